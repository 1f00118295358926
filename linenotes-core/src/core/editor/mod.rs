//! The note-line editor: local buffer, keyboard editing, positional save,
//! and the debounced search-as-you-type assist.

pub mod config;
pub mod debounce;
pub mod session;
pub mod state;

#[doc(inline)]
pub use config::EditorConfig;
#[doc(inline)]
pub use debounce::Debouncer;
#[doc(inline)]
pub use session::{EditorEvent, EditorSession, Notice, SaveReport};
#[doc(inline)]
pub use state::{
    last_token, load_lines, reconcile, Direction, EditorState, Key, SavePlan, SaveStep,
    SearchAction, SearchPanel, SearchRequest,
};
