//! Internal domain modules for the Linenotes core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod api;
pub mod app;
pub mod editor;
pub mod error;
pub mod note;
pub mod note_list;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

#[doc(inline)]
pub use api::{dispatch, handle_json, NotesApi, Reply, Request, Response, SharedStore};
#[doc(inline)]
pub use app::{Message, NotesApp};
#[doc(inline)]
pub use editor::{EditorConfig, EditorSession, EditorState, Key, Notice, SaveReport};
#[doc(inline)]
pub use error::{LinenotesError, Result};
#[doc(inline)]
pub use note::{Line, Text, TextSummary};
#[doc(inline)]
pub use note_list::NoteList;
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use store::NoteStore;
