//! Core library for Linenotes: notes made of ordered lines.
//!
//! [`NoteStore`] resolves the API's queries and mutations over a SQLite
//! database; [`SharedStore`] shares it between tasks and implements the
//! [`NotesApi`] seam that the client side talks to. On the client side,
//! [`NotesApp`] owns a [`NoteList`] and an [`EditorSession`], which in turn
//! drives the [`EditorState`] line editor.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    api::{dispatch, handle_json, NotesApi, Reply, Request, Response, SharedStore},
    app::{Message, NotesApp},
    editor::{
        Direction, EditorConfig, EditorEvent, EditorSession, EditorState, Key, Notice,
        SaveReport, SaveStep, SearchPanel,
    },
    error::{LinenotesError, Result},
    note::{Line, Text, TextSummary},
    note_list::NoteList,
    storage::Storage,
    store::NoteStore,
};
