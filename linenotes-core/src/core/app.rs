//! The state owner tying the note list and the editor together.
//!
//! User input arrives as [`Message`]s through [`NotesApp::update`]; completed
//! background work is picked up with [`NotesApp::next_event`]. A successful save
//! refreshes the note list from here, so neither component needs a handle on
//! the other.

use crate::core::editor::{EditorConfig, EditorSession, Key, Notice};
use crate::core::note_list::NoteList;
use crate::{NotesApi, Result};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    SelectText(i64),
    CreateText(String),
    EditLine { index: usize, content: String },
    Key { index: usize, key: Key },
    Save,
    SetFilter(String),
}

pub struct NotesApp<A> {
    notes: NoteList<A>,
    editor: EditorSession<A>,
}

impl<A: NotesApi + 'static> NotesApp<A> {
    pub fn new(api: Arc<A>, config: &EditorConfig) -> Self {
        Self {
            notes: NoteList::new(Arc::clone(&api)),
            editor: EditorSession::new(api, config),
        }
    }

    pub fn notes(&self) -> &NoteList<A> {
        &self.notes
    }

    pub fn editor(&self) -> &EditorSession<A> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorSession<A> {
        &mut self.editor
    }

    /// Loads the note list and opens the first text, if there is one.
    pub async fn start(&mut self) -> Result<()> {
        self.notes.refresh().await?;
        if let Some(first) = self.notes.texts().first().map(|t| t.id) {
            self.notes.select(first);
            self.editor.select_text(Some(first)).await?;
        }
        Ok(())
    }

    /// Handles one user message.
    pub async fn update(&mut self, message: Message) -> Result<()> {
        match message {
            Message::SelectText(text_id) => {
                if self.notes.select(text_id) {
                    self.editor.select_text(Some(text_id)).await?;
                }
            }
            Message::CreateText(title) => {
                if let Some(text_id) = self.notes.create_text(&title).await? {
                    self.editor.select_text(Some(text_id)).await?;
                }
            }
            Message::EditLine { index, content } => self.editor.edit_line(index, content)?,
            Message::Key { index, key } => {
                self.editor.handle_key(index, key)?;
            }
            Message::Save => {
                if !self.editor.save() {
                    log::debug!("save ignored: nothing selected or a save is running");
                }
            }
            Message::SetFilter(filter) => self.editor.set_filter(filter),
        }
        Ok(())
    }

    /// Waits for the next background completion and applies it.
    ///
    /// Returns the notice to show, if the completion produced one.
    pub async fn next_event(&mut self) -> Option<Notice> {
        let event = self.editor.next_event().await?;
        let notice = self.editor.apply(event);
        if let Some(Notice::Saved(_)) = notice {
            // The list refresh only affects the sidebar; the save itself stands.
            let _ = self.notes.refresh().await;
        }
        notice
    }
}
