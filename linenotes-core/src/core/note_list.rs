//! The list of texts shown beside the editor.

use crate::{NotesApi, Result, TextSummary};
use std::sync::Arc;

pub struct NoteList<A> {
    api: Arc<A>,
    texts: Vec<TextSummary>,
    selected: Option<i64>,
    /// Message from the last failed refresh, cleared by the next good one.
    error: Option<String>,
}

impl<A: NotesApi> NoteList<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            texts: Vec::new(),
            selected: None,
            error: None,
        }
    }

    pub fn texts(&self) -> &[TextSummary] {
        &self.texts
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Re-fetches the text summaries.
    ///
    /// On failure the previous list is kept and the error is remembered for display.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.api.list_texts().await {
            Ok(texts) => {
                self.texts = texts;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("could not load note list: {e}");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Creates a text titled `title`, refreshes, and selects it.
    ///
    /// A blank title is ignored and yields `Ok(None)`.
    pub async fn create_text(&mut self, title: &str) -> Result<Option<i64>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let created = self.api.create_text(title).await?;
        log::info!("created text {} ({:?})", created.id, created.title);
        self.refresh().await?;
        self.select(created.id);
        Ok(Some(created.id))
    }

    /// Selects `text_id`. Returns whether the selection changed.
    pub fn select(&mut self, text_id: i64) -> bool {
        if self.selected == Some(text_id) {
            return false;
        }
        self.selected = Some(text_id);
        true
    }
}
