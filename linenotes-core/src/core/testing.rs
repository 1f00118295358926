//! In-memory [`NotesApi`] double that records every call.

use crate::{Line, LinenotesError, NoteStore, NotesApi, Result, SharedStore, Text, TextSummary};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListTexts,
    GetText(i64),
    LinesByText(i64),
    SearchLines(String),
    CreateText(String),
    CreateLine { text_id: i64, content: String, order: i64 },
    UpdateLine { id: i64, content: String },
    DeleteLine(i64),
}

impl Call {
    fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateText(_) | Self::CreateLine { .. } | Self::UpdateLine { .. } | Self::DeleteLine(_)
        )
    }
}

/// Backed by a real in-memory SQLite store.
pub struct RecordingApi {
    store: SharedStore,
    calls: Mutex<Vec<Call>>,
    /// Successful mutations still allowed before they start failing.
    mutation_budget: Mutex<Option<usize>>,
    searches_fail: AtomicBool,
    lists_fail: AtomicBool,
    /// Upcoming `lines_by_text` calls that fail before reaching the store.
    line_fetch_failures: AtomicUsize,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            store: SharedStore::new(NoteStore::in_memory().unwrap()),
            calls: Mutex::new(Vec::new()),
            mutation_budget: Mutex::new(None),
            searches_fail: AtomicBool::new(false),
            lists_fail: AtomicBool::new(false),
            line_fetch_failures: AtomicUsize::new(0),
        }
    }

    /// Creates a text with `contents` as lines `0..n`, bypassing the call log.
    pub fn seed_text(&self, title: &str, contents: &[&str]) -> i64 {
        let mut store = self.store.lock().unwrap();
        let text = store.create_text(title).unwrap();
        for (order, content) in contents.iter().enumerate() {
            store.create_line(text.id, content, order as i64).unwrap();
        }
        text.id
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SearchLines(word) => Some(word),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Lets `ok` more mutations through, then fails every following one.
    pub fn fail_mutations_after(&self, ok: usize) {
        *self.mutation_budget.lock().unwrap() = Some(ok);
    }

    pub fn fail_searches(&self, fail: bool) {
        self.searches_fail.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.lists_fail.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `count` line fetches fail with a transport error.
    pub fn fail_line_fetches(&self, count: usize) {
        self.line_fetch_failures.store(count, Ordering::SeqCst);
    }

    fn record(&self, call: Call) -> Result<()> {
        let is_mutation = call.is_mutation();
        self.calls.lock().unwrap().push(call);
        if is_mutation {
            let mut budget = self.mutation_budget.lock().unwrap();
            match *budget {
                Some(0) => return Err(LinenotesError::Transport("connection reset".to_string())),
                Some(ref mut remaining) => *remaining -= 1,
                None => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotesApi for RecordingApi {
    async fn list_texts(&self) -> Result<Vec<TextSummary>> {
        self.record(Call::ListTexts)?;
        if self.lists_fail.load(Ordering::SeqCst) {
            return Err(LinenotesError::Transport("server down".to_string()));
        }
        self.store.list_texts().await
    }

    async fn get_text(&self, text_id: i64) -> Result<Option<Text>> {
        self.record(Call::GetText(text_id))?;
        self.store.get_text(text_id).await
    }

    async fn lines_by_text(&self, text_id: i64) -> Result<Vec<Line>> {
        self.record(Call::LinesByText(text_id))?;
        let pending = self.line_fetch_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.line_fetch_failures.store(pending - 1, Ordering::SeqCst);
            return Err(LinenotesError::Transport("line fetch failed".to_string()));
        }
        self.store.lines_by_text(text_id).await
    }

    async fn search_lines(&self, word: &str) -> Result<Vec<Line>> {
        self.record(Call::SearchLines(word.to_string()))?;
        if self.searches_fail.load(Ordering::SeqCst) {
            return Err(LinenotesError::Transport("search timed out".to_string()));
        }
        self.store.search_lines(word).await
    }

    async fn create_text(&self, title: &str) -> Result<TextSummary> {
        self.record(Call::CreateText(title.to_string()))?;
        self.store.create_text(title).await
    }

    async fn create_line(&self, text_id: i64, content: &str, order: i64) -> Result<Line> {
        self.record(Call::CreateLine {
            text_id,
            content: content.to_string(),
            order,
        })?;
        self.store.create_line(text_id, content, order).await
    }

    async fn update_line(&self, line_id: i64, content: &str) -> Result<Line> {
        self.record(Call::UpdateLine {
            id: line_id,
            content: content.to_string(),
        })?;
        self.store.update_line(line_id, content).await
    }

    async fn delete_line(&self, line_id: i64) -> Result<Line> {
        self.record(Call::DeleteLine(line_id))?;
        self.store.delete_line(line_id).await
    }
}
