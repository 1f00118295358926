//! The line editor's synchronous state machine.
//!
//! [`EditorState`] owns the local line buffer of the selected text and decides
//! what the session has to do next (arm a search, run a save plan), but never
//! performs I/O itself.

use crate::{Line, LinenotesError, Result};

/// Direction for [`EditorState::move_focus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Keystrokes the editor reacts to while a line has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Line break: open an empty line below.
    Enter,
    ArrowUp,
    ArrowDown,
    /// Remove the focused line if it is empty.
    Delete,
    /// Anything else; the editor ignores it.
    Other,
}

/// Search results shown under the line that triggered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPanel {
    pub index: usize,
    pub word: String,
    pub results: Vec<Line>,
}

/// A debounced search the session should arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub index: usize,
    pub word: String,
}

/// What an edit means for the search-as-you-type assist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Drop any pending timer; the panel is already hidden.
    Cancel,
    /// (Re)arm the debounce timer for this request.
    Schedule(SearchRequest),
}

/// One API call needed to bring the server in line with the local buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStep {
    Update {
        index: usize,
        line_id: i64,
        content: String,
    },
    Create {
        order: i64,
        content: String,
    },
}

/// The calls for one save pass, in ascending line index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub text_id: i64,
    /// Buffer revision the plan was taken from.
    pub revision: u64,
    pub steps: Vec<SaveStep>,
}

/// Returns the local buffer for a freshly fetched set of lines.
///
/// Lines are taken in `order`; an empty text becomes a single empty line.
pub fn load_lines(server_lines: &[Line]) -> Vec<String> {
    if server_lines.is_empty() {
        return vec![String::new()];
    }
    let mut sorted: Vec<&Line> = server_lines.iter().collect();
    sorted.sort_by_key(|line| line.order);
    sorted.into_iter().map(|line| line.content.clone()).collect()
}

/// The last whitespace-delimited token of `text`, or `""`.
pub fn last_token(text: &str) -> &str {
    text.split_whitespace().last().unwrap_or("")
}

/// Matches the local buffer against `persisted` by position.
///
/// Index `i` is compared with the `i`-th persisted line: a differing content
/// becomes an update, a missing counterpart with non-blank content becomes a
/// create at order `i`. Persisted lines past the end of the buffer are left alone.
pub fn reconcile(persisted: &[Line], lines: &[String]) -> Vec<SaveStep> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(index, content)| match persisted.get(index) {
            Some(existing) if existing.content != *content => Some(SaveStep::Update {
                index,
                line_id: existing.id,
                content: content.clone(),
            }),
            Some(_) => None,
            None if !content.trim().is_empty() => Some(SaveStep::Create {
                order: index as i64,
                content: content.clone(),
            }),
            None => None,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct EditorState {
    text_id: Option<i64>,
    /// Server lines from the last fetch, sorted by `order`.
    persisted: Vec<Line>,
    /// Never empty.
    lines: Vec<String>,
    active_index: Option<usize>,
    saving: bool,
    /// Set once the selected text's lines were fetched; saving waits for it.
    loaded: bool,
    panel: Option<SearchPanel>,
    pending_search: Option<SearchRequest>,
    generation: u64,
    revision: u64,
    filter: String,
    min_token_chars: usize,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(2)
    }
}

impl EditorState {
    /// Creates an editor with nothing selected.
    ///
    /// Edits whose last token is shorter than `min_token_chars` characters do
    /// not trigger a search.
    pub fn new(min_token_chars: usize) -> Self {
        Self {
            text_id: None,
            persisted: Vec::new(),
            lines: vec![String::new()],
            active_index: None,
            saving: false,
            loaded: false,
            panel: None,
            pending_search: None,
            generation: 0,
            revision: 0,
            filter: String::new(),
            min_token_chars,
        }
    }

    pub fn text_id(&self) -> Option<i64> {
        self.text_id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn persisted(&self) -> &[Line] {
        &self.persisted
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn panel(&self) -> Option<&SearchPanel> {
        self.panel.as_ref()
    }

    /// True once the selected text's lines have been fetched.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True while a debounced search is armed or in flight.
    pub fn is_searching(&self) -> bool {
        self.pending_search.is_some()
    }

    /// Returns and clears the pending focus request.
    pub fn take_focus(&mut self) -> Option<usize> {
        self.active_index.take()
    }

    /// Switches to `text_id`, discarding the local buffer and any search state.
    ///
    /// The buffer is `[""]` until [`load`](Self::load) supplies the fetched lines.
    pub fn select(&mut self, text_id: Option<i64>) {
        self.text_id = text_id;
        self.persisted.clear();
        self.loaded = false;
        self.lines = vec![String::new()];
        self.active_index = None;
        self.filter.clear();
        self.cancel_search();
        self.revision += 1;
    }

    /// Replaces the buffer with freshly fetched `server_lines`.
    pub fn load(&mut self, server_lines: Vec<Line>) {
        self.lines = load_lines(&server_lines);
        self.set_persisted(server_lines);
        self.loaded = true;
        self.revision += 1;
    }

    fn set_persisted(&mut self, mut server_lines: Vec<Line>) {
        server_lines.sort_by_key(|line| line.order);
        self.persisted = server_lines;
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(LinenotesError::LineIndexOutOfRange {
                index,
                len: self.lines.len(),
            })
        }
    }

    /// Replaces line `index` with `text` and decides what happens to the search assist.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::LineIndexOutOfRange`] if `index` is past the end.
    pub fn edit_line(&mut self, index: usize, text: impl Into<String>) -> Result<SearchAction> {
        self.check_index(index)?;
        let text = text.into();
        let word = last_token(&text).to_string();
        self.lines[index] = text;
        self.revision += 1;

        if word.chars().count() < self.min_token_chars {
            self.cancel_search();
            return Ok(SearchAction::Cancel);
        }

        if self.panel.as_ref().is_some_and(|panel| panel.index != index) {
            self.panel = None;
        }
        self.generation += 1;
        let request = SearchRequest {
            generation: self.generation,
            index,
            word,
        };
        self.pending_search = Some(request.clone());
        Ok(SearchAction::Schedule(request))
    }

    /// Opens an empty line below `index` and requests focus for it.
    pub fn insert_after(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.lines.insert(index + 1, String::new());
        self.active_index = Some(index + 1);
        self.revision += 1;
        self.shift_search_anchor(|anchor| Some(if anchor > index { anchor + 1 } else { anchor }));
        Ok(())
    }

    /// Requests focus on the neighbouring line; no-op at either end.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::LineIndexOutOfRange`] if `index` is past the end.
    pub fn move_focus(&mut self, index: usize, direction: Direction) -> Result<()> {
        self.check_index(index)?;
        match direction {
            Direction::Up if index > 0 => self.active_index = Some(index - 1),
            Direction::Down if index + 1 < self.lines.len() => self.active_index = Some(index + 1),
            _ => {}
        }
        Ok(())
    }

    /// Removes line `index` if it is empty and not the only line.
    ///
    /// Focus moves to the previous line (or the first one). Returns whether a
    /// line was removed.
    pub fn delete_empty_line(&mut self, index: usize) -> bool {
        let removable = self.lines.len() > 1
            && self.lines.get(index).is_some_and(|line| line.is_empty());
        if !removable {
            return false;
        }

        self.lines.remove(index);
        self.active_index = Some(index.saturating_sub(1));
        self.revision += 1;
        self.shift_search_anchor(|anchor| match anchor.cmp(&index) {
            std::cmp::Ordering::Less => Some(anchor),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(anchor - 1),
        });
        true
    }

    /// Applies the keystroke `key` on line `index`. Returns whether it was handled.
    pub fn handle_key(&mut self, index: usize, key: Key) -> Result<bool> {
        self.check_index(index)?;
        match key {
            Key::Enter => {
                self.insert_after(index)?;
                Ok(true)
            }
            Key::ArrowUp => {
                self.move_focus(index, Direction::Up)?;
                Ok(true)
            }
            Key::ArrowDown => {
                self.move_focus(index, Direction::Down)?;
                Ok(true)
            }
            Key::Delete => Ok(self.delete_empty_line(index)),
            Key::Other => Ok(false),
        }
    }

    /// Keeps the panel and any pending search attached to the same line after
    /// the buffer shifts. `remap` returns `None` when that line disappeared.
    fn shift_search_anchor(&mut self, remap: impl Fn(usize) -> Option<usize>) {
        if let Some(panel) = self.panel.as_mut() {
            match remap(panel.index) {
                Some(index) => panel.index = index,
                None => self.panel = None,
            }
        }
        if let Some(pending) = self.pending_search.as_mut() {
            match remap(pending.index) {
                Some(index) => pending.index = index,
                None => self.cancel_search(),
            }
        }
    }

    /// Hides the panel and invalidates any search still in flight.
    pub fn cancel_search(&mut self) {
        self.generation += 1;
        self.pending_search = None;
        self.panel = None;
    }

    /// Shows the outcome of search `generation` if it is still the current one.
    ///
    /// Failures hide the panel. Returns `false` when the result was stale and dropped.
    pub fn apply_search(&mut self, generation: u64, result: Result<Vec<Line>>) -> bool {
        let pending = match self.pending_search.take() {
            Some(pending) if pending.generation == generation => pending,
            other => {
                self.pending_search = other;
                log::debug!("dropping stale search result (generation {generation})");
                return false;
            }
        };

        match result {
            Ok(results) => {
                self.panel = Some(SearchPanel {
                    index: pending.index,
                    word: pending.word,
                    results,
                });
            }
            Err(e) => {
                log::warn!("line search for {:?} failed: {e}", pending.word);
                self.panel = None;
            }
        }
        true
    }

    /// Marks a save as running and returns what it has to do.
    ///
    /// Returns `None` when no text is selected, its lines were never fetched,
    /// or a save is already running. Without the fetched lines every local
    /// line would be re-created on the server.
    pub fn begin_save(&mut self) -> Option<SavePlan> {
        let text_id = self.text_id?;
        if self.saving || !self.loaded {
            return None;
        }
        self.saving = true;
        Some(SavePlan {
            text_id,
            revision: self.revision,
            steps: reconcile(&self.persisted, &self.lines),
        })
    }

    /// Ends the save described by `plan`.
    ///
    /// `refreshed` holds the text's lines as fetched after the save. They replace
    /// the buffer only when the save succeeded and nothing was edited since the
    /// plan was taken; otherwise the local edits stay for the next save.
    pub fn finish_save(
        &mut self,
        plan_text_id: i64,
        plan_revision: u64,
        succeeded: bool,
        refreshed: Option<Vec<Line>>,
    ) {
        self.saving = false;
        if self.text_id != Some(plan_text_id) {
            return;
        }
        let Some(refreshed) = refreshed else {
            return;
        };
        if succeeded && self.revision == plan_revision {
            self.load(refreshed);
        } else {
            self.set_persisted(refreshed);
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Persisted lines containing the filter, ignoring case. Empty for a blank filter.
    pub fn filtered_lines(&self) -> Vec<&Line> {
        let needle = self.filter.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.persisted
            .iter()
            .filter(|line| line.content.to_lowercase().contains(&needle))
            .collect()
    }
}
