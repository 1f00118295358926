//! Drives an [`EditorState`] against a [`NotesApi`].
//!
//! The session is owned by a single task. Debounced searches and saves run as
//! spawned tasks and report back through [`EditorEvent`]s, which the owner
//! feeds into [`EditorSession::apply`]; that is the only place their results
//! touch the state.

use super::{Debouncer, EditorConfig, EditorState, Key, SaveStep, SearchAction};
use crate::{Line, NotesApi, Result};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Counts of the calls a finished save made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub updated: usize,
    pub created: usize,
}

/// Completion of background work started by the session.
#[derive(Debug)]
pub enum EditorEvent {
    SearchFinished {
        generation: u64,
        result: Result<Vec<Line>>,
    },
    SaveFinished {
        text_id: i64,
        revision: u64,
        outcome: Result<SaveReport>,
        /// The text's lines fetched after the save, if that fetch worked.
        refreshed: Option<Vec<Line>>,
    },
}

/// What the user should be told after an event was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved(SaveReport),
    SaveFailed(String),
}

pub struct EditorSession<A> {
    api: Arc<A>,
    state: EditorState,
    debouncer: Debouncer,
    events_tx: UnboundedSender<EditorEvent>,
    events_rx: UnboundedReceiver<EditorEvent>,
}

impl<A: NotesApi + 'static> EditorSession<A> {
    pub fn new(api: Arc<A>, config: &EditorConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: EditorState::new(config.min_search_token_chars),
            debouncer: Debouncer::new(config.search_debounce()),
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Returns and clears the pending focus request.
    pub fn take_focus(&mut self) -> Option<usize> {
        self.state.take_focus()
    }

    /// Switches the editor to `text_id` and loads its lines.
    ///
    /// # Errors
    ///
    /// Propagates the API error if the lines cannot be fetched. The editor is
    /// then left showing a single empty line for the new selection and refuses
    /// to save until a [`reload`](Self::reload) succeeds.
    pub async fn select_text(&mut self, text_id: Option<i64>) -> Result<()> {
        self.debouncer.cancel();
        self.state.select(text_id);
        self.reload().await
    }

    /// Re-fetches the selected text's lines, replacing the local buffer.
    pub async fn reload(&mut self) -> Result<()> {
        let Some(text_id) = self.state.text_id() else {
            return Ok(());
        };
        let lines = self.api.lines_by_text(text_id).await?;
        log::debug!("loaded {} lines for text {text_id}", lines.len());
        self.state.load(lines);
        Ok(())
    }

    /// Replaces line `index` and re-arms or cancels the search assist.
    pub fn edit_line(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        match self.state.edit_line(index, text)? {
            SearchAction::Cancel => self.debouncer.cancel(),
            SearchAction::Schedule(request) => {
                let api = Arc::clone(&self.api);
                let events = self.events_tx.clone();
                self.debouncer.schedule(async move {
                    log::debug!("searching lines for {:?}", request.word);
                    let result = api.search_lines(&request.word).await;
                    // The receiver lives as long as the session that owns this task.
                    let _ = events.send(EditorEvent::SearchFinished {
                        generation: request.generation,
                        result,
                    });
                });
            }
        }
        Ok(())
    }

    /// Applies a keystroke on line `index`. Returns whether it was handled.
    pub fn handle_key(&mut self, index: usize, key: Key) -> Result<bool> {
        self.state.handle_key(index, key)
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.state.set_filter(filter);
    }

    /// Starts saving the local buffer in the background.
    ///
    /// Returns `false` if nothing is selected or a save is already running.
    /// Edits stay allowed while the save runs; the result arrives as
    /// [`EditorEvent::SaveFinished`].
    pub fn save(&mut self) -> bool {
        let Some(plan) = self.state.begin_save() else {
            return false;
        };
        log::info!("saving text {} ({} calls)", plan.text_id, plan.steps.len());

        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = run_save_steps(api.as_ref(), plan.text_id, &plan.steps).await;
            let refreshed = match api.lines_by_text(plan.text_id).await {
                Ok(lines) => Some(lines),
                Err(e) => {
                    log::warn!("could not refresh text {} after save: {e}", plan.text_id);
                    None
                }
            };
            let _ = events.send(EditorEvent::SaveFinished {
                text_id: plan.text_id,
                revision: plan.revision,
                outcome,
                refreshed,
            });
        });
        true
    }

    /// Waits for the next background completion.
    pub async fn next_event(&mut self) -> Option<EditorEvent> {
        self.events_rx.recv().await
    }

    /// Returns a completion that already arrived, without waiting.
    pub fn try_next_event(&mut self) -> Option<EditorEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Folds a background completion into the state.
    pub fn apply(&mut self, event: EditorEvent) -> Option<Notice> {
        match event {
            EditorEvent::SearchFinished { generation, result } => {
                self.state.apply_search(generation, result);
                None
            }
            EditorEvent::SaveFinished {
                text_id,
                revision,
                outcome,
                refreshed,
            } => {
                self.state.finish_save(text_id, revision, outcome.is_ok(), refreshed);
                match outcome {
                    Ok(report) => {
                        log::info!(
                            "saved text {text_id}: {} updated, {} created",
                            report.updated,
                            report.created
                        );
                        Some(Notice::Saved(report))
                    }
                    Err(e) => {
                        log::error!("saving text {text_id} failed: {e}");
                        Some(Notice::SaveFailed(e.user_message()))
                    }
                }
            }
        }
    }
}

/// Issues the save calls one after another, stopping at the first failure.
///
/// Calls that completed before a failure stay committed.
async fn run_save_steps<A: NotesApi + ?Sized>(
    api: &A,
    text_id: i64,
    steps: &[SaveStep],
) -> Result<SaveReport> {
    let mut report = SaveReport::default();
    for step in steps {
        match step {
            SaveStep::Update {
                line_id, content, ..
            } => {
                api.update_line(*line_id, content).await?;
                report.updated += 1;
            }
            SaveStep::Create { order, content } => {
                api.create_line(text_id, content, *order).await?;
                report.created += 1;
            }
        }
    }
    Ok(report)
}
