//! The notes API: the async [`NotesApi`] seam consumed by client components,
//! and the serde [`Request`]/[`Reply`] pair dispatched against a [`NoteStore`].
//!
//! ## Wire shape
//!
//! Requests are internally tagged by `op` with camelCase names and fields:
//!
//! ```rust
//! use linenotes_core::Request;
//!
//! let req: Request =
//!     serde_json::from_str(r#"{"op":"createLine","textId":1,"content":"x","order":0}"#).unwrap();
//! assert_eq!(
//!     req,
//!     Request::CreateLine { text_id: 1, content: "x".to_string(), order: 0 }
//! );
//! ```
//!
//! Replies are `{"ok": <payload>}` or `{"error": "<message>"}`.

use crate::{Line, LinenotesError, NoteStore, Result, Text, TextSummary};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Every query and mutation the client side needs from the server.
///
/// Calls may complete in any order relative to further user input; callers
/// must not assume a call resolves before the next user event is handled.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list_texts(&self) -> Result<Vec<TextSummary>>;

    async fn get_text(&self, text_id: i64) -> Result<Option<Text>>;

    /// Lines of `text_id`, ascending by `order`.
    async fn lines_by_text(&self, text_id: i64) -> Result<Vec<Line>>;

    /// Lines containing `word`; empty for a blank `word`.
    async fn search_lines(&self, word: &str) -> Result<Vec<Line>>;

    async fn create_text(&self, title: &str) -> Result<TextSummary>;

    async fn create_line(&self, text_id: i64, content: &str, order: i64) -> Result<Line>;

    async fn update_line(&self, line_id: i64, content: &str) -> Result<Line>;

    async fn delete_line(&self, line_id: i64) -> Result<Line>;
}

/// A [`NoteStore`] shared between tasks.
///
/// The SQLite connection is not `Sync`, so every call takes the lock for the
/// duration of one resolver. The lock is never held across an `.await`.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<NoteStore>>,
}

impl SharedStore {
    pub fn new(store: NoteStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Locks the store for direct use.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::Transport`] if a previous holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, NoteStore>> {
        self.inner
            .lock()
            .map_err(|_| LinenotesError::Transport("note store lock poisoned".to_string()))
    }

    /// Runs `request` against the store.
    pub fn dispatch(&self, request: Request) -> Result<Response> {
        dispatch(&mut *self.lock()?, request)
    }
}

#[async_trait]
impl NotesApi for SharedStore {
    async fn list_texts(&self) -> Result<Vec<TextSummary>> {
        self.lock()?.list_texts()
    }

    async fn get_text(&self, text_id: i64) -> Result<Option<Text>> {
        self.lock()?.get_text(text_id)
    }

    async fn lines_by_text(&self, text_id: i64) -> Result<Vec<Line>> {
        self.lock()?.lines_by_text(text_id)
    }

    async fn search_lines(&self, word: &str) -> Result<Vec<Line>> {
        self.lock()?.search_lines(word)
    }

    async fn create_text(&self, title: &str) -> Result<TextSummary> {
        self.lock()?.create_text(title)
    }

    async fn create_line(&self, text_id: i64, content: &str, order: i64) -> Result<Line> {
        self.lock()?.create_line(text_id, content, order)
    }

    async fn update_line(&self, line_id: i64, content: &str) -> Result<Line> {
        self.lock()?.update_line(line_id, content)
    }

    async fn delete_line(&self, line_id: i64) -> Result<Line> {
        self.lock()?.delete_line(line_id)
    }
}

/// One API call, as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    ListTexts,
    GetText { id: i64 },
    LinesByText { text_id: i64 },
    SearchLines { word: String },
    CreateText { title: String },
    CreateLine { text_id: i64, content: String, order: i64 },
    UpdateLine { id: i64, content: String },
    DeleteLine { id: i64 },
}

/// The payload produced by a successful [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Texts(Vec<TextSummary>),
    Text(Option<Text>),
    Lines(Vec<Line>),
    Summary(TextSummary),
    Line(Line),
}

/// The envelope written back to the client for each request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Reply {
    Ok(Response),
    Error(String),
}

/// Resolves `request` against `store`.
pub fn dispatch(store: &mut NoteStore, request: Request) -> Result<Response> {
    let response = match request {
        Request::ListTexts => Response::Texts(store.list_texts()?),
        Request::GetText { id } => Response::Text(store.get_text(id)?),
        Request::LinesByText { text_id } => Response::Lines(store.lines_by_text(text_id)?),
        Request::SearchLines { word } => Response::Lines(store.search_lines(&word)?),
        Request::CreateText { title } => Response::Summary(store.create_text(&title)?),
        Request::CreateLine {
            text_id,
            content,
            order,
        } => Response::Line(store.create_line(text_id, &content, order)?),
        Request::UpdateLine { id, content } => Response::Line(store.update_line(id, &content)?),
        Request::DeleteLine { id } => Response::Line(store.delete_line(id)?),
    };
    Ok(response)
}

/// Parses one JSON request, resolves it, and returns the JSON reply.
///
/// Malformed input and resolver failures both become `{"error": ...}` replies.
pub fn handle_json(store: &SharedStore, raw: &str) -> String {
    let reply = match serde_json::from_str::<Request>(raw) {
        Ok(request) => {
            log::debug!("dispatching {request:?}");
            match store.dispatch(request) {
                Ok(response) => Reply::Ok(response),
                Err(e) => {
                    log::warn!("request failed: {e}");
                    Reply::Error(e.to_string())
                }
            }
        }
        Err(e) => {
            log::warn!("malformed request: {e}");
            Reply::Error(LinenotesError::Json(e).to_string())
        }
    };

    serde_json::to_string(&reply).unwrap_or_else(|e| {
        log::error!("failed to encode reply: {e}");
        r#"{"error":"internal encoding failure"}"#.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn shared() -> SharedStore {
        SharedStore::new(NoteStore::in_memory().unwrap())
    }

    fn call(store: &SharedStore, request: Value) -> Value {
        serde_json::from_str(&handle_json(store, &request.to_string())).unwrap()
    }

    #[test]
    fn test_create_text_then_list() {
        let store = shared();

        let created = call(&store, json!({"op": "createText", "title": "Ideas"}));
        assert_eq!(created["ok"]["title"], "Ideas");
        let id = created["ok"]["id"].as_i64().unwrap();

        let listed = call(&store, json!({"op": "listTexts"}));
        assert_eq!(listed["ok"], json!([{"id": id, "title": "Ideas"}]));
    }

    #[test]
    fn test_line_lifecycle_over_json() {
        let store = shared();
        let id = call(&store, json!({"op": "createText", "title": "T"}))["ok"]["id"].clone();

        let line = call(
            &store,
            json!({"op": "createLine", "textId": id, "content": "one", "order": 0}),
        );
        assert_eq!(line["ok"]["content"], "one");
        assert_eq!(line["ok"]["textId"], id);
        let line_id = line["ok"]["id"].clone();

        let updated = call(&store, json!({"op": "updateLine", "id": line_id, "content": "uno"}));
        assert_eq!(updated["ok"]["content"], "uno");

        let lines = call(&store, json!({"op": "linesByText", "textId": id}));
        assert_eq!(lines["ok"][0]["content"], "uno");

        let hits = call(&store, json!({"op": "searchLines", "word": "un"}));
        assert_eq!(hits["ok"].as_array().unwrap().len(), 1);

        let text = call(&store, json!({"op": "getText", "id": id}));
        assert_eq!(text["ok"]["lines"][0]["content"], "uno");

        let deleted = call(&store, json!({"op": "deleteLine", "id": line_id}));
        assert_eq!(deleted["ok"]["id"], line_id);
    }

    #[test]
    fn test_get_unknown_text_is_null() {
        let store = shared();
        let reply = call(&store, json!({"op": "getText", "id": 404}));
        assert_eq!(reply, json!({"ok": null}));
    }

    #[test]
    fn test_resolver_error_becomes_error_reply() {
        let store = shared();
        let reply = call(&store, json!({"op": "updateLine", "id": 3, "content": "x"}));
        assert_eq!(reply["error"], "Line not found: 3");
    }

    #[test]
    fn test_malformed_request_becomes_error_reply() {
        let store = shared();
        let reply: Value = serde_json::from_str(&handle_json(&store, "{not json")).unwrap();
        assert!(reply["error"].as_str().unwrap().starts_with("JSON error"));

        let unknown = call(&store, json!({"op": "dropTable"}));
        assert!(unknown.get("error").is_some());
    }

    #[tokio::test]
    async fn test_shared_store_implements_notes_api() {
        let store = shared();
        let text = store.create_text("Async").await.unwrap();
        store.create_line(text.id, "hello world", 0).await.unwrap();

        let lines = NotesApi::lines_by_text(&store, text.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert!(NotesApi::search_lines(&store, " ").await.unwrap().is_empty());
    }
}
