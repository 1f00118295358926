//! Query and mutation resolvers over a Linenotes SQLite database.

use crate::{Line, LinenotesError, Result, Storage, Text, TextSummary};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

const LINE_COLUMNS: &str = r#"id, content, "order", text_id"#;

/// An open Linenotes database.
///
/// `NoteStore` resolves every API query and mutation. It holds no state of its
/// own besides the [`Storage`] connection; callers that need to share it across
/// tasks wrap it in a `Mutex` (see [`SharedStore`](crate::SharedStore)).
pub struct NoteStore {
    storage: Storage,
}

impl NoteStore {
    /// Creates a fresh database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::Database`] for any SQLite failure.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            storage: Storage::create(path)?,
        })
    }

    /// Opens an existing database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::InvalidDatabase`] if the file is not a
    /// Linenotes database, or [`LinenotesError::Database`] for any SQLite failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            storage: Storage::open(path)?,
        })
    }

    /// Opens `path`, creating the database first if the file is missing or empty.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            storage: Storage::open_or_create(path)?,
        })
    }

    /// Opens a throwaway in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            storage: Storage::in_memory()?,
        })
    }

    /// Returns the underlying SQLite connection.
    pub fn connection(&self) -> &Connection {
        self.storage.connection()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Returns every text as an `{ id, title }` summary, oldest first.
    pub fn list_texts(&self) -> Result<Vec<TextSummary>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id, title FROM texts ORDER BY id ASC")?;
        let texts = stmt
            .query_map([], |row| {
                Ok(TextSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(texts)
    }

    /// Fetches a single text with its lines, or `None` if `text_id` is unknown.
    pub fn get_text(&self, text_id: i64) -> Result<Option<Text>> {
        let head = self
            .connection()
            .query_row(
                "SELECT id, title, created_at FROM texts WHERE id = ?1",
                [text_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?)),
            )
            .optional()?;

        let Some((id, title, created_at)) = head else {
            return Ok(None);
        };

        Ok(Some(Text {
            id,
            title,
            created_at,
            lines: self.lines_by_text(id)?,
        }))
    }

    /// Returns the lines of `text_id` sorted ascending by `order`.
    ///
    /// Lines sharing an `order` value come back in insertion order. An unknown
    /// text simply has no lines.
    pub fn lines_by_text(&self, text_id: i64) -> Result<Vec<Line>> {
        let mut stmt = self.connection().prepare(&format!(
            r#"SELECT {LINE_COLUMNS} FROM lines WHERE text_id = ?1 ORDER BY "order" ASC, id ASC"#
        ))?;
        let lines = stmt
            .query_map([text_id], map_line_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// Returns every line whose content contains `word`, newest first.
    ///
    /// Matching is a case-sensitive substring test. A blank `word` yields no
    /// results without touching the database.
    pub fn search_lines(&self, word: &str) -> Result<Vec<Line>> {
        if word.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {LINE_COLUMNS} FROM lines WHERE instr(content, ?1) > 0 ORDER BY id DESC"
        ))?;
        let lines = stmt
            .query_map([word], map_line_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("search for {word:?} matched {} lines", lines.len());
        Ok(lines)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Creates an empty text titled `title`.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::ValidationFailed`] if `title` is blank.
    pub fn create_text(&mut self, title: &str) -> Result<TextSummary> {
        if title.trim().is_empty() {
            return Err(LinenotesError::ValidationFailed(
                "A note needs a title".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();
        let conn = self.storage.connection_mut();
        conn.execute(
            "INSERT INTO texts (title, created_at) VALUES (?1, ?2)",
            rusqlite::params![title, now],
        )?;

        Ok(TextSummary {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
        })
    }

    /// Appends a line to `text_id` at position `order`.
    ///
    /// Existing lines are not shifted; the editor supplies positions that are
    /// already consistent.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::TextNotFound`] if the text does not exist, or
    /// [`LinenotesError::ValidationFailed`] if `order` is negative.
    pub fn create_line(&mut self, text_id: i64, content: &str, order: i64) -> Result<Line> {
        if order < 0 {
            return Err(LinenotesError::ValidationFailed(format!(
                "Line order must not be negative (got {order})"
            )));
        }

        let tx = self.storage.connection_mut().transaction()?;

        let text_exists: bool = tx.query_row(
            "SELECT COUNT(*) FROM texts WHERE id = ?1",
            [text_id],
            |row| row.get::<_, i64>(0).map(|count| count > 0),
        )?;
        if !text_exists {
            return Err(LinenotesError::TextNotFound(text_id));
        }

        tx.execute(
            r#"INSERT INTO lines (content, "order", text_id) VALUES (?1, ?2, ?3)"#,
            rusqlite::params![content, order, text_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Line {
            id,
            content: content.to_string(),
            order,
            text_id,
        })
    }

    /// Replaces the content of line `line_id` and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::LineNotFound`] if no such line exists.
    pub fn update_line(&mut self, line_id: i64, content: &str) -> Result<Line> {
        let changed = self.storage.connection().execute(
            "UPDATE lines SET content = ?1 WHERE id = ?2",
            rusqlite::params![content, line_id],
        )?;

        // An UPDATE on a missing row succeeds but touches zero rows.
        if changed == 0 {
            return Err(LinenotesError::LineNotFound(line_id));
        }

        self.get_line(line_id)
    }

    /// Removes line `line_id` and returns the record as it was before deletion.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::LineNotFound`] if no such line exists.
    pub fn delete_line(&mut self, line_id: i64) -> Result<Line> {
        let tx = self.storage.connection_mut().transaction()?;
        let line = tx
            .query_row(
                &format!("SELECT {LINE_COLUMNS} FROM lines WHERE id = ?1"),
                [line_id],
                map_line_row,
            )
            .optional()?
            .ok_or(LinenotesError::LineNotFound(line_id))?;
        tx.execute("DELETE FROM lines WHERE id = ?1", [line_id])?;
        tx.commit()?;
        Ok(line)
    }

    fn get_line(&self, line_id: i64) -> Result<Line> {
        self.connection()
            .query_row(
                &format!("SELECT {LINE_COLUMNS} FROM lines WHERE id = ?1"),
                [line_id],
                map_line_row,
            )
            .optional()?
            .ok_or(LinenotesError::LineNotFound(line_id))
    }
}

/// Row-mapping closure for `rusqlite::Row` → [`Line`], matching `LINE_COLUMNS`.
fn map_line_row(row: &rusqlite::Row) -> rusqlite::Result<Line> {
    Ok(Line {
        id: row.get(0)?,
        content: row.get(1)?,
        order: row.get(2)?,
        text_id: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn store_with_text(title: &str) -> (NoteStore, i64) {
        let mut store = NoteStore::in_memory().unwrap();
        let text = store.create_text(title).unwrap();
        (store, text.id)
    }

    #[test]
    fn test_create_and_list_texts() {
        let mut store = NoteStore::in_memory().unwrap();
        store.create_text("First").unwrap();
        store.create_text("Second").unwrap();

        let titles: Vec<String> = store
            .list_texts()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_create_text_rejects_blank_title() {
        let mut store = NoteStore::in_memory().unwrap();
        let result = store.create_text("   ");
        assert!(matches!(result, Err(LinenotesError::ValidationFailed(_))));
        assert!(store.list_texts().unwrap().is_empty());
    }

    #[test]
    fn test_get_text_includes_ordered_lines() {
        let (mut store, text_id) = store_with_text("Todo");
        store.create_line(text_id, "second", 1).unwrap();
        store.create_line(text_id, "first", 0).unwrap();

        let text = store.get_text(text_id).unwrap().unwrap();
        assert_eq!(text.title, "Todo");
        assert!(text.created_at > 0);
        let contents: Vec<&str> = text.lines.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_get_text_unknown_returns_none() {
        let store = NoteStore::in_memory().unwrap();
        assert!(store.get_text(99).unwrap().is_none());
    }

    #[test]
    fn test_lines_by_text_sorted_by_order_then_id() {
        let (mut store, text_id) = store_with_text("Todo");
        let a = store.create_line(text_id, "a", 2).unwrap();
        let b = store.create_line(text_id, "b", 0).unwrap();
        let c = store.create_line(text_id, "c", 2).unwrap();

        let ids: Vec<i64> = store
            .lines_by_text(text_id)
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);
    }

    #[test]
    fn test_lines_by_text_only_returns_own_lines() {
        let (mut store, first) = store_with_text("One");
        let second = store.create_text("Two").unwrap().id;
        store.create_line(first, "mine", 0).unwrap();
        store.create_line(second, "theirs", 0).unwrap();

        let lines = store.lines_by_text(first).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content, "mine");
        assert_eq!(lines[0].text_id, first);
    }

    #[test]
    fn test_create_line_unknown_text() {
        let mut store = NoteStore::in_memory().unwrap();
        let result = store.create_line(12, "orphan", 0);
        assert!(matches!(result, Err(LinenotesError::TextNotFound(12))));
    }

    #[test]
    fn test_create_line_rejects_negative_order() {
        let (mut store, text_id) = store_with_text("Todo");
        let result = store.create_line(text_id, "x", -1);
        assert!(matches!(result, Err(LinenotesError::ValidationFailed(_))));
    }

    #[test]
    fn test_update_line() {
        let (mut store, text_id) = store_with_text("Todo");
        let line = store.create_line(text_id, "draft", 0).unwrap();

        let updated = store.update_line(line.id, "final").unwrap();
        assert_eq!(updated.content, "final");
        assert_eq!(updated.order, 0);
        assert_eq!(store.lines_by_text(text_id).unwrap()[0].content, "final");
    }

    #[test]
    fn test_update_line_not_found() {
        let mut store = NoteStore::in_memory().unwrap();
        let result = store.update_line(5, "nothing");
        assert!(matches!(result, Err(LinenotesError::LineNotFound(5))));
    }

    #[test]
    fn test_delete_line_returns_deleted_record() {
        let (mut store, text_id) = store_with_text("Todo");
        let line = store.create_line(text_id, "gone soon", 0).unwrap();

        let deleted = store.delete_line(line.id).unwrap();
        assert_eq!(deleted, line);
        assert!(store.lines_by_text(text_id).unwrap().is_empty());
        assert!(matches!(
            store.delete_line(line.id),
            Err(LinenotesError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_search_blank_word_returns_nothing() {
        let (mut store, text_id) = store_with_text("Todo");
        store.create_line(text_id, "   ", 0).unwrap();

        assert!(store.search_lines("").unwrap().is_empty());
        assert!(store.search_lines("  \t").unwrap().is_empty());
    }

    #[test]
    fn test_search_is_substring_newest_first() {
        let (mut store, text_id) = store_with_text("Todo");
        let older = store.create_line(text_id, "buy apples", 0).unwrap();
        store.create_line(text_id, "walk the dog", 1).unwrap();
        let newer = store.create_line(text_id, "pineapple cake", 2).unwrap();

        let ids: Vec<i64> = store
            .search_lines("apple")
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let (mut store, text_id) = store_with_text("Todo");
        store.create_line(text_id, "Rust notes", 0).unwrap();

        assert_eq!(store.search_lines("Rust").unwrap().len(), 1);
        assert!(store.search_lines("rust").unwrap().is_empty());
    }

    #[test]
    fn test_search_treats_like_wildcards_literally() {
        let (mut store, text_id) = store_with_text("Todo");
        store.create_line(text_id, "100% done", 0).unwrap();
        store.create_line(text_id, "1000 done", 1).unwrap();

        let hits = store.search_lines("0%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "100% done");
    }

    #[test]
    fn test_data_persists_across_open() {
        let temp = NamedTempFile::new().unwrap();
        {
            let mut store = NoteStore::create(temp.path()).unwrap();
            let text = store.create_text("Kept").unwrap();
            store.create_line(text.id, "still here", 0).unwrap();
        }

        let store = NoteStore::open(temp.path()).unwrap();
        let texts = store.list_texts().unwrap();
        assert_eq!(texts.len(), 1);
        assert_eq!(store.lines_by_text(texts[0].id).unwrap()[0].content, "still here");
    }
}
