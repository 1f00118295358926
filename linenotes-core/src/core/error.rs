//! Error types for the Linenotes core library.

use thiserror::Error;

/// All errors that can occur within the Linenotes core library.
#[derive(Debug, Error)]
pub enum LinenotesError {
    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A text ID was requested that does not exist in the database.
    #[error("Text not found: {0}")]
    TextNotFound(i64),

    /// A line ID was requested that does not exist in the database.
    #[error("Line not found: {0}")]
    LineNotFound(i64),

    /// Input was rejected before reaching the database.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The opened file is not a valid Linenotes database.
    #[error("Invalid database: {0}")]
    InvalidDatabase(String),

    /// An editor operation addressed a line index past the end of the buffer.
    #[error("Line index {index} out of range (editor holds {len} lines)")]
    LineIndexOutOfRange { index: usize, len: usize },

    /// A call to the notes API could not be completed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A request or record could not be (de)serialized as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`LinenotesError`].
pub type Result<T> = std::result::Result<T, LinenotesError>;

impl LinenotesError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::TextNotFound(_) => "Note no longer exists".to_string(),
            Self::LineNotFound(_) => "Line no longer exists".to_string(),
            Self::ValidationFailed(msg) => msg.clone(),
            Self::InvalidDatabase(_) => "Could not open notes database".to_string(),
            Self::LineIndexOutOfRange { .. } => "That line is no longer in the editor".to_string(),
            Self::Transport(e) => format!("Server unreachable: {e}"),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}
