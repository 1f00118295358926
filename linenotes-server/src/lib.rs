pub mod settings;

// Re-export core library
pub use linenotes_core::*;

use settings::AppSettings;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Opens (or creates) the database named in `settings`, creating its directory.
pub fn open_store(settings: &AppSettings) -> Result<SharedStore> {
    let path = Path::new(&settings.database_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let store = NoteStore::open_or_create(path)?;
    log::info!("opened notes database at {}", path.display());
    Ok(SharedStore::new(store))
}

/// Answers one JSON request per input line until `reader` is exhausted.
///
/// Blank lines are skipped. Returns the number of requests answered.
pub async fn serve<R, W>(store: &SharedStore, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut served = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_json(store, &line);
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        served += 1;
    }
    log::info!("input closed after {served} requests");
    Ok(served)
}
