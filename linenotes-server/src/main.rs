//! Linenotes API host.
//!
//! Reads one JSON request per line on stdin and writes one JSON reply per
//! line on stdout. Logs go to stderr; set `RUST_LOG` to override the filter
//! from the settings file. The first argument, if given, overrides the
//! database path.

use linenotes_server_lib::settings::load_settings;
use linenotes_server_lib::{open_store, serve};
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut settings = load_settings();
    if let Some(path) = std::env::args().nth(1) {
        settings.database_path = path;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = match open_store(&settings) {
        Ok(store) => store,
        Err(e) => {
            log::error!("cannot open {}: {e}", settings.database_path);
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    log::info!("linenotes server ready");
    match serve(&store, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("server stopped: {e}");
            ExitCode::FAILURE
        }
    }
}
