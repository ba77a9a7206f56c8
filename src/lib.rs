pub mod types;
pub mod config;
pub mod rounds;
pub mod grouping;
pub mod numbering;
pub mod geometry;
pub mod connectors;
pub mod layout;

pub use types::*;
pub use config::LayoutConfig;
pub use rounds::{classify, classify_with, LabelStyle, RoundInfo};
pub use grouping::{group, sort_for_display, Grouping, MatchSlot};
pub use numbering::assign_numbers;
pub use geometry::collect;
pub use connectors::{route, route_with_offset};
pub use layout::{build_view, compute_boxes, BracketView, RoundColumn};

use std::{
    env,
    fs,
    io::Read,
    path::Path,
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

// ── Logging ────────────────────────────────────────────────────────────

/// File logging under `logs_dir`; keep the returned guard alive until exit.
pub fn init_tracing(logs_dir: &Path) -> WorkerGuard {
    fs::create_dir_all(logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(logs_dir, "bracket_layout.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init();
    guard
}

// ── Dump tool ──────────────────────────────────────────────────────────

fn read_matches(source: Option<&str>) -> Result<Vec<Match>, String> {
    let data = match source {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("read stdin: {e}"))?;
            buf
        }
        Some(path) => fs::read_to_string(path).map_err(|e| format!("read matches {path}: {e}"))?,
    };
    serde_json::from_str::<Vec<Match>>(&data).map_err(|e| format!("parse matches: {e}"))
}

fn dump(source: Option<&str>) -> Result<String, String> {
    let config = config::load_config()?;
    let matches = read_matches(source)?;
    info!(count = matches.len(), "loaded matches");
    let view = build_view(&matches, &config);
    serde_json::to_string_pretty(&view).map_err(|e| format!("serialize view: {e}"))
}

/// Reads a JSON match array (file argument or stdin) and prints the bracket view.
pub fn run() {
    config::load_env_file(Path::new(".env"));
    let guard = init_tracing(Path::new("logs"));
    info!("bracket layout dump starting");

    let source = env::args().nth(1);
    match dump(source.as_deref()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            drop(guard);
            std::process::exit(1);
        }
    }
}
