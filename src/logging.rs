//! Structured JSONL logging for tooling and human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.hotkey-engine/logs/hotkey-engine.jsonl) - structured for machine parsing
//! - **Pretty to stderr** - human-readable for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use hotkey_engine::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! // Use tracing macros directly
//! tracing::info!(event_type = "app_start", "Replay started");
//! ```
//!
//! # JSONL Output Format
//!
//! Each line is a valid JSON object:
//! ```json
//! {"timestamp":"2026-01-05T10:30:45.123Z","level":"DEBUG","target":"hotkey_engine::hotkeys::engine","fields":{"message":"Hotkey triggered","binding_id":"ctrl+s-global-keydown","scope":"global"}}
//! ```

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::hotkeys::{Dispatch, KeyEvent};

// =============================================================================
// In-memory buffer of recent lines
// =============================================================================

static LOG_BUFFER: Mutex<VecDeque<String>> = Mutex::new(VecDeque::new());
const MAX_LOG_LINES: usize = 50;

const LOG_FILE_NAME: &str = "hotkey-engine.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// If the log file cannot be opened, only stderr output is installed.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            None
        }
    };

    let (json_layer, file_guard) = match file {
        Some(file) => {
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Default to info, allow override via RUST_LOG
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.hotkey-engine/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".hotkey-engine").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("hotkey-engine-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// Categorized helpers
// =============================================================================

/// Log a message under `category` and keep it in the recent-lines buffer.
pub fn log(category: &str, message: &str) {
    add_to_buffer(category, message);
    tracing::info!(category = category, "{}", message);
}

fn add_to_buffer(category: &str, message: &str) {
    let mut buf = LOG_BUFFER.lock();
    if buf.len() >= MAX_LOG_LINES {
        buf.pop_front();
    }
    buf.push_back(format!("[{}] {}", category, message));
}

/// Recent log lines, oldest first.
pub fn recent_logs() -> Vec<String> {
    LOG_BUFFER.lock().iter().cloned().collect()
}

/// The last `n` log lines, newest first.
pub fn last_logs(n: usize) -> Vec<String> {
    LOG_BUFFER.lock().iter().rev().take(n).cloned().collect()
}

/// Log the outcome of one dispatched key event.
pub fn log_key_event(event: &KeyEvent, outcome: &Dispatch) {
    let action = match outcome {
        Dispatch::Ignored => "ignored",
        Dispatch::Unmatched => "unmatched",
        Dispatch::Vetoed { .. } => "vetoed",
        Dispatch::Triggered(_) => "triggered",
    };
    let combo = outcome.triggered().map(|t| t.combo.as_str()).unwrap_or("-");
    add_to_buffer("KEY", &format!("{} {} ({})", action, event.key, combo));

    tracing::debug!(
        event_type = "key_event",
        key = %event.key,
        ctrl = event.ctrl,
        shift = event.shift,
        alt = event.alt,
        meta = event.meta,
        action = action,
        combo = combo,
        "Key {} {}", action, event.key
    );
}

/// Log an error with structured fields and context
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    let msg = match context {
        Some(ctx) => format!("{}: {} (context: {})", category, error, ctx),
        None => format!("{}: {}", category, error),
    };
    add_to_buffer("ERROR", &msg);

    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "{}", msg
    );
}
