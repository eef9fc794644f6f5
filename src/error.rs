use thiserror::Error;
use tracing::{error, info, warn};

/// Error severity for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,    // expected, e.g. a keymap naming an action this build lacks
    Warning, // shortcut not registered, app keeps working
    Error,   // caller bug that needs fixing
}

/// Domain-specific errors for hotkey registration and lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("Combo is required")]
    InvalidCombo,

    #[error("Handler is required for '{combo}'")]
    MissingHandler { combo: String },

    #[error("Either preset or combo must be specified")]
    MissingCombo,

    #[error("Preset '{0}' not found")]
    UnknownPreset(String),

    #[error("Group '{0}' not found")]
    GroupNotFound(String),

    #[error("Action '{0}' is not provided by the application")]
    UnknownAction(String),
}

impl HotkeyError {
    /// Stable machine-readable code, shared with log output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCombo => "INVALID_COMBO",
            Self::MissingHandler { .. } => "MISSING_HANDLER",
            Self::MissingCombo => "MISSING_COMBO",
            Self::UnknownPreset(_) => "PRESET_NOT_FOUND",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::UnknownAction(_) => "ACTION_NOT_FOUND",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidCombo => ErrorSeverity::Warning,
            Self::MissingHandler { .. } => ErrorSeverity::Error,
            Self::MissingCombo => ErrorSeverity::Warning,
            Self::UnknownPreset(_) => ErrorSeverity::Warning,
            Self::GroupNotFound(_) => ErrorSeverity::Error,
            Self::UnknownAction(_) => ErrorSeverity::Info,
        }
    }

    /// Log a skipped registration at the level its severity calls for.
    pub fn log_skipped(&self, subject: &str) {
        let code = self.code();
        match self.severity() {
            ErrorSeverity::Info => info!(subject, code, error = %self, "Hotkey skipped"),
            ErrorSeverity::Warning => warn!(subject, code, error = %self, "Hotkey skipped"),
            ErrorSeverity::Error => error!(subject, code, error = %self, "Hotkey skipped"),
        }
    }
}

pub type Result<T> = std::result::Result<T, HotkeyError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use where a failure should degrade to a default instead of aborting.
///
/// # Examples
///
/// ```ignore
/// use hotkey_engine::error::ResultExt;
///
/// // An unreadable config file just means defaults
/// let Some(contents) = fs::read_to_string(path).warn_on_err() else {
///     return Config::default();
/// };
/// ```
pub trait ResultExt<T> {
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

/// Panic in debug mode, log error in release mode.
///
/// Use for "impossible" states that should crash during development
/// but gracefully degrade in production.
///
/// # Examples
///
/// ```ignore
/// let index = match self.id_to_index.get(&id) {
///     Some(i) => *i,
///     None => {
///         debug_panic!("index out of sync for {}", id);
///         return;
///     }
/// };
/// ```
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            tracing::error!("IMPOSSIBLE STATE: {}", format_args!($($fmt_arg)*));
        }
    };
}
