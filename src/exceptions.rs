//! Error types for lunahack

use std::fmt;

/// Main error type for lunahack operations
#[derive(Debug)]
pub enum LunaError {
    /// No candidate cartridge images in the working directory
    NoImages,

    /// User chose to quit at an interactive prompt
    Aborted,

    /// External tool exited non-zero under the strict failure policy
    Tool {
        tool: String,
        status: i32,
        stderr: String,
    },

    /// Interactive prompt failure (terminal not available, etc.)
    Prompt(dialoguer::Error),

    /// IO error
    Io(std::io::Error),

    /// Generic error with message
    Generic(String),
}

impl fmt::Display for LunaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LunaError::NoImages => write!(f, "No cartridge images found"),
            LunaError::Aborted => write!(f, "Session aborted by user"),
            LunaError::Tool {
                tool,
                status,
                stderr,
            } => write!(f, "Tool '{tool}' failed with status {status}: {stderr}"),
            LunaError::Prompt(err) => write!(f, "Prompt error: {err}"),
            LunaError::Io(err) => write!(f, "IO error: {err}"),
            LunaError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for LunaError {}

impl From<std::io::Error> for LunaError {
    fn from(err: std::io::Error) -> Self {
        LunaError::Io(err)
    }
}

impl From<dialoguer::Error> for LunaError {
    fn from(err: dialoguer::Error) -> Self {
        LunaError::Prompt(err)
    }
}

/// Result type for lunahack operations
pub type Result<T> = std::result::Result<T, LunaError>;
