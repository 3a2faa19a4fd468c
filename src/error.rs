//! Custom error types for playlist-selector.
//!
//! Acquisition and generator failures end the session; everything else is
//! recovered close to where it happens.

use std::error::Error;
use std::fmt;
use std::io;

/// Application error types.
#[derive(Debug)]
pub enum AppError {
    /// Playlist could not be found, read or fetched
    Acquisition(String),
    /// Network/HTTP errors
    Network(String),
    /// JSON parsing errors
    Parse(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(io::Error),
    /// Invalid input from user
    InvalidInput(String),
    /// External generator exited unsuccessfully
    Generator { code: Option<i32>, stderr: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Acquisition(msg) => write!(f, "Acquisition error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Generator { code, stderr } => {
                match code {
                    Some(code) => write!(f, "Generator exited with status {}", code)?,
                    None => write!(f, "Generator terminated by signal")?,
                }
                if !stderr.trim().is_empty() {
                    write!(f, ":\n{}", stderr.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Config(format!("invalid blocked keyword pattern: {}", err))
    }
}

impl From<glob::PatternError> for AppError {
    fn from(err: glob::PatternError) -> Self {
        AppError::Acquisition(format!("invalid discovery pattern: {}", err))
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
