//! Error types for the Contentify replay pipeline
//!
//! Only genuinely exceptional conditions live here. Missing properties,
//! invalid variant values and absent nested instances are expected while
//! replaying rows and are reported through boolean results and logs instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Image error for {url}: {message}")]
    Image { url: String, message: String },

    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },
}

pub type Result<T> = std::result::Result<T, ReplayError>;

impl ReplayError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn image(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Image {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Wrap a read failure the way file-level callers report it
    pub fn file_not_found(path: impl AsRef<str>, cause: impl std::fmt::Display) -> Self {
        Self::FileNotFound {
            path: format!("{}: {}", path.as_ref(), cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ReplayError::invalid_format("rows must be an array");
        assert_eq!(err.to_string(), "Invalid format: rows must be an array");

        let err = ReplayError::fetch("https://a.test/x.png", "HTTP 404");
        assert_eq!(err.to_string(), "Fetch error for https://a.test/x.png: HTTP 404");

        let err = ReplayError::file_not_found("rows.json", "No such file");
        assert_eq!(err.to_string(), "File not found: rows.json: No such file");
    }
}
