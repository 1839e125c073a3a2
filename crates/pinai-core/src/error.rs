//! Error types for the orchestration layer

use thiserror::Error;

use crate::state::MediaKind;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Provider boundary
    // ─────────────────────────────────────────────────────────────
    #[error("Gemini API key is not configured. Set GEMINI_API_KEY or add api_key to the config file.")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    // ─────────────────────────────────────────────────────────────
    // Missing output (provider succeeded, payload unusable)
    // ─────────────────────────────────────────────────────────────
    #[error("No {0} data returned from API")]
    NoData(MediaKind),

    #[error("Video generation failed: {message}")]
    VideoFailed { message: String },

    #[error("Prompt blocked by Gemini ({reason})")]
    Blocked { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Polling / cancellation
    // ─────────────────────────────────────────────────────────────
    #[error("Video generation still pending after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    #[error("Request cancelled")]
    Cancelled,

    // ─────────────────────────────────────────────────────────────
    // Local input / infrastructure
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid attachment: {message}")]
    Attachment { message: String },

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn attachment(message: impl Into<String>) -> Self {
        Self::Attachment {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn video_failed(message: impl Into<String>) -> Self {
        Self::VideoFailed {
            message: message.into(),
        }
    }

    /// True when the provider answered but left out the payload we asked for.
    pub fn is_missing_output(&self) -> bool {
        matches!(
            self,
            Error::NoData(_) | Error::VideoFailed { .. } | Error::Blocked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_output_classification() {
        assert!(Error::NoData(MediaKind::Image).is_missing_output());
        assert!(Error::video_failed("no uri").is_missing_output());
        assert!(Error::Blocked {
            reason: "SAFETY".into()
        }
        .is_missing_output());
        assert!(!Error::MissingApiKey.is_missing_output());
        assert!(!Error::Cancelled.is_missing_output());
    }

    #[test]
    fn test_no_data_message_names_media() {
        let err = Error::NoData(MediaKind::Audio);
        assert_eq!(err.to_string(), "No audio data returned from API");
    }
}
