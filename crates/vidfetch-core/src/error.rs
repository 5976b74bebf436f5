//! Error taxonomy for a fetch invocation.
//!
//! Every variant is terminal for the invocation that produced it. The
//! `Display` text is the user-facing `error` string of a failure descriptor,
//! so it names the failing stage and keeps the underlying cause for operators.

use std::time::Duration;

/// Stage-level failure of one fetch. Exactly one is produced per failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid video URL provided.")]
    InvalidUrl,
    #[error("Failed to retrieve video info: {0}")]
    MetadataFetch(#[from] MetadataError),
    #[error("Video stream error: {0}")]
    StreamRead(String),
    #[error("File write error: {0}")]
    StreamWrite(String),
    #[error("Download timed out after {}", format_budget(.0))]
    Timeout(Duration),
}

impl FetchError {
    /// Short stage label used in structured log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl => "validate",
            FetchError::MetadataFetch(_) => "metadata",
            FetchError::StreamRead(_) => "stream_read",
            FetchError::StreamWrite(_) => "stream_write",
            FetchError::Timeout(_) => "timeout",
        }
    }
}

/// Why the metadata lookup failed. Always carries the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// Transport failure (connect, DNS, TLS, transport timeout).
    #[error("request failed: {0}")]
    Transport(String),
    #[error("lookup returned HTTP {0}")]
    Http(u32),
    /// The page carried no embedded player response.
    #[error("player response not found in watch page")]
    MissingPlayerResponse,
    #[error("player response is not valid JSON: {0}")]
    Parse(String),
    /// The host refused to play the video (private, removed, age-gated...).
    #[error("video is not playable ({status}): {reason}")]
    Unplayable { status: String, reason: String },
    /// A section the metadata snapshot requires is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// The blocking lookup thread did not return a result.
    #[error("lookup task failed: {0}")]
    Task(String),
}

fn format_budget(d: &Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{} minutes", minutes)
        }
    } else if secs == 1 {
        "1 second".to_string()
    } else if secs > 1 {
        format!("{} seconds", secs)
    } else {
        format!("{} ms", d.as_millis())
    }
}
