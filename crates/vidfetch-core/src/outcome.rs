//! Result normalization: one uniform descriptor per fetch.
//!
//! Callers never see engine-internal error types; they get either a success
//! descriptor with display-ready fields or a failure descriptor with a single
//! human-readable `error` string.

use serde::{Serialize, Serializer};
use std::path::Path;
use std::time::Duration;

use crate::error::FetchError;
use crate::resolver::ResourceMetadata;
use crate::transfer::TransferOutcome;

pub const UNKNOWN: &str = "Unknown";
pub const NO_THUMBNAIL: &str = "No thumbnail available";

/// Display-ready description of a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSuccess {
    pub path: String,
    pub filename: String,
    pub title: String,
    /// `M:SS`, minutes unpadded.
    pub duration: String,
    pub thumbnail: String,
    pub channel: String,
    /// Thousands-grouped view count, or `Unknown`.
    pub views: String,
    pub upload_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFailure {
    pub error: String,
}

/// The single value returned per invocation. Serializes as
/// `{"status": true, ...success fields}` or `{"status": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultDescriptor {
    Success(DownloadSuccess),
    Failure(DownloadFailure),
}

#[derive(Serialize)]
struct WithStatus<'a, T> {
    status: bool,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for ResultDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResultDescriptor::Success(body) => WithStatus { status: true, body }.serialize(serializer),
            ResultDescriptor::Failure(body) => WithStatus { status: false, body }.serialize(serializer),
        }
    }
}

impl ResultDescriptor {
    pub fn status(&self) -> bool {
        matches!(self, ResultDescriptor::Success(_))
    }

    pub fn success(&self) -> Option<&DownloadSuccess> {
        match self {
            ResultDescriptor::Success(s) => Some(s),
            ResultDescriptor::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResultDescriptor::Success(_) => None,
            ResultDescriptor::Failure(f) => Some(&f.error),
        }
    }

    /// Failure descriptor for an error raised before or during transfer.
    pub fn from_error(err: &FetchError) -> Self {
        ResultDescriptor::Failure(DownloadFailure {
            error: err.to_string(),
        })
    }
}

impl From<FetchError> for ResultDescriptor {
    fn from(err: FetchError) -> Self {
        ResultDescriptor::from_error(&err)
    }
}

/// Integer seconds to `minutes:seconds`, e.g. 125 → `2:05`, 3661 → `61:01`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Groups thousands with commas, e.g. 1234567 → `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Shapes metadata and a transfer outcome into a descriptor. Infallible.
pub fn normalize(
    metadata: &ResourceMetadata,
    outcome: TransferOutcome,
    path: &Path,
    filename: &str,
    deadline: Duration,
) -> ResultDescriptor {
    match outcome.into_result(deadline) {
        Ok(_) => ResultDescriptor::Success(DownloadSuccess {
            path: path.display().to_string(),
            filename: filename.to_string(),
            title: metadata.title.clone(),
            duration: format_duration(metadata.duration_seconds),
            thumbnail: metadata
                .thumbnail_url
                .clone()
                .unwrap_or_else(|| NO_THUMBNAIL.to_string()),
            channel: metadata
                .author_name
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            views: metadata
                .view_count
                .map(group_thousands)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            upload_date: metadata
                .upload_date
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }),
        Err(e) => ResultDescriptor::from_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;

    fn intro() -> ResourceMetadata {
        ResourceMetadata {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Intro".to_string(),
            author_name: None,
            duration_seconds: 125,
            view_count: Some(2000),
            upload_date: None,
            thumbnail_url: None,
            formats: Vec::new(),
        }
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(125), "2:05");
        assert_eq!(format_duration(3661), "61:01");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(2000), "2,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(100_000), "100,000");
    }

    #[test]
    fn completed_transfer_with_sparse_metadata() {
        let d = normalize(
            &intro(),
            TransferOutcome::Completed { bytes_written: 10 },
            Path::new("downloads/Intro.mp4"),
            "Intro.mp4",
            Duration::from_secs(300),
        );
        let s = d.success().expect("success descriptor");
        assert_eq!(s.filename, "Intro.mp4");
        assert_eq!(s.path, "downloads/Intro.mp4");
        assert_eq!(s.duration, "2:05");
        assert_eq!(s.views, "2,000");
        assert_eq!(s.thumbnail, "No thumbnail available");
        assert_eq!(s.channel, "Unknown");
        assert_eq!(s.upload_date, "Unknown");
    }

    #[test]
    fn completed_transfer_with_full_metadata() {
        let mut meta = intro();
        meta.author_name = Some("Good Dogs".to_string());
        meta.view_count = None;
        meta.upload_date = Some("2021-03-04".to_string());
        meta.thumbnail_url = Some("https://i.example/t.jpg".to_string());
        let d = normalize(
            &meta,
            TransferOutcome::Completed { bytes_written: 1 },
            Path::new("x/Intro.mp4"),
            "Intro.mp4",
            Duration::from_secs(300),
        );
        let s = d.success().unwrap();
        assert_eq!(s.channel, "Good Dogs");
        assert_eq!(s.views, "Unknown");
        assert_eq!(s.upload_date, "2021-03-04");
        assert_eq!(s.thumbnail, "https://i.example/t.jpg");
    }

    #[test]
    fn every_failed_outcome_names_its_stage() {
        let cases = [
            (TransferOutcome::WriteFailed("disk full".into()), "File write error: disk full"),
            (TransferOutcome::ReadFailed("reset".into()), "Video stream error: reset"),
            (TransferOutcome::TimedOut, "Download timed out after 5 minutes"),
        ];
        for (outcome, expected) in cases {
            let d = normalize(
                &intro(),
                outcome,
                Path::new("p"),
                "f",
                Duration::from_secs(300),
            );
            assert!(!d.status());
            assert_eq!(d.error(), Some(expected));
        }
    }

    #[test]
    fn serializes_to_descriptor_shapes() {
        let ok = normalize(
            &intro(),
            TransferOutcome::Completed { bytes_written: 1 },
            Path::new("downloads/Intro.mp4"),
            "Intro.mp4",
            Duration::from_secs(300),
        );
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": true,
                "path": "downloads/Intro.mp4",
                "filename": "Intro.mp4",
                "title": "Intro",
                "duration": "2:05",
                "thumbnail": "No thumbnail available",
                "channel": "Unknown",
                "views": "2,000",
                "uploadDate": "Unknown"
            })
        );

        let failed = ResultDescriptor::from(FetchError::MetadataFetch(MetadataError::Http(404)));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({
                "status": false,
                "error": "Failed to retrieve video info: lookup returned HTTP 404"
            })
        );
    }
}
