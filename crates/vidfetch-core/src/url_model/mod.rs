//! URL modeling and filename derivation.
//!
//! Validates supported video URLs without touching the network and derives
//! the artifact filename from a video title.

mod sanitize;
mod video_id;

pub use sanitize::sanitize_title;
pub use video_id::{extract_video_id, is_valid_video_id, is_valid_video_url, VIDEO_ID_LEN};

use crate::config::VIDEO_EXTENSION;

/// Derives the artifact filename `<sanitized title>.mp4`.
///
/// The same title always yields the same filename. When nothing but
/// whitespace survives sanitization, `fallback_stem` (the video id) is used
/// so the result is never a bare extension.
///
/// # Examples
///
/// - `derive_filename("Intro", "dQw4w9WgXcQ")` → `"Intro.mp4"`
/// - `derive_filename("Dog: Training!! (Part 1)", "dQw4w9WgXcQ")` → `"Dog Training Part 1.mp4"`
/// - `derive_filename("日本語", "dQw4w9WgXcQ")` → `"dQw4w9WgXcQ.mp4"`
pub fn derive_filename(title: &str, fallback_stem: &str) -> String {
    let sanitized = sanitize_title(title);
    let stem = if sanitized.trim().is_empty() {
        fallback_stem
    } else {
        sanitized.as_str()
    };
    let stem = sanitize::truncate_stem(stem, VIDEO_EXTENSION);
    format!("{}.{}", stem, VIDEO_EXTENSION)
}
