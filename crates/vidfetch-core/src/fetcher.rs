//! Fetch pipeline: validate → resolve metadata → transfer → normalize.
//!
//! `Fetcher` owns the configuration and the resolver. Each `fetch` call owns
//! its own stream pair and destination file, so one `Fetcher` can serve
//! concurrent calls.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::FetchConfig;
use crate::error::{FetchError, MetadataError};
use crate::outcome::{normalize, ResultDescriptor};
use crate::resolver::{ResourceMetadata, Resolver, WatchPageResolver};
use crate::storage;
use crate::transfer::{self, TransferOptions};
use crate::url_model;

pub struct Fetcher {
    config: FetchConfig,
    resolver: Arc<dyn Resolver>,
}

impl Fetcher {
    /// Fetcher backed by the watch-page resolver on `config.origin`.
    /// Creates the download directory if it does not exist.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let resolver = Arc::new(WatchPageResolver::from_config(&config));
        Self::with_resolver(config, resolver)
    }

    /// Fetcher with a caller-supplied resolver.
    pub fn with_resolver(config: FetchConfig, resolver: Arc<dyn Resolver>) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.download_dir).with_context(|| {
            format!(
                "failed to create download directory: {}",
                config.download_dir.display()
            )
        })?;
        tracing::info!(
            download_dir = %config.download_dir.display(),
            "fetcher initialized"
        );
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Structural URL check; never touches the network.
    pub fn is_valid_url(&self, url: &str) -> bool {
        let valid = url_model::is_valid_video_url(url);
        tracing::debug!(url, valid, "validated URL");
        valid
    }

    /// Validate `url` and look up its metadata without transferring the payload.
    pub async fn fetch_metadata(&self, url: &str) -> Result<ResourceMetadata, FetchError> {
        let video_id = url_model::extract_video_id(url).ok_or(FetchError::InvalidUrl)?;
        let resolver = Arc::clone(&self.resolver);
        let id = video_id.clone();
        let metadata = tokio::task::spawn_blocking(move || resolver.fetch_metadata(&id))
            .await
            .map_err(|e| MetadataError::Task(e.to_string()))??;
        tracing::info!(
            video_id = %video_id,
            title = %metadata.title,
            channel = ?metadata.author_name,
            duration_secs = metadata.duration_seconds,
            views = ?metadata.view_count,
            upload_date = ?metadata.upload_date,
            "video details retrieved"
        );
        Ok(metadata)
    }

    /// Destination path and filename for a resolved video.
    pub fn destination_for(&self, metadata: &ResourceMetadata) -> (PathBuf, String) {
        let filename = url_model::derive_filename(&metadata.title, &metadata.video_id);
        (self.config.download_dir.join(&filename), filename)
    }

    /// Runs the whole pipeline for `url`. Every path ends in exactly one descriptor.
    pub async fn fetch(&self, url: &str) -> ResultDescriptor {
        tracing::info!(url, "starting download");
        let metadata = match self.fetch_metadata(url).await {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(url, stage = e.stage(), "download failed: {}", e);
                return ResultDescriptor::from_error(&e);
            }
        };

        let (path, filename) = self.destination_for(&metadata);
        tracing::info!(path = %path.display(), "file will be saved");

        let opts = TransferOptions::from_config(&self.config);
        let outcome = transfer::transfer(&metadata, &path, &opts).await;
        let descriptor = normalize(&metadata, outcome, &path, &filename, opts.deadline);
        match &descriptor {
            ResultDescriptor::Success(s) => {
                tracing::info!(path = %s.path, title = %s.title, "download complete")
            }
            ResultDescriptor::Failure(f) => tracing::error!(url, "download failed: {}", f.error),
        }
        descriptor
    }

    /// Best-effort removal of an artifact; never fails.
    pub async fn cleanup(&self, path: &Path) {
        storage::cleanup(path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
        result: Result<ResourceMetadata, MetadataError>,
    }

    impl Resolver for CountingResolver {
        fn fetch_metadata(&self, _video_id: &str) -> Result<ResourceMetadata, MetadataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn fetcher(dir: &Path, result: Result<ResourceMetadata, MetadataError>) -> (Fetcher, Arc<CountingResolver>) {
        let mut cfg = FetchConfig::default();
        cfg.download_dir = dir.join("downloads");
        let resolver = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
            result,
        });
        let f = Fetcher::with_resolver(cfg, resolver.clone()).unwrap();
        (f, resolver)
    }

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

    #[tokio::test]
    async fn creates_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (f, _) = fetcher(dir.path(), Ok(intro()));
        assert!(f.config().download_dir.is_dir());
    }

    #[tokio::test]
    async fn invalid_url_short_circuits_without_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let (f, resolver) = fetcher(dir.path(), Ok(intro()));

        for url in ["", "hello", "https://example.com/watch?v=dQw4w9WgXcQ"] {
            assert!(!f.is_valid_url(url));
            let d = f.fetch(url).await;
            assert_eq!(d.error(), Some("Invalid video URL provided."));
        }
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn metadata_failure_becomes_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let (f, resolver) = fetcher(
            dir.path(),
            Err(MetadataError::Transport("Couldn't connect to server".into())),
        );

        let d = f.fetch("https://youtu.be/dQw4w9WgXcQ").await;

        assert!(!d.status());
        assert_eq!(
            d.error(),
            Some("Failed to retrieve video info: request failed: Couldn't connect to server")
        );
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_playable_stream_becomes_stream_error() {
        let dir = tempfile::tempdir().unwrap();
        let (f, _) = fetcher(dir.path(), Ok(intro()));

        let d = f.fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await;

        assert_eq!(
            d.error(),
            Some("Video stream error: no format with both audio and video")
        );
    }

    #[tokio::test]
    async fn destination_is_sanitized_title_under_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (f, _) = fetcher(dir.path(), Ok(intro()));
        let mut meta = intro();
        meta.title = "Dog: Training!! (Part 1)".to_string();

        let (path, filename) = f.destination_for(&meta);

        assert_eq!(filename, "Dog Training Part 1.mp4");
        assert_eq!(path, dir.path().join("downloads").join("Dog Training Part 1.mp4"));
    }

    #[test]
    fn rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = FetchConfig::default();
        cfg.download_dir = dir.path().to_path_buf();
        cfg.transfer_timeout_secs = 0;
        assert!(Fetcher::new(cfg).is_err());
    }
}
