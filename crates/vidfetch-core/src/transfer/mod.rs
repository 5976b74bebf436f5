//! Stream transfer engine.
//!
//! Runs three activities concurrently for one artifact: a reader on a
//! blocking thread pulling bytes from a `MediaSource`, a writer task pushing
//! them into an `ArtifactWriter`, and a deadline timer. Each reports its
//! terminal signal into a single-resolution slot; the first signal decides
//! the `TransferOutcome` and the other two are torn down before `transfer`
//! returns.

mod format;
mod slot;
mod source;

pub use format::select_highest;
pub use source::{ChunkSender, HttpSource, MediaSource, ReadError};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::resolver::ResourceMetadata;
use crate::storage::ArtifactWriter;
use slot::OutcomeSlot;
use source::Chunk;

/// Terminal result of the streaming phase. Exactly one per transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The sink flushed and synced the whole payload.
    Completed { bytes_written: u64 },
    WriteFailed(String),
    ReadFailed(String),
    TimedOut,
}

impl TransferOutcome {
    /// Bytes written on completion, or the stage error otherwise.
    pub fn into_result(self, deadline: Duration) -> Result<u64, FetchError> {
        match self {
            TransferOutcome::Completed { bytes_written } => Ok(bytes_written),
            TransferOutcome::WriteFailed(reason) => Err(FetchError::StreamWrite(reason)),
            TransferOutcome::ReadFailed(reason) => Err(FetchError::StreamRead(reason)),
            TransferOutcome::TimedOut => Err(FetchError::Timeout(deadline)),
        }
    }
}

/// Knobs for one transfer, taken from `FetchConfig`.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub deadline: Duration,
    pub chunk_buffer: usize,
    pub user_agent: String,
    pub connect_timeout: Duration,
}

impl TransferOptions {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self {
            deadline: cfg.transfer_timeout(),
            chunk_buffer: cfg.chunk_buffer,
            user_agent: cfg.user_agent.clone(),
            connect_timeout: cfg.connect_timeout(),
        }
    }
}

/// Streams the best audio+video format of `metadata` to `destination`.
pub async fn transfer(
    metadata: &ResourceMetadata,
    destination: &Path,
    opts: &TransferOptions,
) -> TransferOutcome {
    let format = match select_highest(&metadata.formats) {
        Some(f) => f,
        None => {
            tracing::error!(
                video_id = %metadata.video_id,
                offered = metadata.formats.len(),
                "no stream carries both audio and video"
            );
            return TransferOutcome::ReadFailed("no format with both audio and video".to_string());
        }
    };
    let url = match format.url.as_deref() {
        Some(u) => u,
        None => return TransferOutcome::ReadFailed("selected format has no URL".to_string()),
    };
    tracing::info!(
        itag = format.itag,
        height = ?format.height,
        mime = %format.mime_type,
        expected_bytes = ?format.content_length,
        "selected stream"
    );
    let source = HttpSource::new(url, opts.user_agent.clone(), opts.connect_timeout);
    transfer_from(Box::new(source), destination, opts.deadline, opts.chunk_buffer).await
}

/// Races reader, writer and deadline for one artifact.
///
/// Always returns; by the time it does the reader thread has exited, the
/// artifact file is closed and the timer is cancelled. A partial artifact is
/// left on disk for the caller to clean up.
pub async fn transfer_from(
    source: Box<dyn MediaSource>,
    destination: &Path,
    deadline: Duration,
    chunk_buffer: usize,
) -> TransferOutcome {
    let started = Instant::now();
    let (slot, outcome_rx) = OutcomeSlot::new();
    let cancel = Arc::new(AtomicBool::new(false));
    let (chunk_tx, chunk_rx) = mpsc::channel::<Chunk>(chunk_buffer.max(1));

    tracing::debug!(path = %destination.display(), ?deadline, "transfer started");

    let writer = tokio::spawn(run_writer(
        destination.to_path_buf(),
        chunk_rx,
        slot.clone(),
        Arc::clone(&cancel),
    ));

    let reader = {
        let slot = slot.clone();
        let sender = ChunkSender::new(chunk_tx, Arc::clone(&cancel));
        tokio::task::spawn_blocking(move || run_reader(source, sender, slot))
    };

    let timer = {
        let slot = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            slot.resolve(TransferOutcome::TimedOut);
        })
    };
    drop(slot);

    let outcome = outcome_rx.await.unwrap_or_else(|_| {
        TransferOutcome::ReadFailed("transfer tasks exited without reporting an outcome".to_string())
    });

    // Tear down the losers. The reader exits first, which closes the channel;
    // the writer then drops pending chunks and closes the file.
    cancel.store(true, Ordering::Relaxed);
    timer.abort();
    if let Err(e) = reader.await {
        tracing::error!("reader thread failed: {}", e);
    }
    if let Err(e) = writer.await {
        tracing::error!("writer task failed: {}", e);
    }
    let _ = timer.await;

    match &outcome {
        TransferOutcome::Completed { bytes_written } => tracing::info!(
            path = %destination.display(),
            bytes = bytes_written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transfer finished"
        ),
        TransferOutcome::TimedOut => tracing::error!(
            path = %destination.display(),
            ?deadline,
            "transfer timed out; partial artifact left on disk"
        ),
        TransferOutcome::WriteFailed(reason) => {
            tracing::error!(path = %destination.display(), "write stream error: {}", reason)
        }
        TransferOutcome::ReadFailed(reason) => {
            tracing::error!(path = %destination.display(), "video stream error: {}", reason)
        }
    }
    outcome
}

fn run_reader(source: Box<dyn MediaSource>, sender: ChunkSender, slot: OutcomeSlot) {
    match source.stream_to(&sender) {
        Ok(()) => {
            if !sender.finish() {
                tracing::debug!("end of stream not delivered; transfer already torn down");
            }
        }
        Err(ReadError::Cancelled) => tracing::debug!("reader stopped by teardown"),
        Err(e) => {
            slot.resolve(TransferOutcome::ReadFailed(e.to_string()));
        }
    }
    // Dropping the sender closes the channel; a writer still waiting exits quietly.
}

async fn run_writer(
    destination: PathBuf,
    mut chunks: mpsc::Receiver<Chunk>,
    slot: OutcomeSlot,
    cancel: Arc<AtomicBool>,
) {
    let mut writer = match ArtifactWriter::create(&destination).await {
        Ok(w) => w,
        Err(e) => {
            slot.resolve(TransferOutcome::WriteFailed(format!("{:#}", e)));
            return;
        }
    };
    while let Some(chunk) = chunks.recv().await {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        match chunk {
            Chunk::Data(bytes) => {
                if let Err(e) = writer.write_chunk(&bytes).await {
                    slot.resolve(TransferOutcome::WriteFailed(format!("{:#}", e)));
                    return;
                }
            }
            Chunk::End => {
                let path = writer.path().to_path_buf();
                let outcome = match writer.finish().await {
                    Ok(0) => {
                        tracing::warn!(path = %path.display(), "stream ended before any data");
                        TransferOutcome::ReadFailed("stream ended without any data".to_string())
                    }
                    Ok(bytes_written) => TransferOutcome::Completed { bytes_written },
                    Err(e) => TransferOutcome::WriteFailed(format!("{:#}", e)),
                };
                slot.resolve(outcome);
                return;
            }
        }
    }
    // Torn down, or the reader closed the stream without end-of-stream; the
    // deciding signal came from elsewhere.
    tracing::debug!(
        path = %writer.path().display(),
        bytes = writer.bytes_written(),
        "writer stopped before end-of-stream"
    );
    if let Err(e) = writer.close().await {
        tracing::warn!("closing partial artifact failed: {:#}", e);
    }
}
