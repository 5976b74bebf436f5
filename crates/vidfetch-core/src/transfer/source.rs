//! Read side of a transfer: a blocking byte source feeding the chunk channel.

use std::cell::Cell;
use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

/// Unit carried from the reader to the writer.
#[derive(Debug)]
pub(crate) enum Chunk {
    Data(Vec<u8>),
    /// Every byte has been read; the sink may flush and report completion.
    End,
}

/// Why a source stopped before delivering the whole payload.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("{0}")]
    Transport(String),
    #[error("stream returned HTTP {0}")]
    Http(u32),
    #[error("{0}")]
    Other(String),
    /// The transfer was torn down; not a failure of the source.
    #[error("transfer cancelled")]
    Cancelled,
}

/// Handle a source uses to hand chunks to the writer. Blocking; only call it
/// from the reader thread.
pub struct ChunkSender {
    tx: mpsc::Sender<Chunk>,
    cancel: Arc<AtomicBool>,
}

impl ChunkSender {
    pub(crate) fn new(tx: mpsc::Sender<Chunk>, cancel: Arc<AtomicBool>) -> Self {
        Self { tx, cancel }
    }

    /// Forward `data` to the writer. Returns false once the transfer has been
    /// torn down or the writer is gone; the source must stop reading.
    pub fn send(&self, data: &[u8]) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.tx.blocking_send(Chunk::Data(data.to_vec())).is_ok()
    }

    /// True once the outcome is decided and the reader should stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Signal end-of-stream to the writer.
    pub(crate) fn finish(&self) -> bool {
        !self.is_cancelled() && self.tx.blocking_send(Chunk::End).is_ok()
    }
}

/// A readable payload. `stream_to` runs on a blocking thread and must return
/// `Ok(())` only after the whole payload went through `sink`. It must poll
/// `sink.is_cancelled()` (or observe a failed `send`) and return promptly
/// once the transfer is torn down.
pub trait MediaSource: Send + 'static {
    fn stream_to(self: Box<Self>, sink: &ChunkSender) -> Result<(), ReadError>;
}

/// Streams one URL with a plain GET.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    user_agent: String,
    connect_timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            user_agent: user_agent.into(),
            connect_timeout,
        }
    }
}

/// Status code from a status line such as `HTTP/1.1 206 Partial Content`.
fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

impl MediaSource for HttpSource {
    fn stream_to(self: Box<Self>, sink: &ChunkSender) -> Result<(), ReadError> {
        let curl_err = |e: curl::Error| ReadError::Transport(e.to_string());
        // Latest status line seen; redirects overwrite it.
        let status: Cell<Option<u32>> = Cell::new(None);

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.url).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.max_redirections(10).map_err(curl_err)?;
        easy.useragent(&self.user_agent).map_err(curl_err)?;
        easy.connect_timeout(self.connect_timeout).map_err(curl_err)?;
        // Needed for the progress callback, which is how an idle transfer notices cancellation.
        easy.progress(true).map_err(curl_err)?;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                        status.set(Some(code));
                    }
                    true
                })
                .map_err(curl_err)?;
            transfer
                .write_function(|data| {
                    // Never hand an error page to the sink.
                    if status.get().map(|c| !is_success(c)).unwrap_or(false) {
                        return Ok(0);
                    }
                    if sink.send(data) {
                        Ok(data.len())
                    } else {
                        Ok(0) // abort transfer
                    }
                })
                .map_err(curl_err)?;
            transfer
                .progress_function(|_, _, _, _| !sink.is_cancelled())
                .map_err(curl_err)?;
            transfer.perform()
        };

        if sink.is_cancelled() {
            return Err(ReadError::Cancelled);
        }
        if let Err(e) = perform_result {
            if let Some(code) = status.get().filter(|c| !is_success(*c)) {
                return Err(ReadError::Http(code));
            }
            if e.is_write_error() || e.is_aborted_by_callback() {
                // The writer dropped its end of the channel.
                return Err(ReadError::Cancelled);
            }
            return Err(ReadError::Transport(e.to_string()));
        }

        let code = easy.response_code().map_err(curl_err)?;
        if !is_success(code) {
            return Err(ReadError::Http(code));
        }
        Ok(())
    }
}
