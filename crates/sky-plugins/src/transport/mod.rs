//! Byte sources for downloads and marketplace indexes.
//!
//! A location is either an `http://` or `https://` URL fetched with a
//! blocking `reqwest` client, or a local path that may carry a `file://`
//! prefix.
//!
//! Remote transfers run on a worker thread that forwards the response body
//! over a bounded channel. The caller waits on that channel while polling its
//! [`CancelToken`], so cancellation takes effect while connecting, while
//! waiting for headers, and between body chunks. An abandoned worker ends at
//! its next send or when the request timeout fires.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::cancel::CancelToken;
use crate::error::PluginError;

/// Tracing target for transport operations.
const TRANSPORT_TARGET: &str = "sky_plugins::transport";

/// Timeout applied to plugin downloads.
pub(crate) const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout applied to marketplace index fetches.
pub(crate) const INDEX_TIMEOUT: Duration = Duration::from_secs(10);

/// How often a waiting caller re-checks its cancellation token.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Body chunks buffered between the worker and the reader.
const CHANNEL_DEPTH: usize = 4;

/// Bytes the worker reads from the response per chunk.
const BODY_CHUNK: usize = 32 * 1024;

/// Failures while opening or reading a location.
#[derive(Debug, Error)]
pub(crate) enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("{path}: {source}")]
    Local { path: PathBuf, source: io::Error },
    #[error("{0}")]
    Body(io::Error),
    #[error("failed to start transfer: {0}")]
    Worker(io::Error),
    #[error("transfer ended before a response arrived")]
    Aborted,
    #[error("transfer cancelled")]
    Cancelled,
}

impl TransportError {
    /// Maps into a [`PluginError`], keeping cancellation distinct from
    /// transport failures described by `failure`.
    pub(crate) fn into_plugin_error(self, failure: impl FnOnce(String) -> PluginError) -> PluginError {
        match self {
            Self::Cancelled => PluginError::Cancelled,
            other => failure(other.to_string()),
        }
    }
}

/// Messages sent from a transfer worker to its reader.
enum Transfer {
    /// Headers arrived with status `200 OK`.
    Started,
    Chunk(Vec<u8>),
    Failed(TransportError),
}

/// Returns `true` when `location` is fetched over HTTP(S).
pub(crate) fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolves a non-remote location to a filesystem path.
///
/// Well-formed `file://` URLs are decoded; anything else has the prefix
/// stripped and is used verbatim.
pub(crate) fn local_path(location: &str) -> PathBuf {
    if location.starts_with("file://")
        && let Some(path) = Url::parse(location)
            .ok()
            .and_then(|url| url.to_file_path().ok())
    {
        return path;
    }
    PathBuf::from(location.strip_prefix("file://").unwrap_or(location))
}

/// Opens `location` for reading.
///
/// Remote responses must have status `200 OK`. Reading from a remote source
/// fails with an error wrapping [`TransportError::Cancelled`] once `cancel`
/// fires.
pub(crate) fn open(
    location: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<Box<dyn Read>, TransportError> {
    if cancel.is_cancelled() {
        return Err(TransportError::Cancelled);
    }
    if is_remote(location) {
        debug!(target: TRANSPORT_TARGET, url = location, "fetching remote source");
        return open_remote(location, timeout, cancel).map(|body| Box::new(body) as Box<dyn Read>);
    }

    let path = local_path(location);
    debug!(target: TRANSPORT_TARGET, path = %path.display(), "opening local source");
    let file = File::open(&path).map_err(|source| TransportError::Local { path, source })?;
    Ok(Box::new(file))
}

fn open_remote(
    url: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<RemoteBody, TransportError> {
    let (sender, receiver) = mpsc::sync_channel(CHANNEL_DEPTH);
    let owned = url.to_owned();
    thread::Builder::new()
        .name(String::from("sky-transfer"))
        .spawn(move || pump(&owned, timeout, &sender))
        .map_err(TransportError::Worker)?;

    let mut body = RemoteBody {
        receiver,
        cancel: cancel.clone(),
        pending: Vec::new(),
        offset: 0,
    };
    match body.next_message()? {
        Some(Transfer::Started) => Ok(body),
        Some(Transfer::Failed(err)) => Err(err),
        Some(Transfer::Chunk(bytes)) => {
            body.pending = bytes;
            Ok(body)
        }
        None => Err(TransportError::Aborted),
    }
}

/// Worker side of a remote transfer. Stops as soon as the reader hangs up.
fn pump(url: &str, timeout: Duration, sender: &SyncSender<Transfer>) {
    let mut response = match request(url, timeout) {
        Ok(response) => response,
        Err(err) => {
            drop(sender.send(Transfer::Failed(err)));
            return;
        }
    };
    if sender.send(Transfer::Started).is_err() {
        return;
    }
    let mut buffer = vec![0_u8; BODY_CHUNK];
    loop {
        let message = match response.read(&mut buffer) {
            Ok(0) => return,
            Ok(read) => Transfer::Chunk(buffer.get(..read).unwrap_or_default().to_vec()),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => Transfer::Failed(TransportError::Body(err)),
        };
        let failed = matches!(message, Transfer::Failed(_));
        if sender.send(message).is_err() || failed {
            return;
        }
    }
}

fn request(url: &str, timeout: Duration) -> Result<Response, TransportError> {
    let client = Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(TransportError::Status(status));
    }
    Ok(response)
}

/// Reader half of a remote transfer.
struct RemoteBody {
    receiver: Receiver<Transfer>,
    cancel: CancelToken,
    pending: Vec<u8>,
    offset: usize,
}

impl RemoteBody {
    /// Waits for the next worker message; `None` once the worker is done.
    fn next_message(&self) -> Result<Option<Transfer>, TransportError> {
        loop {
            if self.cancel.is_cancelled() {
                debug!(target: TRANSPORT_TARGET, "remote transfer cancelled");
                return Err(TransportError::Cancelled);
            }
            match self.receiver.recv_timeout(POLL_INTERVAL) {
                Ok(message) => return Ok(Some(message)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}

impl Read for RemoteBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset >= self.pending.len() {
            match self.next_message().map_err(io::Error::other)? {
                Some(Transfer::Chunk(bytes)) => {
                    self.pending = bytes;
                    self.offset = 0;
                }
                Some(Transfer::Started) => {}
                Some(Transfer::Failed(err)) => return Err(io::Error::other(err)),
                None => return Ok(0),
            }
        }
        let mut available = self.pending.get(self.offset..).unwrap_or_default();
        let read = available.read(buf)?;
        self.offset += read;
        Ok(read)
    }
}
