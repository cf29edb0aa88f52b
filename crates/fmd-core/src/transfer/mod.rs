//! HTTP transport for registry metadata and mirror downloads.
//!
//! The engine only talks to the network through [`Transport`], so the
//! resolver and fetcher can be driven by in-memory fakes in tests. The
//! production implementation is [`CurlTransport`] (libcurl via the `curl`
//! crate), one blocking request at a time.

mod curl_transport;

use std::time::Duration;

use crate::control::CancelToken;
use crate::storage::PartFile;

pub use curl_transport::CurlTransport;

/// Error returned by a single request. Kept typed so callers can tell
/// interruption and local disk faults apart from remote failures.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, DNS, ...).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the body to disk failed.
    #[error("storage: {0}")]
    Io(#[from] std::io::Error),
    /// The cancel token was set mid-transfer.
    #[error("transfer interrupted")]
    Interrupted,
}

/// Blocking HTTP GET operations used by the engine.
pub trait Transport: Send + Sync {
    /// GET `url` into memory; `timeout` bounds the whole request.
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, TransferError>;

    /// Stream the body of `url` into `out`. Returns bytes written.
    fn download(
        &self,
        url: &str,
        out: &mut PartFile,
        cancel: &CancelToken,
    ) -> Result<u64, TransferError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display() {
        assert_eq!(TransferError::Http(404).to_string(), "HTTP 404");
    }
}
