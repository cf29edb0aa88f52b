//! libcurl-backed [`Transport`].

use std::time::Duration;

use super::{TransferError, Transport};
use crate::control::CancelToken;
use crate::storage::PartFile;

/// Blocking curl transport. One `Easy` handle per request, redirects followed.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    user_agent: String,
    connect_timeout: Duration,
    download_timeout: Duration,
}

impl CurlTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            connect_timeout: Duration::from_secs(15),
            download_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, download: Duration) -> Self {
        self.connect_timeout = connect;
        self.download_timeout = download;
        self
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.useragent(&self.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        Ok(easy)
    }
}

fn check_status(easy: &mut curl::easy::Easy) -> Result<(), TransferError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }
    Ok(())
}

impl Transport for CurlTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, TransferError> {
        let mut easy = self.easy(url)?;
        easy.timeout(timeout)?;

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        check_status(&mut easy)?;
        tracing::trace!(url, bytes = body.len(), "GET ok");
        Ok(body)
    }

    fn download(
        &self,
        url: &str,
        out: &mut PartFile,
        cancel: &CancelToken,
    ) -> Result<u64, TransferError> {
        let mut easy = self.easy(url)?;
        easy.timeout(self.download_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.progress(true)?;

        let mut write_err: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                if cancel.is_cancelled() {
                    return Ok(0); // abort transfer
                }
                match out.write_all(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if cancel.is_cancelled() {
                return Err(TransferError::Interrupted);
            }
            if let Some(io) = write_err {
                return Err(TransferError::Io(io));
            }
            return Err(TransferError::Curl(e));
        }
        check_status(&mut easy)?;
        Ok(out.written())
    }
}
