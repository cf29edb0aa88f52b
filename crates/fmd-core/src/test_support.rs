//! In-memory fakes for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::control::CancelToken;
use crate::error::LookupError;
use crate::portal::{InfoJson, ModInfo, ModSource, Release};
use crate::storage::PartFile;
use crate::transfer::{TransferError, Transport};

enum Route {
    Body(Vec<u8>),
    Status(u32),
    /// Part of the body arrives, then the transfer is cut off by the user.
    Cut(Vec<u8>),
}

/// URL-keyed canned responses; unknown URLs answer 404. Counts every request.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, Route>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, url: &str, body: &[u8]) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Body(body.to_vec()));
    }

    pub(crate) fn fail(&self, url: &str, status: u32) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Status(status));
    }

    /// `url` writes `partial` and then reports an interrupted transfer.
    pub(crate) fn cut(&self, url: &str, partial: &[u8]) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Cut(partial.to_vec()));
    }

    pub(crate) fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    fn respond(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        match self.routes.lock().unwrap().get(url) {
            Some(Route::Body(b)) => Ok(b.clone()),
            Some(Route::Status(code)) => Err(TransferError::Http(*code)),
            Some(Route::Cut(_)) => Err(TransferError::Interrupted),
            None => Err(TransferError::Http(404)),
        }
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, TransferError> {
        self.respond(url)
    }

    fn download(
        &self,
        url: &str,
        out: &mut PartFile,
        cancel: &CancelToken,
    ) -> Result<u64, TransferError> {
        if cancel.is_cancelled() {
            return Err(TransferError::Interrupted);
        }
        if let Some(Route::Cut(partial)) = self.routes.lock().unwrap().get(url) {
            *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
            out.write_all(partial)?;
            return Err(TransferError::Interrupted);
        }
        let body = self.respond(url)?;
        out.write_all(&body)?;
        Ok(body.len() as u64)
    }
}

/// Name-keyed metadata source. Unknown names answer like the portal does.
#[derive(Default)]
pub(crate) struct FakeSource {
    mods: Mutex<HashMap<String, ModInfo>>,
    lookups: Mutex<Vec<String>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, name: &str, releases: Vec<Release>) {
        let info = ModInfo {
            name: name.to_string(),
            title: None,
            owner: None,
            summary: None,
            downloads_count: 0,
            releases,
            latest_release: None,
        };
        self.mods.lock().unwrap().insert(name.to_string(), info);
    }

    /// Names looked up so far, in order.
    pub(crate) fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl ModSource for FakeSource {
    fn full_info(&self, name: &str) -> Result<ModInfo, LookupError> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.mods
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::Portal("Mod not found".to_string()))
    }
}

/// Release with the given version and dependency declarations.
pub(crate) fn release(version: &str, deps: &[&str]) -> Release {
    Release {
        version: version.to_string(),
        file_name: format!("mod_{}.zip", version),
        sha1: String::new(),
        download_url: None,
        released_at: None,
        info_json: InfoJson {
            factorio_version: Some("1.1".to_string()),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        },
    }
}
