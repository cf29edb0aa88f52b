//! In-memory transport and context shared by the CLI tests.

use fmd_core::checksum::sha1_bytes;
use fmd_core::config::FmdConfig;
use fmd_core::context::Context;
use fmd_core::control::CancelToken;
use fmd_core::storage::PartFile;
use fmd_core::transfer::{TransferError, Transport};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(super) const REGISTRY: &str = "https://portal.test/api";
pub(super) const MIRROR: &str = "https://mirror.test";

/// URL-keyed canned bodies; anything else is a 404.
#[derive(Default)]
pub(super) struct StaticTransport {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
}

impl StaticTransport {
    pub(super) fn add(&self, url: String, body: impl Into<Vec<u8>>) {
        self.bodies.lock().unwrap().insert(url, body.into());
    }

    fn body(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(TransferError::Http(404))
    }

    /// Publish `name` 1.0.0 with `deps` on the portal and the mirror.
    pub(super) fn publish(&self, name: &str, deps: &[&str]) {
        let payload = format!("{} archive", name);
        let full = serde_json::json!({
            "name": name,
            "releases": [{
                "version": "1.0.0",
                "file_name": format!("{}_1.0.0.zip", name),
                "sha1": sha1_bytes(payload.as_bytes()),
                "info_json": { "dependencies": deps },
            }],
        });
        self.add(format!("{}/mods/{}/full", REGISTRY, name), full.to_string());
        self.add(format!("{}/{}/1.0.0.zip", MIRROR, name), payload);
    }
}

impl Transport for StaticTransport {
    fn get(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, TransferError> {
        self.body(url)
    }

    fn download(
        &self,
        url: &str,
        out: &mut PartFile,
        _cancel: &CancelToken,
    ) -> Result<u64, TransferError> {
        let body = self.body(url)?;
        out.write_all(&body)?;
        Ok(body.len() as u64)
    }
}

/// Context over `transport` with its cache under `dir` and no game directory.
pub(super) fn context(dir: &Path, transport: Arc<StaticTransport>) -> Arc<Context> {
    let config = FmdConfig {
        registry_url: REGISTRY.to_string(),
        mirrors: vec![MIRROR.to_string()],
        request_delay_ms: 0,
        ..FmdConfig::default()
    };
    let transport: Arc<dyn Transport> = transport;
    Arc::new(Context::with_transport(config, dir.join("cache"), transport).unwrap())
}
