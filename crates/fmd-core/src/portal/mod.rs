//! Mod portal (registry) client.
//!
//! Endpoints:
//! - `GET {registry}/mods?page_size=max`: full catalog (summaries)
//! - `GET {registry}/mods/{name}`: summary with only the latest release
//! - `GET {registry}/mods/{name}/full`: every release with its `info_json`
//!
//! An error reply is a JSON object carrying `message`. That field is the only
//! thing used to tell an error body from metadata; any non-2xx status is
//! already a transport failure.

mod catalog;
mod types;

use std::sync::Arc;
use std::time::Duration;

use crate::error::LookupError;
use crate::transfer::Transport;

pub use catalog::{search, similarity, Catalog, SearchHit};
pub use types::{CatalogPage, InfoJson, ModInfo, Release};

/// Default registry API root.
pub const DEFAULT_REGISTRY: &str = "https://mods.factorio.com/api";

/// Source of full mod metadata for the resolver.
pub trait ModSource: Send + Sync {
    /// Every release of `name`, with dependency declarations.
    fn full_info(&self, name: &str) -> Result<ModInfo, LookupError>;
}

/// Blocking portal client over a [`Transport`].
pub struct PortalClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    metadata_timeout: Duration,
    catalog_timeout: Duration,
    catalog: Catalog,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            metadata_timeout: Duration::from_secs(15),
            catalog_timeout: Duration::from_secs(30),
            catalog: Catalog::new(),
        }
    }

    pub fn with_timeouts(mut self, metadata: Duration, catalog: Duration) -> Self {
        self.metadata_timeout = metadata;
        self.catalog_timeout = catalog;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for `/mods/{name}` or `/mods/{name}/full`, with `name` encoded as a path segment.
    pub fn mod_url(&self, name: &str, full: bool) -> String {
        let base = self.base_url.trim_end_matches('/');
        if let Ok(mut url) = url::Url::parse(base) {
            let pushed = match url.path_segments_mut() {
                Ok(mut segments) => {
                    segments.pop_if_empty().push("mods").push(name);
                    if full {
                        segments.push("full");
                    }
                    true
                }
                Err(()) => false,
            };
            if pushed {
                return url.into();
            }
        }
        let mut url = format!("{}/mods/{}", base, name.replace(' ', "%20"));
        if full {
            url.push_str("/full");
        }
        url
    }

    fn catalog_url(&self) -> String {
        format!("{}/mods?page_size=max", self.base_url.trim_end_matches('/'))
    }

    /// Full catalog snapshot, fetched once per process.
    pub fn catalog(&self) -> Result<Arc<Vec<ModInfo>>, LookupError> {
        self.catalog.get_or_fetch(|| {
            let body = self.transport.get(&self.catalog_url(), self.catalog_timeout)?;
            let value: serde_json::Value = serde_json::from_slice(&body)?;
            if let Some(message) = error_message(&value) {
                return Err(LookupError::Portal(message));
            }
            let page: CatalogPage = serde_json::from_value(value)?;
            Ok(page.results)
        })
    }

    /// Prefetch the catalog, logging instead of failing.
    pub fn warm_catalog(&self) {
        if let Err(e) = self.catalog() {
            tracing::warn!("catalog prefetch failed: {}", e);
        }
    }

    /// Drop the catalog snapshot so the next access refetches.
    pub fn invalidate_catalog(&self) {
        self.catalog.invalidate();
    }

    /// Summary for `name`: catalog entry if present, else `GET /mods/{name}`.
    /// `releases` holds only the latest release.
    pub fn summary(&self, name: &str) -> Result<ModInfo, LookupError> {
        match self.catalog() {
            Ok(mods) => {
                if let Some(found) = mods.iter().find(|m| m.name == name) {
                    return Ok(found.clone().into_summary());
                }
            }
            Err(e) => tracing::debug!("catalog unavailable, asking portal directly: {}", e),
        }
        self.get_mod(&self.mod_url(name, false))
            .map(ModInfo::into_summary)
    }

    /// Closest catalog names to `query`.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, LookupError> {
        let mods = self.catalog()?;
        Ok(search(&mods, query, limit))
    }

    fn get_mod(&self, url: &str) -> Result<ModInfo, LookupError> {
        let body = self.transport.get(url, self.metadata_timeout)?;
        decode_mod(&body)
    }
}

impl ModSource for PortalClient {
    fn full_info(&self, name: &str) -> Result<ModInfo, LookupError> {
        self.get_mod(&self.mod_url(name, true))
    }
}

/// `message` of a portal error object, if `value` is one.
fn error_message(value: &serde_json::Value) -> Option<String> {
    let message = value.as_object()?.get("message")?;
    Some(match message.as_str() {
        Some(s) => s.to_string(),
        None => message.to_string(),
    })
}

/// Decode a mod metadata body, honouring the `message` error discriminator.
pub fn decode_mod(body: &[u8]) -> Result<ModInfo, LookupError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if let Some(message) = error_message(&value) {
        return Err(LookupError::Portal(message));
    }
    Ok(serde_json::from_value(value)?)
}
