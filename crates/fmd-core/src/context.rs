//! Per-process state shared by every resolve cycle.
//!
//! Built once at startup (and wrapped in an `Arc` by the server). Holds the
//! portal client with its catalog snapshot, and the artifact fetcher with the
//! mirror registry and checksum store.

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::checksum::{ChecksumCache, CHECKSUM_FILE};
use crate::config::FmdConfig;
use crate::control::CancelToken;
use crate::error::ResolveAbort;
use crate::fetcher::ArtifactFetcher;
use crate::install::{self, Installer};
use crate::mirrors::{MirrorEntry, MirrorRegistry};
use crate::portal::PortalClient;
use crate::resolver::{NodeReport, Resolver, VersionSelector, VisitedSet};
use crate::transfer::{CurlTransport, Transport};

/// Result of one top-level resolve cycle.
#[derive(Debug)]
pub struct Resolution {
    pub visited: VisitedSet,
    pub report: Vec<NodeReport>,
}

pub struct Context {
    config: FmdConfig,
    portal: PortalClient,
    fetcher: ArtifactFetcher,
}

impl Context {
    /// Context over the curl transport and the configured cache directory.
    pub fn new(config: FmdConfig) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        let transport: Arc<dyn Transport> = Arc::new(
            CurlTransport::new(config.user_agent.clone())
                .with_timeouts(config.connect_timeout(), config.download_timeout()),
        );
        Self::with_transport(config, cache_dir, transport)
    }

    /// Context over an explicit transport and cache directory.
    pub fn with_transport(
        config: FmdConfig,
        cache_dir: PathBuf,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("create cache dir {}", cache_dir.display()))?;
        let checksums = ChecksumCache::open(cache_dir.join(CHECKSUM_FILE));
        let mirrors = MirrorRegistry::new(config.mirrors.iter().cloned());
        let portal = PortalClient::new(config.registry_url.clone(), transport.clone())
            .with_timeouts(config.metadata_timeout(), config.catalog_timeout());
        let fetcher = ArtifactFetcher::new(
            transport,
            Arc::new(Mutex::new(mirrors)),
            Arc::new(Mutex::new(checksums)),
            cache_dir,
        );
        tracing::debug!(
            cache_dir = %fetcher.cache_dir().display(),
            mirrors = config.mirrors.len(),
            "context ready"
        );
        Ok(Self {
            config,
            portal,
            fetcher,
        })
    }

    pub fn config(&self) -> &FmdConfig {
        &self.config
    }

    pub fn portal(&self) -> &PortalClient {
        &self.portal
    }

    pub fn fetcher(&self) -> &ArtifactFetcher {
        &self.fetcher
    }

    pub fn cache_dir(&self) -> &Path {
        self.fetcher.cache_dir()
    }

    pub fn mirror_snapshot(&self) -> Vec<MirrorEntry> {
        self.fetcher.mirror_snapshot()
    }

    /// Resolver over this context's portal and fetcher.
    pub fn resolver(&self, cancel: CancelToken) -> Resolver<'_> {
        Resolver::new(&self.portal, &self.fetcher, cancel).with_delay(self.config.request_delay())
    }

    /// Resolve `name` and its dependency closure into a fresh visited set.
    pub fn resolve_root(
        &self,
        name: &str,
        selector: &VersionSelector,
        cancel: CancelToken,
    ) -> Result<Resolution, ResolveAbort> {
        let mut resolver = self.resolver(cancel);
        let visited = resolver.resolve_root(name, selector)?;
        Ok(Resolution {
            visited,
            report: resolver.into_report(),
        })
    }

    /// Configured game directory if valid, else the platform default if that exists.
    pub fn game_dir(&self) -> Option<PathBuf> {
        match &self.config.factorio_path {
            Some(path) if path.is_dir() => Some(path.clone()),
            Some(path) => {
                tracing::warn!(path = %path.display(), "configured game directory does not exist");
                install::default_factorio_dir()
            }
            None => install::default_factorio_dir(),
        }
    }

    /// Installer into the game directory, if one is known.
    pub fn installer(&self) -> Option<Installer> {
        let game_dir = self.game_dir()?;
        Some(Installer::new(
            self.cache_dir(),
            &game_dir,
            self.fetcher.checksums().clone(),
        ))
    }

    /// Delete every cached artifact and forget all stored checksums.
    pub fn clear_cache(&self) -> Result<()> {
        let mut checksums = self
            .fetcher
            .checksums()
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let dir = self.cache_dir();
        match fs::remove_dir_all(dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove {}", dir.display())),
        }
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        checksums.reset();
        tracing::info!(cache_dir = %dir.display(), "cache cleared");
        Ok(())
    }
}
