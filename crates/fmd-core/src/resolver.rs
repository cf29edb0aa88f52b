//! Depth-first dependency resolver.
//!
//! One call to [`Resolver::resolve`] handles one package and recurses into
//! the declared dependencies of the release it picked. The [`VisitedSet`] is
//! both the memo and the cycle breaker: a name is reserved before its
//! metadata is looked up, so a package reachable through several paths (or
//! through a cycle) is handled exactly once, by whichever path gets there
//! first.
//!
//! Per-node failures (lookup, no matching release, missing version, fetch)
//! are logged and recorded in the run report; the package stays absent and
//! the walk continues with its siblings. Only cancellation and local storage
//! faults stop the whole walk.

use std::collections::HashMap;
use std::time::Duration;

use crate::control::CancelToken;
use crate::depspec::{DependencySpec, VersionFilter};
use crate::error::{FetchError, ResolveAbort, ResolveError};
use crate::fetcher::{ArtifactFetcher, ArtifactSource};
use crate::portal::{ModInfo, ModSource, Release};
use crate::version::ModVersion;

/// Engine-provided packages that are never fetched.
pub const IGNORED_MODS: &[&str] = &["base", "space-age", "quality", "elevated-rails"];

/// Default pause between a fetch and expanding its dependencies.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(50);

pub fn is_ignored(name: &str) -> bool {
    IGNORED_MODS.contains(&name)
}

/// Which release of a package to pick among those passing the filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionSelector {
    /// Highest version.
    #[default]
    Latest,
    /// This exact version string.
    Exact(String),
}

impl VersionSelector {
    /// `None`, empty or `"latest"` select the newest release.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg.map(str::trim) {
            None | Some("") | Some("latest") => VersionSelector::Latest,
            Some(v) => VersionSelector::Exact(v.to_string()),
        }
    }
}

/// Package name → installed file name (`None`: visited but nothing to install).
/// Iteration follows first-visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet {
    order: Vec<String>,
    files: HashMap<String, Option<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// `None` if never visited, `Some(None)` if visited without a file.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.files.get(name).map(|f| f.as_deref())
    }

    /// Mark `name` as visited with no file. Returns false if it was already present.
    pub fn reserve(&mut self, name: &str) -> bool {
        if self.files.contains_key(name) {
            return false;
        }
        self.order.push(name.to_string());
        self.files.insert(name.to_string(), None);
        true
    }

    /// Record the artifact file for `name`, reserving it first if needed.
    pub fn record_file(&mut self, name: &str, file_name: &str) {
        self.reserve(name);
        self.files
            .insert(name.to_string(), Some(file_name.to_string()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.order.iter().map(move |name| {
            let file = self.files.get(name).and_then(|f| f.as_deref());
            (name.as_str(), file)
        })
    }

    /// Resolved file names in visit order.
    pub fn files(&self) -> Vec<&str> {
        self.iter().filter_map(|(_, f)| f).collect()
    }

    /// Number of packages with a file.
    pub fn resolved_count(&self) -> usize {
        self.files.values().filter(|f| f.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// What happened at one node of the walk.
#[derive(Debug)]
pub enum NodeOutcome {
    Fetched {
        version: String,
        file_name: String,
        from_cache: bool,
    },
    Ignored,
    Failed(ResolveError),
}

#[derive(Debug)]
pub struct NodeReport {
    pub name: String,
    pub outcome: NodeOutcome,
}

pub struct Resolver<'a> {
    source: &'a dyn ModSource,
    fetcher: &'a ArtifactFetcher,
    delay: Duration,
    cancel: CancelToken,
    report: Vec<NodeReport>,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn ModSource, fetcher: &'a ArtifactFetcher, cancel: CancelToken) -> Self {
        Self {
            source,
            fetcher,
            delay: DEFAULT_REQUEST_DELAY,
            cancel,
            report: Vec::new(),
        }
    }

    /// Courtesy pause after each fetch, before recursing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Per-node outcomes so far, in the order nodes were handled.
    pub fn report(&self) -> &[NodeReport] {
        &self.report
    }

    pub fn into_report(self) -> Vec<NodeReport> {
        self.report
    }

    /// Resolve `name` and its closure into a fresh visited set.
    pub fn resolve_root(
        &mut self,
        name: &str,
        selector: &VersionSelector,
    ) -> Result<VisitedSet, ResolveAbort> {
        let mut visited = VisitedSet::new();
        self.resolve(name, selector, &VersionFilter::Any, &mut visited)?;
        Ok(visited)
    }

    /// Resolve `name` into `visited`, recursing into required dependencies.
    pub fn resolve(
        &mut self,
        name: &str,
        selector: &VersionSelector,
        filter: &VersionFilter,
        visited: &mut VisitedSet,
    ) -> Result<(), ResolveAbort> {
        if self.cancel.is_cancelled() {
            return Err(ResolveAbort::Interrupted);
        }
        if is_ignored(name) {
            if visited.reserve(name) {
                tracing::debug!(mod_name = name, "skipping built-in mod");
                self.push(name, NodeOutcome::Ignored);
            }
            return Ok(());
        }
        if !visited.reserve(name) {
            return Ok(());
        }

        let release = match self.select_and_fetch(name, selector, filter) {
            Ok((release, from_cache)) => {
                visited.record_file(name, &release.file_name);
                self.push(
                    name,
                    NodeOutcome::Fetched {
                        version: release.version.clone(),
                        file_name: release.file_name.clone(),
                        from_cache,
                    },
                );
                release
            }
            Err(e) => {
                let e = escalate(e, &self.cancel)?;
                tracing::warn!(mod_name = name, "could not resolve: {}", e);
                self.push(name, NodeOutcome::Failed(e));
                return Ok(());
            }
        };

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        for raw in release.dependencies() {
            let dep = DependencySpec::parse(raw);
            if dep.drives_fetch() {
                self.resolve(&dep.name, &VersionSelector::Latest, &dep.filter, visited)?;
            } else {
                tracing::trace!(parent = name, dependency = %raw, "not fetched");
            }
        }
        Ok(())
    }

    /// Lookup, filter, select and fetch one package. Returns the release and whether it came from cache.
    fn select_and_fetch(
        &self,
        name: &str,
        selector: &VersionSelector,
        filter: &VersionFilter,
    ) -> Result<(Release, bool), ResolveError> {
        let info = self.source.full_info(name)?;
        let release = select_release(info, selector, filter)?;
        tracing::debug!(mod_name = name, version = %release.version, "selected release");
        let artifact = self.fetcher.fetch(name, &release, &self.cancel)?;
        Ok((release, artifact.source == ArtifactSource::Cache))
    }

    fn push(&mut self, name: &str, outcome: NodeOutcome) {
        self.report.push(NodeReport {
            name: name.to_string(),
            outcome,
        });
    }
}

/// Split node errors into contained failures and run-stopping aborts.
fn escalate(err: ResolveError, cancel: &CancelToken) -> Result<ResolveError, ResolveAbort> {
    match err {
        ResolveError::Fetch(FetchError::Interrupted) => Err(ResolveAbort::Interrupted),
        ResolveError::Fetch(FetchError::Local(e)) => Err(ResolveAbort::Storage(e)),
        ResolveError::Lookup(ref l) if l.is_interrupted() => Err(ResolveAbort::Interrupted),
        _ if cancel.is_cancelled() => Err(ResolveAbort::Interrupted),
        other => Ok(other),
    }
}

/// Pick a release of `info` passing `filter` according to `selector`.
/// Releases whose version string does not parse are never candidates.
pub fn select_release(
    info: ModInfo,
    selector: &VersionSelector,
    filter: &VersionFilter,
) -> Result<Release, ResolveError> {
    let name = info.name;
    let candidates: Vec<(ModVersion, Release)> = info
        .releases
        .into_iter()
        .filter_map(|r| match r.mod_version() {
            Some(v) => filter.matches(&v).then_some((v, r)),
            None => {
                tracing::debug!(mod_name = %name, version = %r.version, "skipping release with unparseable version");
                None
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(ResolveError::NoMatchingRelease {
            name,
            filter: filter.to_string(),
        });
    }

    let picked = match selector {
        VersionSelector::Latest => candidates
            .into_iter()
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, r)| r),
        VersionSelector::Exact(want) => {
            let want_version = ModVersion::parse(want).ok();
            candidates
                .into_iter()
                .find(|(v, r)| r.version == *want || want_version.as_ref() == Some(v))
                .map(|(_, r)| r)
        }
    };
    picked.ok_or_else(|| ResolveError::VersionNotFound {
        name,
        version: match selector {
            VersionSelector::Exact(v) => v.clone(),
            VersionSelector::Latest => "latest".to_string(),
        },
    })
}
