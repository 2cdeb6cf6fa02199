//! In-memory backends for tests and local experiments.
//!
//! Each double counts the calls made against it and can be told to fail
//! specific operations, so tests can check both the result of a walk and how
//! much backend traffic it caused.

use crate::metadata::{
    wildcard_matches, DataModelService, IndexQuery, QueryRow, RepositoryPath,
    RuleIndexQueryService,
};
use crate::repository::ProcessRepository;
use crate::types::{AssetRef, PackageName, ProcessAsset};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

// ── Call counters ──

/// Per-operation call counts of a [`MemoryRepository`].
#[derive(Debug, Default)]
pub struct CallCounters {
    list_packages: AtomicUsize,
    list_process_assets: AtomicUsize,
    fetch_source: AtomicUsize,
    fetch_preview: AtomicUsize,
}

impl CallCounters {
    pub fn list_packages(&self) -> usize {
        self.list_packages.load(Ordering::SeqCst)
    }

    pub fn list_process_assets(&self) -> usize {
        self.list_process_assets.load(Ordering::SeqCst)
    }

    pub fn fetch_source(&self) -> usize {
        self.fetch_source.load(Ordering::SeqCst)
    }

    pub fn fetch_preview(&self) -> usize {
        self.fetch_preview.load(Ordering::SeqCst)
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

// ── MemoryRepository ──

/// One stored process asset.
#[derive(Debug, Clone)]
pub struct MemoryAsset {
    pub package: PackageName,
    pub name: String,
    pub asset_type: String,
    pub content: String,
    pub storage_id: String,
}

impl MemoryAsset {
    /// A `bpmn2` asset.
    pub fn bpmn(package: &str, name: &str, content: &str, storage_id: &str) -> Self {
        Self {
            package: package.to_string(),
            name: name.to_string(),
            asset_type: "bpmn2".to_string(),
            content: content.to_string(),
            storage_id: storage_id.to_string(),
        }
    }

    pub fn uri(&self) -> String {
        format!("{}/{}.{}", self.package, self.name, self.asset_type)
    }
}

/// In-memory [`ProcessRepository`]. Packages and assets are listed in
/// insertion order.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    packages: Vec<(PackageName, Vec<MemoryAsset>)>,
    previews: HashMap<(String, String), String>,
    listing_unavailable: bool,
    unavailable_packages: HashSet<String>,
    failing_sources: HashSet<String>,
    failing_previews: HashSet<(String, String)>,
    calls: CallCounters,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package, even if it will hold no assets.
    pub fn with_package(mut self, package: &str) -> Self {
        self.package_mut(package);
        self
    }

    /// Add an asset, creating its package on first use.
    pub fn with_asset(mut self, asset: MemoryAsset) -> Self {
        self.package_mut(&asset.package).push(asset);
        self
    }

    pub fn with_preview(mut self, location: &str, process_id: &str, preview: &str) -> Self {
        self.previews.insert(
            (location.to_string(), process_id.to_string()),
            preview.to_string(),
        );
        self
    }

    /// Make `list_packages` fail.
    pub fn with_unavailable_listing(mut self) -> Self {
        self.listing_unavailable = true;
        self
    }

    /// Make `list_process_assets` fail for `package`.
    pub fn with_unavailable_package(mut self, package: &str) -> Self {
        self.unavailable_packages.insert(package.to_string());
        self
    }

    /// Make `fetch_source` fail for the asset with this uri.
    pub fn with_failing_source(mut self, uri: &str) -> Self {
        self.failing_sources.insert(uri.to_string());
        self
    }

    pub fn with_failing_preview(mut self, location: &str, process_id: &str) -> Self {
        self.failing_previews
            .insert((location.to_string(), process_id.to_string()));
        self
    }

    pub fn calls(&self) -> &CallCounters {
        &self.calls
    }

    fn package_mut(&mut self, package: &str) -> &mut Vec<MemoryAsset> {
        let idx = match self.packages.iter().position(|(name, _)| name == package) {
            Some(idx) => idx,
            None => {
                self.packages.push((package.to_string(), Vec::new()));
                self.packages.len() - 1
            }
        };
        &mut self.packages[idx].1
    }

    fn find(&self, uri: &str) -> Option<&MemoryAsset> {
        self.packages
            .iter()
            .flat_map(|(_, assets)| assets)
            .find(|asset| asset.uri() == uri)
    }
}

#[async_trait]
impl ProcessRepository for MemoryRepository {
    async fn list_packages(&self) -> Result<Vec<PackageName>> {
        CallCounters::bump(&self.calls.list_packages);
        if self.listing_unavailable {
            bail!("repository unavailable");
        }
        Ok(self.packages.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn list_process_assets(&self, package: &str) -> Result<Vec<AssetRef>> {
        CallCounters::bump(&self.calls.list_process_assets);
        if self.unavailable_packages.contains(package) {
            bail!("package {} unavailable", package);
        }
        Ok(self
            .packages
            .iter()
            .filter(|(name, _)| name == package)
            .flat_map(|(_, assets)| assets)
            .map(|asset| AssetRef::new(package, asset.uri()))
            .collect())
    }

    async fn fetch_source(&self, asset: &AssetRef) -> Result<ProcessAsset> {
        CallCounters::bump(&self.calls.fetch_source);
        if self.failing_sources.contains(&asset.uri) {
            bail!("source of {} unreadable", asset.uri);
        }
        let stored = self
            .find(&asset.uri)
            .ok_or_else(|| anyhow!("no asset {}", asset.uri))?;
        Ok(ProcessAsset {
            name: stored.name.clone(),
            asset_type: stored.asset_type.clone(),
            asset_location: stored.package.clone(),
            raw_content: stored.content.clone(),
            storage_id: stored.storage_id.clone(),
        })
    }

    async fn fetch_preview(&self, location: &str, process_id: &str) -> Result<Option<String>> {
        CallCounters::bump(&self.calls.fetch_preview);
        let key = (location.to_string(), process_id.to_string());
        if self.failing_previews.contains(&key) {
            bail!("preview service failed for {}", process_id);
        }
        Ok(self.previews.get(&key).cloned())
    }
}

// ── MemoryRuleIndex ──

/// In-memory rule attribute index: one `(attribute, value)` pair per rule
/// attribute occurrence.
#[derive(Debug, Default)]
pub struct MemoryRuleIndex {
    attributes: Vec<(String, String)>,
    unavailable: bool,
    queries: AtomicUsize,
}

impl MemoryRuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, attribute: &str, value: &str) -> Self {
        self.attributes
            .push((attribute.to_string(), value.to_string()));
        self
    }

    pub fn with_rule_flow_group(self, group: &str) -> Self {
        self.with_attribute(crate::metadata::RULE_FLOW_GROUP_ATTRIBUTE, group)
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleIndexQueryService for MemoryRuleIndex {
    async fn query(&self, query: &IndexQuery) -> Result<Vec<QueryRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            bail!("rule index unavailable");
        }
        let Some(attribute) = query.attribute() else {
            return Ok(Vec::new());
        };
        let pattern = query.value_pattern().unwrap_or("*");
        Ok(self
            .attributes
            .iter()
            .filter(|(attr, _)| attr == attribute)
            .filter(|(_, value)| {
                if query.use_wildcards {
                    wildcard_matches(pattern, value)
                } else {
                    pattern == value
                }
            })
            .map(|(_, value)| QueryRow::new(value.clone()))
            .collect())
    }
}

// ── MemoryDataModel ──

/// In-memory path resolver and fact type oracle.
#[derive(Debug, Default)]
pub struct MemoryDataModel {
    paths: HashMap<String, RepositoryPath>,
    fact_types: HashMap<PackageName, Vec<String>>,
    unavailable: bool,
}

impl MemoryDataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as resolving to an asset in `package`.
    pub fn with_path(mut self, token: &str, package: &str) -> Self {
        self.paths.insert(
            token.to_string(),
            RepositoryPath {
                uri: token.to_string(),
                package: package.to_string(),
            },
        );
        self
    }

    pub fn with_fact_type(mut self, package: &str, fact_type: &str) -> Self {
        self.fact_types
            .entry(package.to_string())
            .or_default()
            .push(fact_type.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait]
impl DataModelService for MemoryDataModel {
    async fn resolve_path(&self, token: &str) -> Result<Option<RepositoryPath>> {
        if self.unavailable {
            bail!("data model service unavailable");
        }
        Ok(self.paths.get(token).cloned())
    }

    async fn fact_types(&self, path: &RepositoryPath) -> Result<Vec<String>> {
        if self.unavailable {
            bail!("data model service unavailable");
        }
        Ok(self
            .fact_types
            .get(&path.package)
            .cloned()
            .unwrap_or_default())
    }
}
