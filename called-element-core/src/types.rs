use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ─── Scalar aliases ───────────────────────────────────────────

/// Namespace/folder name inside the repository. Opaque to the core.
pub type PackageName = String;

/// Rule-flow-group names, distinct and ascending.
pub type RuleFlowGroupSet = BTreeSet<String>;

/// Fully-qualified fact type names, distinct and ascending.
pub type DataTypeSet = BTreeSet<String>;

/// Separator between process id and asset location in index keys. The
/// designer splits keys on it, so it is fixed.
pub const KEY_SEPARATOR: &str = "|";

// ─── Repository records ───────────────────────────────────────

/// A listed process asset, not yet materialized.
///
/// `uri` is backend-defined; the core only hands it back to
/// [`ProcessRepository::fetch_source`](crate::repository::ProcessRepository::fetch_source).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub package: PackageName,
    pub uri: String,
}

impl AssetRef {
    pub fn new(package: impl Into<PackageName>, uri: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            uri: uri.into(),
        }
    }
}

/// Read-only snapshot of one process definition, fetched per request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessAsset {
    /// Display name (file stem).
    pub name: String,
    /// Extension / kind, e.g. `bpmn2`.
    pub asset_type: String,
    /// Package the asset resides in.
    pub asset_location: PackageName,
    pub raw_content: String,
    /// Repository-assigned id. May be legacy (base64) encoded.
    pub storage_id: String,
}

impl ProcessAsset {
    /// `name.assetType`, the key a designer uses to open the asset.
    pub fn display_key(&self) -> String {
        format!("{}.{}", self.name, self.asset_type)
    }
}

// ─── Resolution results ───────────────────────────────────────

/// Result of single-target resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub display_key: String,
    /// Storage id with any legacy encoding removed.
    pub canonical_storage_id: String,
}

/// Call targets keyed by `processId|assetLocation`, valued by rendered
/// preview (empty when none is available).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CalledElementIndex {
    entries: BTreeMap<String, String>,
}

impl CalledElementIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(process_id: &str, location: &str) -> String {
        format!("{}{}{}", process_id, KEY_SEPARATOR, location)
    }

    /// Insert a target. Returns the previous preview if the key was present.
    pub fn insert(&mut self, process_id: &str, location: &str, preview: String) -> Option<String> {
        let key = Self::key(process_id, location);
        self.entries.insert(key, preview)
    }

    pub fn get(&self, process_id: &str, location: &str) -> Option<&str> {
        self.entries
            .get(&Self::key(process_id, location))
            .map(String::as_str)
    }

    pub fn contains(&self, process_id: &str, location: &str) -> bool {
        self.entries.contains_key(&Self::key(process_id, location))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }
}
