//! Directory-tree backend.
//!
//! Layout under the repository root:
//! - every (non-hidden) directory is a package, named by its `/`-separated
//!   path relative to the root;
//! - `*.bpmn` / `*.bpmn2` files directly inside a package are process assets;
//! - `{processId}-svg.svg` next to them is the rendered preview;
//! - `*.drl` files carry rule attributes, `*.java` / `*.drl` files declare
//!   fact types.
//!
//! Nothing is cached; every call reads the tree again.

mod data_model;
mod repository;
mod rules;

pub use data_model::FsDataModel;
pub use repository::FsRepository;
pub use rules::FsRuleIndex;

use crate::service::Backends;
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Extensions recognised as process assets.
pub const PROCESS_EXTENSIONS: &[&str] = &["bpmn", "bpmn2"];

/// Suffix of preview files: `{processId}-svg.svg`.
pub const PREVIEW_SUFFIX: &str = "-svg.svg";

pub const DEFAULT_URI_SCHEME: &str = "default";

/// Root directory plus the scheme used in storage ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsLayout {
    root: PathBuf,
    scheme: String,
}

impl FsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scheme: DEFAULT_URI_SCHEME.to_string(),
        }
    }

    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All three backends over this tree.
    pub fn backends(&self) -> Backends {
        Backends {
            repository: Arc::new(FsRepository::new(self.clone())),
            rule_index: Arc::new(FsRuleIndex::new(self.clone())),
            data_model: Arc::new(FsDataModel::new(self.clone())),
        }
    }

    /// Directory of `package`. Rejects names that would escape the root.
    pub(crate) fn package_dir(&self, package: &str) -> Result<PathBuf> {
        let rel = safe_relative(package)
            .with_context(|| format!("invalid package name {:?}", package))?;
        Ok(self.root.join(rel))
    }

    /// `scheme://package/file`, whitespace written as `%20`.
    pub(crate) fn storage_id(&self, package: &str, file_name: &str) -> String {
        let path = if package.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", package, file_name)
        };
        format!(
            "{}://{}",
            self.scheme,
            crate::metadata::normalize_path_token(&path)
        )
    }

    /// Inverse of [`storage_id`](Self::storage_id); bare relative paths are
    /// accepted too. `None` if the token would leave the root.
    pub(crate) fn relative_path(&self, token: &str) -> Option<PathBuf> {
        let prefix = format!("{}://", self.scheme);
        let rel = token.strip_prefix(&prefix).unwrap_or(token);
        let decoded = rel.replace("%20", " ");
        safe_relative(decoded.trim_start_matches('/'))
    }

    /// Filesystem path of an asset uri produced by
    /// [`FsRepository`]: a plain relative path, never percent-decoded.
    pub(crate) fn asset_path(&self, uri: &str) -> Option<PathBuf> {
        safe_relative(uri).map(|rel| self.root.join(rel))
    }

    /// Every non-hidden directory below the root, as package names, sorted.
    pub(crate) async fn package_names(&self) -> Result<Vec<String>> {
        let mut packages = Vec::new();
        let mut pending = vec![PathBuf::new()];
        while let Some(rel) = pending.pop() {
            let dir = self.root.join(&rel);
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .with_context(|| format!("reading {}", dir.display()))?;
            while let Some(entry) = entries.next_entry().await? {
                if !entry.file_type().await?.is_dir() {
                    continue;
                }
                let Ok(name) = entry.file_name().into_string() else {
                    tracing::warn!(dir = %dir.display(), "skipping non-UTF-8 directory name");
                    continue;
                };
                if name.starts_with('.') {
                    continue;
                }
                let child = rel.join(&name);
                packages.push(package_name(&child));
                pending.push(child);
            }
        }
        packages.sort();
        Ok(packages)
    }

    /// Files directly inside `dir` whose extension is one of `extensions`,
    /// sorted by name.
    pub(crate) async fn files_with_extension(
        &self,
        dir: &Path,
        extensions: &[&str],
    ) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("reading {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext));
            if matches {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn package_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `rel` as a path that stays below the root: only normal components.
fn safe_relative(rel: &str) -> Option<PathBuf> {
    let path = Path::new(rel);
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}
