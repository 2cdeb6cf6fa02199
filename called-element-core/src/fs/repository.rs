use super::{FsLayout, PREVIEW_SUFFIX, PROCESS_EXTENSIONS};
use crate::repository::ProcessRepository;
use crate::types::{AssetRef, PackageName, ProcessAsset};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// [`ProcessRepository`] over a directory tree. Asset uris are paths
/// relative to the root.
pub struct FsRepository {
    layout: FsLayout,
}

impl FsRepository {
    pub fn new(layout: FsLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl ProcessRepository for FsRepository {
    async fn list_packages(&self) -> Result<Vec<PackageName>> {
        self.layout.package_names().await
    }

    async fn list_process_assets(&self, package: &str) -> Result<Vec<AssetRef>> {
        let dir = self.layout.package_dir(package)?;
        let files = self
            .layout
            .files_with_extension(&dir, PROCESS_EXTENSIONS)
            .await?;
        Ok(files
            .iter()
            .filter_map(|path| {
                let name = file_name(path);
                if name.is_none() {
                    tracing::warn!(file = %path.display(), "skipping non-UTF-8 asset name");
                }
                name
            })
            .map(|name| AssetRef::new(package, format!("{}/{}", package, name)))
            .collect())
    }

    async fn fetch_source(&self, asset: &AssetRef) -> Result<ProcessAsset> {
        let path = self
            .layout
            .asset_path(&asset.uri)
            .ok_or_else(|| anyhow!("invalid asset uri {}", asset.uri))?;
        let raw_content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;

        let file = file_name(&path).ok_or_else(|| anyhow!("no file name in {}", asset.uri))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let asset_type = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ProcessAsset {
            name,
            asset_type,
            asset_location: asset.package.clone(),
            raw_content,
            storage_id: self.layout.storage_id(&asset.package, &file),
        })
    }

    async fn fetch_preview(&self, location: &str, process_id: &str) -> Result<Option<String>> {
        // Process ids come from asset content; never let one name a path.
        if process_id.contains(['/', '\\']) || process_id.starts_with('.') {
            return Ok(None);
        }
        let path = self
            .layout
            .package_dir(location)?
            .join(format!("{}{}", process_id, PREVIEW_SUFFIX));
        match tokio::fs::read_to_string(&path).await {
            Ok(svg) => Ok(Some(svg)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}
