use crate::types::{AssetRef, PackageName, ProcessAsset};
use anyhow::Result;
use async_trait::async_trait;

/// Read access to the process repository.
///
/// The resolution engine operates exclusively through this trait, so the
/// same walk runs against a real store or a test double. Implementations
/// must not cache across calls: every walk re-queries the backend because
/// the repository can change between requests.
#[async_trait]
pub trait ProcessRepository: Send + Sync {
    /// All package names. No ordering guarantee.
    async fn list_packages(&self) -> Result<Vec<PackageName>>;

    /// Process assets directly inside `package`.
    async fn list_process_assets(&self, package: &str) -> Result<Vec<AssetRef>>;

    /// Materialize an asset, including its raw markup. Potentially expensive.
    async fn fetch_source(&self, asset: &AssetRef) -> Result<ProcessAsset>;

    /// Rendered preview for the process `process_id` in `location`, if any.
    async fn fetch_preview(&self, location: &str, process_id: &str) -> Result<Option<String>>;
}
