//! Lazy traversal of every process asset in the repository.

use crate::error::{CalledElementError, Result};
use crate::repository::ProcessRepository;
use crate::types::{AssetRef, PackageName, ProcessAsset};
use futures::stream::{self, Stream};
use std::collections::VecDeque;

/// Walks packages, then the process assets of each package, in backend order.
///
/// Listing failures end the walk with [`CalledElementError::BackendUnavailable`].
/// Per-asset fetches go through [`fetch_source`](Self::fetch_source) and
/// [`fetch_preview`](Self::fetch_preview), which contain their failures.
#[derive(Clone, Copy)]
pub struct RepositoryWalker<'a> {
    repo: &'a dyn ProcessRepository,
}

impl<'a> RepositoryWalker<'a> {
    pub fn new(repo: &'a dyn ProcessRepository) -> Self {
        Self { repo }
    }

    /// Stream every asset reference. Nothing is queried until the stream is
    /// polled, and dropping it stops the walk.
    pub fn asset_refs(&self) -> impl Stream<Item = Result<AssetRef>> + Send + 'a {
        stream::try_unfold(WalkState::new(self.repo), |state| state.advance())
    }

    /// Fetch an asset's source. A failure is logged and yields `None`.
    pub async fn fetch_source(&self, asset: &AssetRef) -> Option<ProcessAsset> {
        match self.repo.fetch_source(asset).await {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!(
                    package = %asset.package,
                    asset = %asset.uri,
                    error = %e,
                    "skipping asset with unreadable source"
                );
                None
            }
        }
    }

    /// Fetch a preview, substituting an empty string when none is available.
    pub async fn fetch_preview(&self, location: &str, process_id: &str) -> String {
        match self.repo.fetch_preview(location, process_id).await {
            Ok(Some(preview)) => preview,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(
                    location,
                    process_id,
                    error = %e,
                    "preview unavailable"
                );
                String::new()
            }
        }
    }
}

struct WalkState<'a> {
    repo: &'a dyn ProcessRepository,
    /// `None` until the package listing has been fetched.
    packages: Option<VecDeque<PackageName>>,
    assets: VecDeque<AssetRef>,
}

impl<'a> WalkState<'a> {
    fn new(repo: &'a dyn ProcessRepository) -> Self {
        Self {
            repo,
            packages: None,
            assets: VecDeque::new(),
        }
    }

    async fn advance(mut self) -> Result<Option<(AssetRef, Self)>> {
        if self.packages.is_none() {
            let packages = self
                .repo
                .list_packages()
                .await
                .map_err(CalledElementError::backend("list_packages"))?;
            tracing::debug!(packages = packages.len(), "walking repository");
            self.packages = Some(packages.into());
        }

        loop {
            if let Some(asset) = self.assets.pop_front() {
                return Ok(Some((asset, self)));
            }
            let Some(package) = self.packages.as_mut().and_then(VecDeque::pop_front) else {
                return Ok(None);
            };
            let assets = self
                .repo
                .list_process_assets(&package)
                .await
                .map_err(CalledElementError::backend("list_process_assets"))?;
            tracing::debug!(package = %package, assets = assets.len(), "listed package");
            self.assets = assets.into();
        }
    }
}
