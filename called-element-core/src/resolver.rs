//! Resolution engine: single-target lookup and the called-element index.
//!
//! ## Walk order and duplicates
//! Single-target mode takes the first asset, in backend walk order, whose
//! declared id matches. Backends do not promise an order, so when several
//! assets declare the same id the winner is whichever the backend lists
//! first. No tie-break is applied on top of that.
//!
//! ## Concurrency
//! Single-target mode is strictly sequential and stops at the first match.
//! Aggregate mode has no early exit and no ordering dependency, so source
//! and preview fetches for up to `max_concurrent_fetches` assets run at once;
//! keys are unique per (process id, location), so the merge is order-free.

use crate::error::{CalledElementError, Result};
use crate::extract::extract_process_id;
use crate::legacy_id::canonical_storage_id;
use crate::repository::ProcessRepository;
use crate::types::{AssetRef, CalledElementIndex, ProcessAsset, ResolvedReference};
use crate::walker::RepositoryWalker;
use futures::{future, TryStreamExt};
use serde::{Deserialize, Serialize};

/// Per-request engine settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Upper bound on concurrently processed assets in aggregate mode.
    pub max_concurrent_fetches: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
        }
    }
}

/// Request-scoped resolution over one repository.
pub struct ResolutionEngine<'a> {
    walker: RepositoryWalker<'a>,
    config: ResolverConfig,
}

impl<'a> ResolutionEngine<'a> {
    pub fn new(repo: &'a dyn ProcessRepository, config: ResolverConfig) -> Self {
        Self {
            walker: RepositoryWalker::new(repo),
            config,
        }
    }

    /// Find the asset declaring `process_id` and return a reference to it.
    ///
    /// Every package is searched; `package` only identifies the caller.
    /// Returns `Ok(None)` when no asset declares the id.
    pub async fn resolve_single(
        &self,
        package: &str,
        process_id: &str,
    ) -> Result<Option<ResolvedReference>> {
        let walker = self.walker;
        let matches = walker.asset_refs().try_filter_map(move |asset_ref| async move {
            let Some(asset) = walker.fetch_source(&asset_ref).await else {
                return Ok(None);
            };
            Ok::<_, CalledElementError>(declares(&asset, process_id).then_some(asset))
        });
        futures::pin_mut!(matches);

        let Some(asset) = matches.try_next().await? else {
            tracing::debug!(caller = package, process_id, "no process declares id");
            return Ok(None);
        };

        let reference = ResolvedReference {
            display_key: asset.display_key(),
            canonical_storage_id: canonical_storage_id(&asset.storage_id),
        };
        tracing::debug!(
            process_id,
            location = %asset.asset_location,
            display_key = %reference.display_key,
            "resolved called element"
        );
        Ok(Some(reference))
    }

    /// Index every process in the repository except the caller's own
    /// `(process_package, process_id)`.
    pub async fn called_elements(
        &self,
        process_package: &str,
        process_id: &str,
    ) -> Result<CalledElementIndex> {
        let limit = self.config.max_concurrent_fetches.max(1);
        let index = self
            .walker
            .asset_refs()
            .map_ok(move |asset_ref| async move {
                Ok::<_, CalledElementError>(
                    self.index_entry(asset_ref, process_package, process_id)
                        .await,
                )
            })
            .try_buffer_unordered(limit)
            .try_fold(CalledElementIndex::new(), |mut index, entry| {
                if let Some(entry) = entry {
                    index.insert(&entry.process_id, &entry.location, entry.preview);
                }
                future::ready(Ok::<_, CalledElementError>(index))
            })
            .await?;

        tracing::debug!(
            caller = process_package,
            process_id,
            entries = index.len(),
            "called-element index assembled"
        );
        Ok(index)
    }

    async fn index_entry(
        &self,
        asset_ref: AssetRef,
        process_package: &str,
        process_id: &str,
    ) -> Option<IndexEntry> {
        let asset = self.walker.fetch_source(&asset_ref).await?;
        let Some(declared) = extract_process_id(&asset.raw_content) else {
            tracing::debug!(asset = %asset_ref.uri, "no process id in markup");
            return None;
        };
        if asset.asset_location == process_package && declared == process_id {
            return None;
        }
        let preview = self
            .walker
            .fetch_preview(&asset.asset_location, declared)
            .await;
        Some(IndexEntry {
            process_id: declared.to_string(),
            location: asset.asset_location.clone(),
            preview,
        })
    }
}

struct IndexEntry {
    process_id: String,
    location: String,
    preview: String,
}

fn declares(asset: &ProcessAsset, process_id: &str) -> bool {
    match extract_process_id(&asset.raw_content) {
        Some(declared) => declared == process_id,
        None => {
            tracing::debug!(
                asset = %asset.name,
                location = %asset.asset_location,
                "no process id in markup"
            );
            false
        }
    }
}
