//! Request dispatch over a set of backends.

use crate::error::Result;
use crate::metadata::{self, DataModelService, RuleIndexQueryService};
use crate::repository::ProcessRepository;
use crate::resolver::{ResolutionEngine, ResolverConfig};
use crate::response::{CalledElementRequest, CalledElementResponse};
use std::sync::Arc;

/// The three collaborators a request may need.
#[derive(Clone)]
pub struct Backends {
    pub repository: Arc<dyn ProcessRepository>,
    pub rule_index: Arc<dyn RuleIndexQueryService>,
    pub data_model: Arc<dyn DataModelService>,
}

/// Routes a [`CalledElementRequest`] to the resolution engine or a metadata
/// adapter. Built per request; holds no state between requests.
pub struct CalledElementService {
    backends: Backends,
    config: ResolverConfig,
}

impl CalledElementService {
    pub fn new(backends: Backends, config: ResolverConfig) -> Self {
        Self { backends, config }
    }

    pub async fn handle(&self, request: CalledElementRequest) -> Result<CalledElementResponse> {
        tracing::debug!(mode = request.mode(), "handling request");
        match request {
            CalledElementRequest::ResolveSingleTarget {
                package,
                process_id,
            } => {
                let reference = self
                    .engine()
                    .resolve_single(&package, &process_id)
                    .await?;
                Ok(CalledElementResponse::Resolved(reference))
            }
            CalledElementRequest::RuleFlowGroups => {
                let groups = metadata::rule_flow_groups(self.backends.rule_index.as_ref()).await?;
                Ok(CalledElementResponse::RuleFlowGroups(groups))
            }
            CalledElementRequest::DataTypes { path_token } => {
                let types =
                    metadata::data_types(self.backends.data_model.as_ref(), &path_token).await?;
                Ok(CalledElementResponse::DataTypes(types))
            }
            CalledElementRequest::CalledElements {
                package,
                process_id,
            } => {
                let index = self
                    .engine()
                    .called_elements(&package, &process_id)
                    .await?;
                Ok(CalledElementResponse::CalledElements(index))
            }
        }
    }

    fn engine(&self) -> ResolutionEngine<'_> {
        ResolutionEngine::new(self.backends.repository.as_ref(), self.config.clone())
    }
}
