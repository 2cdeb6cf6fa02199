//! Metadata lookups for business-rule tasks and data inputs.
//!
//! Two adapters over external services: the rule attribute index (for
//! rule-flow-group names) and the data-model oracle (for the fact types
//! visible to an asset's package). Both normalize what the services return
//! into sorted, de-duplicated sets.

use crate::error::{CalledElementError, Result};
use crate::types::{DataTypeSet, PackageName, RuleFlowGroupSet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Rule attribute holding the group a rule belongs to.
pub const RULE_FLOW_GROUP_ATTRIBUTE: &str = "ruleflow-group";

/// Name of the index query listing rule-flow-group values.
pub const FIND_RULE_FLOW_NAMES_QUERY: &str = "FindRuleFlowNamesQuery";

// ─── Rule attribute index ─────────────────────────────────────

/// One term of an index query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexTerm {
    /// Rule attribute name, e.g. `ruleflow-group`.
    RuleAttribute(String),
    /// Value filter on that attribute. `*` matches any run of characters
    /// when the query enables wildcards.
    RuleAttributeValue(String),
}

/// A named structured query against the rule attribute index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexQuery {
    pub name: String,
    pub terms: Vec<IndexTerm>,
    pub use_wildcards: bool,
}

impl IndexQuery {
    /// All values of the `ruleflow-group` attribute.
    pub fn rule_flow_names() -> Self {
        Self {
            name: FIND_RULE_FLOW_NAMES_QUERY.to_string(),
            terms: vec![
                IndexTerm::RuleAttribute(RULE_FLOW_GROUP_ATTRIBUTE.to_string()),
                IndexTerm::RuleAttributeValue("*".to_string()),
            ],
            use_wildcards: true,
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        self.terms.iter().find_map(|term| match term {
            IndexTerm::RuleAttribute(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn value_pattern(&self) -> Option<&str> {
        self.terms.iter().find_map(|term| match term {
            IndexTerm::RuleAttributeValue(value) => Some(value.as_str()),
            _ => None,
        })
    }
}

/// One result row of an index query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRow {
    pub value: String,
}

impl QueryRow {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[async_trait]
pub trait RuleIndexQueryService: Send + Sync {
    async fn query(&self, query: &IndexQuery) -> anyhow::Result<Vec<QueryRow>>;
}

// ─── Data-model oracle ────────────────────────────────────────

/// A concrete asset path inside the repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPath {
    pub uri: String,
    /// Package whose data model applies to the asset.
    pub package: PackageName,
}

#[async_trait]
pub trait DataModelService: Send + Sync {
    /// Resolve a caller-supplied path token. `None` if nothing exists there.
    async fn resolve_path(&self, token: &str) -> anyhow::Result<Option<RepositoryPath>>;

    /// Fully-qualified fact type names visible to the asset at `path`.
    async fn fact_types(&self, path: &RepositoryPath) -> anyhow::Result<Vec<String>>;
}

// ─── Adapters ─────────────────────────────────────────────────

/// Distinct rule-flow-group names, ascending. An empty index is not an error.
pub async fn rule_flow_groups(service: &dyn RuleIndexQueryService) -> Result<RuleFlowGroupSet> {
    let rows = service
        .query(&IndexQuery::rule_flow_names())
        .await
        .map_err(CalledElementError::backend("rule_index_query"))?;
    let total = rows.len();
    let groups: RuleFlowGroupSet = rows.into_iter().map(|row| row.value).collect();
    tracing::debug!(rows = total, groups = groups.len(), "rule-flow groups collected");
    Ok(groups)
}

/// Fact type names for the asset identified by `token`, ascending.
///
/// Unlike the other lookups there is no empty fallback: the token is
/// required, so one that does not resolve fails the request.
pub async fn data_types(service: &dyn DataModelService, token: &str) -> Result<DataTypeSet> {
    let token = normalize_path_token(token);
    let path = service
        .resolve_path(&token)
        .await
        .map_err(CalledElementError::backend("resolve_path"))?
        .ok_or_else(|| CalledElementError::UnresolvedPathToken(token.clone()))?;
    let types: DataTypeSet = service
        .fact_types(&path)
        .await
        .map_err(CalledElementError::backend("fact_types"))?
        .into_iter()
        .collect();
    tracing::debug!(path = %path.uri, types = types.len(), "data types collected");
    Ok(types)
}

/// Path tokens arrive with raw whitespace; the repository expects it
/// percent-encoded.
pub fn normalize_path_token(token: &str) -> String {
    token
        .chars()
        .fold(String::with_capacity(token.len()), |mut acc, c| {
            if c.is_whitespace() {
                acc.push_str("%20");
            } else {
                acc.push(c);
            }
            acc
        })
}

/// Glob-style match where `*` stands for any (possibly empty) run of
/// characters and everything else matches literally.
pub fn wildcard_matches(pattern: &str, value: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return value.is_empty();
    };
    let Some(mut rest) = value.strip_prefix(first) else {
        return false;
    };
    let mut segments: Vec<&str> = parts.collect();
    let Some(last) = segments.pop() else {
        // no `*` at all
        return rest.is_empty();
    };
    for segment in segments {
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
