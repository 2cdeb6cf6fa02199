//! Request modes and the wire representation of their results.
//!
//! Every mode answers with a flat JSON object of string to string, including
//! single-target resolution (`{displayKey: canonicalStorageId}`, or `{}` when
//! nothing resolves).

use crate::error::{CalledElementError, Result};
use crate::types::{CalledElementIndex, DataTypeSet, ResolvedReference, RuleFlowGroupSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ACTION_OPEN_PROCESS_IN_TAB: &str = "openprocessintab";
pub const ACTION_SHOW_RULE_FLOW_GROUPS: &str = "showruleflowgroups";
pub const ACTION_SHOW_DATA_TYPES: &str = "showdatatypes";

/// Raw request parameters, as posted by the designer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    pub profile: Option<String>,
    /// Caller's package.
    pub ppackage: Option<String>,
    /// Caller's process id, or the target id for `openprocessintab`.
    pub pid: Option<String>,
    pub action: Option<String>,
    /// Asset path token for `showdatatypes`.
    pub uuid: Option<String>,
}

/// A request, selected by the `action` discriminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalledElementRequest {
    /// Resolve a reference to the process declaring `process_id`.
    ResolveSingleTarget { package: String, process_id: String },
    RuleFlowGroups,
    DataTypes { path_token: String },
    /// Index every process except the caller's own. The default mode.
    CalledElements { package: String, process_id: String },
}

impl CalledElementRequest {
    pub fn from_params(params: &RequestParams) -> Result<Self> {
        match params.action.as_deref() {
            Some(ACTION_OPEN_PROCESS_IN_TAB) => Ok(Self::ResolveSingleTarget {
                package: required(&params.ppackage, "ppackage")?,
                process_id: required(&params.pid, "pid")?,
            }),
            Some(ACTION_SHOW_RULE_FLOW_GROUPS) => Ok(Self::RuleFlowGroups),
            Some(ACTION_SHOW_DATA_TYPES) => Ok(Self::DataTypes {
                path_token: required(&params.uuid, "uuid")?,
            }),
            _ => Ok(Self::CalledElements {
                package: required(&params.ppackage, "ppackage")?,
                process_id: required(&params.pid, "pid")?,
            }),
        }
    }

    /// Mode name for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::ResolveSingleTarget { .. } => "resolve-single-target",
            Self::RuleFlowGroups => "list-ruleflow-groups",
            Self::DataTypes { .. } => "list-data-types",
            Self::CalledElements { .. } => "aggregate-called-elements",
        }
    }
}

/// Blank values count as missing; anything else is taken verbatim.
fn required(value: &Option<String>, name: &'static str) -> Result<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or(CalledElementError::MissingParameter(name))
}

/// Result of one request, before serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalledElementResponse {
    Resolved(Option<ResolvedReference>),
    RuleFlowGroups(RuleFlowGroupSet),
    DataTypes(DataTypeSet),
    CalledElements(CalledElementIndex),
}

impl CalledElementResponse {
    /// Flatten into the key/value mapping sent on the wire. Name sets map
    /// each name to itself.
    pub fn into_mapping(self) -> BTreeMap<String, String> {
        match self {
            Self::Resolved(reference) => reference
                .map(|r| (r.display_key, r.canonical_storage_id))
                .into_iter()
                .collect(),
            Self::RuleFlowGroups(names) | Self::DataTypes(names) => reflexive(names),
            Self::CalledElements(index) => index.into_entries(),
        }
    }
}

fn reflexive(names: impl IntoIterator<Item = String>) -> BTreeMap<String, String> {
    names.into_iter().map(|n| (n.clone(), n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(resp: CalledElementResponse) -> serde_json::Value {
        serde_json::to_value(resp.into_mapping()).unwrap()
    }

    fn params(action: Option<&str>, ppackage: Option<&str>, pid: Option<&str>) -> RequestParams {
        RequestParams {
            action: action.map(str::to_string),
            ppackage: ppackage.map(str::to_string),
            pid: pid.map(str::to_string),
            ..RequestParams::default()
        }
    }

    #[test]
    fn action_selects_mode() {
        let req = CalledElementRequest::from_params(&params(
            Some("openprocessintab"),
            Some("orders"),
            Some("ship"),
        ))
        .unwrap();
        assert_eq!(
            req,
            CalledElementRequest::ResolveSingleTarget {
                package: "orders".into(),
                process_id: "ship".into()
            }
        );

        let req =
            CalledElementRequest::from_params(&params(Some("showruleflowgroups"), None, None))
                .unwrap();
        assert_eq!(req, CalledElementRequest::RuleFlowGroups);
        assert_eq!(req.mode(), "list-ruleflow-groups");
    }

    #[test]
    fn unknown_or_missing_action_is_aggregate() {
        for action in [None, Some("whatever")] {
            let req =
                CalledElementRequest::from_params(&params(action, Some("orders"), Some("ship")))
                    .unwrap();
            assert_eq!(req.mode(), "aggregate-called-elements");
        }
    }

    #[test]
    fn missing_parameters_rejected() {
        let err = CalledElementRequest::from_params(&params(None, Some("orders"), None))
            .unwrap_err();
        assert!(matches!(err, CalledElementError::MissingParameter("pid")));

        let err =
            CalledElementRequest::from_params(&params(Some("openprocessintab"), Some(" "), Some("x")))
                .unwrap_err();
        assert!(matches!(err, CalledElementError::MissingParameter("ppackage")));

        let err = CalledElementRequest::from_params(&params(Some("showdatatypes"), None, None))
            .unwrap_err();
        assert!(matches!(err, CalledElementError::MissingParameter("uuid")));
    }

    #[test]
    fn non_blank_values_kept_verbatim() {
        let req = CalledElementRequest::from_params(&params(
            Some("openprocessintab"),
            Some(" orders"),
            Some("ship "),
        ))
        .unwrap();
        assert_eq!(
            req,
            CalledElementRequest::ResolveSingleTarget {
                package: " orders".into(),
                process_id: "ship ".into()
            }
        );

        let req = CalledElementRequest::from_params(&params(None, Some("orders\t"), Some(" ship")))
            .unwrap();
        assert_eq!(
            req,
            CalledElementRequest::CalledElements {
                package: "orders\t".into(),
                process_id: " ship".into()
            }
        );
    }

    #[test]
    fn data_types_token_passed_through() {
        let mut p = params(Some("showdatatypes"), None, None);
        p.uuid = Some("default://repo/orders/a b.bpmn2".into());
        assert_eq!(
            CalledElementRequest::from_params(&p).unwrap(),
            CalledElementRequest::DataTypes {
                path_token: "default://repo/orders/a b.bpmn2".into()
            }
        );
    }

    #[test]
    fn resolved_reference_mapping() {
        let resp = CalledElementResponse::Resolved(Some(ResolvedReference {
            display_key: "cancel.bpmn2".into(),
            canonical_storage_id: "xyz789".into(),
        }));
        assert_eq!(to_json(resp), json!({ "cancel.bpmn2": "xyz789" }));
        assert_eq!(to_json(CalledElementResponse::Resolved(None)), json!({}));
    }

    #[test]
    fn name_sets_map_reflexively() {
        let groups: RuleFlowGroupSet = ["b", "a"].into_iter().map(String::from).collect();
        assert_eq!(
            to_json(CalledElementResponse::RuleFlowGroups(groups)),
            json!({ "a": "a", "b": "b" })
        );
    }

    #[test]
    fn index_mapping() {
        let mut index = CalledElementIndex::new();
        index.insert("cancel-order", "orders", String::new());
        let mapping = CalledElementResponse::CalledElements(index).into_mapping();
        assert_eq!(mapping.get("cancel-order|orders").map(String::as_str), Some(""));
    }
}
