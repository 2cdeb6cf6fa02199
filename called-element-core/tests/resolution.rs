//! End-to-end resolution scenarios over the in-memory backends.

use called_element_core::extract::extract_process_id;
use called_element_core::memory::{MemoryAsset, MemoryDataModel, MemoryRepository, MemoryRuleIndex};
use called_element_core::{
    Backends, CalledElementError, CalledElementRequest, CalledElementResponse,
    CalledElementService, RequestParams, ResolutionEngine, ResolverConfig,
};
use std::sync::Arc;

fn bpmn(id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn2:definitions xmlns:bpmn2="http://www.omg.org/spec/BPMN/20100524/MODEL"
                   xmlns:drools="http://www.jboss.org/drools"
                   id="Definition">
  <bpmn2:process
      id="{id}"
      drools:packageName="org.acme"
      name="{id}"
      isExecutable="true">
    <bpmn2:callActivity id="call_1" calledElement="other"/>
  </bpmn2:process>
</bpmn2:definitions>"#
    )
}

/// Package `orders` holding `ship-order` (plain storage id) and
/// `cancel-order` (storage id base64-encoded from `xyz789`).
fn orders() -> MemoryRepository {
    MemoryRepository::new()
        .with_asset(MemoryAsset::bpmn("orders", "ShipOrder", &bpmn("ship-order"), "abc123"))
        .with_asset(MemoryAsset::bpmn(
            "orders",
            "CancelOrder",
            &bpmn("cancel-order"),
            "eHl6Nzg5",
        ))
}

#[test]
fn extractor_ignores_prefix_and_line_breaks() {
    for id in ["ship-order", "org.acme.Cancel_1", "a b"] {
        assert_eq!(extract_process_id(&bpmn(id)), Some(id));
    }
}

#[tokio::test]
async fn single_target_example() {
    let repo = orders();
    let engine = ResolutionEngine::new(&repo, ResolverConfig::default());
    let reference = engine
        .resolve_single("orders", "cancel-order")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reference.display_key, "CancelOrder.bpmn2");
    assert_eq!(reference.canonical_storage_id, "xyz789");
}

#[tokio::test]
async fn aggregate_example() {
    let repo = orders();
    let engine = ResolutionEngine::new(&repo, ResolverConfig::default());
    let index = engine.called_elements("orders", "ship-order").await.unwrap();
    assert_eq!(index.keys().collect::<Vec<_>>(), vec!["cancel-order|orders"]);
    assert_eq!(index.get("cancel-order", "orders"), Some(""));
}

#[tokio::test]
async fn aggregate_has_n_minus_one_entries() {
    let mut repo = MemoryRepository::new();
    let mut n = 0;
    for package in ["orders", "billing", "shipping"] {
        for i in 0..7 {
            let id = format!("{package}-{i}");
            repo = repo.with_asset(MemoryAsset::bpmn(package, &id, &bpmn(&id), &id));
            n += 1;
        }
        repo = repo.with_asset(MemoryAsset::bpmn(package, "draft", "<bpmn2:definitions/>", "d"));
    }

    let index = ResolutionEngine::new(&repo, ResolverConfig::default())
        .called_elements("billing", "billing-3")
        .await
        .unwrap();
    assert_eq!(index.len(), n - 1);
    assert!(!index.contains("billing-3", "billing"));
    // every parsable asset fetched once, previews only for included ones
    assert_eq!(repo.calls().fetch_source(), n + 3);
    assert_eq!(repo.calls().fetch_preview(), n - 1);
}

#[tokio::test]
async fn single_target_stops_fetching_after_match() {
    let mut repo = MemoryRepository::new();
    for i in 0..10 {
        let id = format!("p{i}");
        repo = repo.with_asset(MemoryAsset::bpmn("pkg", &id, &bpmn(&id), &id));
    }
    let engine = ResolutionEngine::new(&repo, ResolverConfig::default());

    assert!(engine.resolve_single("pkg", "p3").await.unwrap().is_some());
    assert_eq!(repo.calls().fetch_source(), 4);

    assert!(engine.resolve_single("pkg", "absent").await.unwrap().is_none());
    assert_eq!(repo.calls().fetch_source(), 4 + 10);
}

#[tokio::test]
async fn duplicate_ids_resolve_to_first_in_walk_order() {
    let repo = MemoryRepository::new()
        .with_asset(MemoryAsset::bpmn("a", "First", &bpmn("dup"), "first"))
        .with_asset(MemoryAsset::bpmn("b", "Second", &bpmn("dup"), "second"));
    let reference = ResolutionEngine::new(&repo, ResolverConfig::default())
        .resolve_single("b", "dup")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reference.canonical_storage_id, "first");
}

#[tokio::test]
async fn failed_walk_is_distinguishable_from_empty_result() {
    let service = |repo: MemoryRepository| {
        CalledElementService::new(
            Backends {
                repository: Arc::new(repo),
                rule_index: Arc::new(MemoryRuleIndex::new()),
                data_model: Arc::new(MemoryDataModel::new()),
            },
            ResolverConfig::default(),
        )
    };
    let request = CalledElementRequest::CalledElements {
        package: "orders".into(),
        process_id: "ship-order".into(),
    };

    let empty = service(MemoryRepository::new())
        .handle(request.clone())
        .await
        .unwrap();
    assert!(empty.into_mapping().is_empty());

    let failed = service(orders().with_unavailable_listing())
        .handle(request)
        .await
        .unwrap_err();
    assert_eq!(failed.http_status(), 503);
    assert!(matches!(failed, CalledElementError::BackendUnavailable { .. }));
}

#[tokio::test]
async fn rule_flow_groups_example() {
    let backends = Backends {
        repository: Arc::new(MemoryRepository::new()),
        rule_index: Arc::new(
            MemoryRuleIndex::new()
                .with_rule_flow_group("b")
                .with_rule_flow_group("a")
                .with_rule_flow_group("a"),
        ),
        data_model: Arc::new(MemoryDataModel::new()),
    };
    let params = RequestParams {
        action: Some("showruleflowgroups".into()),
        ..RequestParams::default()
    };
    let response = CalledElementService::new(backends, ResolverConfig::default())
        .handle(CalledElementRequest::from_params(&params).unwrap())
        .await
        .unwrap();
    let CalledElementResponse::RuleFlowGroups(groups) = response else {
        panic!("expected rule-flow groups");
    };
    assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
}
