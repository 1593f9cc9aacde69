//! Integration tests for Graph → Blueprint compilation.

mod helpers;

use flowcraft::blueprint::*;
use flowcraft::error::CompileError;
use helpers::*;

fn params_of<'a>(bp: &'a Blueprint, id: &str) -> &'a NodeParameters {
    &bp.nodes
        .iter()
        .find(|n| n.id == id)
        .unwrap_or_else(|| panic!("no blueprint node '{}'", id))
        .parameters
}

#[test]
fn order_flow_compiles_one_to_one() {
    init_tracing();
    let workflow = order_flow();
    let bp = to_blueprint(&workflow.nodes, &workflow.edges).expect("should compile");

    assert_eq!(bp.nodes.len(), workflow.nodes.len());
    assert_eq!(bp.edges.len(), workflow.edges.len());

    let types: Vec<&str> = bp.nodes.iter().map(|n| n.node_type().as_str()).collect();
    assert_eq!(
        types,
        vec!["ManualTrigger", "http", "conditional", "smtp", "switch", "wait", "agent"]
    );
    assert!(bp.nodes[0].trigger);
    assert!(bp.nodes[1..].iter().all(|n| !n.trigger));
    assert_eq!(bp.nodes[3].position, [720.0, -120.0]);
    assert!(bp.nodes.iter().all(|n| n.output.is_empty()));
}

#[test]
fn conditional_routes_by_edge_id() {
    let workflow = order_flow();
    let bp = to_blueprint(&workflow.nodes, &workflow.edges).unwrap();
    match params_of(&bp, "check") {
        NodeParameters::Conditional(p) => {
            assert_eq!(p.expression, "$FetchOrder.body.paid == true");
            assert_eq!(p.true_edge_id.as_deref(), Some("e3"));
            assert_eq!(p.false_edge_id.as_deref(), Some("e4"));
        }
        other => panic!("Expected conditional parameters, got {:?}", other),
    }
}

#[test]
fn conditional_without_false_branch_omits_key() {
    let nodes = vec![
        trigger("t", "Start"),
        conditional("c", "Check", "true"),
        wait("w", "Pause", 1),
    ];
    let edges = vec![edge("e1", "t", "c"), branch("e2", "c", "w", "true")];
    let bp = to_blueprint(&nodes, &edges).unwrap();

    let json = serde_json::to_value(&bp).unwrap();
    let params = &json["nodes"][1]["parameters"];
    assert_eq!(params["true_edge_id"], "e2");
    assert!(params.get("false_edge_id").is_none(), "got {}", params);
}

#[test]
fn switch_routes_have_fallback_slot() {
    let nodes = vec![
        trigger("t", "Start"),
        switch("s", "Route", &["a", "b"]),
        wait("w0", "Zero", 1),
        wait("wf", "Other", 1),
    ];
    let edges = vec![
        edge("e1", "t", "s"),
        branch("e0", "s", "w0", "rule-0"),
        branch("efb", "s", "wf", "fallback"),
    ];
    let bp = to_blueprint(&nodes, &edges).unwrap();
    match params_of(&bp, "s") {
        NodeParameters::Switch(p) => {
            assert_eq!(p.routes, vec![Some("e0".to_string()), None, Some("efb".to_string())]);
            insta::assert_json_snapshot!(p, @r#"
            {
              "rules": [
                {
                  "expression": "a"
                },
                {
                  "expression": "b"
                }
              ],
              "routes": [
                "e0",
                null,
                "efb"
              ]
            }
            "#);
        }
        other => panic!("Expected switch parameters, got {:?}", other),
    }
}

#[test]
fn rule_handle_past_last_rule_never_takes_fallback_slot() {
    let nodes = vec![
        trigger("t", "Start"),
        switch("s", "Route", &["a", "b"]),
        wait("wx", "Stray", 1),
        wait("wf", "Other", 1),
    ];
    let edges = vec![
        edge("e1", "t", "s"),
        branch("ebad", "s", "wx", "rule-2"),
        branch("efb", "s", "wf", "fallback"),
    ];
    let bp = to_blueprint(&nodes, &edges).unwrap();
    match params_of(&bp, "s") {
        NodeParameters::Switch(p) => assert_eq!(p.routes, vec![None, None, Some("efb".to_string())]),
        other => panic!("Expected switch parameters, got {:?}", other),
    }
}

#[test]
fn branch_edges_get_derived_labels() {
    let nodes = vec![
        trigger("t", "Start"),
        conditional("c", "Check", "true"),
        switch("s", "Route", &["x"]),
        wait("w", "Pause", 1),
        wait("v", "Other", 1),
    ];
    let edges = vec![
        edge("e1", "t", "c"),
        branch("e2", "c", "s", "false"),
        branch("e3", "s", "w", "rule-0"),
        branch("e4", "s", "v", "fallback"),
    ];
    let bp = to_blueprint(&nodes, &edges).unwrap();
    let labels: Vec<Option<&str>> = bp.edges.iter().map(|e| e.label.as_deref()).collect();
    assert_eq!(labels, vec![None, Some("false"), Some("Rule 1"), Some("Fallback")]);
}

#[test]
fn smtp_recipients_shape() {
    let nodes = vec![
        email("one", "One", "a@x.dev", Some(credentials("c1"))),
        email("many", "Many", "a@x.dev, b@x.dev", Some(credentials("c2"))),
    ];
    let bp = to_blueprint(&nodes, &[]).unwrap();
    let json = serde_json::to_value(&bp).unwrap();
    assert_eq!(json["nodes"][0]["parameters"]["to"], "a@x.dev");
    assert_eq!(json["nodes"][1]["parameters"]["to"], serde_json::json!(["a@x.dev", "b@x.dev"]));
    assert_eq!(json["nodes"][0]["type"], "smtp");
    assert_eq!(json["nodes"][0]["credentials"]["id"], "c1");
}

#[test]
fn missing_credentials_lists_every_offender() {
    let nodes = vec![
        trigger("t", "Start"),
        email("mail1", "Mail1", "a@x.dev", None),
        agent("bot", "Bot", None),
        email("mail2", "Mail2", "a@x.dev", Some(credentials(""))),
        email("mail3", "Mail3", "a@x.dev", Some(credentials("ok"))),
        http("h", "Http", "https://x.dev"),
    ];
    let err = to_blueprint(&nodes, &[]).unwrap_err();
    let CompileError::MissingCredentials(missing) = &err;
    let ids: Vec<&str> = missing.iter().map(|m| m.node_id.as_str()).collect();
    assert_eq!(ids, vec!["mail1", "bot", "mail2"]);
    assert_eq!(missing[1].node_type, CanonicalType::Agent);

    let diagnostics = err.into_diagnostics();
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics.iter().all(|d| d.code == "C001"));
}

#[test]
fn blueprint_json_round_trips() {
    let workflow = order_flow();
    let bp = to_blueprint(&workflow.nodes, &workflow.edges).unwrap();
    let json = serde_json::to_string(&bp).unwrap();
    let parsed = parse_blueprint(&json).expect("should parse");
    assert_eq!(parsed, bp);
}

#[test]
fn blueprint_with_unknown_type_is_rejected() {
    let json = r#"{"nodes": [{"id": "x", "name": "X", "type": "ftp", "parameters": {}}], "edges": []}"#;
    let errors = parse_blueprint(json).unwrap_err();
    assert_eq!(errors[0].code, "P002");
}
