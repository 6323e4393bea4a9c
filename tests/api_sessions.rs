mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

fn edge_ids(view: &Value) -> Vec<String> {
    let mut ids: Vec<String> = view["edges"]
        .as_array()
        .expect("edges should be an array")
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn health_check_answers_ok() {
    let (app, _) = common::app().await;
    let (status, body) = common::send(&app, "GET", "/healthz", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn new_site_opens_on_the_template_in_view_mode() {
    let (app, _) = common::app().await;

    let (status, view) = common::send(&app, "POST", "/api/sites/site-a/session", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["edit_mode"], false);
    assert_eq!(view["nodes"].as_array().unwrap().len(), 9);
    assert_eq!(view["edges"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn mutations_are_refused_outside_edit_mode() {
    let (app, _) = common::app().await;
    common::send(&app, "POST", "/api/sites/site-a/session", None).await;

    let (status, body) =
        common::send(&app, "DELETE", "/api/sites/site-a/session/nodes/grid-1", None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (_, view) = common::send(&app, "GET", "/api/sites/site-a/session", None).await;
    assert_eq!(view["nodes"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn disallowed_connection_is_rejected_and_edges_unchanged() {
    let (app, _) = common::app().await;
    common::send(&app, "POST", "/api/sites/site-a/session", None).await;
    common::send(&app, "PUT", "/api/sites/site-a/session/edit-mode", Some(json!({ "enabled": true }))).await;
    let (_, before) = common::send(&app, "GET", "/api/sites/site-a/session", None).await;

    let (status, body) = common::send(
        &app,
        "POST",
        "/api/sites/site-a/session/edges",
        Some(json!({ "source": "source-solar", "target": "consumer-residential" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot connect solar array to consumer");

    let (_, after) = common::send(&app, "GET", "/api/sites/site-a/session", None).await;
    assert_eq!(edge_ids(&before), edge_ids(&after));
}

#[tokio::test]
async fn edit_save_and_reload_round_trip() {
    let (app, state) = common::app().await;
    common::send(&app, "POST", "/api/sites/site-b/session", None).await;
    common::send(&app, "PUT", "/api/sites/site-b/session/edit-mode", Some(json!({ "enabled": true }))).await;

    // Inverter straight to the grid is allowed
    let (status, view) = common::send(
        &app,
        "POST",
        "/api/sites/site-b/session/edges",
        Some(json!({ "source": "inverter-1", "target": "grid-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(edge_ids(&view).contains(&"inverter-1-to-grid-1".to_string()));

    // Deleting a BESS unit cascades to its three edges
    let (status, view) =
        common::send(&app, "DELETE", "/api/sites/site-b/session/nodes/bess-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        edge_ids(&view),
        vec![
            "bess-2-to-consumer-industrial",
            "grid-1-to-bess-2",
            "inverter-1-to-grid-1",
            "inverter-1-to-transformer-1",
            "source-solar-to-inverter-1",
            "source-wind-to-inverter-1",
        ]
    );

    let (status, view) = common::send(
        &app,
        "POST",
        "/api/sites/site-b/session/nodes",
        Some(json!({
            "id": "sensor-1",
            "type": "sensor",
            "position": { "x": 100.0, "y": 400.0 },
            "specs": { "interval": 15 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sensor = view["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "sensor-1")
        .expect("sensor should be placed");
    assert_eq!(sensor["label"], "New sensor");
    assert_eq!(sensor["status"], "active");

    let (status, view) = common::send(
        &app,
        "PATCH",
        "/api/sites/site-b/session/nodes/sensor-1",
        Some(json!({ "position": { "x": 120.0, "y": 420.0 }, "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let sensor = view["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "sensor-1")
        .unwrap();
    assert_eq!(sensor["position"], json!({ "x": 120.0, "y": 420.0 }));

    // Nothing persisted before Save
    assert!(state.storage.load_active("site-b").await.unwrap().is_none());

    let (status, saved) = common::send(&app, "POST", "/api/sites/site-b/session/save", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["is_active"], true);

    // Close without further edits and reopen from storage
    common::send(&app, "DELETE", "/api/sites/site-b/session", None).await;
    let (_, reopened) = common::send(&app, "POST", "/api/sites/site-b/session", None).await;

    assert_eq!(reopened["edit_mode"], false);
    assert_eq!(edge_ids(&reopened), edge_ids(&view));
    assert_eq!(reopened["nodes"].as_array().unwrap().len(), 9);

    let (status, flow) = common::send(&app, "GET", "/api/sites/site-b/flow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flow["id"], saved["id"]);
}

#[tokio::test]
async fn repeated_saves_keep_one_active_row() {
    let (app, state) = common::app().await;
    common::send(&app, "POST", "/api/sites/site-c/session", None).await;
    common::send(&app, "PUT", "/api/sites/site-c/session/edit-mode", Some(json!({ "enabled": true }))).await;

    let (_, first) = common::send(&app, "POST", "/api/sites/site-c/session/save", None).await;
    common::send(&app, "DELETE", "/api/sites/site-c/session/edges/grid-1-to-bess-2", None).await;
    let (_, second) = common::send(&app, "POST", "/api/sites/site-c/session/save", None).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(state.storage.count_rows("site-c").await.unwrap(), 1);
    assert_eq!(second["edges"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn unknown_session_and_node_are_not_found() {
    let (app, _) = common::app().await;

    let (status, _) = common::send(&app, "GET", "/api/sites/nowhere/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::send(&app, "POST", "/api/sites/nowhere/session/save", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::send(&app, "POST", "/api/sites/site-d/session", None).await;
    common::send(&app, "PUT", "/api/sites/site-d/session/edit-mode", Some(json!({ "enabled": true }))).await;
    let (status, body) =
        common::send(&app, "DELETE", "/api/sites/site-d/session/nodes/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Node not found: ghost");
}

#[tokio::test]
async fn duplicate_connection_conflicts() {
    let (app, _) = common::app().await;
    common::send(&app, "POST", "/api/sites/site-e/session", None).await;
    common::send(&app, "PUT", "/api/sites/site-e/session/edit-mode", Some(json!({ "enabled": true }))).await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/sites/site-e/session/edges",
        Some(json!({ "source": "grid-1", "target": "bess-1" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}
