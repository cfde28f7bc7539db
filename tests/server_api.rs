//! Handler-level tests: each axum handler is called directly with its extractors.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use launchdash::charts::ChartSpec;
use launchdash::config::Config;
use launchdash::data::{Dataset, LaunchRecord, OutcomeClass};
use launchdash::server::{
    create_session, delete_session, get_session, health, layout, pie_chart, scatter_chart, session_input,
    AppState, ChartQuery, InputRequest,
};
use launchdash::session::OutputId;
use serde_json::json;

fn state() -> AppState {
    let rec = |site: &str, payload: f64, booster: &str, outcome| LaunchRecord {
        launch_site: site.to_string(),
        payload_mass_kg: payload,
        booster_version: booster.to_string(),
        outcome,
    };
    let ds = Dataset::from_records(
        "mem",
        vec![
            rec("CCAFS LC-40", 500.0, "F9 v1.1", OutcomeClass::Failure),
            rec("CCAFS LC-40", 2034.0, "F9 FT B1019", OutcomeClass::Success),
            rec("KSC LC-39A", 5300.0, "F9 FT B1021.2", OutcomeClass::Success),
            rec("VAFB SLC-4E", 9600.0, "F9 FT B1036.1", OutcomeClass::Success),
        ],
    );
    AppState::new(ds, &Config::default())
}

fn query(
    site: Option<&str>,
    low: Option<f64>,
    high: Option<f64>,
) -> Result<Query<ChartQuery>, QueryRejection> {
    Ok(Query(ChartQuery {
        site: site.map(str::to_string),
        low,
        high,
    }))
}

fn input(control: &str, value: serde_json::Value) -> Result<Json<InputRequest>, JsonRejection> {
    Ok(Json(InputRequest {
        control: control.into(),
        value,
    }))
}

async fn json_body(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let st = state();
    let Json(body) = health(State(st.clone())).await;
    assert_eq!(body, json!({"status": "ok", "sessions": 0}));
    create_session(State(st.clone())).await;
    let Json(body) = health(State(st)).await;
    assert_eq!(body["sessions"], 1);
}

#[tokio::test]
async fn layout_lists_sites_and_bounds() {
    let Json(l) = layout(State(state())).await;
    assert_eq!(l.title, "SpaceX Launch Records Dashboard");
    assert_eq!(l.site_dropdown.options.len(), 4);
    assert_eq!(l.site_dropdown.options[0].value, "All Sites");
    assert_eq!(l.payload_slider.value, [500.0, 9600.0]);
    assert_eq!(l.pie_chart_id, "success-pie-chart");
    assert_eq!(l.scatter_chart_id, "success-payload-scatter-chart");
}

#[tokio::test]
async fn stateless_pie_defaults_to_all_sites() {
    let Json(spec) = pie_chart(State(state()), query(None, None, None)).await.unwrap();
    assert_eq!(spec.title(), "Total Success Launches By all sites");
    assert_eq!(spec.len(), 3);
}

#[tokio::test]
async fn stateless_scatter_uses_full_range_by_default() {
    let Json(spec) = scatter_chart(State(state()), query(None, None, None)).await.unwrap();
    assert_eq!(spec.len(), 4);

    let Json(spec) = scatter_chart(State(state()), query(Some("KSC LC-39A"), Some(0.0), Some(6000.0)))
        .await
        .unwrap();
    assert_eq!(spec.title(), "Payload and Outcome for KSC LC-39A");
    assert_eq!(spec.len(), 1);
}

#[tokio::test]
async fn stateless_scatter_rejects_inverted_range() {
    let err = scatter_chart(State(state()), query(None, Some(5000.0), Some(100.0)))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_query_gets_json_error_body() {
    let uri: Uri = "/api/charts/scatter?low=heavy&high=9000".parse().unwrap();
    let err = scatter_chart(State(state()), Query::try_from_uri(&uri))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));

    let uri: Uri = "/api/charts/pie?site=CCAFS%20LC-40&high=lots".parse().unwrap();
    let err = pie_chart(State(state()), Query::try_from_uri(&uri))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_input_body_gets_json_error_body() {
    let st = state();
    let (_, Json(created)) = create_session(State(st.clone())).await;
    let err = session_input(
        State(st),
        Path(created.session_id),
        Json::<InputRequest>::from_bytes(b"{\"control\": "),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    let body = json_body(err.into_response()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn session_flow_updates_dependent_outputs() {
    let st = state();
    let (status, Json(created)) = create_session(State(st.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.updates.len(), 2);
    let id = created.session_id.clone();

    let Json(resp) = session_input(
        State(st.clone()),
        Path(id.clone()),
        input("payload_slider", json!([0, 1000])),
    )
    .await
    .unwrap();
    assert_eq!(resp.updates.len(), 1);
    assert_eq!(resp.updates[0].output, OutputId::SuccessPayloadScatterChart);
    assert_eq!(resp.updates[0].revision, 2);
    assert_eq!(resp.updates[0].chart.len(), 1);

    let Json(resp) = session_input(
        State(st.clone()),
        Path(id.clone()),
        input("site_dropdown", json!("VAFB SLC-4E")),
    )
    .await
    .unwrap();
    assert_eq!(resp.updates.len(), 2);
    match &resp.updates[0].chart {
        ChartSpec::Pie(p) => assert_eq!(p.title, "Total Success Launches for site VAFB SLC-4E"),
        other => panic!("expected pie, got {:?}", other),
    }
    // Slider still at [0, 1000], and VAFB's only launch is 9600 kg.
    assert!(resp.updates[1].chart.is_empty());

    let Json(snap) = get_session(State(st.clone()), Path(id.clone())).await.unwrap();
    assert_eq!(snap.site_selection.as_str(), "VAFB SLC-4E");
    assert_eq!(snap.payload_range.high(), 1000.0);

    assert_eq!(delete_session(State(st.clone()), Path(id.clone())).await, StatusCode::NO_CONTENT);
    assert_eq!(delete_session(State(st.clone()), Path(id.clone())).await, StatusCode::NOT_FOUND);
    let err = get_session(State(st), Path(id)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_input_rejects_bad_control_and_unknown_session() {
    let st = state();
    let (_, Json(created)) = create_session(State(st.clone())).await;

    let err = session_input(
        State(st.clone()),
        Path(created.session_id),
        input("volume_knob", json!(11)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);

    let err = session_input(
        State(st),
        Path("missing".into()),
        input("site_dropdown", json!("All Sites")),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_site_is_not_an_error() {
    let st = state();
    let (_, Json(created)) = create_session(State(st.clone())).await;
    let Json(resp) = session_input(
        State(st),
        Path(created.session_id),
        input("site_dropdown", json!("Starbase")),
    )
    .await
    .unwrap();
    assert!(resp.updates.iter().all(|u| u.chart.is_empty()));
}
