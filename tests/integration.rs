//! Integration tests for the payroll engine HTTP API.
//!
//! This test suite covers:
//! - Clock-in/clock-out and session reconstruction
//! - Conflicting clock actions
//! - Weekly hours accumulation, including the Monday short-circuit
//! - Adjustment upserts and queries
//! - Payroll runs from inline and stored assignments
//! - Error cases

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use payroll_engine::api::{ACTOR_HEADER, AppState, Ports, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::models::{EventPaymentAssignment, WorkEventId, WorkerId};
use payroll_engine::store::{
    InMemoryAdjustmentLedger, InMemoryEventPaymentSource, InMemoryEventStore, ManualClock,
    SharedClock,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn json_decimal(value: &Value) -> Decimal {
    decimal(value.as_str().unwrap())
}

fn create_router_with_source(source: Arc<InMemoryEventPaymentSource>) -> Router {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let clock: SharedClock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap(),
    ));
    let ports = Ports {
        events: Arc::new(InMemoryEventStore::new()),
        ledger: Arc::new(InMemoryAdjustmentLedger::new(clock.clone())),
        payments: source,
        clock,
    };
    create_router(AppState::new(config, ports))
}

fn create_router_for_test() -> Router {
    create_router_with_source(Arc::new(InMemoryEventPaymentSource::new()))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_HEADER, "supervisor-1");
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

async fn clock(router: &Router, worker: &str, action: &str, timestamp: &str) -> (StatusCode, Value) {
    send(
        router,
        "POST",
        &format!("/workers/{}/{}", worker, action),
        Some(json!({ "timestamp": timestamp })),
    )
    .await
}

async fn worked(router: &Router, worker: &str, from: &str, to: &str) {
    let (status, _) = clock(router, worker, "clock-in", from).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = clock(router, worker, "clock-out", to).await;
    assert_eq!(status, StatusCode::CREATED);
}

// =============================================================================
// Clock Actions and Sessions
// =============================================================================

#[tokio::test]
async fn test_split_day_reconstructs_seven_and_a_half_hours() {
    let router = create_router_for_test();
    worked(&router, "w-1", "2025-01-14T09:00:00Z", "2025-01-14T13:00:00Z").await;
    worked(&router, "w-1", "2025-01-14T14:00:00Z", "2025-01-14T17:30:00Z").await;

    let (status, json) = send(&router, "GET", "/workers/w-1/intervals", None).await;

    assert_eq!(status, StatusCode::OK);
    let closed = json["closed"].as_array().unwrap();
    assert_eq!(closed.len(), 2);
    assert!(json["open"].is_null());
    assert_eq!(closed[0]["started_at"], "2025-01-14T09:00:00Z");
    assert_eq!(closed[1]["ended_at"], "2025-01-14T17:30:00Z");
}

#[tokio::test]
async fn test_intervals_filtered_by_range() {
    let router = create_router_for_test();
    worked(&router, "w-1", "2025-01-13T09:00:00Z", "2025-01-13T17:00:00Z").await;
    worked(&router, "w-1", "2025-01-14T09:00:00Z", "2025-01-14T17:00:00Z").await;

    let (status, json) = send(
        &router,
        "GET",
        "/workers/w-1/intervals?from=2025-01-14T00:00:00Z&to=2025-01-15T00:00:00Z",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["closed"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_double_clock_in_conflicts() {
    let router = create_router_for_test();
    let (status, _) = clock(&router, "w-1", "clock-in", "2025-01-14T09:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = clock(&router, "w-1", "clock-in", "2025-01-14T09:05:00Z").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_clock_out_without_session_conflicts() {
    let router = create_router_for_test();

    let (status, json) = clock(&router, "w-1", "clock-out", "2025-01-14T09:00:00Z").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_session_reports_open_interval() {
    let router = create_router_for_test();
    worked(&router, "w-1", "2025-01-14T09:00:00Z", "2025-01-14T13:00:00Z").await;
    clock(&router, "w-1", "clock-in", "2025-01-14T14:00:00Z").await;

    let (status, json) = send(&router, "GET", "/workers/w-1/session", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["open"], true);
    assert_eq!(json["session"]["started_at"], "2025-01-14T14:00:00Z");
    assert!(json["session"]["ended_at"].is_null());
}

#[tokio::test]
async fn test_session_closed_for_unknown_worker() {
    let router = create_router_for_test();

    let (status, json) = send(&router, "GET", "/workers/nobody/session", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["open"], false);
    assert!(json["session"].is_null());
}

#[tokio::test]
async fn test_clock_in_stamped_by_server_clock() {
    let router = create_router_for_test();

    let (status, json) = send(&router, "POST", "/workers/w-1/clock-in", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["timestamp"], "2025-01-20T12:00:00Z");
    assert_eq!(json["sequence"], 1);
}

// =============================================================================
// Weekly Hours
// =============================================================================

#[tokio::test]
async fn test_weekly_hours_wednesday_window() {
    let router = create_router_for_test();
    // Fully inside Monday..Wednesday 00:00: counts.
    worked(&router, "w-1", "2025-01-14T09:00:00Z", "2025-01-14T17:00:00Z").await;
    // Crosses into the reference date: excluded.
    worked(&router, "w-1", "2025-01-14T22:00:00Z", "2025-01-15T02:00:00Z").await;
    // Previous week: excluded.
    worked(&router, "w-2", "2025-01-10T09:00:00Z", "2025-01-10T17:00:00Z").await;

    let (status, json) = send(
        &router,
        "POST",
        "/weekly-hours",
        Some(json!({
            "entries": [
                {"work_event_id": "evt-1", "reference_date": "2025-01-15", "worker_ids": ["w-1", "w-2"]}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_decimal(&json["hours"]["evt-1"]["w-1"]), decimal("8"));
    assert_eq!(json_decimal(&json["hours"]["evt-1"]["w-2"]), Decimal::ZERO);
    assert_eq!(json["summaries"]["evt-1"][0]["week_anchor"], "2025-01-13");
}

#[tokio::test]
async fn test_weekly_hours_monday_is_zero() {
    let router = create_router_for_test();
    worked(&router, "w-1", "2025-01-12T09:00:00Z", "2025-01-12T17:00:00Z").await;

    let (status, json) = send(
        &router,
        "POST",
        "/weekly-hours",
        Some(json!({
            "entries": [
                {"work_event_id": "evt-1", "reference_date": "2025-01-13", "worker_ids": ["w-1"]}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_decimal(&json["hours"]["evt-1"]["w-1"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_weekly_hours_empty_batch_rejected() {
    let router = create_router_for_test();

    let (status, json) = send(&router, "POST", "/weekly-hours", Some(json!({ "entries": [] }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_weekly_hours_earliest_date_rejected() {
    let router = create_router_for_test();

    let (status, json) = send(
        &router,
        "POST",
        "/weekly-hours",
        Some(json!({
            "entries": [
                {"work_event_id": "evt-1", "reference_date": NaiveDate::MIN, "worker_ids": ["w-1"]}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"], "entries[0].reference_date");
}

// =============================================================================
// Adjustments
// =============================================================================

#[tokio::test]
async fn test_adjustment_upsert_then_clear() {
    let router = create_router_for_test();

    let (status, json) = send(
        &router,
        "PUT",
        "/adjustments",
        Some(json!({"work_event_id": "evt-1", "worker_id": "w-1", "amount": "-10", "note": "damaged kit"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_decimal(&json["amount"]), decimal("-10"));
    assert_eq!(json["note"], "damaged kit");

    let (status, json) = send(
        &router,
        "POST",
        "/adjustments/query",
        Some(json!({"work_event_ids": ["evt-1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_decimal(&json["evt-1"]["w-1"]), decimal("-10"));

    let (status, json) = send(
        &router,
        "PUT",
        "/adjustments",
        Some(json!({"work_event_id": "evt-1", "worker_id": "w-1", "amount": "0"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(json.is_null());

    let (status, json) = send(
        &router,
        "POST",
        "/adjustments/query",
        Some(json!({"work_event_ids": ["evt-1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({}));
}

// =============================================================================
// Payroll Runs
// =============================================================================

#[tokio::test]
async fn test_payroll_with_inline_assignment_totals_290() {
    let router = create_router_for_test();
    send(
        &router,
        "PUT",
        "/adjustments",
        Some(json!({"work_event_id": "evt-1", "worker_id": "w-1", "amount": "-10"})),
    )
    .await;

    let (status, json) = send(
        &router,
        "POST",
        "/payroll/summaries",
        Some(json!({
            "assignments": [{
                "work_event_id": "evt-1",
                "worker_id": "w-1",
                "reference_date": "2025-01-15",
                "hours": {"regular": "8", "overtime": "2", "doubletime": "0"},
                "base_rate": "20",
                "commission": "50",
                "tips": "30"
            }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let summary = &json["payments"][0]["calculation"]["summary"];
    assert_eq!(json_decimal(&summary["regular_pay"]), decimal("160"));
    assert_eq!(json_decimal(&summary["overtime_pay"]), decimal("60"));
    assert_eq!(json_decimal(&summary["adjustment"]), decimal("-10"));
    assert_eq!(json_decimal(&summary["total_pay"]), decimal("290"));
    assert_eq!(json_decimal(&json["total_pay"]), decimal("290"));
}

#[tokio::test]
async fn test_payroll_from_stored_assignments_uses_prior_week_hours() {
    let source = Arc::new(InMemoryEventPaymentSource::new());
    source.insert(EventPaymentAssignment {
        work_event_id: WorkEventId::new("evt-7"),
        worker_id: WorkerId::new("w-1"),
        reference_date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        division: Some("security".to_string()),
        event_hours: decimal("10"),
        hours: None,
        base_rate: decimal("20"),
        commission: decimal("40"),
        tips: Decimal::ZERO,
    });
    let router = create_router_with_source(source);
    for day in 13..=16 {
        worked(
            &router,
            "w-1",
            &format!("2025-01-{}T08:00:00Z", day),
            &format!("2025-01-{}T17:00:00Z", day),
        )
        .await;
    }

    let (status, json) = send(
        &router,
        "POST",
        "/payroll/summaries",
        Some(json!({ "work_event_ids": ["evt-7"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payment = &json["payments"][0];
    // 4 days × 9 hours before Friday
    assert_eq!(json_decimal(&payment["prior_week_hours"]), decimal("36"));
    assert_eq!(json_decimal(&payment["hours"]["regular"]), decimal("4"));
    assert_eq!(json_decimal(&payment["hours"]["overtime"]), decimal("6"));
    let summary = &payment["calculation"]["summary"];
    // Security is excluded from commission by the default configuration.
    assert_eq!(json_decimal(&summary["commission"]), Decimal::ZERO);
    assert_eq!(json_decimal(&summary["total_pay"]), decimal("260"));
    assert_eq!(
        payment["calculation"]["audit_steps"][0]["rule_id"],
        "hour_tier_classification"
    );
}

#[tokio::test]
async fn test_payroll_negative_rate_rejected() {
    let router = create_router_for_test();

    let (status, json) = send(
        &router,
        "POST",
        "/payroll/summaries",
        Some(json!({
            "assignments": [{
                "work_event_id": "evt-1",
                "worker_id": "w-1",
                "reference_date": "2025-01-15",
                "event_hours": "4",
                "base_rate": "-20"
            }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_missing_actor_rejected_everywhere() {
    let router = create_router_for_test();
    let routes = [
        ("POST", "/workers/w-1/clock-in"),
        ("POST", "/workers/w-1/clock-out"),
        ("GET", "/workers/w-1/session"),
        ("GET", "/workers/w-1/intervals"),
        ("POST", "/weekly-hours"),
        ("PUT", "/adjustments"),
        ("POST", "/adjustments/query"),
        ("POST", "/payroll/summaries"),
    ];

    for (method, uri) in routes {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let router = create_router_for_test();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/payroll/summaries")
                .header(ACTOR_HEADER, "supervisor-1")
                .header("Content-Type", "application/json")
                .body(Body::from("{ invalid json }"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_backdated_clock_out_rejected() {
    let router = create_router_for_test();
    clock(&router, "w-1", "clock-in", "2025-01-14T09:00:00Z").await;

    let (status, json) = clock(&router, "w-1", "clock-out", "2025-01-14T08:00:00Z").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
