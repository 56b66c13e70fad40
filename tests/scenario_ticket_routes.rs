//! In-process scenario tests for the ticketing HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test builds the router over an in-memory ticket store and drives it
//! via `tower::ServiceExt::oneshot` — no network I/O required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot

use carpark_server::fees::FeePolicy;
use carpark_server::routes::create_routes;
use carpark_server::service::TicketService;
use carpark_server::store::MemoryTicketStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PLATE: &str = "123-45-678";

/// Build a fresh in-process router backed by a clean in-memory store.
fn make_router() -> axum::Router {
    make_router_with_policy(FeePolicy::Flat)
}

fn make_router_with_policy(policy: FeePolicy) -> axum::Router {
    let store = Arc::new(MemoryTicketStore::new());
    let service = Arc::new(TicketService::new(store, policy));
    create_routes(service)
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn post(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

/// Parse body bytes as a `serde_json::Value`.
fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

/// Run an entry for PLATE and return the ticket id.
async fn enter(router: &axum::Router, plate: &str) -> String {
    let (status, body) = call(
        router.clone(),
        post(&format!("/entry?plate={plate}&parkingLot=382")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    parse_json(body)["ticketId"]
        .as_str()
        .expect("ticketId missing")
        .to_string()
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_healthy() {
    let (status, body) = call(make_router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["status"], "healthy");
}

// ---------------------------------------------------------------------------
// POST /entry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn entry_creates_a_ticket() {
    let router = make_router();
    let (status, body) = call(router.clone(), post(&format!("/entry?plate={PLATE}&parkingLot=382"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let json = parse_json(body);
    let ticket_id = json["ticketId"].as_str().expect("ticketId missing");

    // The record is readable back, active, with the lot attached.
    let (status, body) = call(router, get(&format!("/ticket/{ticket_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["license_plate"], PLATE);
    assert_eq!(json["status"], "active");
    assert_eq!(json["parking_lot"], "382");
}

#[tokio::test]
async fn entry_without_lot_is_still_created() {
    let router = make_router();
    let (status, body) = call(router, post(&format!("/entry?plate={PLATE}"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(parse_json(body)["ticketId"].is_string());
}

#[tokio::test]
async fn entry_rejects_invalid_plate_with_400() {
    let (status, body) = call(make_router(), post("/entry?plate=ABC-12-DEF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json = parse_json(body);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "INVALID_PLATE");
}

#[tokio::test]
async fn entry_for_parked_plate_is_409_and_creates_nothing() {
    let router = make_router();
    enter(&router, PLATE).await;

    let (status, body) = call(router.clone(), post(&format!("/entry?plate={PLATE}"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["error"]["code"], "ALREADY_PARKED");

    // Still exactly one ticket for the plate.
    let (_, body) = call(router, get(&format!("/tickets?plate={PLATE}"))).await;
    assert_eq!(parse_json(body).as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// POST /exit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exit_returns_the_receipt_shape() {
    let router = make_router();
    let ticket_id = enter(&router, PLATE).await;

    let (status, body) = call(router, post(&format!("/exit?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["licensePlate"], PLATE);
    assert_eq!(json["parkingLot"], "382");
    // One 15-minute block at the flat rate.
    assert_eq!(json["charge"], "2.50");
    assert!(json["totalParkedTime"].is_string());
}

#[tokio::test]
async fn second_exit_is_409_already_exited() {
    let router = make_router();
    let ticket_id = enter(&router, PLATE).await;

    let (status, _) = call(router.clone(), post(&format!("/exit?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(router, post(&format!("/exit?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["error"]["code"], "ALREADY_EXITED");
}

#[tokio::test]
async fn exit_of_unknown_ticket_is_404() {
    let (status, body) = call(
        make_router(),
        post("/exit?ticketId=00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["error"]["code"], "TICKET_NOT_FOUND");
}

#[tokio::test]
async fn exit_with_malformed_ticket_id_is_404() {
    let (status, body) = call(make_router(), post("/exit?ticketId=1234")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["error"]["code"], "TICKET_NOT_FOUND");
}

#[tokio::test]
async fn capped_policy_charges_euro_rate() {
    let router = make_router_with_policy(FeePolicy::DailyCapped);
    let ticket_id = enter(&router, PLATE).await;

    let (status, body) = call(router, post(&format!("/exit?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["charge"], "2.00");
}

// ---------------------------------------------------------------------------
// POST /pay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pay_settles_an_exited_ticket() {
    let router = make_router();
    let ticket_id = enter(&router, PLATE).await;

    let (_, exit_body) = call(router.clone(), post(&format!("/exit?ticketId={ticket_id}"))).await;
    let charge = parse_json(exit_body)["charge"].clone();

    let (status, body) = call(router.clone(), post(&format!("/pay?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ticketId"], ticket_id);
    assert_eq!(json["licensePlate"], PLATE);
    // Payment never recomputes the fee: charged equals the exit charge.
    assert_eq!(json["charged"], charge);
    assert_eq!(json["currency"], "USD");
    assert_eq!(json["payment_status"], "paid");
    assert!(json["transactionId"].as_str().unwrap().starts_with("tx-"));

    // Second pay attempt is refused.
    let (status, body) = call(router, post(&format!("/pay?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["error"]["code"], "ALREADY_PAID");
}

#[tokio::test]
async fn pay_before_exit_is_400() {
    let router = make_router();
    let ticket_id = enter(&router, PLATE).await;

    let (status, body) = call(router.clone(), post(&format!("/pay?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["error"]["code"], "NOT_YET_EXITED");

    // Nothing was mutated: the ticket is still active.
    let (_, body) = call(router, get(&format!("/ticket/{ticket_id}"))).await;
    assert_eq!(parse_json(body)["status"], "active");
}

#[tokio::test]
async fn pay_of_unknown_ticket_is_404() {
    let (status, _) = call(
        make_router(),
        post("/pay?ticketId=00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exit_after_pay_is_409_already_paid() {
    let router = make_router();
    let ticket_id = enter(&router, PLATE).await;
    let _ = call(router.clone(), post(&format!("/exit?ticketId={ticket_id}"))).await;
    let _ = call(router.clone(), post(&format!("/pay?ticketId={ticket_id}"))).await;

    let (status, body) = call(router, post(&format!("/exit?ticketId={ticket_id}"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["error"]["code"], "ALREADY_PAID");
}

// ---------------------------------------------------------------------------
// GET /tickets and GET /ticket/:id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tickets_listing_filters_by_plate_and_open() {
    let router = make_router();
    let first = enter(&router, PLATE).await;
    enter(&router, "12-345-67").await;

    // Close the first ticket.
    let _ = call(router.clone(), post(&format!("/exit?ticketId={first}"))).await;

    let (status, body) = call(router.clone(), get("/tickets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body).as_array().unwrap().len(), 2);

    let (_, body) = call(router.clone(), get("/tickets?open=true")).await;
    let open = parse_json(body);
    assert_eq!(open.as_array().unwrap().len(), 1);
    assert_eq!(open[0]["license_plate"], "12-345-67");

    let (_, body) = call(router.clone(), get(&format!("/tickets?plate={PLATE}"))).await;
    assert_eq!(parse_json(body).as_array().unwrap().len(), 1);

    let (_, body) = call(router, get(&format!("/tickets?plate={PLATE}&open=true"))).await;
    assert!(parse_json(body).as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ticket_record_shows_the_full_lifecycle() {
    let router = make_router();
    let ticket_id = enter(&router, PLATE).await;
    let _ = call(router.clone(), post(&format!("/exit?ticketId={ticket_id}"))).await;
    let _ = call(router.clone(), post(&format!("/pay?ticketId={ticket_id}"))).await;

    let (status, body) = call(router, get(&format!("/ticket/{ticket_id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["status"], "paid");
    assert_eq!(json["fee"], "2.50");
    assert_eq!(json["currency"], "USD");
    assert!(json["exit_time"].is_string());
    assert!(json["transaction_id"].as_str().unwrap().starts_with("tx-"));
}

#[tokio::test]
async fn unknown_ticket_record_is_404() {
    let (status, _) = call(make_router(), get("/ticket/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
