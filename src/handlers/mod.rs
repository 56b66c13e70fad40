//! HTTP boundary. Handlers translate query parameters into lifecycle
//! controller calls and map results onto the wire shapes; all failure
//! mapping lives in [`AppError`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{EntryReceipt, Ticket};
use crate::service::TicketService;
use crate::utils::error::AppError;

#[derive(serde::Serialize)]
struct HealthPayload {
    status: &'static str,
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthPayload { status: "healthy" })
}

#[derive(Deserialize)]
pub struct EntryParams {
    plate: String,
    #[serde(rename = "parkingLot")]
    parking_lot: Option<String>,
}

/// `POST /entry?plate=123-45-678&parkingLot=382`
pub async fn create_entry(
    State(service): State<Arc<TicketService>>,
    Query(params): Query<EntryParams>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = service
        .enter(&params.plate, params.parking_lot.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EntryReceipt {
            ticket_id: ticket.ticket_id,
        }),
    ))
}

#[derive(Deserialize)]
pub struct TicketIdParams {
    #[serde(rename = "ticketId")]
    ticket_id: String,
}

/// `POST /exit?ticketId=<id>`
pub async fn process_exit(
    State(service): State<Arc<TicketService>>,
    Query(params): Query<TicketIdParams>,
) -> Result<impl IntoResponse, AppError> {
    let ticket_id = parse_ticket_id(&params.ticket_id)?;
    let receipt = service.exit(ticket_id).await?;
    Ok(Json(receipt))
}

/// `POST /pay?ticketId=<id>`
pub async fn settle_payment(
    State(service): State<Arc<TicketService>>,
    Query(params): Query<TicketIdParams>,
) -> Result<impl IntoResponse, AppError> {
    let ticket_id = parse_ticket_id(&params.ticket_id)?;
    let receipt = service.pay(ticket_id).await?;
    Ok(Json(receipt))
}

#[derive(Deserialize)]
pub struct TicketsParams {
    plate: Option<String>,
    #[serde(default)]
    open: bool,
}

/// `GET /tickets?plate=<s>&open=<bool>`
pub async fn list_tickets(
    State(service): State<Arc<TicketService>>,
    Query(params): Query<TicketsParams>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets = service.tickets(params.plate.as_deref(), params.open).await?;
    Ok(Json(tickets))
}

/// `GET /ticket/:ticket_id`
pub async fn get_ticket(
    State(service): State<Arc<TicketService>>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, AppError> {
    let ticket_id = parse_ticket_id(&ticket_id)?;
    let ticket = service.ticket(ticket_id).await?;
    Ok(Json(ticket))
}

/// An id that does not parse is indistinguishable from an unknown ticket.
fn parse_ticket_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::TicketNotFound(raw.to_string()))
}
