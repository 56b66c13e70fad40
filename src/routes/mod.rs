use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{
    create_entry, get_ticket, health_check, list_tickets, process_exit, settle_payment,
};
use crate::service::TicketService;

pub fn create_routes(service: Arc<TicketService>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/entry", post(create_entry))
        .route("/exit", post(process_exit))
        .route("/pay", post(settle_payment))
        .route("/tickets", get(list_tickets))
        .route("/ticket/:ticket_id", get(get_ticket))
        .with_state(service)
        .layer(TraceLayer::new_for_http());

    apply_security_headers(router).layer(create_cors_layer())
}
