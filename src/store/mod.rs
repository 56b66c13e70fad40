//! Ticket store contract.
//!
//! The lifecycle controller talks to a keyed record store through this trait:
//! one exact-match secondary lookup (by plate) and two conditional updates.
//! The conditional updates are the only coordination primitive in the system;
//! each succeeds iff the record's current status matches the expected prior
//! state, atomically at the backing store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Ticket;

pub mod memory;
pub mod postgres;

pub use memory::MemoryTicketStore;
pub use postgres::PgTicketStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No record for the given ticket id.
    #[error("no ticket with the given id")]
    NotFound,

    /// The record's status did not match the expected prior state at mutation
    /// time; the record already moved on. A legitimate outcome under
    /// concurrent requests, never retried.
    #[error("ticket status did not match the expected state")]
    PreconditionFailed,

    /// Transport or backend failure. Retryable by the caller only for reads.
    #[error("ticket store unavailable")]
    Unavailable(#[source] BoxError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Unavailable(Box::new(other)),
        }
    }
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert a new record. Does not enforce the one-active-ticket-per-plate
    /// invariant; the caller checks that beforehand.
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError>;

    async fn get(&self, ticket_id: Uuid) -> Result<Ticket, StoreError>;

    /// Exact-match secondary lookup by plate, filtered to `active` status.
    async fn find_active_by_plate(&self, plate: &str) -> Result<Vec<Ticket>, StoreError>;

    /// List tickets, optionally filtered by plate and/or open (`active`) status.
    async fn query(&self, plate: Option<&str>, open_only: bool) -> Result<Vec<Ticket>, StoreError>;

    /// Best-effort annotation of the physical lot, applied after creation.
    async fn attach_parking_lot(&self, ticket_id: Uuid, parking_lot: &str)
        -> Result<(), StoreError>;

    /// Conditional update: records the exit and moves `active ->
    /// pending_payment`. Succeeds iff the current status is `active`,
    /// otherwise fails with [`StoreError::PreconditionFailed`].
    async fn transition_to_pending(
        &self,
        ticket_id: Uuid,
        exit_time: DateTime<Utc>,
        fee: Decimal,
        currency: &str,
    ) -> Result<Ticket, StoreError>;

    /// Conditional update: records the settlement and moves `pending_payment
    /// -> paid`. Succeeds iff the current status is `pending_payment`.
    async fn transition_to_paid(
        &self,
        ticket_id: Uuid,
        transaction_id: &str,
    ) -> Result<Ticket, StoreError>;
}
