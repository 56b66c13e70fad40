//! In-memory ticket store.
//!
//! Backs the `memory` deployment profile and doubles as the store used by the
//! test suites. Conditional updates are check-and-set under a single mutex,
//! which gives the same atomicity contract as the database-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Ticket, TicketStatus};
use crate::store::{StoreError, TicketStore};

#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: Mutex<HashMap<Uuid, Ticket>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.lock().await;
        tickets.insert(ticket.ticket_id, ticket.clone());
        Ok(ticket)
    }

    async fn get(&self, ticket_id: Uuid) -> Result<Ticket, StoreError> {
        let tickets = self.tickets.lock().await;
        tickets.get(&ticket_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn find_active_by_plate(&self, plate: &str) -> Result<Vec<Ticket>, StoreError> {
        self.query(Some(plate), true).await
    }

    async fn query(&self, plate: Option<&str>, open_only: bool) -> Result<Vec<Ticket>, StoreError> {
        let tickets = self.tickets.lock().await;
        Ok(tickets
            .values()
            .filter(|t| plate.map_or(true, |p| t.license_plate == p))
            .filter(|t| !open_only || t.status == TicketStatus::Active)
            .cloned()
            .collect())
    }

    async fn attach_parking_lot(
        &self,
        ticket_id: Uuid,
        parking_lot: &str,
    ) -> Result<(), StoreError> {
        let mut tickets = self.tickets.lock().await;
        let ticket = tickets.get_mut(&ticket_id).ok_or(StoreError::NotFound)?;
        ticket.parking_lot = Some(parking_lot.to_string());
        Ok(())
    }

    async fn transition_to_pending(
        &self,
        ticket_id: Uuid,
        exit_time: DateTime<Utc>,
        fee: Decimal,
        currency: &str,
    ) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.lock().await;
        let ticket = tickets.get_mut(&ticket_id).ok_or(StoreError::NotFound)?;
        if ticket.status != TicketStatus::Active {
            return Err(StoreError::PreconditionFailed);
        }
        ticket.exit_time = Some(exit_time);
        ticket.fee = Some(fee);
        ticket.currency = Some(currency.to_string());
        ticket.status = TicketStatus::PendingPayment;
        Ok(ticket.clone())
    }

    async fn transition_to_paid(
        &self,
        ticket_id: Uuid,
        transaction_id: &str,
    ) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.lock().await;
        let ticket = tickets.get_mut(&ticket_id).ok_or(StoreError::NotFound)?;
        if ticket.status != TicketStatus::PendingPayment {
            return Err(StoreError::PreconditionFailed);
        }
        ticket.transaction_id = Some(transaction_id.to_string());
        ticket.status = TicketStatus::Paid;
        Ok(ticket.clone())
    }
}
