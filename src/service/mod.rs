//! Ticket lifecycle controller.
//!
//! Orchestrates entry, exit and payment over the ticket store, enforcing the
//! linear state machine `active -> pending_payment -> paid`. All coordination
//! between concurrent requests is delegated to the store's conditional
//! updates; the controller holds no locks across store calls, so a lost
//! conditional update is an expected outcome, not a fault.
//!
//! Known gap carried over from the original system: the entry uniqueness
//! check is lookup-then-create, not atomic. Two near-simultaneous entries for
//! the same plate can both pass the check and both create a ticket.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::fees::{self, FeePolicy};
use crate::models::{plate, ExitReceipt, PaymentReceipt, Ticket, TicketStatus};
use crate::store::{StoreError, TicketStore};
use crate::utils::error::AppError;

pub struct TicketService {
    store: Arc<dyn TicketStore>,
    policy: FeePolicy,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>, policy: FeePolicy) -> Self {
        Self { store, policy }
    }

    /// Open a ticket for a vehicle entering the lot.
    ///
    /// The parking lot annotation is best-effort: a failure to attach it is
    /// logged and the ticket stands.
    pub async fn enter(
        &self,
        plate: &str,
        parking_lot: Option<&str>,
    ) -> Result<Ticket, AppError> {
        if !plate::is_valid(plate) {
            return Err(AppError::InvalidPlate(plate.to_string()));
        }

        let parked = self.store.find_active_by_plate(plate).await?;
        if !parked.is_empty() {
            return Err(AppError::AlreadyParked(plate.to_string()));
        }

        let mut ticket = self.store.create(Ticket::open(plate, Utc::now())).await?;
        info!(ticket_id = %ticket.ticket_id, license_plate = plate, "Created ticket");

        if let Some(lot) = parking_lot {
            match self.store.attach_parking_lot(ticket.ticket_id, lot).await {
                Ok(()) => ticket.parking_lot = Some(lot.to_string()),
                Err(e) => {
                    warn!(
                        ticket_id = %ticket.ticket_id,
                        error = %e,
                        "Could not attach parking lot to ticket"
                    );
                }
            }
        }

        Ok(ticket)
    }

    /// Process a vehicle exit: compute the fee and move the ticket to
    /// `pending_payment`.
    ///
    /// If a concurrent exit wins the conditional update, this attempt reports
    /// `AlreadyExited` and its fee quote is discarded. The recorded fee is
    /// written exactly once.
    pub async fn exit(&self, ticket_id: Uuid) -> Result<ExitReceipt, AppError> {
        let ticket = self.fetch(ticket_id).await?;
        match ticket.status {
            TicketStatus::PendingPayment => return Err(AppError::AlreadyExited(ticket_id)),
            TicketStatus::Paid => return Err(AppError::AlreadyPaid(ticket_id)),
            TicketStatus::Active => {}
        }

        let exit_time = Utc::now();
        let quote = fees::quote(self.policy, ticket.entry_time, exit_time);

        let updated = match self
            .store
            .transition_to_pending(ticket_id, exit_time, quote.fee, quote.currency)
            .await
        {
            Ok(t) => t,
            Err(StoreError::PreconditionFailed) => {
                return Err(AppError::AlreadyExited(ticket_id))
            }
            Err(StoreError::NotFound) => {
                return Err(AppError::TicketNotFound(ticket_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            ticket_id = %ticket_id,
            fee = %quote.fee,
            currency = quote.currency,
            blocks = quote.blocks,
            "Processed exit"
        );

        Ok(ExitReceipt {
            license_plate: updated.license_plate,
            total_parked_time: quote.duration_minutes,
            parking_lot: updated.parking_lot.unwrap_or_else(|| "N/A".to_string()),
            charge: quote.fee,
        })
    }

    /// Settle a ticket. Payment is mocked: an opaque transaction id is minted
    /// locally and the amount charged is the fee recorded at exit, never
    /// recomputed.
    pub async fn pay(&self, ticket_id: Uuid) -> Result<PaymentReceipt, AppError> {
        let ticket = self.fetch(ticket_id).await?;
        match ticket.status {
            TicketStatus::Paid => return Err(AppError::AlreadyPaid(ticket_id)),
            TicketStatus::Active => return Err(AppError::NotYetExited(ticket_id)),
            TicketStatus::PendingPayment => {}
        }

        let transaction_id = format!("tx-{}", Uuid::new_v4());
        let updated = match self
            .store
            .transition_to_paid(ticket_id, &transaction_id)
            .await
        {
            Ok(t) => t,
            Err(StoreError::PreconditionFailed) => return Err(AppError::AlreadyPaid(ticket_id)),
            Err(StoreError::NotFound) => {
                return Err(AppError::TicketNotFound(ticket_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let charged = updated
            .fee
            .ok_or_else(|| AppError::Internal("settled ticket has no recorded fee".to_string()))?;
        let currency = updated
            .currency
            .unwrap_or_else(|| self.policy.currency().to_string());

        info!(
            ticket_id = %ticket_id,
            transaction_id = %transaction_id,
            charged = %charged,
            "Processed payment"
        );

        Ok(PaymentReceipt {
            ticket_id,
            license_plate: updated.license_plate,
            charged,
            currency,
            transaction_id,
            payment_status: TicketStatus::Paid,
        })
    }

    /// Fetch a single ticket record.
    pub async fn ticket(&self, ticket_id: Uuid) -> Result<Ticket, AppError> {
        self.fetch(ticket_id).await
    }

    /// List tickets, optionally filtered by plate and/or open status.
    pub async fn tickets(
        &self,
        plate: Option<&str>,
        open_only: bool,
    ) -> Result<Vec<Ticket>, AppError> {
        Ok(self.store.query(plate, open_only).await?)
    }

    async fn fetch(&self, ticket_id: Uuid) -> Result<Ticket, AppError> {
        match self.store.get(ticket_id).await {
            Ok(t) => Ok(t),
            Err(StoreError::NotFound) => Err(AppError::TicketNotFound(ticket_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
