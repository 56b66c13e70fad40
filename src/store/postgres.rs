//! Postgres-backed ticket store.
//!
//! Conditional updates are single `UPDATE ... WHERE status = <expected>
//! RETURNING` statements, so the precondition check and the mutation are one
//! atomic operation at the database. The plate lookup is served by the index
//! created in the migrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Ticket, TicketStatus};
use crate::store::{StoreError, TicketStore};

pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        let created = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets
                (ticket_id, license_plate, parking_lot, entry_time, exit_time,
                 fee, currency, status, transaction_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING ticket_id, license_plate, parking_lot, entry_time,
                      exit_time, fee, currency, status, transaction_id
            "#,
        )
        .bind(ticket.ticket_id)
        .bind(&ticket.license_plate)
        .bind(&ticket.parking_lot)
        .bind(ticket.entry_time)
        .bind(ticket.exit_time)
        .bind(ticket.fee)
        .bind(&ticket.currency)
        .bind(ticket.status)
        .bind(&ticket.transaction_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get(&self, ticket_id: Uuid) -> Result<Ticket, StoreError> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, license_plate, parking_lot, entry_time,
                   exit_time, fee, currency, status, transaction_id
            FROM tickets
            WHERE ticket_id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn find_active_by_plate(&self, plate: &str) -> Result<Vec<Ticket>, StoreError> {
        self.query(Some(plate), true).await
    }

    async fn query(&self, plate: Option<&str>, open_only: bool) -> Result<Vec<Ticket>, StoreError> {
        let tickets = match (plate, open_only) {
            (Some(plate), true) => {
                sqlx::query_as::<_, Ticket>(
                    r#"
                    SELECT ticket_id, license_plate, parking_lot, entry_time,
                           exit_time, fee, currency, status, transaction_id
                    FROM tickets
                    WHERE license_plate = $1 AND status = $2
                    "#,
                )
                .bind(plate)
                .bind(TicketStatus::Active)
                .fetch_all(&self.pool)
                .await?
            }
            (Some(plate), false) => {
                sqlx::query_as::<_, Ticket>(
                    r#"
                    SELECT ticket_id, license_plate, parking_lot, entry_time,
                           exit_time, fee, currency, status, transaction_id
                    FROM tickets
                    WHERE license_plate = $1
                    "#,
                )
                .bind(plate)
                .fetch_all(&self.pool)
                .await?
            }
            (None, true) => {
                sqlx::query_as::<_, Ticket>(
                    r#"
                    SELECT ticket_id, license_plate, parking_lot, entry_time,
                           exit_time, fee, currency, status, transaction_id
                    FROM tickets
                    WHERE status = $1
                    "#,
                )
                .bind(TicketStatus::Active)
                .fetch_all(&self.pool)
                .await?
            }
            (None, false) => {
                sqlx::query_as::<_, Ticket>(
                    r#"
                    SELECT ticket_id, license_plate, parking_lot, entry_time,
                           exit_time, fee, currency, status, transaction_id
                    FROM tickets
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(tickets)
    }

    async fn attach_parking_lot(
        &self,
        ticket_id: Uuid,
        parking_lot: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET parking_lot = $2
            WHERE ticket_id = $1
            "#,
        )
        .bind(ticket_id)
        .bind(parking_lot)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn transition_to_pending(
        &self,
        ticket_id: Uuid,
        exit_time: DateTime<Utc>,
        fee: Decimal,
        currency: &str,
    ) -> Result<Ticket, StoreError> {
        let updated = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets
            SET exit_time = $2, fee = $3, currency = $4, status = $5
            WHERE ticket_id = $1 AND status = $6
            RETURNING ticket_id, license_plate, parking_lot, entry_time,
                      exit_time, fee, currency, status, transaction_id
            "#,
        )
        .bind(ticket_id)
        .bind(exit_time)
        .bind(fee)
        .bind(currency)
        .bind(TicketStatus::PendingPayment)
        .bind(TicketStatus::Active)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(ticket) => Ok(ticket),
            None => {
                // No row matched: either the ticket does not exist (NotFound
                // from the lookup) or it exists in another state.
                self.get(ticket_id).await?;
                Err(StoreError::PreconditionFailed)
            }
        }
    }

    async fn transition_to_paid(
        &self,
        ticket_id: Uuid,
        transaction_id: &str,
    ) -> Result<Ticket, StoreError> {
        let updated = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets
            SET transaction_id = $2, status = $3
            WHERE ticket_id = $1 AND status = $4
            RETURNING ticket_id, license_plate, parking_lot, entry_time,
                      exit_time, fee, currency, status, transaction_id
            "#,
        )
        .bind(ticket_id)
        .bind(transaction_id)
        .bind(TicketStatus::Paid)
        .bind(TicketStatus::PendingPayment)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(ticket) => Ok(ticket),
            None => {
                self.get(ticket_id).await?;
                Err(StoreError::PreconditionFailed)
            }
        }
    }
}
