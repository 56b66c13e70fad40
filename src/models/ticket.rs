use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a ticket. Linear: `active -> pending_payment -> paid`,
/// no backward transitions, tickets are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Active,
    PendingPayment,
    Paid,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "active",
            TicketStatus::PendingPayment => "pending_payment",
            TicketStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vehicle's parking session, from entry to settlement.
///
/// `exit_time`, `fee` and `currency` are written exactly once when the exit
/// is processed; `transaction_id` is written exactly once at payment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub ticket_id: Uuid,
    pub license_plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_lot: Option<String>,
    pub entry_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl Ticket {
    /// A freshly opened ticket: new id, `active`, nothing else recorded yet.
    pub fn open(license_plate: &str, entry_time: DateTime<Utc>) -> Self {
        Self {
            ticket_id: Uuid::new_v4(),
            license_plate: license_plate.to_string(),
            parking_lot: None,
            entry_time,
            exit_time: None,
            fee: None,
            currency: None,
            status: TicketStatus::Active,
            transaction_id: None,
        }
    }
}

/// Body of a successful `/entry` response.
#[derive(Debug, Serialize)]
pub struct EntryReceipt {
    #[serde(rename = "ticketId")]
    pub ticket_id: Uuid,
}

/// Body of a successful `/exit` response.
#[derive(Debug, Serialize)]
pub struct ExitReceipt {
    #[serde(rename = "licensePlate")]
    pub license_plate: String,
    /// Parked duration in minutes, rounded to 2 decimal places.
    #[serde(rename = "totalParkedTime")]
    pub total_parked_time: Decimal,
    #[serde(rename = "parkingLot")]
    pub parking_lot: String,
    pub charge: Decimal,
}

/// Body of a successful `/pay` response. `payment_status` is always `paid`;
/// the field names mirror the rest of the receipt except for that one, which
/// stays snake_case.
#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    #[serde(rename = "ticketId")]
    pub ticket_id: Uuid,
    #[serde(rename = "licensePlate")]
    pub license_plate: String,
    pub charged: Decimal,
    pub currency: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub payment_status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ticket_starts_active_with_fresh_id() {
        let a = Ticket::open("123-45-678", Utc::now());
        let b = Ticket::open("123-45-678", Utc::now());

        assert_eq!(a.status, TicketStatus::Active);
        assert!(a.exit_time.is_none());
        assert!(a.fee.is_none());
        assert!(a.transaction_id.is_none());
        assert_ne!(a.ticket_id, b.ticket_id);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TicketStatus::PendingPayment).unwrap();
        assert_eq!(json, "\"pending_payment\"");
    }

    #[test]
    fn receipts_serialize_with_wire_field_names() {
        let exit = ExitReceipt {
            license_plate: "123-45-678".to_string(),
            total_parked_time: Decimal::new(1000, 2),
            parking_lot: "382".to_string(),
            charge: Decimal::new(250, 2),
        };
        let json = serde_json::to_value(&exit).unwrap();
        assert_eq!(json["licensePlate"], "123-45-678");
        assert_eq!(json["totalParkedTime"], "10.00");
        assert_eq!(json["parkingLot"], "382");
        assert_eq!(json["charge"], "2.50");

        let pay = PaymentReceipt {
            ticket_id: Uuid::new_v4(),
            license_plate: "123-45-678".to_string(),
            charged: Decimal::new(250, 2),
            currency: "USD".to_string(),
            transaction_id: "tx-abc".to_string(),
            payment_status: TicketStatus::Paid,
        };
        let json = serde_json::to_value(&pay).unwrap();
        assert_eq!(json["charged"], "2.50");
        assert_eq!(json["transactionId"], "tx-abc");
        assert_eq!(json["payment_status"], "paid");
    }
}
