pub mod plate;
pub mod ticket;

pub use ticket::{EntryReceipt, ExitReceipt, PaymentReceipt, Ticket, TicketStatus};
