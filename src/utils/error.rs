use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::store::StoreError;
use crate::utils::response::error as error_response;

/// Domain error taxonomy. Every outward failure of the API is one of these;
/// the store's `PreconditionFailed` is translated by the lifecycle controller
/// into `AlreadyExited`/`AlreadyPaid` and never reaches this layer raw.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid license plate format: {0}")]
    InvalidPlate(String),

    #[error("Vehicle with license plate {0} is already parked")]
    AlreadyParked(String),

    #[error("Ticket {0} not found")]
    TicketNotFound(String),

    #[error("Exit request for ticket {0} was already processed")]
    AlreadyExited(Uuid),

    #[error("Ticket {0} is already paid")]
    AlreadyPaid(Uuid),

    #[error("Ticket {0} has not been exited yet")]
    NotYetExited(Uuid),

    #[error("Ticket store unavailable")]
    StoreUnavailable(#[source] StoreError),

    #[error("Internal server error")]
    Internal(String),
}

/// Fallback conversion for store calls whose domain cases (`NotFound`,
/// `PreconditionFailed`) have already been handled by the caller.
impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreUnavailable(e)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidPlate(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyParked(_) => StatusCode::CONFLICT,
            AppError::TicketNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExited(_) => StatusCode::CONFLICT,
            AppError::AlreadyPaid(_) => StatusCode::CONFLICT,
            AppError::NotYetExited(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidPlate(_) => "INVALID_PLATE",
            AppError::AlreadyParked(_) => "ALREADY_PARKED",
            AppError::TicketNotFound(_) => "TICKET_NOT_FOUND",
            AppError::AlreadyExited(_) => "ALREADY_EXITED",
            AppError::AlreadyPaid(_) => "ALREADY_PAID",
            AppError::NotYetExited(_) => "NOT_YET_EXITED",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::StoreUnavailable(e) => {
                error!(error = ?e, "Ticket store error");
            }
            AppError::Internal(msg) => {
                error!(message = %msg, "Internal error");
            }
            other => {
                warn!(code = other.code(), message = %other, "Request rejected");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::StoreUnavailable(_) => "A storage error occurred".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        error_response(code, public_message, None, status)
    }
}
