use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bank::BankError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub const UNEXPECTED: &str = "An unexpected error occurred.";
pub const PANICKED: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Invalid quantity '{value}' for field '{field}'.")]
    InvalidQuantity { field: &'static str, value: String },

    #[error("Bad Request")]
    MalformedPayload,

    #[error("Resource Not Found")]
    RouteNotFound,

    #[error(transparent)]
    Bank(#[from] BankError),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields { .. }
            | AppError::InvalidQuantity { .. }
            | AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Bank(e) if e.is_lookup() => StatusCode::BAD_REQUEST,
            AppError::Bank { .. } | AppError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Server-side failures are reported without their details.
    fn public_message(&self) -> String {
        match self {
            AppError::Bank(BankError::Io(_) | BankError::Csv(_)) | AppError::InternalError(_) => {
                UNEXPECTED.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("{self:?}");
        } else {
            warn!("{self}");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Turns a handler panic into the same JSON error shape as every other failure.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    error!("Handler panicked: {detail}");

    let body = ErrorBody {
        error: PANICKED.to_string(),
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
