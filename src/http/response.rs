//! Boundary status → HTTP status mapping.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

use crate::error::GatewayError;
use crate::gateway::types::{ConfirmationStatus, OperationStatus};

/// Statuses that exist only at the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    MissingParams,
    MissingBody,
}

#[derive(Serialize)]
struct StatusBody<S> {
    status: S,
}

/// `400 {"status": "MISSING_PARAMS" | "MISSING_BODY"}`.
pub fn rejected(status: RequestStatus) -> Response {
    (StatusCode::BAD_REQUEST, Json(StatusBody { status })).into_response()
}

/// Status-only response for a core error, e.g. an unknown symbol.
pub fn from_error(err: &GatewayError) -> Response {
    let status = err.status();
    (http_status(status), Json(StatusBody { status })).into_response()
}

pub fn http_status(status: OperationStatus) -> StatusCode {
    match status {
        OperationStatus::Ok => StatusCode::OK,
        OperationStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        OperationStatus::InsufficientFunds
        | OperationStatus::InvalidSignatures
        | OperationStatus::UnsupportedSymbol
        | OperationStatus::InvalidReceiverAddress
        | OperationStatus::InvalidSenderAddress => StatusCode::BAD_REQUEST,
    }
}

pub fn oracle_http_status(status: ConfirmationStatus) -> StatusCode {
    match status {
        ConfirmationStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}
