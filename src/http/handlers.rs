//! Route handlers. Each one validates its input shape, checks the symbol,
//! then delegates to the gateway.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::gateway::types::TransferRequest;
use crate::http::response::{self, RequestStatus};
use crate::http::server::AppState;
use crate::rails::UnsignedTransaction;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfoQuery {
    pub reference: Option<String>,
    pub pool_address: Option<String>,
}

/// A single address or a list of candidates.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Addresses {
    One(String),
    Many(Vec<String>),
}

impl Addresses {
    fn into_vec(self) -> Vec<String> {
        match self {
            Addresses::One(address) => vec![address],
            Addresses::Many(addresses) => addresses,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateSignatureBody {
    pub message: Option<String>,
    pub address: Option<Addresses>,
    pub signature: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionBody {
    pub transaction_data: Option<Vec<TransferRequest>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignAndSendBody {
    pub partial_tx: Option<Vec<UnsignedTransaction>>,
    pub tosign: Option<Vec<String>>,
    pub signatures: Option<Vec<String>>,
}

/// Decode a JSON body; anything unreadable is treated as a missing body.
fn parse_body<T: DeserializeOwned + Default>(raw: &Bytes) -> Option<T> {
    if raw.is_empty() {
        return Some(T::default());
    }
    match serde_json::from_slice(raw) {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable request body");
            None
        }
    }
}

pub async fn transaction_info(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<TransactionInfoQuery>,
) -> Response {
    if let Err(e) = state.gateway.rail(&symbol) {
        return response::from_error(&e);
    }
    tracing::info!(symbol = %symbol, reference = ?query.reference, pool = ?query.pool_address, "Called /oracle/transactionInfo");
    let (Some(reference), Some(pool_address)) = (query.reference, query.pool_address) else {
        return response::rejected(RequestStatus::MissingParams);
    };
    if reference.is_empty() || pool_address.is_empty() {
        return response::rejected(RequestStatus::MissingParams);
    }

    match state
        .gateway
        .get_transaction_information(&reference, &pool_address, &symbol)
        .await
    {
        Ok(result) => (response::oracle_http_status(result.status), Json(result)).into_response(),
        Err(e) => response::from_error(&e),
    }
}

pub async fn validate_signature(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    raw: Bytes,
) -> Response {
    if let Err(e) = state.gateway.rail(&symbol) {
        return response::from_error(&e);
    }
    tracing::info!(symbol = %symbol, "Called /oracle/validateSignature");
    let Some(ValidateSignatureBody {
        message: Some(message),
        address: Some(address),
        signature: Some(signature),
    }) = parse_body::<ValidateSignatureBody>(&raw)
    else {
        return response::rejected(RequestStatus::MissingBody);
    };

    match state
        .gateway
        .validate_signature(&message, &address.into_vec(), &signature, &symbol)
    {
        Ok(valid) => Json(valid).into_response(),
        Err(e) => response::from_error(&e),
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    raw: Bytes,
) -> Response {
    if let Err(e) = state.gateway.rail(&symbol) {
        return response::from_error(&e);
    }
    tracing::info!(symbol = %symbol, "Called /tx/create");
    let Some(CreateTransactionBody {
        transaction_data: Some(requests),
    }) = parse_body::<CreateTransactionBody>(&raw)
    else {
        return response::rejected(RequestStatus::MissingBody);
    };

    let result = state.gateway.create_transaction(&requests, &symbol).await;
    (response::http_status(result.status), Json(result)).into_response()
}

pub async fn sign_and_send(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    raw: Bytes,
) -> Response {
    if let Err(e) = state.gateway.rail(&symbol) {
        return response::from_error(&e);
    }
    tracing::info!(symbol = %symbol, "Called /tx/signAndSend");
    let Some(SignAndSendBody {
        partial_tx: Some(transactions),
        tosign: Some(signing_hashes),
        signatures: Some(signatures),
    }) = parse_body::<SignAndSendBody>(&raw)
    else {
        return response::rejected(RequestStatus::MissingBody);
    };

    let result = state
        .gateway
        .sign_and_send_transaction(&transactions, &signing_hashes, &signatures)
        .await;
    (response::http_status(result.status), Json(result)).into_response()
}

pub async fn transaction_fee(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    let quote = state.gateway.get_transaction_fee(&symbol).await;
    (response::http_status(quote.status), Json(quote)).into_response()
}

pub async fn health(State(state): State<AppState>) -> Response {
    let report = state.gateway.health().await;
    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}
