use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::dispatcher::Dispatcher;
use crate::error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    #[serde(rename = "tokenName", default)]
    pub token_name: String,
}

/// `GET /v1/token/symbol?tokenName=<name>`
pub async fn token_symbol(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = state
        .dispatcher
        .token_symbol(&query.token_name)
        .await
        .map_err(|e| ApiError::from_gateway("failed to look up the token symbol", e))?;

    Ok(Json(json!({ "symbol": symbol })))
}

/// `GET /v1/token/balance` with an `address` header.
pub async fn token_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let address = required_header(&headers, "address")?;

    let balance = state
        .dispatcher
        .token_balance(&address)
        .await
        .map_err(|e| ApiError::from_gateway("failed to fetch the token balance", e))?;

    // Decimal string: a uint256 does not fit JSON numbers.
    Ok(Json(json!({ "balance": balance.to_string() })))
}

/// `POST /v1/token/` with an `address` header; signs with the operator key.
pub async fn send_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let address = required_header(&headers, "address")?;

    let tx_hash = state
        .dispatcher
        .send_token(&address, None)
        .await
        .map_err(|e| ApiError::from_gateway("token transfer failed", e))?;

    Ok(ok_body(tx_hash))
}

/// `POST /v1/token/private` with `address` and `privateKey` headers.
pub async fn send_token_private(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let address = required_header(&headers, "address")?;
    let private_key = required_header(&headers, "privateKey")?;

    let tx_hash = state
        .dispatcher
        .send_token(&address, Some(&private_key))
        .await
        .map_err(|e| ApiError::from_gateway("token transfer failed", e))?;

    Ok(ok_body(tx_hash))
}

/// `POST /v1/coin/` with an `address` header; signs with the operator key.
pub async fn send_coin(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let address = required_header(&headers, "address")?;

    let tx_hash = state
        .dispatcher
        .send_coin(&address, None)
        .await
        .map_err(|e| ApiError::from_gateway("coin transfer failed", e))?;

    Ok(ok_body(tx_hash))
}

/// `POST /v1/coin/private` with `address` and `privateKey` headers.
pub async fn send_coin_private(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let address = required_header(&headers, "address")?;
    let private_key = required_header(&headers, "privateKey")?;

    let tx_hash = state
        .dispatcher
        .send_coin(&address, Some(&private_key))
        .await
        .map_err(|e| ApiError::from_gateway("coin transfer failed", e))?;

    Ok(ok_body(tx_hash))
}

fn ok_body(tx_hash: alloy_primitives::B256) -> Json<Value> {
    Json(json!({ "msg": "ok", "txHash": format!("{tx_hash:#x}") }))
}

/// Extracts a required, non-empty header; rejects the request with a 400
/// before any chain work otherwise.
fn required_header(headers: &HeaderMap, name: &str) -> Result<String, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::bad_request(format!("{name} header is missing or invalid")))
}
