//! Controller-layer tests: drive the axum router with in-memory requests and
//! assert the response envelopes and status mapping.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use chain_client::{ChainClient, ClientError, ClientResult};
use eth_core::{abi, codec, signer, KeyMaterial};
use gateway::dispatcher::Dispatcher;
use gateway::handlers::AppState;
use gateway::routes::router;

const OPERATOR_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const RECIPIENT: &str = "0x5D86dE4B82091dBF1fd2c706d36ebC98E3d4d5Cd";
const TOKEN: &str = "0xe3236FEe84ffbcFA7955241CF0Bd0836169e075f";

/// What every chain access should do in one test.
#[derive(Clone, Copy)]
enum ChainBehavior {
    Healthy,
    TimeOut,
    Reject,
}

struct StubChain {
    behavior: ChainBehavior,
}

#[async_trait]
impl ChainClient for StubChain {
    async fn pending_nonce(&self, _address: Address) -> ClientResult<u64> {
        self.gate()?;
        Ok(3)
    }

    async fn suggested_gas_price(&self) -> ClientResult<U256> {
        self.gate()?;
        Ok(U256::from(1_000_000_000u64))
    }

    async fn chain_id(&self) -> ClientResult<u64> {
        self.gate()?;
        Ok(1112)
    }

    async fn broadcast(&self, raw_tx: &[u8]) -> ClientResult<B256> {
        self.gate()?;
        let tx = codec::decode(raw_tx).expect("gateway broadcasts valid encodings");
        Ok(signer::tx_hash(&tx))
    }

    async fn call(&self, _to: Address, data: Bytes) -> ClientResult<Bytes> {
        self.gate()?;
        if data[..4] == abi::selector("name()") {
            Ok(Bytes::from(abi_string("Coz Token")))
        } else if data[..4] == abi::selector("symbol()") {
            Ok(Bytes::from(abi_string("Coz")))
        } else if data[..4] == abi::selector("balanceOf(address)") {
            Ok(Bytes::from(U256::from(420u64).to_be_bytes::<32>().to_vec()))
        } else {
            Err(ClientError::Rpc("execution reverted".into()))
        }
    }
}

impl StubChain {
    fn gate(&self) -> ClientResult<()> {
        match self.behavior {
            ChainBehavior::Healthy => Ok(()),
            ChainBehavior::TimeOut => Err(ClientError::Timeout(10)),
            ChainBehavior::Reject => Err(ClientError::Rpc("nonce too low".into())),
        }
    }
}

fn abi_string(value: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&U256::from(0x20u64).to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(value.len() as u64).to_be_bytes::<32>());
    let mut tail = vec![0u8; value.len().div_ceil(32) * 32];
    tail[..value.len()].copy_from_slice(value.as_bytes());
    out.extend_from_slice(&tail);
    out
}

fn app(behavior: ChainBehavior) -> axum::Router {
    let dispatcher = Dispatcher::new(
        Arc::new(StubChain { behavior }),
        KeyMaterial::from_hex(OPERATOR_KEY).unwrap(),
        TOKEN.parse().unwrap(),
        U256::from(700_000_000_000_000_000u64),
        200_000,
    );
    router(AppState {
        dispatcher: Arc::new(dispatcher),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn coin_transfer_returns_ok_envelope() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/coin/")
                .header("address", RECIPIENT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["msg"], "ok");
    assert!(body["txHash"].as_str().unwrap().starts_with("0x"));
}

#[tokio::test]
async fn missing_address_header_is_400_before_any_work() {
    let response = app(ChainBehavior::TimeOut) // would 504 if it reached the chain
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/coin/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("address"));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn private_transfer_requires_private_key_header() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/token/private")
                .header("address", RECIPIENT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("privateKey"));
}

#[tokio::test]
async fn token_balance_returns_decimal_string() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/token/balance")
                .header("address", RECIPIENT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["balance"], "420");
}

#[tokio::test]
async fn token_symbol_roundtrip() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/token/symbol?tokenName=Coz%20Token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["symbol"], "Coz");
}

#[tokio::test]
async fn token_symbol_name_mismatch_is_400_with_error_text() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/token/symbol?tokenName=Wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("mismatch"));
}

#[tokio::test]
async fn chain_timeout_maps_to_504() {
    let response = app(ChainBehavior::TimeOut)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/coin/")
                .header("address", RECIPIENT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("timeout"));
}

#[tokio::test]
async fn node_rejection_maps_to_502() {
    let response = app(ChainBehavior::Reject)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/token/")
                .header("address", RECIPIENT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn invalid_recipient_maps_to_400() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/coin/")
                .header("address", "not-an-address")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("invalid recipient address"));
}

#[tokio::test]
async fn preflight_gets_cors_headers() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/v1/coin/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-methods")
            .unwrap(),
        "POST, OPTIONS, GET, PUT, DELETE"
    );
}

#[tokio::test]
async fn regular_responses_carry_cors_headers_too() {
    let response = app(ChainBehavior::Healthy)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/token/balance")
                .header("address", RECIPIENT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
