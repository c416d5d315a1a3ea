//! # API Module
//!
//! HTTP handlers for the web3 URL gateway. All routes live under `/api`.
//!
//! ## Available Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /chains` - Built-in chains merged with configured overrides
//! - `GET /resolve?url=web3://...` - Resolved call intent for a URL
//! - `GET /fetch?url=web3://...` - Content returned by the contract
//! - `GET /w3/:host/*path` - Path-style gateway for `web3://<host>/<path>`
//! - `POST /rpc` - JSON-RPC tool calls

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{blockchain::models::Web3Error, AppState};

pub mod chains;
pub mod fetch;
pub mod health;
pub mod rpc;

/// Builds the full HTTP application.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/chains", get(chains::list_chains_handler))
        .route("/resolve", get(fetch::resolve_handler))
        .route("/fetch", get(fetch::fetch_handler))
        .route("/w3/:host", get(fetch::gateway_handler))
        .route("/w3/:host/*path", get(fetch::gateway_handler))
        // JSON-RPC endpoint for tool calls
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// HTTP status for a resolution or execution failure.
pub fn status_for(err: &Web3Error) -> StatusCode {
    match err {
        Web3Error::MalformedUrl(_)
        | Web3Error::UnsupportedProtocol(_)
        | Web3Error::InvalidPath(_)
        | Web3Error::InvalidIntent(_) => StatusCode::BAD_REQUEST,
        Web3Error::UnknownChain(_)
        | Web3Error::UnresolvableName { .. }
        | Web3Error::NameRecordMissing(_)
        | Web3Error::NotAContract(_) => StatusCode::NOT_FOUND,
        Web3Error::UnsupportedResolveMode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Web3Error::Abi(_) | Web3Error::Rpc(_) | Web3Error::Connection { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub fn error_response(err: &Web3Error) -> Response {
    (
        status_for(err),
        Json(json!({ "error": err.to_string(), "kind": err.kind() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Web3Error::MalformedUrl("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Web3Error::UnknownChain(5)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&Web3Error::NotAContract(Address::zero())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Web3Error::UnsupportedResolveMode("foo".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&Web3Error::Rpc("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_status_agrees_with_rpc_classification() {
        let errors = [
            Web3Error::MalformedUrl("x".into()),
            Web3Error::UnsupportedProtocol("ftp".into()),
            Web3Error::UnknownChain(5),
            Web3Error::unresolvable("site.eth", None),
            Web3Error::UnsupportedResolveMode("foo".into()),
            Web3Error::NotAContract(Address::zero()),
            Web3Error::NameRecordMissing("site.eth".into()),
            Web3Error::InvalidPath("/1bad".into()),
            Web3Error::InvalidIntent("chain".into()),
            Web3Error::Rpc("timeout".into()),
            Web3Error::Connection {
                chain_id: 1,
                reason: "refused".into(),
            },
        ];
        for err in &errors {
            assert_eq!(
                status_for(err).is_client_error(),
                err.is_client_error(),
                "{}",
                err.kind()
            );
        }
    }
}
