//! Utility functions for the web3 URL gateway

use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::blockchain::models::Web3Error;
use crate::mcp::protocol::{error_codes, Response};

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// JSON-RPC error for a failed resolution, tagged with the error kind.
pub fn web3_error_response(req_id: &Value, err: &Web3Error) -> Response {
    let code = if err.is_client_error() {
        error_codes::INVALID_PARAMS
    } else {
        error_codes::INTERNAL_ERROR
    };
    Response::error_with_data(
        req_id.clone(),
        code,
        err.to_string(),
        serde_json::json!({ "kind": err.kind() }),
    )
}
