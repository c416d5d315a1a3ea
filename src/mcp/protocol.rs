// src/mcp/protocol.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }

    /// Rewrites a direct tool invocation (`{"method": "web3_fetch", "params": {...}}`)
    /// into the equivalent `tools/call` request.
    pub fn into_tool_call(self) -> Request {
        let arguments = self.params.unwrap_or_else(|| Value::Object(Default::default()));
        Request {
            jsonrpc: self.jsonrpc,
            id: self.id,
            method: "tools/call".to_string(),
            params: Some(serde_json::json!({
                "name": self.method,
                "arguments": arguments,
            })),
        }
    }
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(ErrorObject {
                code,
                message,
                data: None,
            }),
        }
    }

    pub fn error_with_data(id: Value, code: i32, message: String, data: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(ErrorObject {
                code,
                message,
                data: Some(data),
            }),
        }
    }
}

// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let req: Request = serde_json::from_value(json!({"method": "tools/list"})).unwrap();
        assert_eq!(req.jsonrpc, "2.0");
        assert!(req.is_notification());
        assert!(req.params.is_none());
    }

    #[test]
    fn test_into_tool_call() {
        let req: Request = serde_json::from_value(json!({
            "id": 1,
            "method": "web3_fetch",
            "params": {"url": "web3://site.eth/"}
        }))
        .unwrap();
        let wrapped = req.into_tool_call();
        assert_eq!(wrapped.method, "tools/call");
        let params = wrapped.params.unwrap();
        assert_eq!(params["name"], "web3_fetch");
        assert_eq!(params["arguments"]["url"], "web3://site.eth/");

        let bare: Request =
            serde_json::from_value(json!({"id": 2, "method": "list_chains"})).unwrap();
        assert_eq!(bare.into_tool_call().params.unwrap()["arguments"], json!({}));
    }

    #[test]
    fn test_error_response_shape() {
        let resp = Response::error_with_data(
            json!(7),
            error_codes::INVALID_PARAMS,
            "bad url".into(),
            json!({"kind": "MalformedUrl"}),
        );
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["error"]["code"], -32602);
        assert_eq!(value["error"]["data"]["kind"], "MalformedUrl");
        assert!(value.get("result").is_none());
    }
}