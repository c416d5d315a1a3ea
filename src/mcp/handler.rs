//! # Tool Handler Module
//!
//! Implements the JSON-RPC tool protocol spoken over stdio and `POST /api/rpc`.
//!
//! ## Supported Tools
//!
//! - `web3_resolve` - Resolve a `web3://` URL into its call intent
//! - `web3_fetch` - Resolve and execute a `web3://` URL
//! - `list_chains` - List the chains URLs can address

use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    blockchain::chains,
    mcp::protocol::{error_codes, Request, Response},
    resolver::models::{FetchOutput, FetchResult},
    utils, AppState,
};

// Helper: produce a result Value that always contains a text content array
// and preserves structured data for JSON-friendly clients.
fn make_texty_result(text: String, payload: Value) -> Value {
    let content = json!([{ "type": "text", "text": text }]);
    match payload {
        Value::Object(mut map) => {
            // Do not overwrite if caller already set content
            if !map.contains_key("content") {
                map.insert("content".into(), content);
            }
            Value::Object(map)
        }
        other => json!({
            "data": other,
            "content": content
        }),
    }
}

/// Human-readable rendering of a fetch output.
fn output_text(result: &FetchResult) -> String {
    match &result.output {
        FetchOutput::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => format!("0x{}", hex::encode(bytes)),
        },
        FetchOutput::Json(json) => json.clone(),
        FetchOutput::Decoded(_) => result.output.to_string_sequence().join(","),
    }
}

/// This is the main dispatcher for all incoming requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Convenience aliases to support direct method calls from CLI
        "web3_resolve" | "web3_fetch" | "list_chains" => {
            handle_tool_call(req.into_tool_call(), state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;
    let options = state.config.fetch_options();

    let res: Result<Response, Response> = match tool_name {
        "web3_resolve" => {
            (async {
                let url = utils::get_required_arg::<String>(args, "url", req_id)?;
                let intent = state.web3.resolve(&url, &options).await.map_err(|e| {
                    error!("web3_resolve {} failed: {}", url, e);
                    utils::web3_error_response(req_id, &e)
                })?;
                let payload = json!({ "url": url, "intent": intent });
                Ok(Response::success(
                    req_id.clone(),
                    make_texty_result(payload["intent"].to_string(), payload),
                ))
            })
            .await
        }
        "web3_fetch" => {
            (async {
                let url = utils::get_required_arg::<String>(args, "url", req_id)?;
                let result = state.web3.fetch(&url, &options).await.map_err(|e| {
                    error!("web3_fetch {} failed: {}", url, e);
                    utils::web3_error_response(req_id, &e)
                })?;
                let text = output_text(&result);
                let payload = serde_json::to_value(&result).map_err(|e| {
                    Response::error(req_id.clone(), error_codes::INTERNAL_ERROR, e.to_string())
                })?;
                Ok(Response::success(req_id.clone(), make_texty_result(text, payload)))
            })
            .await
        }
        "list_chains" => {
            let chains = chains::list_chains(&state.config.chain_overrides);
            let text = chains
                .iter()
                .map(|c| format!("{} ({}): {}", c.id, c.short_name, c.name))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(Response::success(
                req_id.clone(),
                make_texty_result(text, json!({ "chains": chains })),
            ))
        }
        _ => Err(Response::error(
            req_id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Unknown tool: {}", tool_name),
        )),
    };

    match res {
        Ok(r) => r,
        Err(e) => e,
    }
}

fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "web3_url_gateway",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "Resolves web3:// URLs to read-only smart contract calls on EVM chains and returns their content.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let tools = json!([
        {
            "name": "web3_resolve",
            "description": "Resolve a web3:// URL into the chain, contract and call it stands for, without executing it.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "A web3:// URL, e.g. web3://vitalik.eth/ or web3://0x...:137/tokenURI/1"}
                },
                "required": ["url"],
                "additionalProperties": false
            }
        },
        {
            "name": "web3_fetch",
            "description": "Fetch the content a web3:// URL points to by calling the contract (read-only).",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "A web3:// URL."}
                },
                "required": ["url"],
                "additionalProperties": false
            }
        },
        {
            "name": "list_chains",
            "description": "List the chains web3:// URLs can address, including configured overrides.",
            "inputSchema": { "type": "object", "properties": {}, "additionalProperties": false }
        },
    ]);
    Response::success(req.id.clone(), json!({ "tools": tools }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_texty_result() {
        let wrapped = make_texty_result("hi".into(), json!({"a": 1}));
        assert_eq!(wrapped["a"], 1);
        assert_eq!(wrapped["content"][0]["text"], "hi");

        let scalar = make_texty_result("n".into(), json!(3));
        assert_eq!(scalar["data"], 3);
    }

    #[test]
    fn test_tools_list() {
        let req = Request {
            jsonrpc: "2.0".into(),
            id: json!(1),
            method: "tools/list".into(),
            params: None,
        };
        let resp = handle_tools_list(&req);
        let tools = resp.result.unwrap()["tools"].clone();
        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(names, vec!["web3_resolve", "web3_fetch", "list_chains"]);
    }
}
