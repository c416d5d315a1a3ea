// src/mcp/stdio.rs

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::{
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};

/// Answers one line of input. `None` for blank lines and notifications.
pub async fn handle_line(line: &str, state: &AppState) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    debug!("Received: {}", line);

    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_mcp_request(request, state.clone()).await?,
        Err(parse_error) => {
            error!("JSON parse error: {}", parse_error);
            Response::error(
                serde_json::Value::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", parse_error),
            )
        }
    };

    match serde_json::to_string(&response) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            None
        }
    }
}

/// Line-delimited JSON-RPC loop; returns on EOF or I/O failure.
pub async fn serve<R, W>(reader: R, mut writer: W, state: AppState)
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(response) = handle_line(&line, &state).await else {
                    continue;
                };
                debug!("Sending: {}", response);
                let written = async {
                    writer.write_all(response.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    writer.flush().await
                }
                .await;
                if let Err(e) = written {
                    error!("Failed to write response: {}", e);
                    break;
                }
            }
            Ok(None) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, Web3Client};
    use serde_json::Value;

    fn state() -> AppState {
        AppState::new(Config::default(), Web3Client::with_rpc())
    }

    #[tokio::test]
    async fn test_serve_answers_each_request_line() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n",
            "\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "not json\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"list_chains\"}\n",
        );
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, state()).await;

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "web3_url_gateway");
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert!(responses[2]["result"]["chains"].as_array().unwrap().len() >= 10);
    }
}
