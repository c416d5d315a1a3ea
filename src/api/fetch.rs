// src/api/fetch.rs

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::error;

use crate::{
    api::error_response,
    resolver::models::{FetchOutput, FetchResult, WEB3_SCHEME},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

/// `Content-Type` to serve a fetch result with.
pub fn content_type(result: &FetchResult) -> String {
    match &result.output {
        FetchOutput::Json(_) => "application/json".to_string(),
        FetchOutput::Bytes(_) => result
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        FetchOutput::Decoded(_) => result
            .mime_type
            .clone()
            .unwrap_or_else(|| "text/plain; charset=utf-8".to_string()),
    }
}

/// Rebuilds `web3://<host>/<path>?<query>` from a `/w3/<host>/<path>` request,
/// keeping the path exactly as sent.
pub fn gateway_url(uri: &Uri) -> Option<String> {
    let (_, rest) = uri.path().split_once("/w3/")?;
    if rest.is_empty() {
        return None;
    }
    let mut url = format!("{}://{}", WEB3_SCHEME, rest);
    if let Some(query) = uri.query() {
        url.push('?');
        url.push_str(query);
    }
    Some(url)
}

async fn serve(state: &AppState, url: &str) -> axum::response::Response {
    match state.web3.fetch(url, &state.config.fetch_options()).await {
        Ok(result) => {
            let content_type = content_type(&result);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type)],
                result.output.to_body(),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to fetch {}: {}", url, e);
            error_response(&e)
        }
    }
}

// The handler function for the GET /resolve?url=... endpoint.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> impl IntoResponse {
    match state
        .web3
        .resolve(&query.url, &state.config.fetch_options())
        .await
    {
        Ok(intent) => (StatusCode::OK, Json(intent)).into_response(),
        Err(e) => {
            error!("Failed to resolve {}: {}", query.url, e);
            error_response(&e)
        }
    }
}

// The handler function for the GET /fetch?url=... endpoint.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> impl IntoResponse {
    serve(&state, &query.url).await
}

// The handler function for the GET /w3/:host/*path endpoint.
pub async fn gateway_handler(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    match gateway_url(&uri) {
        Some(url) => serve(&state, &url).await,
        None => (StatusCode::BAD_REQUEST, "Missing web3 host").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_url() {
        let uri: Uri = "/api/w3/site.eth:5/images/a%20b.png?x=1".parse().unwrap();
        assert_eq!(
            gateway_url(&uri).as_deref(),
            Some("web3://site.eth:5/images/a%20b.png?x=1")
        );

        let uri: Uri = "/api/w3/0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(
            gateway_url(&uri).as_deref(),
            Some("web3://0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
        );

        let uri: Uri = "/api/health".parse().unwrap();
        assert_eq!(gateway_url(&uri), None);
    }
}
