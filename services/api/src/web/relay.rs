//! services/api/src/web/relay.rs
//!
//! The same-origin relay: takes a logical request description, performs it
//! against the remote service and answers with a flattened envelope. Browsers
//! talk to this endpoint instead of the remote host to stay same-origin.

use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use reading_list_core::relay::{RelayEnvelope, RelayFailure, RelayReply, RelayRequest};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL},
    Method,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Why the relay could not perform an exchange.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("URL is required")]
    MissingUrl,
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("Invalid header {0}")]
    InvalidHeader(String),
    #[error("Failed to encode request data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

//=========================================================================================
// Forwarding
//=========================================================================================

/// Performs relay requests with a shared HTTP client.
#[derive(Clone, Debug, Default)]
pub struct Relay {
    client: reqwest::Client,
}

impl Relay {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Performs `request` and returns the upstream outcome, whatever its status.
    pub async fn forward(&self, request: RelayRequest) -> Result<RelayReply, RelayError> {
        let url = request
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(RelayError::MissingUrl)?;
        let method_name = request.method_or_default().to_ascii_uppercase();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| RelayError::InvalidMethod(method_name.clone()))?;

        let headers = outgoing_headers(request.headers.as_ref())?;
        let body = select_body(&request)?;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(url = %url, method = %method_name, "Relay request failed: {}", e);
            e
        })?;

        let status = response.status();
        info!(url = %url, method = %method_name, status = status.as_u16(), "Relayed request");

        let headers = flatten_headers(response.headers());
        let text = response.text().await?;

        Ok(RelayReply {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            data: parse_body(text),
        })
    }
}

/// Chooses the outgoing body.
///
/// GET never carries one. A form content type sends `body` verbatim, even when
/// `data` is also present; otherwise `data` (if not null) is sent as JSON.
pub fn select_body(request: &RelayRequest) -> Result<Option<String>, RelayError> {
    if request.method_or_default().eq_ignore_ascii_case("GET") {
        return Ok(None);
    }

    let is_form = request.headers.as_ref().is_some_and(|headers| {
        headers
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case("content-type") && value == FORM_CONTENT_TYPE)
    });
    if is_form {
        return Ok(request.body.clone());
    }

    match &request.data {
        None | Some(Value::Null) => Ok(None),
        Some(data) => Ok(Some(serde_json::to_string(data)?)),
    }
}

/// JSON when the text parses, the raw text otherwise.
pub fn parse_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn outgoing_headers(
    supplied: Option<&BTreeMap<String, String>>,
) -> Result<HeaderMap, RelayError> {
    let mut headers = HeaderMap::new();
    for (name, value) in supplied.into_iter().flatten() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RelayError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| RelayError::InvalidHeader(name.to_string()))?;
        headers.insert(name, value);
    }
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    Ok(headers)
}

fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}

//=========================================================================================
// HTTP Handler
//=========================================================================================

/// Forward a request to the remote service.
///
/// Always answers 200 with the upstream outcome embedded, unless the relay
/// itself cannot perform the exchange.
#[utoipa::path(
    post,
    path = "/api/proxy",
    request_body = crate::web::rest::RelayRequestSchema,
    responses(
        (status = 200, description = "Upstream exchange completed", body = crate::web::rest::RelayReplySchema),
        (status = 400, description = "Missing url or malformed body", body = crate::web::rest::RelayFailureSchema),
        (status = 500, description = "The relay could not perform the request", body = crate::web::rest::RelayFailureSchema)
    )
)]
pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state.relay.forward(request).await {
        Ok(reply) => (StatusCode::OK, Json(RelayEnvelope::Reply(reply))).into_response(),
        Err(RelayError::MissingUrl) => {
            failure(StatusCode::BAD_REQUEST, RelayError::MissingUrl.to_string())
        }
        Err(e) => {
            error!("Proxy error: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn failure(status: StatusCode, error: String) -> Response {
    (status, Json(RelayEnvelope::Failure(RelayFailure { error }))).into_response()
}
