//! services/api/src/web/rest.rs
//!
//! Contains the JSON endpoints other than the relay and the master
//! definition for the OpenAPI specification.

use crate::web::gate::{has_cookie, SETUP_COOKIE};
use axum::{http::HeaderMap, response::Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::relay::relay_handler,
        check_config_handler,
    ),
    components(
        schemas(RelayRequestSchema, RelayReplySchema, RelayFailureSchema, CheckConfigResponse)
    ),
    tags(
        (name = "Reading List API", description = "Relay and configuration endpoints for the reading-list client.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A request for the relay to perform.
#[derive(Deserialize, ToSchema)]
#[schema(as = RelayRequest)]
#[allow(dead_code)]
pub struct RelayRequestSchema {
    /// Absolute URL of the remote resource.
    url: String,
    /// HTTP method, `GET` when omitted.
    method: Option<String>,
    headers: Option<BTreeMap<String, String>>,
    /// JSON payload, sent unless the content type is form-encoded.
    #[schema(value_type = Option<Object>)]
    data: Option<serde_json::Value>,
    /// Pre-encoded form body.
    body: Option<String>,
}

/// The upstream outcome as seen by the relay.
#[derive(Deserialize, ToSchema)]
#[schema(as = RelayReply)]
#[allow(dead_code)]
pub struct RelayReplySchema {
    status: u16,
    #[serde(rename = "statusText")]
    status_text: String,
    headers: BTreeMap<String, String>,
    /// Parsed JSON, or the raw text when the body is not JSON.
    #[schema(value_type = Object)]
    data: serde_json::Value,
}

#[derive(Deserialize, ToSchema)]
#[schema(as = RelayFailure)]
#[allow(dead_code)]
pub struct RelayFailureSchema {
    error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckConfigResponse {
    pub configured: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Report whether the browser has completed setup.
#[utoipa::path(
    get,
    path = "/api/check-config",
    responses(
        (status = 200, description = "Setup state of the caller", body = CheckConfigResponse)
    )
)]
pub async fn check_config_handler(headers: HeaderMap) -> Json<CheckConfigResponse> {
    let configured = has_cookie(&headers, SETUP_COOKIE).unwrap_or_else(|e| {
        warn!("Could not read setup cookie: {}", e);
        false
    });
    Json(CheckConfigResponse { configured })
}
