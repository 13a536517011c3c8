//! services/api/src/web/gate.rs
//!
//! Access gate that runs before every page is rendered.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

/// Cookie set once the user has supplied working API credentials.
pub const SETUP_COOKIE: &str = "wallabag_setup_complete";

pub const LOGIN_PATH: &str = "/login";

/// Paths reachable without completed setup (exact match or sub-path).
const PUBLIC_PATHS: [&str; 2] = [LOGIN_PATH, "/api/check-config"];

const API_PREFIX: &str = "/api";
const STATIC_PREFIX: &str = "/static";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Cookie header is not valid UTF-8")]
    MalformedCookie,
}

/// True when `path` never needs the setup marker.
pub fn bypasses_gate(path: &str) -> bool {
    let is_public = PUBLIC_PATHS
        .iter()
        .any(|p| path == *p || path.strip_prefix(p).is_some_and(|rest| rest.starts_with('/')));

    is_public
        || path.starts_with(API_PREFIX)
        || path.starts_with(STATIC_PREFIX)
        || path.contains('.')
}

/// Whether a cookie named `name` is present, whatever its value.
pub fn has_cookie(headers: &HeaderMap, name: &str) -> Result<bool, GateError> {
    for value in headers.get_all(header::COOKIE) {
        let raw = value.to_str().map_err(|_| GateError::MalformedCookie)?;
        let found = raw
            .split(';')
            .filter_map(|pair| pair.trim().split('=').next())
            .any(|cookie_name| cookie_name.trim() == name);
        if found {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn evaluate(path: &str, headers: &HeaderMap) -> Result<GateDecision, GateError> {
    if bypasses_gate(path) {
        return Ok(GateDecision::Allow);
    }
    if has_cookie(headers, SETUP_COOKIE)? {
        Ok(GateDecision::Allow)
    } else {
        Ok(GateDecision::RedirectToLogin)
    }
}

/// Middleware redirecting unconfigured navigations to the login page.
///
/// Evaluation errors let the request through; pages still check
/// authentication on their own.
pub async fn require_setup(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    match evaluate(&path, req.headers()) {
        Ok(GateDecision::Allow) => next.run(req).await,
        Ok(GateDecision::RedirectToLogin) => {
            debug!(path = %path, "Setup incomplete, redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        Err(e) => {
            warn!(path = %path, "Access gate error, allowing request: {}", e);
            next.run(req).await
        }
    }
}
