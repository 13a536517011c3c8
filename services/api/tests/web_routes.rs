//! Router-level tests for the relay endpoint, the access gate and the
//! config-check endpoint.

use api_lib::web::{app_router, relay::Relay, state::AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string, header as header_is, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app() -> Router {
    app_router(Arc::new(AppState::new(Relay::default())))
}

async fn post_relay(payload: Value) -> (StatusCode, Value) {
    post_relay_raw(payload.to_string()).await
}

async fn post_relay_raw(body: String) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::post("/api/proxy")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(uri: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut request = Request::get(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app().oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
}

mod relay_endpoint {
    use super::*;

    #[tokio::test]
    async fn missing_url_is_a_client_error() {
        let (status, body) = post_relay(json!({"method": "GET", "headers": {}})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "URL is required"}));
    }

    #[tokio::test]
    async fn form_body_is_forwarded_verbatim() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .and(header_is("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("a=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .expect(1)
            .mount(&upstream)
            .await;

        let (status, body) = post_relay(json!({
            "url": format!("{}/oauth/v2/token", upstream.uri()),
            "method": "POST",
            "headers": {"Content-Type": "application/x-www-form-urlencoded"},
            "body": "a=1",
            "data": {"b": 2}
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 200);
        assert_eq!(body["statusText"], "OK");
        assert_eq!(body["data"], json!({"access_token": "t"}));
    }

    #[tokio::test]
    async fn json_data_is_serialized_for_other_methods() {
        let upstream = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/entries/5.json"))
            .and(header_is("authorization", "Bearer tok"))
            .and(body_string(r#"{"archive":1}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
            .expect(1)
            .mount(&upstream)
            .await;

        let (status, body) = post_relay(json!({
            "url": format!("{}/api/entries/5.json", upstream.uri()),
            "method": "PATCH",
            "headers": {"Content-Type": "application/json", "Authorization": "Bearer tok"},
            "data": {"archive": 1}
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], 5);
    }

    #[tokio::test]
    async fn upstream_errors_and_text_bodies_are_enveloped() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("x-request-id", "abc")
                    .set_body_string("<h1>Not Found</h1>"),
            )
            .mount(&upstream)
            .await;

        let (status, body) = post_relay(json!({"url": format!("{}/missing", upstream.uri())})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 404);
        assert_eq!(body["statusText"], "Not Found");
        assert_eq!(body["headers"]["x-request-id"], "abc");
        assert_eq!(body["data"], "<h1>Not Found</h1>");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_server_error() {
        let (status, body) = post_relay(json!({"url": "http://127.0.0.1:1/nothing"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let (status, body) = post_relay_raw("{\"url\": ".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn unknown_method_is_a_server_error() {
        let (status, body) = post_relay(json!({
            "url": "http://127.0.0.1:1/never-contacted",
            "method": "NOT A METHOD"
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Invalid HTTP method: NOT A METHOD"}));
    }

    #[tokio::test]
    async fn invalid_headers_are_server_errors() {
        let (status, body) = post_relay(json!({
            "url": "http://127.0.0.1:1/never-contacted",
            "headers": {"bad header": "x"}
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Invalid header bad header"}));

        let (status, body) = post_relay(json!({
            "url": "http://127.0.0.1:1/never-contacted",
            "headers": {"X-Note": "line\nbreak"}
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Invalid header x-note"}));
    }
}

mod access_gate {
    use super::*;

    #[tokio::test]
    async fn gated_page_redirects_to_login_without_marker() {
        let response = get("/article/5", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");

        let response = get("/", Some("theme=dark")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn marker_lets_pages_through() {
        let response = get("/article/5", Some("wallabag_setup_complete=true")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("data-id=\"5\""));
    }

    #[tokio::test]
    async fn public_api_and_dotted_paths_bypass() {
        assert_eq!(get("/login", None).await.status(), StatusCode::OK);
        assert_eq!(get("/api/check-config", None).await.status(), StatusCode::OK);
        // Unrouted, but not redirected.
        assert_eq!(get("/api/anything", None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/favicon.ico", None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn check_config_reports_marker() {
        let response = get("/api/check-config", Some("wallabag_setup_complete=true")).await;
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"configured": true}));

        let response = get("/api/check-config", None).await;
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"configured": false}));
    }
}
