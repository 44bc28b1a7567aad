//! End-to-end scenarios for the cookie store adapter, the gatekeeper, and
//! the data surface, run against the full router with a mock backend.

use std::sync::Arc;

use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;

use sessrelay_auth::{AuthConfig, BackendClient, MockAuthService};
use sessrelay_gateway::{create_router, GatewayConfig, GatewayState};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    // Point relayed mutations at a dead port and keep the bound short: the
    // sign-out scenario exercises the best-effort contract, not the relay.
    config.public_base_url = "http://127.0.0.1:9".to_string();
    config.relay.timeout_ms = 200;
    config
}

fn server_with(auth: MockAuthService) -> TestServer {
    let state = GatewayState::new(Arc::new(auth), test_config());
    TestServer::new(create_router(state)).expect("router must start")
}

fn session_cookie_header(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("sb-session={token}")).unwrap()
}

fn set_cookie_values(response: &axum_test::TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn set_cookie_scenario() {
    let server = server_with(MockAuthService::default());

    let response = server
        .post("/api/auth/cookie")
        .json(&json!({
            "name": "sb-session",
            "value": "abc123",
            "options": { "maxAge": 3600 },
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>(), json!({"success": true}));

    let cookies = set_cookie_values(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("sb-session=abc123"));
    assert!(cookies[0].contains("Max-Age=3600"));
}

#[tokio::test]
async fn delete_cookie_scenario() {
    let server = server_with(MockAuthService::default());

    let response = server
        .delete("/api/auth/cookie")
        .json(&json!({
            "name": "sb-session",
            "options": { "path": "/" },
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>(), json!({"success": true}));

    let cookies = set_cookie_values(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("sb-session="));
    assert!(cookies[0].contains("Max-Age=0"));
    assert!(cookies[0].contains("Path=/"));
}

#[tokio::test]
async fn malformed_set_body_yields_fixed_error_shape() {
    let server = server_with(MockAuthService::default());

    let response = server.post("/api/auth/cookie").text("{not json").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "Failed to set cookie"})
    );
}

#[tokio::test]
async fn malformed_delete_body_yields_fixed_error_shape() {
    let server = server_with(MockAuthService::default());

    let response = server.delete("/api/auth/cookie").text("{not json").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "Failed to delete cookie"})
    );
}

#[tokio::test]
async fn repeated_set_is_idempotent() {
    let server = server_with(MockAuthService::default());
    let body = json!({
        "name": "sb-session",
        "value": "abc123",
        "options": { "maxAge": 3600 },
    });

    let first = server.post("/api/auth/cookie").json(&body).await;
    let second = server.post("/api/auth/cookie").json(&body).await;

    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(second.status_code(), StatusCode::OK);
    assert_eq!(set_cookie_values(&first), set_cookie_values(&second));
}

#[tokio::test]
async fn cookie_set_is_visible_on_the_next_request() {
    let server = server_with(MockAuthService::default());
    let token = format!("test-session:{USER_ID}");

    // Request N: the adapter writes the cookie onto its own response.
    let set = server
        .post("/api/auth/cookie")
        .json(&json!({
            "name": "sb-session",
            "value": token,
            "options": { "maxAge": 3600, "path": "/" },
        }))
        .await;
    assert_eq!(set.status_code(), StatusCode::OK);

    // Request N+1: the browser replays the stored pair and the gatekeeper
    // sees the session.
    let pair = set_cookie_values(&set)[0]
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let next = server
        .get("/api/data/favorites")
        .add_header(COOKIE, HeaderValue::from_str(&pair).unwrap())
        .await;
    assert_eq!(next.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn cookie_delete_clears_the_session_for_the_next_request() {
    let server = server_with(MockAuthService::default());

    let cleared = server
        .delete("/api/auth/cookie")
        .json(&json!({
            "name": "sb-session",
            "options": { "path": "/" },
        }))
        .await;
    assert_eq!(cleared.status_code(), StatusCode::OK);

    // The browser drops the cookie on Max-Age=0, so the next request
    // carries none and is redirected to sign-in.
    let next = server.get("/api/data/favorites").await;
    assert_eq!(next.status_code(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn gatekeeper_redirects_without_session() {
    let server = server_with(MockAuthService::default());

    let response = server.get("/api/data/favorites").await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(LOCATION),
        Some(&HeaderValue::from_static("/signin"))
    );
}

#[tokio::test]
async fn gatekeeper_redirects_on_rejected_session() {
    let server = server_with(MockAuthService::default());

    let response = server
        .get("/api/data/favorites")
        .add_header(COOKIE, session_cookie_header("garbage"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn gatekeeper_rewrites_cookie_on_refresh() {
    let server = server_with(MockAuthService::rotating());
    let token = format!("test-session:{USER_ID}");

    let response = server
        .get("/api/data/favorites")
        .add_header(COOKIE, session_cookie_header(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let cookies = set_cookie_values(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with(&format!("sb-session={token}:r")));
    assert!(cookies[0].contains("HttpOnly"));
    assert!(cookies[0].contains("Path=/"));
}

#[tokio::test]
async fn rewritten_cookie_still_validates_on_the_next_request() {
    // Run the gatekeeper against the production backend client: the value it
    // writes back must be consumable by the next request's refresh, which
    // the real backend only accepts as a refresh token.
    let backend = MockServer::start().await;

    for (inbound, access, rotated) in [
        ("refresh-1", "access-2", "refresh-2"),
        ("refresh-2", "access-3", "refresh-3"),
    ] {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_partial_json(json!({"refresh_token": inbound})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access,
                "refresh_token": rotated,
                "expires_in": 3600,
                "user": { "id": USER_ID },
            })))
            .mount(&backend)
            .await;
    }
    // Any other grant is revoked upstream.
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&backend)
        .await;

    let auth_config = AuthConfig {
        base_url: backend.uri(),
        anon_key: "anon-key".to_string(),
    };
    let state = GatewayState::new(Arc::new(BackendClient::new(auth_config)), test_config());
    let server = TestServer::new(create_router(state)).expect("router must start");

    // Request N validates and rewrites the cookie.
    let first = server
        .get("/api/data/favorites")
        .add_header(COOKIE, session_cookie_header("refresh-1"))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let rewritten = set_cookie_values(&first)[0]
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert_eq!(rewritten, "sb-session=refresh-2");

    // Request N+1 replays exactly what request N wrote.
    let second = server
        .get("/api/data/favorites")
        .add_header(COOKIE, HeaderValue::from_str(&rewritten).unwrap())
        .await;
    assert_eq!(second.status_code(), StatusCode::OK);
    assert_eq!(
        set_cookie_values(&second)[0].split(';').next().unwrap(),
        "sb-session=refresh-3"
    );
}

#[tokio::test]
async fn data_round_trip_is_user_scoped() {
    let server = server_with(MockAuthService::default());
    let token = format!("test-session:{USER_ID}");
    let cookie = session_cookie_header(&token);

    let created = server
        .post("/api/data/favorites")
        .add_header(COOKIE, cookie.clone())
        .json(&json!({ "id": 1, "name": "first" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);

    let listed = server
        .get("/api/data/favorites")
        .add_header(COOKIE, cookie)
        .await;
    assert_eq!(listed.status_code(), StatusCode::OK);

    let body = listed.json::<serde_json::Value>();
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "first");
    assert_eq!(rows[0]["user_id"], USER_ID);
}

#[tokio::test]
async fn invalid_table_name_is_rejected() {
    let server = server_with(MockAuthService::default());
    let token = format!("test-session:{USER_ID}");

    let response = server
        .get("/api/data/Favorites")
        .add_header(COOKIE, session_cookie_header(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_out_acks_even_when_relay_is_unreachable() {
    let server = server_with(MockAuthService::default());
    let token = format!("test-session:{USER_ID}");

    // The relayed cookie removal targets a dead port; the sign-out must
    // still acknowledge, per the best-effort relay contract.
    let response = server
        .post("/api/auth/signout")
        .add_header(COOKIE, session_cookie_header(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>(), json!({"success": true}));
}

#[tokio::test]
async fn health_is_public() {
    let server = server_with(MockAuthService::default());

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>()["status"], "ok");
}
