//! HTTP surface for the SparkyFitness MCP server.
//!
//! The router exposes two endpoints:
//!
//! - `GET /health`: liveness probe, always answered with `200 OK` and never authenticated.
//! - `/mcp`: the streamable HTTP MCP endpoint, guarded by HTTP basic authentication when
//!   credentials are configured.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};

use crate::{config::BasicAuthCredentials, mcp::SparkyFitnessMcpServer};

/// Realm advertised in `WWW-Authenticate` challenges.
const AUTH_REALM: &str = "Basic realm=\"MCP Server\"";

/// Path the MCP service is mounted under.
pub const MCP_PATH: &str = "/mcp";

/// Build the HTTP router serving the health probe and the MCP endpoint.
pub fn create_router(
    server: SparkyFitnessMcpServer,
    basic_auth: Option<BasicAuthCredentials>,
    session_idle_timeout: Duration,
) -> Router {
    let mut sessions = LocalSessionManager::default();
    sessions.session_config.keep_alive = Some(session_idle_timeout);

    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(sessions),
        StreamableHttpServerConfig {
            stateful_mode: true,
            ..Default::default()
        },
    );

    let mut mcp = Router::new().nest_service(MCP_PATH, mcp_service);
    if let Some(credentials) = basic_auth {
        mcp = mcp.route_layer(middleware::from_fn_with_state(
            Arc::new(credentials),
            require_basic_auth,
        ));
    }

    Router::new().route("/health", get(health)).merge(mcp)
}

async fn health() -> &'static str {
    "OK"
}

async fn require_basic_auth(
    State(expected): State<Arc<BasicAuthCredentials>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic_credentials)
        .is_some_and(|(username, password)| {
            username == expected.username && password == expected.password
        });

    if authorized {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "Rejected MCP request without valid credentials");
    unauthorized()
}

/// Split a `Basic` authorization header into username and password.
fn decode_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn unauthorized() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized\n").into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(AUTH_REALM),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::handlers::testing::StubFitnessApi;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use tower::ServiceExt;

    fn router(basic_auth: Option<BasicAuthCredentials>) -> Router {
        let server = SparkyFitnessMcpServer::new(Arc::new(StubFitnessApi::default()));
        create_router(server, basic_auth, Duration::from_secs(60))
    }

    fn credentials() -> BasicAuthCredentials {
        BasicAuthCredentials {
            username: "admin".into(),
            password: "s3cret".into(),
        }
    }

    fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
        request(Method::GET, uri, authorization)
    }

    fn request(method: Method, uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).expect("request")
    }

    fn basic(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }

    #[tokio::test]
    async fn health_is_public_with_and_without_auth() {
        for auth in [None, Some(credentials())] {
            let response = router(auth)
                .oneshot(get("/health", None))
                .await
                .expect("router response");

            assert_eq!(response.status(), StatusCode::OK);
            let body = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body bytes");
            assert_eq!(&body[..], b"OK");
        }
    }

    #[tokio::test]
    async fn mcp_requires_credentials_when_configured() {
        let response = router(Some(credentials()))
            .oneshot(get("/mcp/", None))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"MCP Server\""
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], b"Unauthorized\n");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let header_value = basic("admin", "guess");
        let response = router(Some(credentials()))
            .oneshot(get("/mcp", Some(&header_value)))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_credentials_reach_mcp_service() {
        let header_value = basic("admin", "s3cret");
        let response = router(Some(credentials()))
            .oneshot(request(Method::PUT, "/mcp/", Some(&header_value)))
            .await
            .expect("router response");

        // The MCP service itself only speaks GET, POST and DELETE.
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn mcp_is_open_without_configured_auth() {
        let response = router(None)
            .oneshot(request(Method::PUT, "/mcp/", None))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn basic_header_parsing() {
        assert_eq!(
            decode_basic_credentials(&basic("user", "pa:ss")),
            Some(("user".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(decode_basic_credentials("Bearer abc"), None);
        assert_eq!(decode_basic_credentials("Basic !!!"), None);
    }
}
