//! HTTP surface of the to-do service: routes, request params, bearer token
//! authentication and the live `/sse` notification stream.

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use log::*;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use service::AppState;

pub use self::error::{Error, Result};

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod router;
mod sse;

/// Builds the application router with CORS applied.
pub fn app(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);
    router::define_routes(app_state).layer(cors)
}

/// Binds the configured interface and port and serves until Ctrl-C.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{interface}:{}", app_state.config.port);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(
        listener,
        app(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received, draining connections");
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::body::Body;
    use axum::http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, header::ORIGIN, Request};
    use clap::Parser;
    use service::config::Config;
    use tower::ServiceExt;

    #[tokio::test]
    async fn cors_allows_configured_origins_only() {
        let config = Config::parse_from([
            "todo_notify_rs",
            "--allowed-origins",
            "https://app.example",
        ])
        .set_jwt_secret("test-secret".to_string());
        let app_state = AppState::init(config);

        let allowed = app(app_state.clone())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(ORIGIN, "https://app.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example"
        );

        let denied = app(app_state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn invalid_origins_are_skipped() {
        // A header value cannot contain a newline
        let _layer = cors_layer(&["https://ok.example".to_string(), "bad\norigin".to_string()]);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
