//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{health, query};
use crate::core::config::CorsConfig;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::core::shutdown::ShutdownService;
use crate::domain::QueryService;

pub struct ApiServer {
    host: String,
    port: u16,
    cors: CorsConfig,
    service: Arc<QueryService>,
    shutdown: ShutdownService,
}

impl ApiServer {
    pub fn new(
        host: String,
        port: u16,
        cors: CorsConfig,
        service: Arc<QueryService>,
        shutdown: ShutdownService,
    ) -> Self {
        Self {
            host,
            port,
            cors,
            service,
            shutdown,
        }
    }

    /// Serve until the shutdown signal fires
    pub async fn start(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.host
                .parse()
                .with_context(|| format!("Invalid host address: {}", self.host))?,
            self.port,
        );

        let router = build_router(self.service, &self.cors);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!(%addr, "Listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(self.shutdown.wait())
        .await?;

        tracing::debug!("Server stopped");
        Ok(())
    }
}

/// Build the full application router
pub fn build_router(service: Arc<QueryService>, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/v1/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .merge(query::routes(service))
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(cors))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::ExhaustionPolicy;
    use crate::data::llm::ScriptedBackend;
    use crate::domain::query::FilterGenerator;

    fn router(origins: &[&str]) -> Router {
        let backend = Arc::new(ScriptedBackend::replies(&[
            r#"{"filters":[{"header":"age","operator":"<","value":18}]}"#,
        ]));
        let generator = FilterGenerator::new(backend, 3, ExhaustionPolicy::Fail);
        let cors = CorsConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        };
        build_router(Arc::new(QueryService::new(generator)), &cors)
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_message() {
        let resp = router(&["*"])
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({"message": "CSV Query Genie API is running!"})
        );
    }

    #[tokio::test]
    async fn test_health() {
        let resp = router(&["*"])
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let resp = router(&["*"])
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_through_full_router() {
        let req = Request::post("/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "query": "people under 18",
                    "data": [{"name": "Alice", "age": 30}, {"name": "Bob", "age": 17}]
                })
                .to_string(),
            ))
            .unwrap();
        let resp = router(&["*"]).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([{"name": "Bob", "age": 17}]));
    }

    #[tokio::test]
    async fn test_openapi_json_served() {
        let resp = router(&["*"])
            .oneshot(Request::get("/api/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_json(resp).await["paths"]["/query"].is_object());
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let req = Request::get("/")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();
        let resp = router(&["*"]).oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        let allowed = Request::get("/")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = router(&["http://localhost:5173"]).oneshot(allowed).await.unwrap();
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );

        let denied = Request::get("/")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let resp = router(&["http://localhost:5173"]).oneshot(denied).await.unwrap();
        assert!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
