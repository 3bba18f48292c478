use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::Config;
use crate::handlers;
use crate::AppState;

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login));

    let session_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let api_routes = Router::new()
        // Users
        .route("/api/user", post(handlers::users::create_user))
        .route("/api/user/:id", get(handlers::users::get_user))
        // Daily metrics
        .route("/api/metrics/daily", post(handlers::metrics::upsert_daily_metric))
        .route("/api/metrics/history", get(handlers::metrics::metrics_history))
        .route("/api/metrics/latest", get(handlers::metrics::latest_metric))
        // AI insights
        .route("/api/ai/analyze", post(handlers::insights::analyze_metrics))
        .route("/api/ai/latest", get(handlers::insights::latest_insight))
        .route("/api/ai/history", get(handlers::insights::insight_history));

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes)
        .merge(session_routes)
        .merge(api_routes)
        .fallback(handlers::health::not_found)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db;
    use crate::services::ai::AiClient;

    const USER: &str = "3f2c8a1e-9b4d-4c6e-8f7a-1b2c3d4e5f60";

    fn app() -> Router {
        let config = Config::for_tests();
        let state = AppState {
            db: db::pool::lazy_pool(&config),
            ai: AiClient::new(&config).unwrap(),
            config: Arc::new(config),
        };
        router(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_service() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "med-brain-api");
    }

    #[tokio::test]
    async fn unknown_route_uses_envelope() {
        let (status, body) = send(get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn invalid_metric_is_rejected_before_storage() {
        let (status, body) = send(post_json(
            "/api/metrics/daily",
            json!({
                "userId": USER,
                "date": "2024-03-15",
                "sleepStart": "23:00",
                "screenTime": 3,
                "activityMinutes": 20,
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(body["details"][0]["field"], "sleepStart");
        assert_eq!(
            body["details"][0]["message"],
            "Both sleep start and end times must be provided together"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/metrics/daily")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn history_query_requires_uuid() {
        let (status, body) = send(get("/api/metrics/history?userId=abc&days=7")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid query parameters");
        assert_eq!(body["details"][0]["field"], "userId");
        assert_eq!(body["details"][0]["message"], "Invalid user ID format");
    }

    #[tokio::test]
    async fn analyze_requires_user_id() {
        let (status, body) = send(post_json("/api/ai/analyze", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "userId");
    }

    #[tokio::test]
    async fn latest_insight_requires_user_id() {
        let (status, body) = send(get("/api/ai/latest")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "userId");
    }

    #[tokio::test]
    async fn user_path_must_be_uuid() {
        let (status, body) = send(get("/api/user/42")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid path parameter");
        assert_eq!(body["details"][0]["field"], "id");
    }

    #[tokio::test]
    async fn session_routes_need_a_token() {
        let (status, body) = send(get("/api/auth/me")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "No token provided");
    }

    #[tokio::test]
    async fn repeated_auth_attempts_are_not_throttled() {
        let app = app();
        for _ in 0..8 {
            let request = post_json(
                "/api/auth/login",
                json!({ "email": "ada@example.com", "password": "" }),
            );
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn signup_validates_before_lookup() {
        let (status, body) = send(post_json(
            "/api/auth/signup",
            json!({ "email": "ada@example.com", "password": "short", "username": "ada" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "password");
    }
}
