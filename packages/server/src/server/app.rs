//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::common::AppError;
use crate::domains::posts::actions::{MAX_FILES_PER_POST, MAX_FILE_BYTES};
use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::*;

const DEV_CLIENT_URL: &str = "http://localhost:3000";

/// Headroom for the non-file multipart parts and boundaries.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
    pub environment: String,
}

/// HTTP-level settings taken from `Config`.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub environment: String,
    pub client_url: Option<String>,
    pub request_timeout: Duration,
    pub rate_limit_enabled: bool,
}

impl HttpSettings {
    fn is_production(&self) -> bool {
        self.environment == "production"
    }

    fn allowed_origin(&self) -> HeaderValue {
        let origin = match (&self.client_url, self.is_production()) {
            (Some(url), true) => url.as_str(),
            _ => DEV_CLIENT_URL,
        };
        HeaderValue::from_str(origin).unwrap_or_else(|_| {
            warn!(origin, "Invalid CLIENT_URL, falling back to development origin");
            HeaderValue::from_static(DEV_CLIENT_URL)
        })
    }
}

/// Every REST route, relative to its mount point.
fn api_routes() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Auth
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/join-family", post(join_family_handler))
        .route("/auth/profile", get(profile_handler))
        // Profile
        .route(
            "/profile/children",
            get(list_children_handler).post(add_child_handler),
        )
        .route(
            "/profile/children/:id",
            put(update_child_handler).delete(remove_child_handler),
        )
        .route("/profile/family", get(family_handler))
        .route("/profile/update", put(update_profile_handler))
        // Posts
        .route(
            "/posts",
            get(list_posts_handler).post(create_post_handler).layer(
                DefaultBodyLimit::max(MAX_FILES_PER_POST * MAX_FILE_BYTES + MULTIPART_OVERHEAD),
            ),
        )
        .route("/posts/:id", delete(delete_post_handler))
        .route("/posts/:id/like", post(like_post_handler))
        .route("/posts/:id/comments", post(add_comment_handler))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}

/// Give timed-out requests the same `{"message"}` body as other errors.
async fn render_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return AppError::RequestTimeout.into_response();
    }
    response
}

/// Build the Axum application router
///
/// Routes are served both at the root and under `/api`.
pub fn build_app(deps: ServerDeps, settings: HttpSettings) -> Router {
    let jwt_service = deps.jwt_service.clone();

    let app_state = AppState {
        deps,
        environment: settings.environment.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(settings.allowed_origin())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let mut app = Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .fallback(route_not_found)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            settings.request_timeout,
        ))
        .layer(middleware::map_response(render_timeout));

    // 100 requests per 15 minutes per client IP: one token every 9s, burst of 100
    if settings.rate_limit_enabled {
        match GovernorConfigBuilder::default()
            .per_second(9)
            .burst_size(100)
            .use_headers()
            .finish()
        {
            Some(config) => {
                app = app.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => warn!("Rate limiter configuration rejected; serving without rate limiting"),
        }
    }

    app.layer(cors).layer(TraceLayer::new_for_http())
}
