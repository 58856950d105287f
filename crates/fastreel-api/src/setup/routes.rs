//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::{auth_middleware, AuthState};
use crate::handlers;
use crate::handlers::thumbnail_upload::ASSETS_ROUTE;
use crate::middleware::reject_oversized_body;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use fastreel_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Headroom over the file cap for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState::new(&config.base.jwt_secret));

    // Protected routes (require authentication)
    let protected_routes = protected_routes(&state).layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    let app = public_routes()
        .merge(protected_routes)
        .nest_service(ASSETS_ROUTE, ServeDir::new(&config.media.assets_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.base.cors_origins.iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!(
                "CORS configured to allow all origins - not recommended for production"
            );
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .base
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Upload route bounded to `max_file_size` plus multipart framing.
fn upload_route<H, T>(handler: H, max_file_size: u64) -> MethodRouter<Arc<AppState>>
where
    H: axum::handler::Handler<T, Arc<AppState>>,
    T: 'static,
{
    let limit = max_file_size.saturating_add(MULTIPART_OVERHEAD_BYTES);
    post(handler)
        .layer(DefaultBodyLimit::max(
            usize::try_from(limit).unwrap_or(usize::MAX),
        ))
        .layer(axum::middleware::from_fn_with_state(
            limit,
            reject_oversized_body,
        ))
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route(
            "/objects/{bucket}/{*key}",
            get(handlers::objects::get_object),
        )
}

/// Protected routes (require authentication).
fn protected_routes(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/videos",
            get(handlers::video_get::list_videos).post(handlers::video_create::create_video),
        )
        .route("/api/videos/{id}", get(handlers::video_get::get_video))
        .route(
            "/api/videos/{id}/video",
            upload_route(
                handlers::video_upload::upload_video,
                state.uploads.max_video_size,
            ),
        )
        .route(
            "/api/videos/{id}/thumbnail",
            upload_route(
                handlers::thumbnail_upload::upload_thumbnail,
                state.uploads.max_thumbnail_size,
            ),
        )
}
