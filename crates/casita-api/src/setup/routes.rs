//! Route configuration and setup

use crate::handlers::items;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use casita_core::{Config, MediaBackend};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router: the item API, locally served uploads when
/// the media store is on disk, and the static site bundle at the root.
pub fn build_router(config: &Config, state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/items",
            get(items::list_items)
                .post(items::create_item)
                .put(items::missing_item_id)
                .delete(items::missing_item_id),
        )
        .route(
            "/api/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .with_state(state.clone());

    let mut app = api;

    // When blobs live on the local filesystem they are served by this same
    // process. A non-relative base URL means something else (a CDN, nginx)
    // fronts them.
    if state.config.media_backend == MediaBackend::Local
        && config.uploads_base_url.starts_with('/')
    {
        app = app.nest_service(
            config.uploads_base_url.as_str(),
            ServeDir::new(&config.uploads_dir),
        );
    }

    if let Some(site_dir) = &config.static_site_dir {
        app = app.fallback_service(ServeDir::new(site_dir));
    }

    app
        // The per-file ceiling is enforced while reading multipart fields,
        // with a response the global limit layer cannot produce.
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors())
        .layer(axum::middleware::from_fn(preflight_no_content))
}

/// Reflect the caller's origin and requested headers. The API is keyless and
/// the admin page may be opened from file:// or any host.
fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}

/// Preflight requests answer 204 with no body.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
