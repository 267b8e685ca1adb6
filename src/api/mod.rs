//! HTTP API layer: system routes and OpenAPI document.

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the HTTP endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "banter-gateway",
        description = "Anonymous random-chat rendezvous gateway. Clients connect over WebSocket at `/ws`."
    ),
    paths(handlers::system::health_handler),
    components(schemas(handlers::system::HealthResponse)),
    tags((name = "System", description = "Service health"))
)]
pub struct ApiDoc;

/// Builds the API router with all HTTP endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new().merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
