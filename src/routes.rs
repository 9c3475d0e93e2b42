use crate::docs::ApiDoc;
use crate::modules::minutes::handler;
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn configure_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handler::index_page))
        .route("/complete", get(handler::complete_page))
        .nest("/api", api_routes())
        .nest("/api", crate::modules::minutes::router())
        .layer(cors)
}

fn api_routes() -> Router<AppState> {
    Router::new().route("/health", get(|| async { "ok" }))
}
