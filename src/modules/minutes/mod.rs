use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

pub mod dto;
pub mod events;
pub mod handler;
pub mod prompts;

/// Meeting videos run large; the default 2 MB body limit is far too small.
const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videos", post(handler::upload_video))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
