use crate::common::response::ApiError;
use crate::infrastructure::staging::area::StagingArea;
use crate::modules::minutes::dto::UploadRequest;
use crate::modules::minutes::events::MinutesJob;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};
use tracing::{error, info};
use uuid::Uuid;

/// Slack member ids are exactly this long (e.g. "U0123456789").
pub const SLACK_USER_ID_LEN: usize = 11;

#[utoipa::path(
    post,
    path = "/api/videos",
    request_body(content = crate::modules::minutes::dto::UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 301, description = "Upload accepted, pipeline continues in the background; outcome is delivered via chat"),
        (status = 400, description = "Missing/invalid user_id or file"),
        (status = 500, description = "Staging failure")
    ),
    tag = "Minutes"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match UploadRequest::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response(),
    };

    // Recipient validation comes before anything touches the staging area.
    let user_id = match validate_user_id(form.user_id.as_deref()) {
        Ok(id) => id,
        Err(msg) => return ApiError(msg, StatusCode::BAD_REQUEST).into_response(),
    };

    let video = match form.video {
        Some(video) => video,
        None => {
            return ApiError("a video file is required".to_string(), StatusCode::BAD_REQUEST)
                .into_response()
        }
    };

    let job = MinutesJob {
        id: Uuid::new_v4(),
        user_id,
        video_filename: video.filename.clone(),
        minutes_prompt: form.minutes_prompt,
        email_prompt: form.email_prompt,
    };

    let staging = match StagingArea::create(&state.config.staging_root, job.id) {
        Ok(staging) => staging,
        Err(e) => {
            error!("failed to allocate staging area: {}", e);
            return ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response();
        }
    };
    if let Err(e) = staging.store_upload(&video.filename, &video.data) {
        error!("failed to stage upload: {}", e);
        return ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response();
    }

    info!(job_id = %job.id, "accepted upload '{}' for {}", job.video_filename, job.user_id);

    // Respond immediately; the uploader learns the outcome via chat.
    tokio::spawn(crate::workers::pipeline::process_job(state, job));

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/complete")]).into_response()
}

fn validate_user_id(user_id: Option<&str>) -> Result<String, String> {
    match user_id {
        None => Err("user_id is required".to_string()),
        Some(id) if id.len() != SLACK_USER_ID_LEN => Err(format!(
            "user_id must be exactly {} characters",
            SLACK_USER_ID_LEN
        )),
        Some(id) => Ok(id.to_string()),
    }
}

pub async fn index_page() -> Html<&'static str> {
    Html(include_str!("../../../static/index.html"))
}

pub async fn complete_page() -> Html<&'static str> {
    Html(include_str!("../../../static/complete.html"))
}
