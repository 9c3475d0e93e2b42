use crate::common::upload::{read_video_field, VideoUpload};
use anyhow::Result;
use axum::extract::Multipart;
use utoipa::ToSchema;

/// OpenAPI shape of the multipart upload form.
#[derive(ToSchema)]
pub struct UploadForm {
    /// MP4 meeting recording.
    #[schema(value_type = String, format = Binary)]
    pub file: String,
    /// Slack member id of the recipient.
    pub user_id: String,
    pub minutes_prompt: Option<String>,
    pub email_prompt: Option<String>,
}

/// The parsed upload form. The video stays in memory until the recipient
/// identifier has passed validation; only then is anything staged to disk.
pub struct UploadRequest {
    pub video: Option<VideoUpload>,
    pub user_id: Option<String>,
    pub minutes_prompt: Option<String>,
    pub email_prompt: Option<String>,
}

impl UploadRequest {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut request = Self {
            video: None,
            user_id: None,
            minutes_prompt: None,
            email_prompt: None,
        };

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(|s| s.to_string());
            match name.as_deref() {
                Some("file") => request.video = Some(read_video_field(field).await?),
                Some("user_id") => request.user_id = non_empty(field.text().await?),
                Some("minutes_prompt") => request.minutes_prompt = non_empty(field.text().await?),
                Some("email_prompt") => request.email_prompt = non_empty(field.text().await?),
                _ => {}
            }
        }

        Ok(request)
    }
}

/// Browsers submit untouched form fields as empty strings.
fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
