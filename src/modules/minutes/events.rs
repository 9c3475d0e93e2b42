use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One meeting-minutes request, handed from the upload handler to the
/// pipeline worker. The id keys the job's staging area on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinutesJob {
    pub id: Uuid,
    pub user_id: String,
    pub video_filename: String,
    pub minutes_prompt: Option<String>,
    pub email_prompt: Option<String>,
}
