use crate::common::error::PipelineError;
use crate::common::markup::to_chat_markup;
use crate::infrastructure::ai::TextGenerator;
use crate::infrastructure::chat::ChatDelivery;
use crate::infrastructure::speech::SpeechToText;
use crate::infrastructure::staging::area::{StageDir, StagingArea};
use crate::modules::minutes::events::MinutesJob;
use crate::modules::minutes::prompts;
use crate::state::AppState;
use futures_util::future::try_join_all;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

/// Transcription providers cap the audio payload; larger files are split.
const MAX_PART_BYTES: u64 = 20 * 1024 * 1024;

const DEFAULT_LOCALE: &str = "ja-JP";

const RETRY_INSTRUCTION: &str = "お手数ですが、動画をもう一度アップロードしてください。";

/// Strictly sequential stages. The only branch is into Failed, reachable
/// from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    AudioExtracted,
    Transcribed,
    MinutesGenerated,
    EmailGenerated,
    Delivered,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::AudioExtracted => "audio_extracted",
            PipelineStage::Transcribed => "transcribed",
            PipelineStage::MinutesGenerated => "minutes_generated",
            PipelineStage::EmailGenerated => "email_generated",
            PipelineStage::Delivered => "delivered",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs one job end to end. Spawned as a detached task by the upload
/// handler; the HTTP response has already been sent, so every failure from
/// here on is communicated to the recipient over chat only.
pub async fn process_job(state: AppState, job: MinutesJob) {
    info!(job_id = %job.id, stage = %PipelineStage::Received, "pipeline started");
    let staging = StagingArea::open(&state.config.staging_root, job.id);

    match run(&state, &job, &staging).await {
        Ok(()) => {
            info!(job_id = %job.id, stage = %PipelineStage::Delivered, "pipeline finished");
        }
        Err(e) => {
            error!(job_id = %job.id, stage = %PipelineStage::Failed, "pipeline failed: {}", e);
            notify_failure(state.chat.as_ref(), &job.user_id, &e).await;
        }
    }

    staging.remove();
}

async fn run(
    state: &AppState,
    job: &MinutesJob,
    staging: &StagingArea,
) -> Result<(), PipelineError> {
    let video = staging.sole_artifact(StageDir::Uploads)?;

    staging.clear(StageDir::Audio)?;
    let audio = state
        .media
        .extract_audio(&video, &staging.dir(StageDir::Audio))
        .await?;
    let parts = state.media.split_audio(&audio, MAX_PART_BYTES).await?;
    info!(job_id = %job.id, stage = %PipelineStage::AudioExtracted, "{} audio part(s)", parts.len());

    staging.clear(StageDir::Transcript)?;
    let transcript_path = staging
        .dir(StageDir::Transcript)
        .join(artifact_name(&job.video_filename, "txt"));
    transcribe_parts(state.speech.as_ref(), &parts, DEFAULT_LOCALE, &transcript_path).await?;
    info!(job_id = %job.id, stage = %PipelineStage::Transcribed, "transcript ready");

    let transcript = tokio::fs::read_to_string(&transcript_path).await?;
    let minutes_prompt = job
        .minutes_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_MINUTES_PROMPT);
    let minutes = generate_document(state.ai.as_ref(), minutes_prompt, &transcript).await?;
    staging.clear(StageDir::Minutes)?;
    let minutes_path = staging
        .dir(StageDir::Minutes)
        .join(artifact_name(&job.video_filename, "txt"));
    tokio::fs::write(&minutes_path, &minutes).await?;
    info!(job_id = %job.id, stage = %PipelineStage::MinutesGenerated, "minutes ready");

    let email_prompt = job
        .email_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_EMAIL_PROMPT);
    let email = generate_document(state.ai.as_ref(), email_prompt, &minutes).await?;
    staging.clear(StageDir::Email)?;
    let email_path = staging
        .dir(StageDir::Email)
        .join(artifact_name(&job.video_filename, "txt"));
    tokio::fs::write(&email_path, &email).await?;
    info!(job_id = %job.id, stage = %PipelineStage::EmailGenerated, "email draft ready");

    let channel = state.chat.open_conversation(&job.user_id).await?;
    state.chat.post_message(&channel, &minutes).await?;
    state.chat.post_message(&channel, &email).await?;

    Ok(())
}

/// Artifact filenames reuse the upload's name with the extension swapped.
fn artifact_name(upload_filename: &str, ext: &str) -> String {
    let stem = Path::new(upload_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    format!("{}.{}", stem, ext)
}

/// Transcribes every part and assembles the transcript, one segment per
/// line. Parts run concurrently and may resolve in any order; `try_join_all`
/// hands back the results in input order and the append below runs strictly
/// by ascending part index, so the transcript is always chronological.
async fn transcribe_parts(
    speech: &dyn SpeechToText,
    parts: &[PathBuf],
    locale: &str,
    out: &Path,
) -> Result<(), PipelineError> {
    let calls = parts.iter().map(|part| async move {
        let audio = tokio::fs::read(part).await?;
        speech.transcribe(audio, locale).await
    });
    let results = try_join_all(calls).await?;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(out)
        .await?;
    for segments in results {
        for segment in segments {
            file.write_all(segment.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }
    }
    file.flush().await?;
    Ok(())
}

/// One generation call plus the markdown-to-chat-markup pass. The prompt
/// binding (transcript→minutes, minutes→email) is data, not a code fork.
async fn generate_document(
    ai: &dyn TextGenerator,
    prompt: &str,
    document: &str,
) -> Result<String, PipelineError> {
    let raw = ai.generate(prompts::SYSTEM_INSTRUCTION, prompt, document).await?;
    Ok(to_chat_markup(&raw))
}

/// Exactly one best-effort failure notification. There is no further
/// escalation path, so a failure of the notification itself is only logged.
async fn notify_failure(chat: &dyn ChatDelivery, user_id: &str, failure: &PipelineError) {
    let text = format!(
        "議事録の作成に失敗しました: {}\n{}",
        failure.user_message(),
        RETRY_INSTRUCTION
    );

    let delivery = async {
        let channel = chat.open_conversation(user_id).await?;
        chat.post_message(&channel, &text).await
    };
    if let Err(e) = delivery.await {
        warn!("failure notification could not be delivered: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::AppConfig;
    use crate::infrastructure::ai::MockTextGenerator;
    use crate::infrastructure::chat::MockChatDelivery;
    use crate::infrastructure::media::MockAudioTranscoder;
    use crate::infrastructure::speech::MockSpeechToText;
    use async_trait::async_trait;
    use mockall::Sequence;
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn test_config(staging_root: &Path) -> AppConfig {
        AppConfig {
            server_port: 0,
            staging_root: staging_root.to_path_buf(),
            speech_api_key: String::new(),
            speech_region: "japaneast".to_string(),
            gemini_api_key: String::new(),
            gemini_model: "test".to_string(),
            slack_bot_token: String::new(),
        }
    }

    fn test_job() -> MinutesJob {
        MinutesJob {
            id: Uuid::new_v4(),
            user_id: "U0123456789".to_string(),
            video_filename: "meeting.mp4".to_string(),
            minutes_prompt: None,
            email_prompt: None,
        }
    }

    fn state_with(
        staging_root: &Path,
        media: MockAudioTranscoder,
        speech: MockSpeechToText,
        ai: MockTextGenerator,
        chat: MockChatDelivery,
    ) -> AppState {
        AppState::new(
            test_config(staging_root),
            Arc::new(media),
            Arc::new(speech),
            Arc::new(ai),
            Arc::new(chat),
        )
    }

    struct OutOfOrderSpeech;

    #[async_trait]
    impl SpeechToText for OutOfOrderSpeech {
        async fn transcribe(
            &self,
            audio: Vec<u8>,
            _locale: &str,
        ) -> Result<Vec<String>, PipelineError> {
            // Earlier parts finish later, exercising the ordering guarantee.
            let (delay_ms, segment) = match audio.as_slice() {
                b"p0" => (30, "a"),
                b"p1" => (10, "b"),
                _ => (0, "c"),
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(vec![segment.to_string()])
        }
    }

    #[tokio::test]
    async fn transcript_preserves_part_order() {
        let tmp = TempDir::new().unwrap();
        let mut parts = Vec::new();
        for (i, content) in [b"p0", b"p1", b"p2"].iter().enumerate() {
            let path = tmp.path().join(format!("meeting.part{:03}.wav", i));
            fs::write(&path, content).unwrap();
            parts.push(path);
        }
        let out = tmp.path().join("meeting.txt");

        transcribe_parts(&OutOfOrderSpeech, &parts, DEFAULT_LOCALE, &out)
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "a\nb\nc\n");
    }

    #[tokio::test]
    async fn happy_path_delivers_minutes_then_email() {
        let tmp = TempDir::new().unwrap();
        let job = test_job();
        let staging = StagingArea::create(tmp.path(), job.id).unwrap();
        staging.store_upload("meeting.mp4", b"video-bytes").unwrap();

        let mut media = MockAudioTranscoder::new();
        media.expect_extract_audio().times(1).returning(|_, out_dir| {
            let audio = out_dir.join("meeting.wav");
            fs::write(&audio, b"wav-bytes").unwrap();
            Ok(audio)
        });
        media
            .expect_split_audio()
            .times(1)
            .returning(|audio, _| Ok(vec![audio.to_path_buf()]));

        let mut speech = MockSpeechToText::new();
        speech
            .expect_transcribe()
            .times(1)
            .returning(|_, _| Ok(vec!["おはようございます".to_string(), "始めます".to_string()]));

        let mut ai = MockTextGenerator::new();
        ai.expect_generate()
            .withf(|system, prompt, document| {
                system == prompts::SYSTEM_INSTRUCTION
                    && prompt == prompts::DEFAULT_MINUTES_PROMPT
                    && document == "おはようございます\n始めます\n"
            })
            .times(1)
            .returning(|_, _, _| Ok("# 議事録\n**決定事項** あり".to_string()));
        ai.expect_generate()
            .withf(|_, prompt, document| {
                prompt == prompts::DEFAULT_EMAIL_PROMPT && document == "議事録\n*決定事項* あり"
            })
            .times(1)
            .returning(|_, _, _| Ok("# メール\n* 次回日程".to_string()));

        let mut chat = MockChatDelivery::new();
        let mut seq = Sequence::new();
        chat.expect_open_conversation()
            .withf(|user| user == "U0123456789")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("C0000000001".to_string()));
        chat.expect_post_message()
            .withf(|channel, text| channel == "C0000000001" && text == "議事録\n*決定事項* あり")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        chat.expect_post_message()
            .withf(|channel, text| channel == "C0000000001" && text == "メール\n- 次回日程")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let state = state_with(tmp.path(), media, speech, ai, chat);
        process_job(state, job.clone()).await;

        // terminal state tears the job area down
        assert!(!tmp.path().join(job.id.to_string()).exists());
    }

    #[tokio::test]
    async fn stage_failure_sends_one_notification_with_the_message() {
        let tmp = TempDir::new().unwrap();
        let job = test_job();
        let staging = StagingArea::create(tmp.path(), job.id).unwrap();
        staging.store_upload("meeting.mp4", b"video-bytes").unwrap();

        let mut media = MockAudioTranscoder::new();
        media
            .expect_extract_audio()
            .times(1)
            .returning(|_, _| Err(PipelineError::Transcode("codec not found".to_string())));
        media.expect_split_audio().never();

        let speech = MockSpeechToText::new();
        let ai = MockTextGenerator::new();

        let mut chat = MockChatDelivery::new();
        chat.expect_open_conversation()
            .times(1)
            .returning(|_| Ok("C0000000001".to_string()));
        chat.expect_post_message()
            .withf(|_, text| text.contains("codec not found") && text.contains(RETRY_INSTRUCTION))
            .times(1)
            .returning(|_, _| Ok(()));

        let state = state_with(tmp.path(), media, speech, ai, chat);
        process_job(state, job).await;
    }

    #[tokio::test]
    async fn failed_notification_is_swallowed() {
        let tmp = TempDir::new().unwrap();
        let job = test_job();
        StagingArea::create(tmp.path(), job.id).unwrap();
        // uploads dir left empty: the run fails on the missing artifact

        let media = MockAudioTranscoder::new();
        let speech = MockSpeechToText::new();
        let ai = MockTextGenerator::new();

        let mut chat = MockChatDelivery::new();
        chat.expect_open_conversation()
            .times(1)
            .returning(|_| Err(PipelineError::Delivery("token revoked".to_string())));
        chat.expect_post_message().never();

        let state = state_with(tmp.path(), media, speech, ai, chat);
        // must not panic or propagate
        process_job(state, job).await;
    }

    #[tokio::test]
    async fn empty_generation_fails_the_job() {
        let tmp = TempDir::new().unwrap();
        let job = test_job();
        let staging = StagingArea::create(tmp.path(), job.id).unwrap();
        staging.store_upload("meeting.mp4", b"video-bytes").unwrap();

        let mut media = MockAudioTranscoder::new();
        media.expect_extract_audio().times(1).returning(|_, out_dir| {
            let audio = out_dir.join("meeting.wav");
            fs::write(&audio, b"wav-bytes").unwrap();
            Ok(audio)
        });
        media
            .expect_split_audio()
            .times(1)
            .returning(|audio, _| Ok(vec![audio.to_path_buf()]));

        let mut speech = MockSpeechToText::new();
        speech
            .expect_transcribe()
            .times(1)
            .returning(|_, _| Ok(vec!["発言".to_string()]));

        let mut ai = MockTextGenerator::new();
        ai.expect_generate()
            .times(1)
            .returning(|_, _, _| Err(PipelineError::Generation("provider returned no candidates".to_string())));

        let mut chat = MockChatDelivery::new();
        chat.expect_open_conversation()
            .times(1)
            .returning(|_| Ok("C0000000001".to_string()));
        chat.expect_post_message()
            .withf(|_, text| text.contains("no candidates"))
            .times(1)
            .returning(|_, _| Ok(()));

        let state = state_with(tmp.path(), media, speech, ai, chat);
        process_job(state, job).await;
    }

    #[test]
    fn artifact_name_swaps_the_extension() {
        assert_eq!(artifact_name("meeting.mp4", "txt"), "meeting.txt");
        assert_eq!(artifact_name("MEETING.MP4", "wav"), "MEETING.wav");
        assert_eq!(artifact_name("weird", "txt"), "weird.txt");
    }
}
