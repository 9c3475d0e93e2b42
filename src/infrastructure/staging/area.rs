use crate::common::error::PipelineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// One staging directory per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageDir {
    Uploads,
    Audio,
    Transcript,
    Minutes,
    Email,
}

impl StageDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageDir::Uploads => "uploads",
            StageDir::Audio => "audio",
            StageDir::Transcript => "transcript",
            StageDir::Minutes => "minutes",
            StageDir::Email => "email",
        }
    }

    pub const ALL: [StageDir; 5] = [
        StageDir::Uploads,
        StageDir::Audio,
        StageDir::Transcript,
        StageDir::Minutes,
        StageDir::Email,
    ];
}

/// Per-job working area on disk. Each job gets an isolated directory tree
/// keyed by its id, so a second upload can never clobber the artifacts of a
/// job that is still running.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Allocates the working area for a new job, creating every stage
    /// directory up front.
    pub fn create(staging_root: &Path, job_id: Uuid) -> Result<Self, PipelineError> {
        let area = Self {
            root: staging_root.join(job_id.to_string()),
        };
        for stage in StageDir::ALL {
            fs::create_dir_all(area.dir(stage))?;
        }
        Ok(area)
    }

    /// Reopens an existing job area without touching the filesystem. Used by
    /// the worker, which receives the job after the handler staged the upload.
    pub fn open(staging_root: &Path, job_id: Uuid) -> Self {
        Self {
            root: staging_root.join(job_id.to_string()),
        }
    }

    pub fn dir(&self, stage: StageDir) -> PathBuf {
        self.root.join(stage.as_str())
    }

    /// Removes and recreates a stage directory. Calling this on a directory
    /// that does not exist is equivalent to a no-op followed by creation.
    /// Destructive: callers must have consumed any prior artifact first.
    pub fn clear(&self, stage: StageDir) -> Result<(), PipelineError> {
        let dir = self.dir(stage);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&dir)?;
        Ok(())
    }

    /// Returns the single artifact a stage directory is expected to hold.
    pub fn sole_artifact(&self, stage: StageDir) -> Result<PathBuf, PipelineError> {
        let dir = self.dir(stage);
        let mut entries = fs::read_dir(&dir)?;
        match entries.next() {
            Some(entry) => Ok(entry?.path()),
            None => Err(PipelineError::MissingArtifact(stage.as_str().to_string())),
        }
    }

    /// Writes the uploaded video into the uploads stage, clearing any prior
    /// contents first so exactly one artifact remains.
    pub fn store_upload(&self, filename: &str, data: &[u8]) -> Result<PathBuf, PipelineError> {
        self.clear(StageDir::Uploads)?;
        let path = self.dir(StageDir::Uploads).join(filename);
        fs::write(&path, data)?;
        Ok(path)
    }

    /// Best-effort teardown once the job has reached a terminal state.
    pub fn remove(self) {
        if let Err(e) = fs::remove_dir_all(&self.root) {
            warn!("failed to remove staging area {}: {}", self.root.display(), e);
        }
    }
}
