use serde::{Deserialize, Serialize};

use crate::model::report::DetectionRecord;

/// Discrete stage of an analysis job's lifecycle.
///
/// Phases only move forward: idle -> uploading -> processing -> complete,
/// with error reachable from uploading or processing. Going back to idle
/// requires an explicit reset (a new upload or a manual clear).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Idle,
    Uploading,
    Processing,
    Complete,
    Error,
}

/// Running vehicle totals reported by the backend while a job is processing.
/// The server always sends these four keys; anything else is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleCounters {
    pub total: u32,
    pub cars: u32,
    pub bikes: u32,
    pub trucks: u32,
}

/// UI-visible state of the single analysis job for the current session.
///
/// This struct is the persistence format: it is serialized as one JSON blob
/// into browser local storage and must round-trip losslessly so a page
/// reload can restore an in-progress or completed job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobState {
    pub phase: JobPhase,

    /// Transfer progress in percent, meaningful while `Uploading`.
    pub upload_progress: f64,

    /// Analysis progress estimate in percent, meaningful while `Processing`.
    /// The backend reports counters rather than a percentage, so this is a
    /// client-side estimate nudged toward 90 until completion.
    pub processing_progress: f64,

    pub counters: VehicleCounters,

    /// Download token of the processed output video, set on completion.
    pub video_link: Option<String>,

    /// Structured detection rows, populated once the job completes and the
    /// report has been fetched. Rows are stored verbatim as received.
    pub report_rows: Vec<DetectionRecord>,

    pub error_message: Option<String>,
}

impl Default for JobState {
    fn default() -> Self {
        JobState {
            phase: JobPhase::Idle,
            upload_progress: 0.0,
            processing_progress: 0.0,
            counters: VehicleCounters::default(),
            video_link: None,
            report_rows: Vec::new(),
            error_message: None,
        }
    }
}

impl JobState {
    /// Fresh state for a newly started upload: everything from the previous
    /// job is discarded before the transfer begins.
    pub fn fresh_upload() -> Self {
        JobState {
            phase: JobPhase::Uploading,
            ..JobState::default()
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, JobPhase::Uploading | JobPhase::Processing)
    }
}
