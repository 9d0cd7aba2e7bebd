//! Transition function for the analysis job lifecycle.
//!
//! Every change to [`JobState`] funnels through [`apply`]: the hosting view
//! translates callback results into [`JobEvent`]s, `apply` mutates the state
//! and answers with the side effects the view must carry out (start or stop
//! the poller, fetch the report, notify the user). Keeping this a pure
//! function over plain data is what makes the phase rules testable off the
//! browser.
//!
//! Phase rules enforced here:
//! - idle -> uploading -> processing -> complete, error reachable from
//!   uploading and processing; no other transitions without an explicit
//!   `UploadStarted` or `Clear` reset.
//! - `upload_progress` is clamped to [0,100] and never decreases.
//! - Status ticks arriving outside `Processing` are dropped, which both
//!   guards against late poll responses after cancellation and makes a
//!   duplicate "completed" tick a no-op (exactly one report fetch per job).

use common::jobs::{JobPhase, JobState};
use common::model::report::DetectionRecord;
use common::requests::{ProcessingStatus, StatusResponse, UploadResponse};

/// Something that happened to the current job, always carried with its
/// explicit success/error variant rather than as a fire-and-forget callback.
#[derive(Debug)]
pub enum JobEvent {
    /// The user picked a file and the transfer is about to begin.
    UploadStarted,
    /// Byte-level transfer progress in percent.
    UploadProgress(f64),
    /// The upload request settled, one way or the other.
    UploadSettled(Result<UploadResponse, String>),
    /// One status poll tick settled.
    StatusTick(Result<StatusResponse, String>),
    /// The report request settled.
    ReportSettled(Result<Vec<DetectionRecord>, String>),
    /// Explicit user reset back to idle.
    Clear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// Side effect the hosting view must execute after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    StartPolling,
    StopPolling,
    FetchReport,
    Notify(Severity, String),
}

/// Simulated processing estimate creeps toward this ceiling until the
/// backend reports completion (the server sends counters, not a percentage).
const SIMULATED_PROGRESS_CEILING: f64 = 90.0;

/// Applies `event` to `state`, returning the effects to run.
pub fn apply(state: &mut JobState, event: JobEvent) -> Vec<Effect> {
    match event {
        JobEvent::UploadStarted => {
            // A new job discards the previous one entirely; any live poll
            // loop belongs to the old job and must die first.
            *state = JobState::fresh_upload();
            vec![Effect::StopPolling]
        }

        JobEvent::UploadProgress(percent) => {
            if state.phase == JobPhase::Uploading {
                let clamped = percent.clamp(0.0, 100.0);
                if clamped > state.upload_progress {
                    state.upload_progress = clamped;
                }
            }
            Vec::new()
        }

        JobEvent::UploadSettled(result) => {
            if state.phase != JobPhase::Uploading {
                return Vec::new();
            }
            match result {
                Ok(response) if response.success => {
                    state.phase = JobPhase::Processing;
                    state.upload_progress = 100.0;
                    state.processing_progress = 0.0;
                    vec![
                        Effect::StartPolling,
                        Effect::Notify(Severity::Info, "Upload complete. Analyzing...".into()),
                    ]
                }
                Ok(response) => {
                    let message = response
                        .error
                        .unwrap_or_else(|| "Upload rejected by the server".to_string());
                    fail(state, message)
                }
                Err(message) => fail(state, message),
            }
        }

        JobEvent::StatusTick(result) => {
            // Stale-response guard: ticks only mean something while the job
            // is processing. This also de-duplicates "completed" ticks.
            if state.phase != JobPhase::Processing {
                return Vec::new();
            }
            match result {
                Ok(status) => on_status(state, status),
                // Transient network failure: keep polling, the caller logs.
                Err(_) => Vec::new(),
            }
        }

        JobEvent::ReportSettled(result) => {
            if state.phase != JobPhase::Complete {
                return Vec::new();
            }
            match result {
                Ok(rows) => {
                    state.report_rows = rows;
                    Vec::new()
                }
                // A missing report never demotes a completed job: the
                // processed video already exists. The caller logs.
                Err(_) => Vec::new(),
            }
        }

        JobEvent::Clear => {
            *state = JobState::default();
            vec![Effect::StopPolling]
        }
    }
}

fn on_status(state: &mut JobState, status: StatusResponse) -> Vec<Effect> {
    match status.status {
        ProcessingStatus::Starting | ProcessingStatus::Processing => {
            if let Some(counters) = status.counters {
                state.counters = counters;
            }
            state.processing_progress =
                (state.processing_progress + 1.0).min(SIMULATED_PROGRESS_CEILING);
            Vec::new()
        }
        ProcessingStatus::Completed => {
            state.phase = JobPhase::Complete;
            state.processing_progress = 100.0;
            state.video_link = status.video_link;
            if let Some(counters) = status.counters {
                state.counters = counters;
            }
            vec![
                Effect::StopPolling,
                Effect::FetchReport,
                Effect::Notify(Severity::Success, "Analysis complete".into()),
            ]
        }
        ProcessingStatus::Error => {
            let message = status
                .error
                .unwrap_or_else(|| "Analysis failed".to_string());
            fail(state, message)
        }
        // The backend answers "idle" only when it has no job at all: it was
        // restarted and lost ours. Polling forever would never resolve.
        ProcessingStatus::Idle => fail(
            state,
            "The analysis server has no record of this job".to_string(),
        ),
    }
}

fn fail(state: &mut JobState, message: String) -> Vec<Effect> {
    state.phase = JobPhase::Error;
    state.error_message = Some(message.clone());
    vec![Effect::StopPolling, Effect::Notify(Severity::Error, message)]
}

/// Reconciles a state restored from persistence after a page reload.
/// Returns whether the status poll loop should resume.
///
/// A transfer cannot survive a reload, so a restored `Uploading` state is
/// downgraded to `Processing` and polled: if the backend did accept the
/// upload the poll picks it up, and if it never did the first tick reports
/// `idle` and the job fails with an explanation.
pub fn on_restore(state: &mut JobState) -> bool {
    if state.phase == JobPhase::Uploading {
        state.phase = JobPhase::Processing;
        state.upload_progress = 100.0;
        state.processing_progress = 0.0;
    }
    state.phase == JobPhase::Processing
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::jobs::VehicleCounters;

    fn processing_tick(counters: Option<VehicleCounters>) -> JobEvent {
        JobEvent::StatusTick(Ok(StatusResponse {
            status: ProcessingStatus::Processing,
            counters,
            video_link: None,
            csv_link: None,
            error: None,
        }))
    }

    fn completed_tick(video_link: &str) -> JobEvent {
        JobEvent::StatusTick(Ok(StatusResponse {
            status: ProcessingStatus::Completed,
            counters: None,
            video_link: Some(video_link.to_string()),
            csv_link: None,
            error: None,
        }))
    }

    fn upload_ok() -> JobEvent {
        JobEvent::UploadSettled(Ok(UploadResponse {
            success: true,
            message: Some("Processing started".into()),
            job_id: Some("j1".into()),
            error: None,
        }))
    }

    fn has_effect(effects: &[Effect], wanted: &Effect) -> bool {
        effects.iter().any(|e| e == wanted)
    }

    #[test]
    fn successful_upload_then_completion() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        assert_eq!(state.phase, JobPhase::Uploading);

        let effects = apply(&mut state, upload_ok());
        assert_eq!(state.phase, JobPhase::Processing);
        assert_eq!(state.processing_progress, 0.0);
        assert!(has_effect(&effects, &Effect::StartPolling));

        let effects = apply(&mut state, completed_tick("v1.mp4"));
        assert_eq!(state.phase, JobPhase::Complete);
        assert_eq!(state.video_link.as_deref(), Some("v1.mp4"));
        assert!(has_effect(&effects, &Effect::StopPolling));
        assert!(has_effect(&effects, &Effect::FetchReport));
    }

    #[test]
    fn rejected_upload_fails_without_polling() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        let effects = apply(
            &mut state,
            JobEvent::UploadSettled(Ok(UploadResponse {
                success: false,
                message: None,
                job_id: None,
                error: Some("bad codec".into()),
            })),
        );
        assert_eq!(state.phase, JobPhase::Error);
        assert_eq!(state.error_message.as_deref(), Some("bad codec"));
        assert!(!has_effect(&effects, &Effect::StartPolling));
    }

    #[test]
    fn server_error_tick_stops_polling() {
        // Two healthy processing ticks, then a server-side failure.
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());
        apply(&mut state, processing_tick(None));
        apply(&mut state, processing_tick(None));

        let effects = apply(
            &mut state,
            JobEvent::StatusTick(Ok(StatusResponse {
                status: ProcessingStatus::Error,
                counters: None,
                video_link: None,
                csv_link: None,
                error: Some("OOM".into()),
            })),
        );
        assert_eq!(state.phase, JobPhase::Error);
        assert_eq!(state.error_message.as_deref(), Some("OOM"));
        assert!(has_effect(&effects, &Effect::StopPolling));
    }

    #[test]
    fn report_rows_are_stored_verbatim() {
        // An empty-string plate survives storage untouched.
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());
        apply(&mut state, completed_tick("v1.mp4"));

        apply(
            &mut state,
            JobEvent::ReportSettled(Ok(vec![DetectionRecord {
                vehicle_type: "car".into(),
                color: "red".into(),
                number_plate: Some(String::new()),
                frame: None,
                confidence: None,
            }])),
        );
        assert_eq!(state.report_rows.len(), 1);
        assert_eq!(state.report_rows[0].number_plate.as_deref(), Some(""));
    }

    #[test]
    fn duplicate_completed_tick_is_a_no_op() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());

        let first = apply(&mut state, completed_tick("v1.mp4"));
        assert!(has_effect(&first, &Effect::FetchReport));

        // A late second "completed" response must not refetch or regress.
        let second = apply(&mut state, completed_tick("v2.mp4"));
        assert!(second.is_empty());
        assert_eq!(state.video_link.as_deref(), Some("v1.mp4"));
    }

    #[test]
    fn transient_poll_failure_keeps_state_and_polling() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());
        apply(&mut state, processing_tick(None));
        let before = state.clone();

        let effects = apply(
            &mut state,
            JobEvent::StatusTick(Err("connection refused".into())),
        );
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn upload_progress_is_monotonic_and_bounded() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, JobEvent::UploadProgress(40.0));
        apply(&mut state, JobEvent::UploadProgress(25.0));
        assert_eq!(state.upload_progress, 40.0);
        apply(&mut state, JobEvent::UploadProgress(250.0));
        assert_eq!(state.upload_progress, 100.0);
        apply(&mut state, JobEvent::UploadProgress(-5.0));
        assert_eq!(state.upload_progress, 100.0);
    }

    #[test]
    fn phase_never_regresses_without_reset() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());
        apply(&mut state, completed_tick("v1.mp4"));

        // Upload events from a stale transfer cannot touch a completed job.
        apply(&mut state, JobEvent::UploadProgress(10.0));
        apply(&mut state, JobEvent::UploadSettled(Err("late".into())));
        assert_eq!(state.phase, JobPhase::Complete);

        // Only an explicit reset goes back.
        apply(&mut state, JobEvent::Clear);
        assert_eq!(state.phase, JobPhase::Idle);
    }

    #[test]
    fn report_failure_keeps_job_complete() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());
        apply(&mut state, completed_tick("v1.mp4"));

        let effects = apply(&mut state, JobEvent::ReportSettled(Err("HTTP 500".into())));
        assert!(effects.is_empty());
        assert_eq!(state.phase, JobPhase::Complete);
        assert!(state.report_rows.is_empty());
    }

    #[test]
    fn idle_status_while_polling_is_a_lost_job() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());

        let effects = apply(
            &mut state,
            JobEvent::StatusTick(Ok(StatusResponse {
                status: ProcessingStatus::Idle,
                counters: None,
                video_link: None,
                csv_link: None,
                error: None,
            })),
        );
        assert_eq!(state.phase, JobPhase::Error);
        assert!(has_effect(&effects, &Effect::StopPolling));
    }

    #[test]
    fn counters_merge_on_processing_ticks() {
        let mut state = JobState::default();
        apply(&mut state, JobEvent::UploadStarted);
        apply(&mut state, upload_ok());

        let counters = VehicleCounters {
            total: 5,
            cars: 3,
            bikes: 1,
            trucks: 1,
        };
        apply(&mut state, processing_tick(Some(counters)));
        assert_eq!(state.counters, counters);
        assert!(state.processing_progress > 0.0);

        // Simulated estimate never claims completion on its own.
        for _ in 0..200 {
            apply(&mut state, processing_tick(None));
        }
        assert_eq!(state.processing_progress, 90.0);
        assert_eq!(state.phase, JobPhase::Processing);
    }

    #[test]
    fn restore_resumes_polling_for_in_flight_jobs() {
        // A reload mid-processing must resume, not reset.
        let mut state = JobState {
            phase: JobPhase::Processing,
            ..JobState::default()
        };
        assert!(on_restore(&mut state));
        assert_eq!(state.phase, JobPhase::Processing);

        // A reload mid-upload cannot resume the transfer; it downgrades to
        // polling and lets the backend settle the outcome.
        let mut state = JobState {
            phase: JobPhase::Uploading,
            upload_progress: 37.0,
            ..JobState::default()
        };
        assert!(on_restore(&mut state));
        assert_eq!(state.phase, JobPhase::Processing);

        let mut state = JobState::default();
        assert!(!on_restore(&mut state));
        assert_eq!(state.phase, JobPhase::Idle);
    }

    #[test]
    fn new_upload_stops_any_previous_poll_loop() {
        let mut state = JobState {
            phase: JobPhase::Processing,
            ..JobState::default()
        };
        let effects = apply(&mut state, JobEvent::UploadStarted);
        assert!(has_effect(&effects, &Effect::StopPolling));
        assert_eq!(state.phase, JobPhase::Uploading);
        assert!(state.video_link.is_none());
        assert!(state.report_rows.is_empty());
    }
}
