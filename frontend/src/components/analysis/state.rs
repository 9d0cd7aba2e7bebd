//! Runtime state of the analysis dashboard.
//!
//! The job itself lives in the [`JobStore`]; everything here that is not the
//! store is view-local (filter text, in-flight flags, DOM refs) and is
//! deliberately not persisted.

use yew::prelude::*;

use crate::job::poller::PollHandle;
use crate::job::store::{JobStore, LocalStorageBackend};

pub struct AnalysisDashboardComponent {
    /// The session's single job, mirrored to local storage on every write.
    pub store: JobStore<LocalStorageBackend>,

    /// Cancellation token of the running poll loop, if any.
    pub poll: Option<PollHandle>,

    /// Free-text filter over the results table. View-local.
    pub filter_text: String,

    /// Guard so a job triggers at most one report request.
    pub report_in_flight: bool,

    /// Reference to the hidden file input used for video selection.
    pub file_input_ref: NodeRef,
}

impl AnalysisDashboardComponent {
    pub fn new() -> Self {
        Self {
            store: JobStore::new(LocalStorageBackend),
            poll: None,
            filter_text: String::new(),
            report_in_flight: false,
            file_input_ref: NodeRef::default(),
        }
    }
}
