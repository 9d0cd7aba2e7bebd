//! Update function for the analysis dashboard.
//!
//! Every message that concerns the job is translated into a [`JobEvent`] and
//! fed through `machine::apply` against the persisted store; the effects the
//! machine returns are then carried out here (starting or stopping the poll
//! loop, spawning the report fetch, showing toasts). View-local messages
//! (filter text, file picker, CSV export) never touch the machine.

use gloo_console::{error, warn};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::job::machine::{self, Effect, JobEvent};
use crate::job::poller::{self, PollHandle};
use crate::job::{report, upload};

use super::helpers;
use super::messages::Msg;
use super::state::AnalysisDashboardComponent;

pub fn update(
    component: &mut AnalysisDashboardComponent,
    ctx: &Context<AnalysisDashboardComponent>,
    msg: Msg,
) -> bool {
    match msg {
        Msg::OpenFilePicker => {
            if let Some(input) = component.file_input_ref.cast::<web_sys::HtmlInputElement>() {
                input.click();
            }
            false
        }

        Msg::FileSelected(None) => false,

        Msg::FileSelected(Some(file)) => {
            apply_event(component, ctx, JobEvent::UploadStarted);
            component.report_in_flight = false;
            component.filter_text.clear();

            let email = ctx.props().user_email.clone();
            let progress_link = ctx.link().clone();
            let settled_link = ctx.link().clone();
            upload::submit(
                file,
                &email,
                move |percent| progress_link.send_message(Msg::UploadProgress(percent)),
                move |result| settled_link.send_message(Msg::UploadSettled(result)),
            );
            true
        }

        Msg::UploadProgress(percent) => {
            apply_event(component, ctx, JobEvent::UploadProgress(percent));
            true
        }

        Msg::UploadSettled(result) => {
            let event = JobEvent::UploadSettled(result.map_err(|err| err.to_string()));
            apply_event(component, ctx, event);
            true
        }

        Msg::StatusTick(result) => {
            if let Err(err) = &result {
                // Transient failure: absorbed, the loop retries next tick.
                warn!("status poll failed, retrying:", err.clone());
            }
            apply_event(component, ctx, JobEvent::StatusTick(result));
            true
        }

        Msg::ReportSettled(result) => {
            component.report_in_flight = false;
            if let Err(err) = &result {
                // The job stays complete; the video artifact already exists.
                error!("report fetch failed:", err.clone());
            }
            apply_event(component, ctx, JobEvent::ReportSettled(result));
            true
        }

        Msg::SetFilter(text) => {
            component.filter_text = text;
            true
        }

        Msg::ExportCsv => {
            let rows = &component.store.get().report_rows;
            if !rows.is_empty() {
                helpers::download_csv(&helpers::report_to_csv(rows));
            }
            false
        }

        Msg::ClearJob => {
            apply_event(component, ctx, JobEvent::Clear);
            component.store.clear();
            component.filter_text.clear();
            component.report_in_flight = false;
            true
        }
    }
}

fn apply_event(
    component: &mut AnalysisDashboardComponent,
    ctx: &Context<AnalysisDashboardComponent>,
    event: JobEvent,
) {
    let mut effects = Vec::new();
    component
        .store
        .set(|state| effects = machine::apply(state, event));
    run_effects(component, ctx, effects);
}

fn run_effects(
    component: &mut AnalysisDashboardComponent,
    ctx: &Context<AnalysisDashboardComponent>,
    effects: Vec<Effect>,
) {
    for effect in effects {
        match effect {
            Effect::StartPolling => start_polling(component, ctx),
            Effect::StopPolling => {
                if let Some(handle) = component.poll.take() {
                    handle.cancel();
                }
            }
            Effect::FetchReport => {
                if component.report_in_flight {
                    continue;
                }
                component.report_in_flight = true;
                let email = ctx.props().user_email.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    link.send_message(Msg::ReportSettled(report::fetch(&email).await));
                });
            }
            Effect::Notify(severity, message) => helpers::show_toast(severity, &message),
        }
    }
}

/// Starts (or restarts) the status poll loop for the current job. Also used
/// from `rendered()` when a reload restored a still-processing job.
pub fn start_polling(
    component: &mut AnalysisDashboardComponent,
    ctx: &Context<AnalysisDashboardComponent>,
) {
    if let Some(previous) = component.poll.take() {
        previous.cancel();
    }
    let handle = PollHandle::new();
    let link = ctx.link().clone();
    poller::start(&handle, ctx.props().user_email.clone(), move |result| {
        link.send_message(Msg::StatusTick(result));
    });
    component.poll = Some(handle);
}
