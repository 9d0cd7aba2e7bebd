//! View rendering for the analysis dashboard.
//!
//! Pure function of the stored [`JobState`]: each phase gets its own panel
//! (upload console, transfer progress, live processing counters, results).
//! The results panel renders the detection table with presentation-side
//! plate normalization, a free-text filter, the processed-video download
//! link and a CSV export button.

use common::jobs::{JobPhase, JobState};
use web_sys::{HtmlInputElement, InputEvent};
use yew::html::Scope;
use yew::prelude::*;

use crate::api;

use super::helpers::{plate_display, plates_detected, row_matches_filter, vehicle_counts};
use super::messages::Msg;
use super::state::AnalysisDashboardComponent;

pub fn view(component: &AnalysisDashboardComponent, ctx: &Context<AnalysisDashboardComponent>) -> Html {
    let link = ctx.link();
    let state = component.store.get();

    html! {
        <div class="analysis-root">
            { build_header(state) }
            {
                match state.phase {
                    JobPhase::Idle => build_upload_console(component, link, None),
                    JobPhase::Uploading => build_upload_progress(state),
                    JobPhase::Processing => build_processing_panel(state),
                    JobPhase::Complete => build_results(component, link, state),
                    JobPhase::Error => {
                        build_upload_console(component, link, state.error_message.as_deref())
                    }
                }
            }
        </div>
    }
}

fn phase_label(phase: JobPhase) -> &'static str {
    match phase {
        JobPhase::Idle => "Standby",
        JobPhase::Uploading => "Uploading",
        JobPhase::Processing => "Analyzing",
        JobPhase::Complete => "Complete",
        JobPhase::Error => "Failed",
    }
}

fn build_header(state: &JobState) -> Html {
    html! {
        <header class="analysis-header">
            <div>
                <h1>{"SITA"}</h1>
                <p class="subtitle">{"Traffic video analysis"}</p>
            </div>
            <span class={classes!("phase-badge", format!("phase-{}", phase_label(state.phase).to_lowercase()))}>
                { phase_label(state.phase) }
            </span>
        </header>
    }
}

/// Upload console, shown when idle and (with the error banner) after a
/// failed job. The file input stays hidden; the button forwards to it.
fn build_upload_console(
    component: &AnalysisDashboardComponent,
    link: &Scope<AnalysisDashboardComponent>,
    error: Option<&str>,
) -> Html {
    let onchange = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.get(0));
        // Clearing the value lets the same file be picked again.
        input.set_value("");
        Msg::FileSelected(file)
    });

    html! {
        <section class="upload-console">
            if let Some(message) = error {
                <p class="error-banner">{ message.to_string() }</p>
            }
            <input
                ref={component.file_input_ref.clone()}
                type="file"
                accept="video/*"
                style="display: none;"
                onchange={onchange}
            />
            <button class="primary-btn" onclick={link.callback(|_| Msg::OpenFilePicker)}>
                { if error.is_some() { "Upload another video" } else { "Select video feed" } }
            </button>
            <p class="hint">{"Upload a traffic recording to count vehicles, classify colors and read number plates."}</p>
        </section>
    }
}

fn build_upload_progress(state: &JobState) -> Html {
    html! {
        <section class="progress-panel">
            { build_progress_bar(state.upload_progress) }
            <p class="progress-label">
                { format!("Uploading... {:.0}%", state.upload_progress) }
            </p>
        </section>
    }
}

fn build_processing_panel(state: &JobState) -> Html {
    let counters = &state.counters;
    html! {
        <section class="progress-panel">
            { build_progress_bar(state.processing_progress) }
            <p class="progress-label">{"Analyzing video on the server..."}</p>
            <div class="counter-grid">
                { build_counter("Vehicles", counters.total) }
                { build_counter("Cars", counters.cars) }
                { build_counter("Bikes", counters.bikes) }
                { build_counter("Trucks", counters.trucks) }
            </div>
        </section>
    }
}

fn build_counter(label: &'static str, value: u32) -> Html {
    html! {
        <div class="counter-cell">
            <span class="counter-value">{ value }</span>
            <span class="counter-label">{ label }</span>
        </div>
    }
}

fn build_progress_bar(percent: f64) -> Html {
    html! {
        <div class="progress-track">
            <div class="progress-fill" style={format!("width: {:.0}%;", percent.clamp(0.0, 100.0))} />
        </div>
    }
}

fn build_results(
    component: &AnalysisDashboardComponent,
    link: &Scope<AnalysisDashboardComponent>,
    state: &JobState,
) -> Html {
    let rows = &state.report_rows;

    html! {
        <section class="results-panel">
            <div class="results-actions">
                if let Some(token) = &state.video_link {
                    <a class="primary-btn" href={api::download_url(token)} download="">
                        {"Download processed video"}
                    </a>
                }
                <button
                    class="secondary-btn"
                    disabled={rows.is_empty()}
                    onclick={link.callback(|_| Msg::ExportCsv)}
                >
                    {"Export CSV"}
                </button>
                <button class="secondary-btn" onclick={link.callback(|_| Msg::ClearJob)}>
                    {"New analysis"}
                </button>
            </div>

            { build_stats_strip(state) }

            {
                if rows.is_empty() {
                    if component.report_in_flight {
                        html! { <p class="hint">{"Retrieving detection report..."}</p> }
                    } else {
                        // Report fetch failed; the processed video above is
                        // still the primary artifact.
                        html! { <p class="hint">{"Detection report unavailable."}</p> }
                    }
                } else {
                    build_report_table(component, link, state)
                }
            }
        </section>
    }
}

fn build_stats_strip(state: &JobState) -> Html {
    let rows = &state.report_rows;
    let counts = vehicle_counts(rows);
    html! {
        <div class="counter-grid">
            { build_counter("Total", rows.len() as u32) }
            { build_counter("Cars", *counts.get("car").unwrap_or(&0) as u32) }
            { build_counter("Bikes", *counts.get("bike").unwrap_or(&0) as u32) }
            { build_counter("Trucks", *counts.get("truck").unwrap_or(&0) as u32) }
            { build_counter("Plates read", plates_detected(rows) as u32) }
        </div>
    }
}

fn build_report_table(
    component: &AnalysisDashboardComponent,
    link: &Scope<AnalysisDashboardComponent>,
    state: &JobState,
) -> Html {
    let filter = component.filter_text.clone();
    let oninput = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::SetFilter(input.value())
    });

    let visible = state
        .report_rows
        .iter()
        .filter(|row| row_matches_filter(row, &component.filter_text));

    html! {
        <div class="report-table">
            <input
                class="filter-input"
                type="text"
                placeholder="Filter by type, color or plate"
                value={filter}
                oninput={oninput}
            />
            <table>
                <thead>
                    <tr>
                        <th>{"#"}</th>
                        <th>{"Vehicle"}</th>
                        <th>{"Color"}</th>
                        <th>{"Number plate"}</th>
                    </tr>
                </thead>
                <tbody>
                    {
                        for visible.enumerate().map(|(index, row)| {
                            let plate = plate_display(row);
                            let missing = row
                                .number_plate
                                .as_deref()
                                .map_or(true, |p| p.trim().is_empty());
                            html! {
                                <tr key={index}>
                                    <td>{ format!("#{}", 1000 + index) }</td>
                                    <td>{ row.vehicle_type.clone() }</td>
                                    <td>{ row.color.clone() }</td>
                                    <td class={classes!(missing.then_some("plate-missing"))}>
                                        { plate.to_string() }
                                    </td>
                                </tr>
                            }
                        })
                    }
                </tbody>
            </table>
        </div>
    }
}
