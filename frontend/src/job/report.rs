//! Report fetcher: retrieves the structured per-vehicle detection rows once
//! the poller has seen the job complete. Fired exactly once per completed
//! job; a failure here is logged by the caller and never demotes the job,
//! since the processed video already exists.

use common::model::report::{DetectionRecord, TrafficReport};
use gloo_net::http::Request;

use crate::api;

pub async fn fetch(email: &str) -> Result<Vec<DetectionRecord>, String> {
    let response = Request::get(&api::api_url("/traffic_report"))
        .header(api::IDENTITY_HEADER, email)
        .send()
        .await
        .map_err(|err| format!("report request failed: {err}"))?;

    if response.status() != 200 {
        return Err(format!(
            "report request failed with HTTP {}",
            response.status()
        ));
    }

    let report: TrafficReport = response
        .json()
        .await
        .map_err(|err| format!("malformed report response: {err}"))?;
    Ok(report.data)
}
