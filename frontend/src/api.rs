//! Endpoint addressing and shared request plumbing for the SITA analysis
//! backend. Every request carries the user's email in an identity header;
//! for this deployment the email doubles as the session token.

use common::requests::StatusResponse;
use gloo_net::http::Request;

/// Forced IPv4 for Windows stability.
pub const API_BASE: &str = "http://127.0.0.1:7860";

pub const IDENTITY_HEADER: &str = "X-User-Email";

pub fn api_url(endpoint: &str) -> String {
    format!("{}/api{}", API_BASE, endpoint)
}

/// Download URL for a produced artifact (processed video or CSV) referenced
/// by the opaque link token the status endpoint hands out.
pub fn download_url(link: &str) -> String {
    format!("{}/api/download/{}", API_BASE, link)
}

/// Single status query. Errors are flattened to a readable string since the
/// caller either logs them (transient tick failure) or shows them as-is.
pub async fn fetch_status(email: &str) -> Result<StatusResponse, String> {
    let response = Request::get(&api_url("/status"))
        .header(IDENTITY_HEADER, email)
        .send()
        .await
        .map_err(|err| format!("status request failed: {err}"))?;

    if response.status() != 200 {
        return Err(format!(
            "status request failed with HTTP {}",
            response.status()
        ));
    }

    response
        .json::<StatusResponse>()
        .await
        .map_err(|err| format!("malformed status response: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_urls_are_rooted_under_api() {
        assert_eq!(api_url("/status"), "http://127.0.0.1:7860/api/status");
        assert_eq!(
            api_url("/traffic_report"),
            "http://127.0.0.1:7860/api/traffic_report"
        );
    }

    #[test]
    fn download_url_embeds_the_link_token() {
        assert_eq!(
            download_url("v1_processed.mp4"),
            "http://127.0.0.1:7860/api/download/v1_processed.mp4"
        );
    }
}
