use serde::{Deserialize, Serialize};

use crate::jobs::VehicleCounters;

/// Response body of `POST /upload_video`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Server-side stage of the current job as reported by `GET /status`.
///
/// `Starting` is the window between upload acceptance and the worker picking
/// the job up; the client treats it like `Processing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Idle,
    Starting,
    Processing,
    Completed,
    Error,
}

/// Response body of `GET /status`.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusResponse {
    pub status: ProcessingStatus,
    #[serde(default)]
    pub counters: Option<VehicleCounters>,
    #[serde(default)]
    pub video_link: Option<String>,
    #[serde(default)]
    pub csv_link: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_decodes_server_shape() {
        // Shape emitted by the analysis server, extra keys ignored.
        let resp: StatusResponse = serde_json::from_str(
            r#"{
                "status": "processing",
                "counters": {"total": 12, "cars": 8, "bikes": 3, "trucks": 1},
                "id": "f3b1",
                "video_link": null,
                "csv_link": null,
                "error": null
            }"#,
        )
        .unwrap();
        assert_eq!(resp.status, ProcessingStatus::Processing);
        assert_eq!(resp.counters.unwrap().cars, 8);
        assert!(resp.video_link.is_none());
    }

    #[test]
    fn completed_status_carries_links() {
        let resp: StatusResponse = serde_json::from_str(
            r#"{"status": "completed", "video_link": "v1.mp4", "csv_link": "v1.csv"}"#,
        )
        .unwrap();
        assert_eq!(resp.status, ProcessingStatus::Completed);
        assert_eq!(resp.video_link.as_deref(), Some("v1.mp4"));
    }

    #[test]
    fn upload_failure_carries_error_text() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"success": false, "error": "bad codec"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("bad codec"));
    }
}
