use serde::{Deserialize, Serialize};

/// One row of structured output produced by the backend's video analysis.
///
/// The backend assembles these rows from its per-job CSV, so every field may
/// be partially populated: a vehicle can be classified without a readable
/// plate, and older jobs may lack the auxiliary columns entirely. Rows are
/// stored exactly as received; turning an absent or empty plate into a
/// "Not Detected" marker is the presentation layer's concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Classification label, e.g. "car", "bike", "truck". Free-form.
    #[serde(default = "unknown_vehicle")]
    pub vehicle_type: String,

    /// Dominant color label, free-form.
    #[serde(default)]
    pub color: String,

    /// Recognized plate text. `None` or an empty string both mean the plate
    /// was not detected.
    #[serde(default)]
    pub number_plate: Option<String>,

    /// Frame reference within the source video. Display-only.
    #[serde(default)]
    pub frame: Option<String>,

    /// Detection confidence in [0,1]. Display-only.
    #[serde(default)]
    pub confidence: Option<f64>,
}

fn unknown_vehicle() -> String {
    "unknown".to_string()
}

/// Payload of `GET /traffic_report`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrafficReport {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<DetectionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_take_defaults() {
        let row: DetectionRecord = serde_json::from_str(r#"{"color":"blue"}"#).unwrap();
        assert_eq!(row.vehicle_type, "unknown");
        assert_eq!(row.color, "blue");
        assert_eq!(row.number_plate, None);
        assert_eq!(row.frame, None);
    }

    #[test]
    fn empty_plate_is_kept_verbatim() {
        // The wire may carry "" for an undetected plate; storage must not
        // rewrite it (normalization happens in the view).
        let row: DetectionRecord =
            serde_json::from_str(r#"{"vehicle_type":"car","color":"red","number_plate":""}"#)
                .unwrap();
        assert_eq!(row.number_plate.as_deref(), Some(""));
    }

    #[test]
    fn report_payload_decodes() {
        let report: TrafficReport = serde_json::from_str(
            r#"{
                "columns": ["vehicle_type", "color", "number_plate", "frame"],
                "data": [
                    {"vehicle_type": "truck", "color": "white", "number_plate": "MH12DE1433", "frame": "88"},
                    {"vehicle_type": "bike", "color": "black"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(report.data.len(), 2);
        assert_eq!(report.data[0].vehicle_type, "truck");
        assert_eq!(report.data[1].number_plate, None);
    }
}
