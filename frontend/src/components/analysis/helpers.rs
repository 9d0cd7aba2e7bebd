//! Helpers for the analysis dashboard: pure presentation functions over the
//! stored detection rows (plate normalization, per-type counts, filtering,
//! CSV assembly) plus the DOM-side toast and download glue.

use std::collections::BTreeMap;

use common::model::report::DetectionRecord;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use crate::job::machine::Severity;

/// Marker shown for an absent or empty plate. Purely presentational: the
/// stored row keeps whatever the backend sent.
pub const PLATE_NOT_DETECTED: &str = "Not Detected";

pub fn plate_display(row: &DetectionRecord) -> &str {
    match &row.number_plate {
        Some(plate) if !plate.trim().is_empty() => plate.as_str(),
        _ => PLATE_NOT_DETECTED,
    }
}

/// Per-type totals derived from the report rows, keyed by the lowercased
/// classification label.
pub fn vehicle_counts(rows: &[DetectionRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let label = if row.vehicle_type.is_empty() {
            "unknown".to_string()
        } else {
            row.vehicle_type.to_lowercase()
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

pub fn plates_detected(rows: &[DetectionRecord]) -> usize {
    rows.iter()
        .filter(|row| plate_display(row) != PLATE_NOT_DETECTED)
        .count()
}

/// Case-insensitive match over type, color and plate. An empty or
/// whitespace-only filter matches everything.
pub fn row_matches_filter(row: &DetectionRecord, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let haystack = format!(
        "{} {} {}",
        row.vehicle_type,
        row.color,
        row.number_plate.as_deref().unwrap_or("")
    )
    .to_lowercase();
    haystack.contains(&needle)
}

/// Assembles the exported CSV. Plates are normalized to the display marker;
/// fields containing separators are quoted.
pub fn report_to_csv(rows: &[DetectionRecord]) -> String {
    let mut lines = vec!["vehicle_type,color,number_plate,frame".to_string()];
    for row in rows {
        lines.push(format!(
            "{},{},{},{}",
            csv_field(&row.vehicle_type),
            csv_field(&row.color),
            csv_field(plate_display(row)),
            csv_field(row.frame.as_deref().unwrap_or(""))
        ));
    }
    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Shows a transient toast at the bottom of the page, colored by severity.
pub fn show_toast(severity: Severity, message: &str) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                let style = html_toast.style();
                let background = match severity {
                    Severity::Info => "rgba(0, 0, 0, 0.85)",
                    Severity::Success => "rgba(16, 92, 42, 0.9)",
                    Severity::Error => "rgba(120, 24, 24, 0.9)",
                };
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", background).ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "4px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("font-family", "Arial, sans-serif").ok();

                if body.append_child(&html_toast).is_ok() {
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(3000).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

/// Hands the assembled CSV to the browser as a timestamped file download.
pub fn download_csv(csv: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let parts = js_sys::Array::of1(&JsValue::from_str(csv));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("text/csv;charset=utf-8;");
    let Ok(blob) = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options) else {
        return;
    };
    let Ok(url) = web_sys::Url::create_object_url_with_blob(&blob) else {
        return;
    };

    if let Ok(element) = document.create_element("a") {
        if let Ok(anchor) = element.dyn_into::<web_sys::HtmlAnchorElement>() {
            anchor.set_href(&url);
            anchor.set_download(&format!("SITA_REPORT_{}.csv", js_sys::Date::now() as u64));
            if let Some(body) = document.body() {
                body.append_child(&anchor).ok();
                anchor.click();
                body.remove_child(&anchor).ok();
            }
        }
    }
    web_sys::Url::revoke_object_url(&url).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vehicle: &str, color: &str, plate: Option<&str>) -> DetectionRecord {
        DetectionRecord {
            vehicle_type: vehicle.to_string(),
            color: color.to_string(),
            number_plate: plate.map(str::to_string),
            frame: None,
            confidence: None,
        }
    }

    #[test]
    fn empty_and_absent_plates_display_as_not_detected() {
        assert_eq!(plate_display(&row("car", "red", None)), PLATE_NOT_DETECTED);
        assert_eq!(
            plate_display(&row("car", "red", Some(""))),
            PLATE_NOT_DETECTED
        );
        assert_eq!(
            plate_display(&row("car", "red", Some("   "))),
            PLATE_NOT_DETECTED
        );
        assert_eq!(plate_display(&row("car", "red", Some("KA01"))), "KA01");
    }

    #[test]
    fn normalization_does_not_mutate_the_row() {
        let record = row("car", "red", Some(""));
        let _ = plate_display(&record);
        assert_eq!(record.number_plate.as_deref(), Some(""));
    }

    #[test]
    fn counts_group_by_lowercased_type() {
        let rows = vec![
            row("Car", "red", None),
            row("car", "blue", None),
            row("truck", "white", None),
            row("", "grey", None),
        ];
        let counts = vehicle_counts(&rows);
        assert_eq!(counts.get("car"), Some(&2));
        assert_eq!(counts.get("truck"), Some(&1));
        assert_eq!(counts.get("unknown"), Some(&1));
    }

    #[test]
    fn plates_detected_ignores_empty_markers() {
        let rows = vec![
            row("car", "red", Some("KA01AB1234")),
            row("car", "red", Some("")),
            row("bike", "black", None),
        ];
        assert_eq!(plates_detected(&rows), 1);
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let record = row("Truck", "White", Some("MH12DE1433"));
        assert!(row_matches_filter(&record, "truck"));
        assert!(row_matches_filter(&record, "WHITE"));
        assert!(row_matches_filter(&record, "mh12"));
        assert!(row_matches_filter(&record, ""));
        assert!(row_matches_filter(&record, "   "));
        assert!(!row_matches_filter(&record, "bike"));
    }

    #[test]
    fn csv_export_normalizes_plates_and_escapes_fields() {
        let rows = vec![
            row("car", "red", Some("KA01")),
            row("truck", "white, rusty", Some("")),
        ];
        let csv = report_to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "vehicle_type,color,number_plate,frame");
        assert_eq!(lines[1], "car,red,KA01,");
        assert_eq!(lines[2], "truck,\"white, rusty\",Not Detected,");
    }
}
