use common::model::report::DetectionRecord;
use common::requests::{StatusResponse, UploadResponse};

use crate::job::upload::UploadError;

pub enum Msg {
    OpenFilePicker,
    FileSelected(Option<web_sys::File>),
    UploadProgress(f64),
    UploadSettled(Result<UploadResponse, UploadError>),
    StatusTick(Result<StatusResponse, String>),
    ReportSettled(Result<Vec<DetectionRecord>, String>),
    SetFilter(String),
    ExportCsv,
    ClearJob,
}
