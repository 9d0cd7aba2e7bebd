//! Upload submitter.
//!
//! `fetch` exposes no transfer progress, so the upload goes through a raw
//! `XMLHttpRequest` with an `upload.onprogress` listener, the same approach
//! the product has always used. Every possible outcome (rejected by the
//! server, non-2xx, network failure, unreadable body) is funneled into a
//! single settled `Result` so the state machine sees one explicit event.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use common::requests::UploadResponse;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{FormData, ProgressEvent, XmlHttpRequest};

use crate::api;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadError {
    /// The request never completed (connection dropped, server unreachable).
    Network,
    /// The server answered outside 2xx.
    Http(u16),
    /// The server answered 2xx with a body that is not an `UploadResponse`.
    Malformed(String),
    /// The browser refused to start the request.
    Browser(&'static str),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Network => write!(f, "network error during upload"),
            UploadError::Http(status) => write!(f, "upload failed with HTTP {status}"),
            UploadError::Malformed(detail) => write!(f, "unreadable upload response: {detail}"),
            UploadError::Browser(detail) => write!(f, "{detail}"),
        }
    }
}

/// Starts the multipart upload of `file`, attributed to `email`.
///
/// `on_progress` receives percentages in [0,100] as bytes leave the browser;
/// `on_done` fires exactly once with the settled outcome.
pub fn submit<P, D>(file: web_sys::File, email: &str, on_progress: P, on_done: D)
where
    P: Fn(f64) + 'static,
    D: FnOnce(Result<UploadResponse, UploadError>) + 'static,
{
    let xhr = match XmlHttpRequest::new() {
        Ok(xhr) => xhr,
        Err(_) => {
            on_done(Err(UploadError::Browser("XMLHttpRequest unavailable")));
            return;
        }
    };
    if xhr.open("POST", &api::api_url("/upload_video")).is_err() {
        on_done(Err(UploadError::Browser("could not open upload request")));
        return;
    }
    xhr.set_request_header(api::IDENTITY_HEADER, email).ok();

    let form = match FormData::new() {
        Ok(form) => form,
        Err(_) => {
            on_done(Err(UploadError::Browser("FormData unavailable")));
            return;
        }
    };
    form.append_with_blob("video", &file).ok();
    form.append_with_str("email", email).ok();

    // `onload` and `onerror` are separate JS callbacks but `on_done` must
    // fire exactly once, so it sits in a shared take-once slot.
    let done = Rc::new(RefCell::new(Some(on_done)));

    if let Ok(upload) = xhr.upload() {
        let progress = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
            if event.length_computable() && event.total() > 0.0 {
                on_progress(event.loaded() / event.total() * 100.0);
            }
        });
        upload.set_onprogress(Some(progress.as_ref().unchecked_ref()));
        // Listener must outlive this call; one leaked closure per upload.
        progress.forget();
    }

    {
        let xhr_result = xhr.clone();
        let done = Rc::clone(&done);
        let onload = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
            settle(&done, parse_outcome(&xhr_result));
        });
        xhr.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
    }

    {
        let done = Rc::clone(&done);
        let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
            settle(&done, Err(UploadError::Network));
        });
        xhr.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    if xhr.send_with_opt_form_data(Some(&form)).is_err() {
        settle(&done, Err(UploadError::Network));
    }
}

fn settle<D>(slot: &Rc<RefCell<Option<D>>>, result: Result<UploadResponse, UploadError>)
where
    D: FnOnce(Result<UploadResponse, UploadError>),
{
    if let Some(done) = slot.borrow_mut().take() {
        done(result);
    }
}

fn parse_outcome(xhr: &XmlHttpRequest) -> Result<UploadResponse, UploadError> {
    let status = xhr.status().unwrap_or(0);
    if !(200..300).contains(&status) {
        return Err(UploadError::Http(status));
    }
    let body = xhr.response_text().ok().flatten().unwrap_or_default();
    serde_json::from_str(&body).map_err(|err| UploadError::Malformed(err.to_string()))
}
