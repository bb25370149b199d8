use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{File, FormData, ProgressEvent, XmlHttpRequest};

const UPLOAD_ENDPOINT: &str = "/api/uploadPdf";

/// True when a picked batch can be uploaded: at least one file and every
/// declared type is a PDF. One offender rejects the whole batch; there is no
/// partial acceptance.
pub fn is_pdf_batch<I, S>(types: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut any = false;
    for t in types {
        if t.as_ref() != "application/pdf" {
            return false;
        }
        any = true;
    }
    any
}

/// Uploads a batch of PDFs as one multipart request, every file under the
/// `file` field, and invokes callbacks as the transfer advances.
///
/// `on_progress` receives the sent fraction in `0.0..=1.0` whenever the
/// transport reports computable lengths; `on_done` fires on any 2xx status,
/// `on_error` on a non-2xx status or a transport failure. Uses
/// `XmlHttpRequest` because `fetch` does not expose upload progress. The
/// returned handle is not used for cancellation; nothing in this layer
/// cancels network calls.
pub fn upload_pdfs(
    files: Vec<File>,
    on_progress: impl Fn(f64) + 'static,
    on_done: impl Fn() + 'static,
    on_error: impl Fn(String) + 'static,
) -> Option<XmlHttpRequest> {
    let on_error = Rc::new(on_error);

    let form = match FormData::new() {
        Ok(form) => form,
        Err(e) => {
            on_error(format!("Could not build the upload request: {e:?}"));
            return None;
        }
    };
    for file in &files {
        if form.append_with_blob("file", file).is_err() {
            on_error(format!("Could not attach {} to the upload.", file.name()));
            return None;
        }
    }

    let xhr = match XmlHttpRequest::new() {
        Ok(xhr) => xhr,
        Err(e) => {
            on_error(format!("Could not start the upload: {e:?}"));
            return None;
        }
    };
    if xhr.open("POST", UPLOAD_ENDPOINT).is_err() {
        on_error("Could not start the upload.".to_string());
        return None;
    }

    // --- upload progress ---
    if let Ok(upload) = xhr.upload() {
        let onprogress = Closure::<dyn Fn(ProgressEvent)>::new(move |ev: ProgressEvent| {
            if ev.length_computable() && ev.total() > 0.0 {
                on_progress(ev.loaded() / ev.total());
            }
        });
        upload.set_onprogress(Some(onprogress.as_ref().unchecked_ref()));
        onprogress.forget();
    }

    // --- completion: status decides success ---
    let xhr_for_status = xhr.clone();
    let on_error_load = on_error.clone();
    let onload = Closure::<dyn Fn()>::new(move || {
        let status = xhr_for_status.status().unwrap_or(0);
        if (200..300).contains(&status) {
            on_done();
        } else {
            on_error_load(format!("Server error: {status}"));
        }
    });
    xhr.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    // --- transport failure ---
    let on_error_net = on_error.clone();
    let onerror = Closure::<dyn Fn()>::new(move || {
        on_error_net("Network error: the upload did not reach the server.".to_string());
    });
    xhr.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    if xhr.send_with_opt_form_data(Some(&form)).is_err() {
        on_error("Could not send the upload.".to_string());
        return None;
    }

    Some(xhr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_pdf_batch_is_accepted() {
        assert!(is_pdf_batch(["application/pdf", "application/pdf"]));
    }

    #[test]
    fn one_offender_rejects_the_whole_batch() {
        assert!(!is_pdf_batch([
            "application/pdf",
            "image/png",
            "application/pdf"
        ]));
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(!is_pdf_batch(Vec::<String>::new()));
    }

    #[test]
    fn missing_type_is_rejected() {
        // Browsers report an empty string when they cannot sniff a type.
        assert!(!is_pdf_batch([""]));
    }
}
