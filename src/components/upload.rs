use std::time::Duration;

use gloo_timers::future::sleep;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::notify::Notifier;
use crate::session::ChatSession;
use crate::upload::{is_pdf_batch, upload_pdfs};

/// The success toast waits a beat so it lands after the progress bar clears.
const SUCCESS_TOAST_DELAY_MS: u64 = 800;

/// PDF picker with preview list, progress bar, and the send gate: messages
/// can only be sent once a batch has uploaded successfully.
#[component]
pub fn UploadPanel() -> impl IntoView {
    let session = ChatSession::expect();
    let notify = Notifier::expect();
    let state = session.state;

    // Names of the currently previewed batch.
    let (picked, set_picked) = signal(Vec::<String>::new());
    // Sent fraction of the in-flight upload; None hides the indicator.
    let (progress, set_progress) = signal(None::<f64>);
    let input_ref = NodeRef::<leptos::html::Input>::new();

    let reset_picker = move || {
        if let Some(input) = input_ref.get_untracked() {
            input.set_value("");
        }
        set_picked.set(Vec::new());
        set_progress.set(None);
    };

    let on_pick = {
        let notify = notify.clone();
        move |_| {
            let Some(input) = input_ref.get_untracked() else {
                return;
            };
            let Some(list) = input.files() else {
                return;
            };
            let files: Vec<web_sys::File> =
                (0..list.length()).filter_map(|i| list.get(i)).collect();
            if files.is_empty() {
                return;
            }

            // One non-PDF rejects the whole batch; no partial acceptance.
            if !is_pdf_batch(files.iter().map(|f| f.type_())) {
                notify.error("Only PDF files can be uploaded. Pick PDFs and try again.");
                reset_picker();
                return;
            }

            set_picked.set(files.iter().map(|f| f.name()).collect());
            set_progress.set(Some(0.0));

            let notify_done = notify.clone();
            let notify_fail = notify.clone();
            // The handle is deliberately dropped: nothing in this layer
            // cancels an in-flight request.
            let _ = upload_pdfs(
                files,
                move |fraction| set_progress.set(Some(fraction)),
                move || {
                    state.set_uploaded_file_ready.set(true);
                    let notify = notify_done.clone();
                    spawn_local(async move {
                        sleep(Duration::from_millis(SUCCESS_TOAST_DELAY_MS)).await;
                        set_progress.set(None);
                        notify.success("Your PDF is ready. Ask away!");
                    });
                },
                move |reason| {
                    set_progress.set(None);
                    notify_fail.error(format!("Upload failed. {reason}"));
                },
            );
        }
    };

    let remove_file = move |name: String| {
        set_picked.update(|names| names.retain(|n| n != &name));
        if picked.get_untracked().is_empty() {
            // Last preview removed: the picker resets and the send gate closes.
            reset_picker();
            state.set_uploaded_file_ready.set(false);
        }
    };

    view! {
        <div class="upload-panel">
            <label class="upload-label" for="pdf-input">
                "Chat about a PDF"
            </label>
            <input
                id="pdf-input"
                type="file"
                accept="application/pdf"
                multiple
                node_ref=input_ref
                on:change=on_pick
            />
            {move || {
                let names = picked.get();
                (!names.is_empty())
                    .then(|| {
                        view! {
                            <ul class="upload-preview">
                                <For
                                    each=move || picked.get()
                                    key=|name| name.clone()
                                    let:name
                                >
                                    {
                                        let remove_name = name.clone();
                                        view! {
                                            <li class="upload-preview-item">
                                                <span class="upload-file-name">{name.clone()}</span>
                                                <button
                                                    class="upload-remove"
                                                    on:click=move |_| remove_file(remove_name.clone())
                                                >
                                                    "×"
                                                </button>
                                            </li>
                                        }
                                    }
                                </For>
                            </ul>
                        }
                    })
            }}
            {move || {
                progress.get().map(|fraction| {
                    let percent = (fraction * 100.0).clamp(0.0, 100.0);
                    // "Processing" is driven purely by the sent fraction
                    // hitting 100%; the server gives no processing signal.
                    let label = if fraction >= 1.0 {
                        "Processing PDF…".to_string()
                    } else {
                        format!("Uploading… {percent:.0}%")
                    };
                    view! {
                        <div class="upload-progress">
                            <div class="progress-track">
                                <div class="progress-fill" style:width=format!("{percent:.0}%")></div>
                            </div>
                            <div class="progress-label">{label}</div>
                        </div>
                    }
                })
            }}
        </div>
    }
}
