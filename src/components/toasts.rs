use leptos::prelude::*;

use crate::notify::Notifier;

/// Shared toast container, mounted once in `App`. Every notification renders
/// here no matter which page raised it; the container's corner follows the
/// most recent `show` call.
#[component]
pub fn ToastHost() -> impl IntoView {
    let notify = Notifier::expect();
    let notify_sv = expect_context::<StoredValue<Notifier, LocalStorage>>();
    let toasts = notify.toasts();
    let position = notify.position();

    view! {
        <div class=move || format!("toast-container {}", position.get().css_class())>
            <For
                each=move || toasts.get()
                key=|toast| (toast.id.clone(), toast.hiding)
                let:toast
            >
                {
                    let notify = notify_sv.get_value();
                    let id = toast.id.clone();
                    let class = format!(
                        "toast {}{}",
                        toast.kind.css_class(),
                        if toast.hiding { " hiding" } else { "" },
                    );
                    view! {
                        <div class=class>
                            <div class="toast-body">
                                <div class="toast-title">{toast.title.clone()}</div>
                                <div class="toast-message">{toast.message.clone()}</div>
                            </div>
                            <button class="toast-close" on:click=move |_| notify.remove(&id)>
                                "×"
                            </button>
                        </div>
                    }
                }
            </For>
        </div>
    }
}
