use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::redirect_to;
use crate::api;
use crate::notify::Notifier;

/// Sign-in / sign-up page with a toggle between the two forms.
#[component]
pub fn AuthPage() -> impl IntoView {
    let (show_signup, set_show_signup) = signal(false);

    view! {
        <div class="auth-container">
            <div class="auth-card">
                <h1 class="app-title">"PDF Chat"</h1>
                {move || {
                    if show_signup.get() {
                        view! { <SignUpForm show_signup=set_show_signup /> }.into_any()
                    } else {
                        view! { <SignInForm /> }.into_any()
                    }
                }}
                <button
                    class="auth-toggle"
                    on:click=move |_| set_show_signup.update(|v| *v = !*v)
                >
                    {move || {
                        if show_signup.get() {
                            "Already have an account? Sign in"
                        } else {
                            "New here? Create an account"
                        }
                    }}
                </button>
            </div>
        </div>
    }
}

#[component]
fn SignInForm() -> impl IntoView {
    let notify = Notifier::expect();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let email_value = email.get_untracked().trim().to_string();
        let password_value = password.get_untracked();
        if email_value.is_empty() || password_value.is_empty() {
            notify.warning("Please fill in your email and password.");
            return;
        }

        set_submitting.set(true);
        let notify = notify.clone();
        spawn_local(async move {
            match api::login(&email_value, &password_value).await {
                Ok(resp) if resp.success => {
                    redirect_to(resp.redirect_url.as_deref().unwrap_or("/"));
                }
                Ok(resp) => {
                    notify.error(if resp.message.is_empty() {
                        "Sign-in failed.".to_string()
                    } else {
                        resp.message
                    });
                }
                Err(e) => {
                    notify.error(format!("Could not sign in. {e}"));
                }
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form class="auth-form" on:submit=on_submit>
            <h2>"Sign in"</h2>
            <input
                type="email"
                placeholder="Email"
                prop:value=email
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Password"
                prop:value=password
                on:input=move |ev| set_password.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || submitting.get()>
                {move || if submitting.get() { "Signing in…" } else { "Sign in" }}
            </button>
        </form>
    }
}

#[component]
fn SignUpForm(
    /// Flipped back to `false` after a successful registration so the user
    /// lands on the sign-in form.
    show_signup: WriteSignal<bool>,
) -> impl IntoView {
    let notify = Notifier::expect();
    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let name_value = name.get_untracked().trim().to_string();
        let email_value = email.get_untracked().trim().to_string();
        let password_value = password.get_untracked();
        if name_value.is_empty() || email_value.is_empty() || password_value.is_empty() {
            notify.warning("Please fill in all fields.");
            return;
        }

        set_submitting.set(true);
        let notify = notify.clone();
        spawn_local(async move {
            match api::signup(&name_value, &email_value, &password_value).await {
                Ok(resp) if resp.success => {
                    notify.success(if resp.message.is_empty() {
                        "Account created. You can sign in now.".to_string()
                    } else {
                        resp.message
                    });
                    show_signup.set(false);
                }
                Ok(resp) => {
                    notify.error(if resp.message.is_empty() {
                        "Sign-up failed.".to_string()
                    } else {
                        resp.message
                    });
                }
                Err(e) => {
                    notify.error(format!("Could not sign up. {e}"));
                }
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form class="auth-form" on:submit=on_submit>
            <h2>"Create an account"</h2>
            <input
                type="text"
                placeholder="Name"
                prop:value=name
                on:input=move |ev| set_name.set(event_target_value(&ev))
            />
            <input
                type="email"
                placeholder="Email"
                prop:value=email
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Password (6+ characters)"
                prop:value=password
                on:input=move |ev| set_password.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || submitting.get()>
                {move || if submitting.get() { "Creating…" } else { "Sign up" }}
            </button>
        </form>
    }
}
