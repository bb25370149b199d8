use std::cell::Cell;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use gloo_timers::callback::Timeout;
use leptos::prelude::*;

pub const DEFAULT_TOAST_DURATION_MS: u32 = 5_000;

/// How long a dismissed toast keeps its element around for the hide
/// animation before it is dropped for good.
const HIDE_GRACE_MS: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }

    fn default_title(self) -> &'static str {
        match self {
            ToastKind::Success => "Success!",
            ToastKind::Error => "Error!",
            ToastKind::Warning => "Warning!",
            ToastKind::Info => "Info",
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            ToastKind::Success => "Operation completed successfully.",
            ToastKind::Error => "Something went wrong.",
            ToastKind::Warning => "Please double-check and try again.",
            ToastKind::Info => "Just so you know.",
        }
    }
}

/// Screen corner of the shared toast container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl ToastPosition {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastPosition::TopRight => "top-right",
            ToastPosition::TopLeft => "top-left",
            ToastPosition::BottomRight => "bottom-right",
            ToastPosition::BottomLeft => "bottom-left",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    /// Set once dismissal starts; the toast stays in the list for
    /// `HIDE_GRACE_MS` so the hide animation can play.
    pub hiding: bool,
}

/// Optional overrides for [`Notifier::show`]. Missing title and message fall
/// back to the kind's defaults.
#[derive(Debug, Default)]
pub struct ToastOptions {
    pub title: Option<String>,
    pub message: Option<String>,
    pub duration_ms: Option<u32>,
    pub position: Option<ToastPosition>,
}

/// Queue of transient, auto-dismissing alerts.
///
/// A cloneable handle around shared signals; `App` provides one instance via
/// context and every caller gets the same queue. All toasts share a single
/// container, so the position passed to the most recent `show` call wins for
/// everything currently on screen. That matches the widget this replaces and
/// is intentional.
#[derive(Clone)]
pub struct Notifier {
    toasts: RwSignal<Vec<Toast>>,
    position: RwSignal<ToastPosition>,
    #[cfg(target_arch = "wasm32")]
    timers: Rc<RefCell<HashMap<String, Timeout>>>,
    next_id: Rc<Cell<u64>>,
}

impl Notifier {
    pub fn new() -> Self {
        Notifier {
            toasts: RwSignal::new(Vec::new()),
            position: RwSignal::new(ToastPosition::default()),
            #[cfg(target_arch = "wasm32")]
            timers: Rc::new(RefCell::new(HashMap::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    /// Create a queue and put it into the Leptos context. The handle is not
    /// `Send`, so it rides in a thread-local `StoredValue`.
    pub fn provide() -> Self {
        let notifier = Notifier::new();
        provide_context(StoredValue::new_local(notifier.clone()));
        notifier
    }

    pub fn expect() -> Self {
        expect_context::<StoredValue<Notifier, LocalStorage>>().get_value()
    }

    pub fn toasts(&self) -> RwSignal<Vec<Toast>> {
        self.toasts
    }

    pub fn position(&self) -> RwSignal<ToastPosition> {
        self.position
    }

    /// Shows a toast and starts its auto-dismiss timer. Always succeeds and
    /// returns the new toast's unique id.
    pub fn show(&self, kind: ToastKind, opts: ToastOptions) -> String {
        let id = format!("toast-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let toast = Toast {
            id: id.clone(),
            kind,
            title: opts
                .title
                .unwrap_or_else(|| kind.default_title().to_string()),
            message: opts
                .message
                .unwrap_or_else(|| kind.default_message().to_string()),
            hiding: false,
        };

        // Repositions the shared container for every visible toast, not just
        // this one.
        self.position.set(opts.position.unwrap_or_default());
        self.toasts.update(|toasts| toasts.push(toast));

        let this = self.clone();
        let timer_id = id.clone();
        self.schedule(
            &id,
            opts.duration_ms.unwrap_or(DEFAULT_TOAST_DURATION_MS),
            move || this.remove(&timer_id),
        );

        id
    }

    /// Starts dismissing a toast. Idempotent: unknown or already-dismissed
    /// ids are a no-op. The toast lingers in a `hiding` state for a short
    /// grace period, then disappears.
    pub fn remove(&self, id: &str) {
        let mut started = false;
        self.toasts.update(|toasts| {
            if let Some(toast) = toasts.iter_mut().find(|t| t.id == id && !t.hiding) {
                toast.hiding = true;
                started = true;
            }
        });
        if !started {
            return;
        }

        self.cancel_timer(id);
        let this = self.clone();
        let timer_id = id.to_string();
        self.schedule(id, HIDE_GRACE_MS, move || this.discard(&timer_id));
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.show(
            ToastKind::Success,
            ToastOptions {
                message: Some(message.into()),
                ..Default::default()
            },
        )
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.show(
            ToastKind::Error,
            ToastOptions {
                message: Some(message.into()),
                ..Default::default()
            },
        )
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.show(
            ToastKind::Warning,
            ToastOptions {
                message: Some(message.into()),
                ..Default::default()
            },
        )
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.show(
            ToastKind::Info,
            ToastOptions {
                message: Some(message.into()),
                ..Default::default()
            },
        )
    }

    fn discard(&self, id: &str) {
        self.cancel_timer(id);
        self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule(&self, id: &str, ms: u32, run: impl FnOnce() + 'static) {
        // Replacing an entry drops the old Timeout, which cancels it.
        let handle = Timeout::new(ms, run);
        self.timers.borrow_mut().insert(id.to_string(), handle);
    }

    /// Timers only exist in the browser; in native unit tests toasts simply
    /// never expire on their own.
    #[cfg(not(target_arch = "wasm32"))]
    fn schedule(&self, _id: &str, _ms: u32, _run: impl FnOnce() + 'static) {}

    fn cancel_timer(&self, id: &str) {
        #[cfg(target_arch = "wasm32")]
        drop(self.timers.borrow_mut().remove(id));
        #[cfg(not(target_arch = "wasm32"))]
        let _ = id;
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn show_returns_unique_ids() {
        let notify = Notifier::new();
        let ids: HashSet<String> = (0..50)
            .map(|_| notify.show(ToastKind::Info, ToastOptions::default()))
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn defaults_are_filled_per_kind() {
        let notify = Notifier::new();
        notify.show(ToastKind::Error, ToastOptions::default());
        let toasts = notify.toasts().get_untracked();
        assert_eq!(toasts[0].title, "Error!");
        assert_eq!(toasts[0].message, "Something went wrong.");
    }

    #[test]
    fn explicit_title_and_message_are_kept() {
        let notify = Notifier::new();
        notify.show(
            ToastKind::Success,
            ToastOptions {
                title: Some("Uploaded".into()),
                message: Some("report.pdf is ready.".into()),
                ..Default::default()
            },
        );
        let toasts = notify.toasts().get_untracked();
        assert_eq!(toasts[0].title, "Uploaded");
        assert_eq!(toasts[0].message, "report.pdf is ready.");
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let notify = Notifier::new();
        notify.show(ToastKind::Info, ToastOptions::default());
        notify.remove("toast-999");
        let toasts = notify.toasts().get_untracked();
        assert_eq!(toasts.len(), 1);
        assert!(!toasts[0].hiding);
    }

    #[test]
    fn remove_twice_equals_remove_once() {
        let notify = Notifier::new();
        let id = notify.show(ToastKind::Info, ToastOptions::default());
        notify.remove(&id);
        let after_first = notify.toasts().get_untracked();
        notify.remove(&id);
        let after_second = notify.toasts().get_untracked();
        assert_eq!(after_first, after_second);
        assert!(after_first[0].hiding);
    }

    #[test]
    fn last_position_wins_for_the_shared_container() {
        let notify = Notifier::new();
        notify.show(
            ToastKind::Info,
            ToastOptions {
                position: Some(ToastPosition::TopRight),
                ..Default::default()
            },
        );
        notify.show(
            ToastKind::Error,
            ToastOptions {
                position: Some(ToastPosition::BottomLeft),
                ..Default::default()
            },
        );
        assert_eq!(
            notify.position().get_untracked(),
            ToastPosition::BottomLeft
        );
    }

    #[test]
    fn wrappers_pick_their_kind() {
        let notify = Notifier::new();
        notify.success("saved");
        notify.warning("careful");
        let toasts = notify.toasts().get_untracked();
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[0].message, "saved");
        assert_eq!(toasts[1].kind, ToastKind::Warning);
    }
}
