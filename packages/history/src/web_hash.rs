use std::cell::RefCell;

use gloo::events::EventListener;
use gloo::utils::window;
use tracing::error;
use web_sys::Window;

use crate::{ForeignNavigation, History, UpdateCallback};

/// A [`History`] provider that keeps the active route in the URL fragment.
///
/// On construction an empty fragment is defaulted to the root marker `/`.
/// Committing a transition never rewrites the fragment; fragment changes are
/// driven externally, by intercepted link clicks rewriting the location. The
/// `hashchange` listener hands the new fragment back as a foreign navigation
/// with `update_address: true`.
pub struct HashHistory {
    window: Window,
    history: web_sys::History,
    listener: RefCell<Option<EventListener>>,
}

impl HashHistory {
    /// Create a new [`HashHistory`], defaulting an empty fragment to the
    /// root marker. Setting the fragment does not reload the page and fires
    /// no hook.
    pub fn new() -> Self {
        let window = window();
        let history = window.history().expect("`window` has access to `history`");

        let location = window.location();
        let hash = location.hash().unwrap_or_default();
        if hash.is_empty() {
            if let Err(err) = location.set_hash("/") {
                error!("failed to set the root fragment: {err:?}");
            }
        }

        Self {
            window,
            history,
            listener: RefCell::new(None),
        }
    }
}

impl Default for HashHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for HashHistory {
    fn current_url(&self) -> String {
        self.window
            .location()
            .href()
            .unwrap_or_else(|_| String::from("/"))
    }

    fn update(&self, _location: &str) {
        // Fragment changes are driven externally, a commit never rewrites
        // them.
    }

    fn go_back(&self) {
        if let Err(err) = self.history.back() {
            error!("failed to go back: {err:?}");
        }
    }

    fn go_forward(&self) {
        if let Err(err) = self.history.forward() {
            error!("failed to go forward: {err:?}");
        }
    }

    fn updater(&self, callback: UpdateCallback) {
        let location = self.window.location();
        *self.listener.borrow_mut() = Some(EventListener::new(
            &self.window,
            "hashchange",
            move |_event| {
                let hash = location.hash().unwrap_or_default();
                let target = hash.strip_prefix('#').unwrap_or(&hash).to_string();
                callback(ForeignNavigation {
                    target,
                    update_address: true,
                });
            },
        ));
    }

    fn teardown(&self) {
        *self.listener.borrow_mut() = None;
    }
}
