use std::cell::RefCell;

use gloo::events::EventListener;
use gloo::utils::window;
use serde::{Deserialize, Serialize};
use tracing::error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{PopStateEvent, Window};

use crate::{ForeignNavigation, History, UpdateCallback};

/// State attached to the history entries the router pushes. Entries without
/// it (the initial entry, entries created by other scripts) are foreign to
/// the router and never routed.
#[derive(Serialize, Deserialize)]
struct EntryState {
    path: String,
}

/// A [`History`] provider that creates a full history entry per committed
/// transition, via the [History API].
///
/// On construction the current entry is replaced with its own URL, without
/// navigating and without attaching router state. Each committed transition
/// pushes a new entry carrying the target as both serialized state and
/// visible address. A `popstate` whose entry carries router state is handed
/// back as a foreign navigation with `update_address: false`: the browser
/// already recorded the entry, pushing it again would corrupt the stack.
///
/// [History API]: https://developer.mozilla.org/en-US/docs/Web/API/History_API
pub struct WebHistory {
    window: Window,
    history: web_sys::History,
    listener: RefCell<Option<EventListener>>,
}

impl WebHistory {
    /// Create a new [`WebHistory`], replacing the current entry with its own
    /// normalized URL.
    pub fn new() -> Self {
        let window = window();
        let history = window.history().expect("`window` has access to `history`");

        let myself = Self {
            window,
            history,
            listener: RefCell::new(None),
        };

        let href = myself.current_url();
        if let Err(err) = myself
            .history
            .replace_state_with_url(&JsValue::NULL, "", Some(&href))
        {
            error!("failed to replace the initial entry: {err:?}");
        }

        myself
    }
}

impl Default for WebHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for WebHistory {
    fn current_url(&self) -> String {
        self.window
            .location()
            .href()
            .unwrap_or_else(|_| String::from("/"))
    }

    fn update(&self, location: &str) {
        let state = match serde_wasm_bindgen::to_value(&EntryState {
            path: location.to_string(),
        }) {
            Ok(state) => state,
            Err(err) => {
                error!("failed to serialize entry state for `{location}`: {err}");
                JsValue::NULL
            }
        };

        if let Err(err) = self.history.push_state_with_url(&state, "", Some(location)) {
            error!("failed to push `{location}`: {err:?}");
        }
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
        *self.listener.borrow_mut() = Some(EventListener::new(
            &self.window,
            "popstate",
            move |event| {
                let Some(event) = event.dyn_ref::<PopStateEvent>() else {
                    return;
                };
                let state = event.state();
                if state.is_null() || state.is_undefined() {
                    return;
                }
                // Entries carrying state from outside the router are ignored.
                if let Ok(EntryState { path }) = serde_wasm_bindgen::from_value(state) {
                    callback(ForeignNavigation {
                        target: path,
                        update_address: false,
                    });
                }
            },
        ));
    }

    fn teardown(&self) {
        *self.listener.borrow_mut() = None;
    }
}
