use waymark_history::NavigationMode;

/// What an intercepted anchor click should do with the anchor's reference.
#[cfg_attr(not(feature = "web"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkAction {
    /// Root-relative reference in history mode: navigate directly.
    Navigate(String),
    /// Root-relative reference in hash mode: rewrite the location fragment,
    /// which fires the fragment-change listener, which navigates.
    RewriteFragment(String),
    /// Everything else opens in a new browsing context.
    OpenExternal(String),
}

#[cfg_attr(not(feature = "web"), allow(dead_code))]
pub(crate) fn link_action(href: &str, mode: NavigationMode) -> LinkAction {
    if href.starts_with('/') {
        match mode {
            NavigationMode::History => LinkAction::Navigate(href.to_string()),
            NavigationMode::Hash => LinkAction::RewriteFragment(href.to_string()),
        }
    } else {
        LinkAction::OpenExternal(href.to_string())
    }
}

#[cfg(feature = "web")]
mod bridge {
    use std::rc::Rc;

    use gloo::events::EventListener;
    use gloo::utils::{document, window};
    use tracing::error;
    use wasm_bindgen::JsCast;
    use web_sys::{Event, HtmlAnchorElement};

    use super::{link_action, LinkAction};
    use crate::router::RouterInner;

    /// The document-level click listener. One per router instance, so
    /// dynamically added anchors are covered without per-element
    /// registration; dropped (and thereby unsubscribed) on teardown.
    pub(crate) struct EventBridge {
        _listener: EventListener,
    }

    impl EventBridge {
        pub(crate) fn attach(inner: &Rc<RouterInner>) -> Self {
            let weak = Rc::downgrade(inner);
            let listener = EventListener::new(&document(), "click", move |event| {
                let Some(inner) = weak.upgrade() else { return };
                on_click(&inner, event);
            });
            Self {
                _listener: listener,
            }
        }
    }

    fn on_click(inner: &Rc<RouterInner>, event: &Event) {
        // Clicks whose target is not an anchor are ignored entirely: no
        // default-suppression, no side effect.
        let Some(target) = event.target() else { return };
        let Some(anchor) = target.dyn_ref::<HtmlAnchorElement>() else {
            return;
        };
        let Some(href) = anchor.get_attribute("href") else {
            return;
        };

        event.prevent_default();
        match link_action(&href, inner.mode()) {
            LinkAction::Navigate(path) => {
                let inner = Rc::clone(inner);
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = inner.navigate(&path, true).await {
                        error!("link navigation to `{path}` failed: {err}");
                    }
                });
            }
            LinkAction::RewriteFragment(path) => {
                if let Err(err) = window().location().set_hash(&path) {
                    error!("failed to rewrite the fragment to `{path}`: {err:?}");
                }
            }
            LinkAction::OpenExternal(url) => {
                if let Err(err) = window().open_with_url_and_target(&url, "_blank") {
                    error!("failed to open `{url}` in a new context: {err:?}");
                }
            }
        }
    }
}

#[cfg(feature = "web")]
pub(crate) use bridge::EventBridge;
