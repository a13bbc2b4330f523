use std::cell::RefCell;
use std::rc::Rc;

use tracing::{error, warn};
use url::Url;

use crate::{ForeignNavigation, History, NavigationMode, UpdateCallback};

/// The synthetic base URL in-memory histories live under.
pub(crate) fn base_url() -> Url {
    Url::parse("waymark://index.html/").expect("synthetic base URL is valid")
}

/// An address-bar operation performed against the browsing context.
///
/// [`MemoryHistory`] records these so tests can assert how a transition was
/// reflected in the address bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOp {
    /// The current entry was replaced, keeping the history stack untouched.
    Replace(String),
    /// A new entry was pushed on top of the history stack.
    Push(String),
}

/// One entry of the emulated history stack. Only entries created by a push
/// carry router state; the initial, replaced entry does not, matching what
/// the History API reports for it.
struct Entry {
    location: String,
    state: Option<String>,
}

struct MemoryState {
    current: Url,
    current_state: Option<String>,
    fragment: Option<String>,
    back: Vec<Entry>,
    forward: Vec<Entry>,
    ops: Vec<HistoryOp>,
}

/// A [`History`] provider that stores all navigation information in memory.
///
/// This is the default provider outside the browser and the test double for
/// both navigation modes: it keeps the op log of every [`Replace`] and
/// [`Push`], and its [`go_back`], [`go_forward`], and [`set_fragment`]
/// methods emulate the signals a browsing context would raise.
///
/// The handle is cheap to clone and clones share state, so a test can keep a
/// view of the history after handing a clone to the router.
///
/// ```rust
/// # use waymark_history::{History, MemoryHistory, NavigationMode};
/// let history = MemoryHistory::new(NavigationMode::History);
/// history.update("/a");
/// history.update("/b");
/// history.go_back();
/// assert_eq!(history.current_url(), "waymark://index.html/a");
/// ```
///
/// [`Replace`]: HistoryOp::Replace
/// [`Push`]: HistoryOp::Push
/// [`go_back`]: History::go_back
/// [`go_forward`]: History::go_forward
/// [`set_fragment`]: MemoryHistory::set_fragment
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Rc<MemoryInner>,
}

struct MemoryInner {
    mode: NavigationMode,
    state: RefCell<MemoryState>,
    callback: RefCell<Option<UpdateCallback>>,
}

fn location_of(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

impl MemoryHistory {
    /// Create a [`MemoryHistory`] for the given mode.
    ///
    /// In [`NavigationMode::History`] the current entry is replaced with its
    /// own normalized URL, like a browser-backed provider would. In
    /// [`NavigationMode::Hash`] an empty fragment is defaulted to the root
    /// marker `/`. Neither performs a navigation.
    pub fn new(mode: NavigationMode) -> Self {
        let current = base_url();
        let mut ops = Vec::new();
        let mut fragment = None;
        match mode {
            NavigationMode::History => ops.push(HistoryOp::Replace(location_of(&current))),
            NavigationMode::Hash => fragment = Some(String::from("/")),
        }

        Self {
            inner: Rc::new(MemoryInner {
                mode,
                state: RefCell::new(MemoryState {
                    current,
                    current_state: None,
                    fragment,
                    back: Vec::new(),
                    forward: Vec::new(),
                    ops,
                }),
                callback: RefCell::new(None),
            }),
        }
    }

    /// Every address-bar operation performed so far, in order.
    pub fn operations(&self) -> Vec<HistoryOp> {
        self.inner.state.borrow().ops.clone()
    }

    /// The current fragment, without the leading `#`.
    ///
    /// Always [`None`] in [`NavigationMode::History`].
    pub fn fragment(&self) -> Option<String> {
        self.inner.state.borrow().fragment.clone()
    }

    /// Emulate an external fragment rewrite, as an intercepted link click
    /// performs in [`NavigationMode::Hash`].
    ///
    /// The old fragment becomes a history entry and the installed callback
    /// receives the new one, exactly like a `hashchange` signal.
    pub fn set_fragment(&self, fragment: &str) {
        if self.inner.mode != NavigationMode::Hash {
            warn!("fragment rewrites are only meaningful in hash mode");
            return;
        }

        let fragment = fragment.strip_prefix('#').unwrap_or(fragment).to_string();
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(old) = state.fragment.replace(fragment.clone()) {
                state.back.push(Entry {
                    location: old,
                    state: None,
                });
            }
            state.forward.clear();
        }

        self.inner.foreign(ForeignNavigation {
            target: fragment,
            update_address: true,
        });
    }
}

impl MemoryInner {
    /// Invoke the installed callback. All state borrows must be released
    /// before calling this: the callback re-enters the router.
    fn foreign(&self, navigation: ForeignNavigation) {
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback(navigation);
        }
    }
}

impl History for MemoryHistory {
    fn current_url(&self) -> String {
        let state = self.inner.state.borrow();
        let mut url = state.current.clone();
        url.set_fragment(state.fragment.as_deref());
        url.to_string()
    }

    fn update(&self, location: &str) {
        match self.inner.mode {
            // Fragment changes are driven externally, a commit never
            // rewrites them.
            NavigationMode::Hash => {}
            NavigationMode::History => {
                let mut state = self.inner.state.borrow_mut();
                let next = match state.current.join(location) {
                    Ok(url) => url,
                    Err(err) => {
                        error!("cannot push `{location}`: {err}");
                        return;
                    }
                };

                let previous = Entry {
                    location: location_of(&state.current),
                    state: state.current_state.take(),
                };
                state.back.push(previous);
                state.current = next;
                state.current_state = Some(location.to_string());
                state.forward.clear();
                state.ops.push(HistoryOp::Push(location.to_string()));
            }
        }
    }

    fn go_back(&self) {
        let navigation = {
            let mut state = self.inner.state.borrow_mut();
            match self.inner.mode {
                NavigationMode::History => {
                    let Some(entry) = state.back.pop() else {
                        return;
                    };
                    let current = Entry {
                        location: location_of(&state.current),
                        state: state.current_state.take(),
                    };
                    state.forward.push(current);
                    state.current = state
                        .current
                        .join(&entry.location)
                        .expect("past locations came from the url type itself");
                    state.current_state = entry.state.clone();

                    // Entries without router state are foreign to the
                    // router; a browser-backed provider would not raise a
                    // navigation for them either.
                    entry.state.map(|target| ForeignNavigation {
                        target,
                        update_address: false,
                    })
                }
                NavigationMode::Hash => {
                    let Some(entry) = state.back.pop() else {
                        return;
                    };
                    if let Some(old) = state.fragment.replace(entry.location.clone()) {
                        state.forward.push(Entry {
                            location: old,
                            state: None,
                        });
                    }
                    Some(ForeignNavigation {
                        target: entry.location,
                        update_address: true,
                    })
                }
            }
        };

        if let Some(navigation) = navigation {
            self.inner.foreign(navigation);
        }
    }

    fn go_forward(&self) {
        let navigation = {
            let mut state = self.inner.state.borrow_mut();
            match self.inner.mode {
                NavigationMode::History => {
                    let Some(entry) = state.forward.pop() else {
                        return;
                    };
                    let current = Entry {
                        location: location_of(&state.current),
                        state: state.current_state.take(),
                    };
                    state.back.push(current);
                    state.current = state
                        .current
                        .join(&entry.location)
                        .expect("past locations came from the url type itself");
                    state.current_state = entry.state.clone();

                    entry.state.map(|target| ForeignNavigation {
                        target,
                        update_address: false,
                    })
                }
                NavigationMode::Hash => {
                    let Some(entry) = state.forward.pop() else {
                        return;
                    };
                    if let Some(old) = state.fragment.replace(entry.location.clone()) {
                        state.back.push(Entry {
                            location: old,
                            state: None,
                        });
                    }
                    Some(ForeignNavigation {
                        target: entry.location,
                        update_address: true,
                    })
                }
            }
        };

        if let Some(navigation) = navigation {
            self.inner.foreign(navigation);
        }
    }

    fn updater(&self, callback: UpdateCallback) {
        *self.inner.callback.borrow_mut() = Some(callback);
    }

    fn teardown(&self) {
        *self.inner.callback.borrow_mut() = None;
    }
}
