use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{error, trace};
use waymark_history::{ForeignNavigation, History, NavigationMode};

#[cfg(feature = "web")]
use waymark_history::{HashHistory, WebHistory};

#[cfg(not(feature = "web"))]
use waymark_history::MemoryHistory;

#[cfg(feature = "web")]
use crate::events::EventBridge;
use crate::error::{HookStage, RouterError};
use crate::navigation::{self, ResolvedTarget};
use crate::registry::RouteRegistry;
use crate::routes::{Route, RouteHooks, RoutePattern};

/// How a [`navigate`](Router::navigate) call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The transition ran to completion; the matched route is now current.
    Completed,
    /// No registered route matched the target. Nothing happened: no hook
    /// ran, the address bar and current route are untouched.
    NoMatch,
    /// Another transition was in flight. The request was queued and runs
    /// after it, in arrival order; failures of queued transitions are
    /// reported through `tracing`, since no caller is left to observe them.
    Enqueued,
}

struct PendingNavigation {
    target: String,
    update_address: bool,
}

pub(crate) struct RouterInner {
    mode: NavigationMode,
    history: Box<dyn History>,
    registry: RefCell<RouteRegistry>,
    /// The entry active after the last completed transition. Owned here
    /// exclusively; replaced, never mutated.
    current: RefCell<Option<Rc<Route>>>,
    transitioning: Cell<bool>,
    pending: RefCell<VecDeque<PendingNavigation>>,
    #[cfg(feature = "web")]
    bridge: RefCell<Option<EventBridge>>,
}

/// A client-side router: an ordered route registry, a navigation controller
/// running the `on_leave`/`on_before_enter`/`on_enter` lifecycle, and a
/// [`History`] provider keeping the address bar in sync.
///
/// The handle is cheap to clone; clones drive the same router. Everything is
/// single-threaded: hooks, history providers, and listeners all live on the
/// event loop of the browsing context (or the test executor).
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Create a router for `mode` with the default history provider: the
    /// browser-backed provider for that mode on web targets,
    /// [`MemoryHistory`](waymark_history::MemoryHistory) elsewhere.
    pub fn new(mode: NavigationMode) -> Self {
        Self::with_history(mode, default_history(mode))
    }

    /// Create a router over a custom [`History`] provider.
    ///
    /// The provider's callback is installed immediately, and on web targets
    /// the document-level click listener is attached.
    pub fn with_history(mode: NavigationMode, history: Box<dyn History>) -> Self {
        let inner = Rc::new(RouterInner {
            mode,
            history,
            registry: RefCell::new(RouteRegistry::new()),
            current: RefCell::new(None),
            transitioning: Cell::new(false),
            pending: RefCell::new(VecDeque::new()),
            #[cfg(feature = "web")]
            bridge: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        inner.history.updater(Rc::new(move |foreign: ForeignNavigation| {
            let Some(inner) = weak.upgrade() else { return };
            inner.pending.borrow_mut().push_back(PendingNavigation {
                target: foreign.target,
                update_address: foreign.update_address,
            });
            RouterInner::schedule_flush(&inner);
        }));

        #[cfg(feature = "web")]
        {
            *inner.bridge.borrow_mut() = Some(EventBridge::attach(&inner));
        }

        Self { inner }
    }

    /// Append a route to the registry.
    ///
    /// No deduplication happens and insertion order is match order: the
    /// first registered match wins, so specific routes go in before generic
    /// ones.
    pub fn add_route(&self, route: Route) {
        self.inner.registry.borrow_mut().add(route);
    }

    /// Remove every route whose pattern is the given literal.
    ///
    /// Only literal patterns can be targeted; pattern and predicate routes
    /// are not removable by value (a documented limitation).
    pub fn remove_route(&self, path: &str) {
        self.inner.registry.borrow_mut().remove(path);
    }

    /// Register a fallback that matches every path.
    ///
    /// Because of registry ordering this must be called after every other
    /// registration; a catch-all registered early masks everything after it.
    pub fn set_not_found_route(&self, hooks: RouteHooks) {
        self.inner.registry.borrow_mut().add_catch_all(hooks);
    }

    /// Route `target` through the full transition lifecycle.
    ///
    /// The target is resolved against the current location; its query part
    /// becomes the parameter mapping every hook of this transition receives.
    /// With `update_address`, the committed transition is reflected in the
    /// address bar between `on_before_enter` and `on_enter`; navigations
    /// replaying an entry the browsing context already recorded pass
    /// `false`.
    ///
    /// Calls arriving while a transition is in flight do not interleave with
    /// it: they are queued and run afterwards in arrival order, reported
    /// here as [`NavigationOutcome::Enqueued`].
    pub async fn navigate(
        &self,
        target: &str,
        update_address: bool,
    ) -> Result<NavigationOutcome, RouterError> {
        self.inner.navigate(target, update_address).await
    }

    /// [`navigate`](Router::navigate) with the address update implied, the
    /// common case for programmatic navigation.
    pub async fn navigate_to(&self, target: &str) -> Result<NavigationOutcome, RouterError> {
        self.navigate(target, true).await
    }

    /// Run every queued navigation request: requests raised by the browsing
    /// context and calls that arrived during a transition.
    ///
    /// On web targets this happens automatically on the event loop; call it
    /// manually when driving a custom [`History`] provider, e.g. in tests.
    pub async fn flush(&self) {
        self.inner.flush().await;
    }

    /// Ask the browsing context to go back one entry. The resulting signal
    /// is routed like any other foreign navigation.
    pub fn go_back(&self) {
        self.inner.history.go_back();
    }

    /// Ask the browsing context to go forward one entry.
    pub fn go_forward(&self) {
        self.inner.history.go_forward();
    }

    /// The pattern of the route active after the last completed transition,
    /// or [`None`] before the first.
    pub fn current_pattern(&self) -> Option<RoutePattern> {
        self.inner
            .current
            .borrow()
            .as_ref()
            .map(|route| route.pattern().clone())
    }

    /// The navigation mode fixed at construction.
    pub fn mode(&self) -> NavigationMode {
        self.inner.mode
    }

    /// Unsubscribe from every browsing-context signal: the history
    /// provider's listener and, on web targets, the document-level click
    /// listener. Repeated construction and teardown does not leak listeners.
    pub fn teardown(&self) {
        self.inner.history.teardown();
        #[cfg(feature = "web")]
        {
            *self.inner.bridge.borrow_mut() = None;
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(NavigationMode::default())
    }
}

fn default_history(mode: NavigationMode) -> Box<dyn History> {
    #[cfg(feature = "web")]
    let history: Box<dyn History> = match mode {
        NavigationMode::History => Box::new(WebHistory::new()),
        NavigationMode::Hash => Box::new(HashHistory::new()),
    };
    #[cfg(not(feature = "web"))]
    let history: Box<dyn History> = Box::new(MemoryHistory::new(mode));

    history
}

impl RouterInner {
    #[cfg(feature = "web")]
    pub(crate) fn mode(&self) -> NavigationMode {
        self.mode
    }

    /// Hand the queue to the event loop. Off the browser there is no
    /// executor to hand it to; the queue drains on the next `navigate` or
    /// `flush` call.
    fn schedule_flush(inner: &Rc<Self>) {
        #[cfg(feature = "web")]
        {
            let inner = Rc::clone(inner);
            wasm_bindgen_futures::spawn_local(async move {
                inner.flush().await;
            });
        }
        #[cfg(not(feature = "web"))]
        let _ = inner;
    }

    pub(crate) async fn navigate(
        &self,
        target: &str,
        update_address: bool,
    ) -> Result<NavigationOutcome, RouterError> {
        if self.transitioning.get() {
            trace!("transition in flight, queueing `{target}`");
            self.pending.borrow_mut().push_back(PendingNavigation {
                target: target.to_string(),
                update_address,
            });
            return Ok(NavigationOutcome::Enqueued);
        }

        self.transitioning.set(true);
        let outcome = self.transition(target, update_address).await;
        self.drain().await;
        self.transitioning.set(false);
        outcome
    }

    async fn flush(&self) {
        if self.transitioning.get() {
            // The in-flight call drains the queue before going idle.
            return;
        }
        self.transitioning.set(true);
        self.drain().await;
        self.transitioning.set(false);
    }

    /// Queued requests have no caller left to observe a failure, so it is
    /// reported here.
    async fn drain(&self) {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(next) = next else { break };
            if let Err(err) = self.transition(&next.target, next.update_address).await {
                error!("queued navigation to `{}` failed: {err}", next.target);
            }
        }
    }

    async fn transition(
        &self,
        target: &str,
        update_address: bool,
    ) -> Result<NavigationOutcome, RouterError> {
        let ResolvedTarget {
            path,
            location,
            params,
        } = navigation::resolve(&self.history.current_url(), target);

        let matched = self.registry.borrow().matching(&path);
        let Some(route) = matched else {
            trace!("no route matches `{path}`");
            return Ok(NavigationOutcome::NoMatch);
        };

        // The parameters passed to `on_leave` are those of the incoming
        // target, not of the route being left.
        let on_leave = self
            .current
            .borrow()
            .as_ref()
            .and_then(|current| current.hooks.on_leave.clone());
        if let Some(hook) = on_leave {
            hook(params.clone()).await.map_err(|source| RouterError::Hook {
                stage: HookStage::Leave,
                path: path.clone(),
                source,
            })?;
        }

        if let Some(hook) = route.hooks.on_before_enter.clone() {
            hook(params.clone()).await.map_err(|source| RouterError::Hook {
                stage: HookStage::BeforeEnter,
                path: path.clone(),
                source,
            })?;
        }

        if update_address {
            self.history.update(&location);
        }

        let on_enter = route.hooks.on_enter.clone();
        on_enter(params).await.map_err(|source| RouterError::Hook {
            stage: HookStage::Enter,
            path: path.clone(),
            source,
        })?;

        *self.current.borrow_mut() = Some(route);
        Ok(NavigationOutcome::Completed)
    }
}
