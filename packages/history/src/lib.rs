#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::rc::Rc;

mod memory;
pub use memory::*;

#[cfg(feature = "web")]
mod web;
#[cfg(feature = "web")]
pub use web::*;

#[cfg(feature = "web")]
mod web_hash;
#[cfg(feature = "web")]
pub use web_hash::*;

/// How the router records committed transitions in the browsing context.
///
/// The mode is fixed when a provider (and the router using it) is constructed
/// and cannot change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationMode {
    /// Every committed transition becomes a full history entry, created
    /// through the History API.
    History,
    /// The active route lives in the URL fragment. Fragment changes are
    /// driven externally (intercepted link clicks), never by a commit.
    #[default]
    Hash,
}

/// A navigation the browsing context performed on its own, handed back to the
/// router through the callback installed with [`History::updater`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignNavigation {
    /// The path (possibly with a query part) to route to.
    pub target: String,
    /// Whether the address bar still needs to reflect the target. Back and
    /// forward signals carry `false`: the browsing context already recorded
    /// the entry, re-pushing it would corrupt the history stack.
    pub update_address: bool,
}

/// The callback a [`History`] provider invokes for foreign navigations.
///
/// Callbacks are `Rc`, not `Arc`: providers, the router, and the hooks it
/// runs all live on a single thread (the browser's event loop on wasm).
pub type UpdateCallback = Rc<dyn Fn(ForeignNavigation)>;

/// An integration with some kind of navigation history.
///
/// The router uses a `History` provider for three things: resolving relative
/// navigation targets against the current URL, reflecting committed
/// transitions in the address bar, and receiving navigations the browsing
/// context performs on its own.
pub trait History {
    /// The full current URL of the browsing context.
    ///
    /// Used as the base when resolving `navigate` targets, mirroring how a
    /// browser resolves a URL relative to the current location.
    ///
    /// ```rust
    /// # use waymark_history::{History, MemoryHistory, NavigationMode};
    /// let history = MemoryHistory::new(NavigationMode::History);
    /// assert_eq!(history.current_url(), "waymark://index.html/");
    /// ```
    #[must_use]
    fn current_url(&self) -> String;

    /// Reflect a committed transition's path and query in the address bar.
    ///
    /// `location` is the path plus query part, e.g. `/search?q=waymark`.
    /// Providers in [`NavigationMode::Hash`] must treat this as a no-op:
    /// fragment changes are driven externally, never by a commit.
    fn update(&self, location: &str);

    /// Ask the browsing context to go back one entry.
    ///
    /// The resulting signal (if any) arrives through the [`updater`]
    /// callback like any other foreign navigation.
    ///
    /// [`updater`]: History::updater
    fn go_back(&self);

    /// Ask the browsing context to go forward one entry.
    fn go_forward(&self);

    /// Install the callback invoked when the browsing context navigates on
    /// its own: back/forward signals, external fragment edits.
    fn updater(&self, callback: UpdateCallback);

    /// Drop every subscription to the browsing context.
    ///
    /// After teardown the provider no longer raises foreign navigations.
    fn teardown(&self) {}
}
