#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

mod error;
mod events;
mod navigation;
mod registry;
mod router;
mod routes;

pub use error::{HookStage, RouterError};
pub use router::{NavigationOutcome, Router};
pub use routes::{HookFuture, HookParams, Route, RouteHook, RouteHooks, RoutePattern};

pub use waymark_history::{
    ForeignNavigation, History, HistoryOp, MemoryHistory, NavigationMode, UpdateCallback,
};

#[cfg(feature = "web")]
pub use waymark_history::{HashHistory, WebHistory};

/// A collection of useful items most applications need.
pub mod prelude {
    pub use crate::{
        History, HookParams, MemoryHistory, NavigationMode, NavigationOutcome, Route, RouteHooks,
        RoutePattern, Router, RouterError,
    };

    #[cfg(feature = "web")]
    pub use crate::{HashHistory, WebHistory};
}
