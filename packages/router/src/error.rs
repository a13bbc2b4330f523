use std::fmt;

use thiserror::Error;

/// The lifecycle stage a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// `on_leave` of the route being left.
    Leave,
    /// `on_before_enter` of the matched route.
    BeforeEnter,
    /// `on_enter` of the matched route.
    Enter,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Leave => "on_leave",
            Self::BeforeEnter => "on_before_enter",
            Self::Enter => "on_enter",
        })
    }
}

/// Errors a navigation surfaces to its caller.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A lifecycle hook failed. The transition stopped at that point: its
    /// remaining steps did not run and the current route is unchanged. A
    /// failure in `on_enter` happens after the address bar was already
    /// updated; the resulting mismatch is inherent to the hook ordering and
    /// is not rolled back.
    #[error("{stage} hook failed while transitioning to `{path}`")]
    Hook {
        /// The stage the failing hook belongs to.
        stage: HookStage,
        /// The path component of the transition target.
        path: String,
        /// The hook's own failure.
        #[source]
        source: anyhow::Error,
    },
}
