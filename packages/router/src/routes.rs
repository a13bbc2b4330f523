use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use regex::Regex;

/// Query-string parameters of a transition target, keys to values.
///
/// On duplicate keys the last occurrence wins.
pub type HookParams = HashMap<String, String>;

/// The future a lifecycle hook returns.
///
/// Hooks run on a single thread (the browser's event loop on wasm), so the
/// future does not need to be `Send`.
pub type HookFuture = LocalBoxFuture<'static, anyhow::Result<()>>;

/// A boxed lifecycle hook.
pub type RouteHook = Rc<dyn Fn(HookParams) -> HookFuture>;

/// The matching rule of a route entry.
#[derive(Clone)]
pub enum RoutePattern {
    /// Matches iff the candidate path equals the literal exactly.
    Literal(String),
    /// Matches iff the pattern tests positively against the candidate path.
    /// The test is unanchored, like `RegExp.test`.
    Pattern(Regex),
    /// Matches iff the predicate, invoked with the candidate path, echoes
    /// that exact path back. Returning anything else (another path, `"true"`,
    /// ...) does not match. The echo convention is deliberate; it is not a
    /// boolean test.
    Predicate(Rc<dyn Fn(&str) -> String>),
}

impl RoutePattern {
    /// A predicate pattern from a closure.
    pub fn predicate(predicate: impl Fn(&str) -> String + 'static) -> Self {
        Self::Predicate(Rc::new(predicate))
    }

    /// The pattern every possible path matches.
    pub(crate) fn catch_all() -> Self {
        Self::Pattern(Regex::new(".*").expect("the catch-all pattern is valid"))
    }

    /// Whether `path` matches this pattern. `path` carries no query part.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == path,
            Self::Pattern(pattern) => pattern.is_match(path),
            Self::Predicate(predicate) => predicate(path) == path,
        }
    }

    pub(crate) fn is_literal(&self, path: &str) -> bool {
        matches!(self, Self::Literal(literal) if literal == path)
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.debug_tuple("Literal").field(literal).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(literal: &str) -> Self {
        Self::Literal(literal.to_string())
    }
}

impl From<String> for RoutePattern {
    fn from(literal: String) -> Self {
        Self::Literal(literal)
    }
}

impl From<Regex> for RoutePattern {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

fn boxed<H, F>(hook: H) -> RouteHook
where
    H: Fn(HookParams) -> F + 'static,
    F: Future<Output = anyhow::Result<()>> + 'static,
{
    Rc::new(move |params| -> HookFuture { Box::pin(hook(params)) })
}

/// The lifecycle hooks of a route entry.
///
/// `on_enter` is required and supplied at construction; `on_before_enter`
/// and `on_leave` are optional. Every hook receives the query parameters of
/// the transition target and may complete asynchronously; the router awaits
/// each one before moving on.
///
/// ```rust
/// use waymark::RouteHooks;
///
/// let hooks = RouteHooks::new(|_params| async { Ok(()) })
///     .on_leave(|_params| async { Ok(()) });
/// # let _ = hooks;
/// ```
pub struct RouteHooks {
    pub(crate) on_before_enter: Option<RouteHook>,
    pub(crate) on_enter: RouteHook,
    pub(crate) on_leave: Option<RouteHook>,
}

impl RouteHooks {
    /// Hooks with the required `on_enter`.
    pub fn new<H, F>(on_enter: H) -> Self
    where
        H: Fn(HookParams) -> F + 'static,
        F: Future<Output = anyhow::Result<()>> + 'static,
    {
        Self {
            on_before_enter: None,
            on_enter: boxed(on_enter),
            on_leave: None,
        }
    }

    /// Hook awaited before the target route is entered, ahead of any
    /// address-bar update.
    pub fn on_before_enter<H, F>(mut self, hook: H) -> Self
    where
        H: Fn(HookParams) -> F + 'static,
        F: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.on_before_enter = Some(boxed(hook));
        self
    }

    /// Hook awaited when this route stops being the current one. It receives
    /// the parameters of the *incoming* route, not of this one.
    pub fn on_leave<H, F>(mut self, hook: H) -> Self
    where
        H: Fn(HookParams) -> F + 'static,
        F: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.on_leave = Some(boxed(hook));
        self
    }
}

/// A registered route: a pattern paired with lifecycle hooks.
pub struct Route {
    pub(crate) pattern: RoutePattern,
    pub(crate) hooks: RouteHooks,
}

impl Route {
    /// A route from anything that converts into a [`RoutePattern`]: a
    /// literal `&str`/`String`, a [`regex::Regex`], or a pattern built with
    /// [`RoutePattern::predicate`].
    pub fn new(pattern: impl Into<RoutePattern>, hooks: RouteHooks) -> Self {
        Self {
            pattern: pattern.into(),
            hooks,
        }
    }

    /// The matching rule of this route.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_match_exactly() {
        let pattern = RoutePattern::from("/test");
        assert!(pattern.matches("/test"));
        assert!(!pattern.matches("/test/"));
        assert!(!pattern.matches("/tes"));
    }

    #[test]
    fn patterns_test_unanchored() {
        let pattern = RoutePattern::from(Regex::new("/test1[0-9]").unwrap());
        assert!(pattern.matches("/test15"));
        assert!(pattern.matches("/test15/deeper"));
        assert!(!pattern.matches("/test2a"));
    }

    #[test]
    fn predicates_match_only_on_echo() {
        let echo = RoutePattern::predicate(|path| path.to_string());
        assert!(echo.matches("/callback"));

        let fixed = RoutePattern::predicate(|_| String::from("/callback"));
        assert!(fixed.matches("/callback"));
        assert!(!fixed.matches("/elsewhere"));

        // A truthy-looking return is not an echo.
        let truthy = RoutePattern::predicate(|_| String::from("true"));
        assert!(!truthy.matches("/callback"));
    }

    #[test]
    fn the_catch_all_matches_every_path() {
        let pattern = RoutePattern::catch_all();
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/deeply/nested/path"));
        assert!(pattern.matches(""));
    }

    #[test]
    fn only_literals_answer_literal_equality() {
        assert!(RoutePattern::from("/x").is_literal("/x"));
        assert!(!RoutePattern::from("/x").is_literal("/y"));
        assert!(!RoutePattern::from(Regex::new("/x").unwrap()).is_literal("/x"));
        assert!(!RoutePattern::predicate(|p| p.to_string()).is_literal("/x"));
    }
}
