use std::rc::Rc;

use crate::routes::{Route, RouteHooks, RoutePattern};

/// Ordered collection of route entries.
///
/// Matching walks entries in insertion order and stops at the first
/// structural match, so earlier registrations shadow later ones for
/// overlapping patterns. A catch-all registered early masks everything after
/// it; callers register specific routes before generic ones.
pub(crate) struct RouteRegistry {
    routes: Vec<Rc<Route>>,
}

impl RouteRegistry {
    pub(crate) fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append an entry. No deduplication: identical patterns may coexist,
    /// the first registered always wins.
    pub(crate) fn add(&mut self, route: Route) {
        self.routes.push(Rc::new(route));
    }

    /// Remove every entry whose pattern is the given literal, by value.
    ///
    /// Pattern and predicate entries cannot be targeted this way; that is a
    /// documented limitation of the removal contract, not an oversight.
    pub(crate) fn remove(&mut self, path: &str) {
        self.routes.retain(|route| !route.pattern.is_literal(path));
    }

    /// Register an entry every possible path matches. Ordering still
    /// applies: to act as a fallback it must be registered last.
    pub(crate) fn add_catch_all(&mut self, hooks: RouteHooks) {
        self.add(Route::new(RoutePattern::catch_all(), hooks));
    }

    /// The first entry matching `path`. `None` is a legitimate outcome, not
    /// an error.
    pub(crate) fn matching(&self, path: &str) -> Option<Rc<Route>> {
        self.routes
            .iter()
            .find(|route| route.pattern.matches(path))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn noop() -> RouteHooks {
        RouteHooks::new(|_| async { Ok(()) })
    }

    fn matched_pattern(registry: &RouteRegistry, path: &str) -> Option<RoutePattern> {
        registry
            .matching(path)
            .map(|route| route.pattern().clone())
    }

    #[test]
    fn the_first_registration_wins() {
        let mut registry = RouteRegistry::new();
        registry.add(Route::new(Regex::new(".*").unwrap(), noop()));
        registry.add(Route::new("/specific", noop()));

        let matched = matched_pattern(&registry, "/specific").unwrap();
        assert!(matches!(matched, RoutePattern::Pattern(_)));
    }

    #[test]
    fn a_catch_all_registered_last_only_catches_the_rest() {
        let mut registry = RouteRegistry::new();
        registry.add(Route::new("/specific", noop()));
        registry.add_catch_all(noop());

        assert!(matches!(
            matched_pattern(&registry, "/specific").unwrap(),
            RoutePattern::Literal(path) if path == "/specific"
        ));
        assert!(matches!(
            matched_pattern(&registry, "/anything-else").unwrap(),
            RoutePattern::Pattern(_)
        ));
    }

    #[test]
    fn removal_only_targets_equal_literals() {
        let mut registry = RouteRegistry::new();
        registry.add(Route::new("/x", noop()));
        registry.add(Route::new(Regex::new("/x").unwrap(), noop()));
        registry.remove("/x");

        // The pattern entry survives and now matches.
        assert!(matches!(
            matched_pattern(&registry, "/x").unwrap(),
            RoutePattern::Pattern(_)
        ));
    }

    #[test]
    fn removal_takes_every_equal_literal() {
        let mut registry = RouteRegistry::new();
        registry.add(Route::new("/x", noop()));
        registry.add(Route::new("/x", noop()));
        registry.remove("/x");

        assert!(registry.matching("/x").is_none());
    }

    #[test]
    fn no_match_is_none() {
        let registry = RouteRegistry::new();
        assert!(registry.matching("/anywhere").is_none());
    }
}
