use url::Url;

use crate::routes::HookParams;

/// Base used when the history provider cannot produce a parseable URL.
fn fallback_base() -> Url {
    Url::parse("waymark://index.html/").expect("synthetic base URL is valid")
}

/// A navigation target resolved against the current location.
pub(crate) struct ResolvedTarget {
    /// Query-less path component, the route-matching key.
    pub(crate) path: String,
    /// Path plus query, the form the address bar shows.
    pub(crate) location: String,
    /// Parsed query parameters.
    pub(crate) params: HookParams,
}

/// Resolve `target` the way a browser resolves a URL relative to the current
/// location.
///
/// Resolution never fails: input the URL parser rejects degrades to the raw
/// target truncated at `?`, with an empty parameter mapping. On duplicate
/// query keys the last occurrence wins.
pub(crate) fn resolve(current_url: &str, target: &str) -> ResolvedTarget {
    let base = Url::parse(current_url).unwrap_or_else(|_| fallback_base());
    match base.join(target) {
        Ok(url) => {
            let mut params = HookParams::new();
            for (key, value) in url.query_pairs() {
                params.insert(key.into_owned(), value.into_owned());
            }
            let location = match url.query() {
                Some(query) => format!("{}?{query}", url.path()),
                None => url.path().to_string(),
            };
            ResolvedTarget {
                path: url.path().to_string(),
                location,
                params,
            }
        }
        Err(_) => {
            let path = target.split('?').next().unwrap_or(target).to_string();
            ResolvedTarget {
                location: path.clone(),
                path,
                params: HookParams::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "waymark://index.html/";

    #[test]
    fn splits_path_and_query() {
        let resolved = resolve(BASE, "/test?a=1&b=2");
        assert_eq!(resolved.path, "/test");
        assert_eq!(resolved.location, "/test?a=1&b=2");
        assert_eq!(resolved.params.get("a").unwrap(), "1");
        assert_eq!(resolved.params.get("b").unwrap(), "2");
    }

    #[test]
    fn the_last_duplicate_key_wins() {
        let resolved = resolve(BASE, "/test?a=1&a=2");
        assert_eq!(resolved.params.get("a").unwrap(), "2");
        assert_eq!(resolved.params.len(), 1);
    }

    #[test]
    fn resolves_relative_to_the_current_location() {
        let resolved = resolve("waymark://index.html/app/page?x=1", "other");
        assert_eq!(resolved.path, "/app/other");
        assert_eq!(resolved.params.len(), 0);
    }

    #[test]
    fn an_empty_target_is_the_current_location() {
        let resolved = resolve("waymark://index.html/app?x=1", "");
        assert_eq!(resolved.path, "/app");
        assert_eq!(resolved.params.get("x").unwrap(), "1");
    }

    #[test]
    fn fragments_never_reach_the_matching_key() {
        let resolved = resolve(BASE, "/test?a=1#section");
        assert_eq!(resolved.path, "/test");
        assert_eq!(resolved.location, "/test?a=1");
    }

    #[test]
    fn unresolvable_input_degrades_instead_of_failing() {
        let resolved = resolve(BASE, "http://[::1?q=x");
        assert_eq!(resolved.path, "http://[::1");
        assert_eq!(resolved.location, "http://[::1");
        assert!(resolved.params.is_empty());
    }

    #[test]
    fn an_unparseable_base_falls_back_to_the_synthetic_one() {
        let resolved = resolve("not a url", "/test");
        assert_eq!(resolved.path, "/test");
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let resolved = resolve(BASE, "/test?msg=hello%20world");
        assert_eq!(resolved.params.get("msg").unwrap(), "hello world");
    }
}
