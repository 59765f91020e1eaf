//! Reflection of the settled search query into the page URL.

use url::Url;

/// Query parameter that carries the search text.
pub const SEARCH_PARAM: &str = "search";

/// The `search` parameter of `location`, if any.
pub fn search_param(location: &Url) -> Option<String> {
    location
        .query_pairs()
        .find(|(name, _)| name == SEARCH_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Returns `location` with `search` set to `query`, or removed for blank text.
///
/// Other parameters keep their order and the fragment is untouched.
pub fn with_search_param(location: &Url, query: &str) -> Url {
    let kept: Vec<(String, String)> = location
        .query_pairs()
        .filter(|(name, _)| name != SEARCH_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    let query = query.trim();

    let mut next = location.clone();
    if kept.is_empty() && query.is_empty() {
        next.set_query(None);
        return next;
    }
    {
        let mut pairs = next.query_pairs_mut();
        pairs.clear();
        for (name, value) in &kept {
            pairs.append_pair(name, value);
        }
        if !query.is_empty() {
            pairs.append_pair(SEARCH_PARAM, query);
        }
    }
    next
}
