//! Reading search parameters back out of provider URLs.
//!
//! The block page carries the original search URL in its `continue`
//! parameter, so the query and offset are looked up there first.

use url::Url;

/// Value of the first `name` parameter of `url`, percent-decoded.
#[must_use]
pub fn query_param(url: &str, name: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// The search query a provider URL refers to.
#[must_use]
pub fn search_query(url: &str) -> Option<String> {
    query_param(url, "continue")
        .and_then(|inner| query_param(&inner, "q"))
        .or_else(|| query_param(url, "q"))
}

/// The pagination offset a provider URL refers to; absent means the first page.
#[must_use]
pub fn search_offset(url: &str) -> u32 {
    query_param(url, "continue")
        .and_then(|inner| query_param(&inner, "start"))
        .or_else(|| query_param(url, "start"))
        .and_then(|start| start.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_parameters() {
        let url = "https://www.google.com/search?q=inurl%3Aadmin&channel=fs&start=20";
        assert_eq!(search_query(url).as_deref(), Some("inurl:admin"));
        assert_eq!(search_offset(url), 20);
    }

    #[test]
    fn test_parameters_behind_continue() {
        let url = "https://www.google.com/sorry/index?continue=https://www.google.com/search%3Fq%3Dsite%253Aexample.com%26start%3D40&q=EgQ";
        assert_eq!(search_query(url).as_deref(), Some("site:example.com"));
        assert_eq!(search_offset(url), 40);
    }

    #[test]
    fn test_missing_parameters() {
        assert_eq!(search_query("https://www.google.com/"), None);
        assert_eq!(search_offset("https://www.google.com/"), 0);
        assert_eq!(search_query("not a url"), None);
    }
}
