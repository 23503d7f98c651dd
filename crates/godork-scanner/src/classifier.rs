//! Response classification.
//!
//! Maps a raw response onto the verdict that drives the page walker. The
//! classifier is pure: identical inputs always produce the same verdict.

use crate::fetch::RawResponse;
use godork_core::ProviderConfig;
use regex::Regex;
use std::sync::OnceLock;

/// What the walker should do with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A results page; hand the body to the extractor.
    Success,
    /// Redirected to the anti-automation interstitial.
    Challenged { redirect_url: String },
    /// 4xx, or a response with no defined meaning; logged and skipped.
    ClientError { status: u16 },
    /// 5xx; logged and skipped.
    ServerError { status: u16 },
    /// Placeholder page or unusable response; retry the same request.
    Indeterminate,
}

/// Classify a fetched response.
#[must_use]
pub fn classify(response: &RawResponse, provider: &ProviderConfig) -> Verdict {
    classify_parts(response.status, response.location(), &response.body, provider)
}

/// Classify from the status, the `Location` header and the body.
///
/// Rules, first match wins:
/// 1. a `<title>` equal to the provider's placeholder marker is `Indeterminate`
/// 2. 200 is `Success`
/// 3. 3xx toward the block path is `Challenged`; without `Location` it is
///    `Indeterminate`; any other target is a `ClientError`
/// 4. 4xx is `ClientError`, 5xx is `ServerError`
/// 5. anything else is a `ClientError`
#[must_use]
pub fn classify_parts(
    status: u16,
    location: Option<&str>,
    body: &str,
    provider: &ProviderConfig,
) -> Verdict {
    if is_placeholder(body, &provider.results_marker) {
        return Verdict::Indeterminate;
    }

    match status {
        200 => Verdict::Success,
        300..=399 => match location {
            Some(location) if location.contains(&provider.block_path) => Verdict::Challenged {
                redirect_url: location.to_string(),
            },
            Some(_) => Verdict::ClientError { status },
            None => Verdict::Indeterminate,
        },
        500..=599 => Verdict::ServerError { status },
        _ => Verdict::ClientError { status },
    }
}

/// Text of every `<title>` element in `body`, trimmed.
#[must_use]
pub fn page_titles(body: &str) -> Vec<String> {
    static TITLE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = TITLE_REGEX
        .get_or_init(|| Regex::new(r"(?i)<title[^>]*>(.*?)</title>").expect("valid regex"));

    regex
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// The provider serves a bare shell titled exactly with its marker when it
/// has nothing usable to return for this request.
fn is_placeholder(body: &str, marker: &str) -> bool {
    page_titles(body).iter().any(|title| title == marker)
}
