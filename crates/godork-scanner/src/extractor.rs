//! Title and link extraction from results markup.
//!
//! Titles come from `<h3>` headings (DOM query); links come from the
//! provider's `/url?q=` redirect wrappers (regex). Both passes are pure.

use godork_core::ProviderConfig;
use regex::Regex;
use scraper::{Html, Selector};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Titles and links found on one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub titles: Vec<String>,
    pub links: Vec<String>,
}

impl Extraction {
    /// Number of index-paired (title, link) records.
    #[must_use]
    pub fn paired_len(&self) -> usize {
        self.titles.len().min(self.links.len())
    }
}

/// Extractor configured with the provider's boilerplate and domain.
#[derive(Debug, Clone)]
pub struct Extractor {
    boilerplate_headings: Vec<String>,
    domain: String,
}

impl Extractor {
    #[must_use]
    pub fn new(provider: &ProviderConfig) -> Self {
        Self {
            boilerplate_headings: provider.boilerplate_headings.clone(),
            domain: provider.domain.to_ascii_lowercase(),
        }
    }

    #[must_use]
    pub fn extract(&self, body: &str) -> Extraction {
        Extraction {
            titles: self.titles(body),
            links: self.links(body),
        }
    }

    /// Result headings, excluding headings that are exactly one of the
    /// provider's own console/marketing headings.
    ///
    /// Results that merely mention the provider keep their place, so titles
    /// stay index-aligned with links.
    #[must_use]
    pub fn titles(&self, body: &str) -> Vec<String> {
        static HEADING: OnceLock<Selector> = OnceLock::new();
        let selector = HEADING.get_or_init(|| Selector::parse("h3").expect("valid selector"));

        let document = Html::parse_document(body);
        document
            .select(selector)
            .map(|heading| heading.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty() && !self.is_boilerplate(text))
            .collect()
    }

    fn is_boilerplate(&self, heading: &str) -> bool {
        self.boilerplate_headings
            .iter()
            .any(|boilerplate| heading == boilerplate)
    }

    /// Decoded targets of the provider's redirect wrappers, excluding links
    /// back into the provider's own domain family.
    #[must_use]
    pub fn links(&self, body: &str) -> Vec<String> {
        static WRAPPED_LINK: OnceLock<Regex> = OnceLock::new();
        let regex = WRAPPED_LINK.get_or_init(|| {
            Regex::new(
                r#""><a href="/url\?q=(.*?)&amp|href="/url\?q=(.*?)&amp;sa=U&amp;ved=|&amp;url=(.*?)&amp;ved="#,
            )
            .expect("valid regex")
        });

        regex
            .captures_iter(body)
            .filter_map(|caps| {
                // Alternate wrapper formats land in different groups
                let mut groups: Vec<&str> = Vec::new();
                for group in caps.iter().skip(1).flatten() {
                    let value = group.as_str();
                    if !value.is_empty() && !groups.contains(&value) {
                        groups.push(value);
                    }
                }
                let candidate = groups.concat();
                (candidate.starts_with("http") && !self.is_provider_link(&candidate))
                    .then(|| decode(&candidate))
            })
            .collect()
    }

    fn is_provider_link(&self, link: &str) -> bool {
        url::Url::parse(link)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
            .is_some_and(|host| {
                host == self.domain || host.ends_with(&format!(".{}", self.domain))
            })
    }
}

/// Highest pagination index visible on the page (`aria-label="Page N"`).
#[must_use]
pub fn last_page(body: &str) -> Option<u32> {
    static PAGE_LABEL: OnceLock<Regex> = OnceLock::new();
    let regex = PAGE_LABEL
        .get_or_init(|| Regex::new(r#"aria-label="Page ([0-9]+)""#).expect("valid regex"));

    regex
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

fn decode(link: &str) -> String {
    urlencoding::decode(link).map_or_else(|_| link.to_string(), Cow::into_owned)
}
