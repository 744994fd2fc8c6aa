//! Link extraction and title parsing
//!
//! Scans a fetched page for anchor elements, resolves hrefs against the
//! base URL, strips fragments, collapses duplicates, and filters the
//! result through the profile's admissibility check. Pure apart from the
//! HTML parse; no network or disk access.

use crate::profile::Profile;
use deunicode::deunicode;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Links and title extracted from one fetched page
#[derive(Debug)]
pub struct ExtractedPage {
    /// Normalized, fragment-stripped, admissible outbound links
    pub links: HashSet<String>,

    /// First title element's text, ASCII-transliterated; empty if absent
    pub title: String,
}

/// Extracts the admissible link set and the page title
pub fn extract_page(base_url: &Url, body: &str, profile: &Profile) -> ExtractedPage {
    let document = Html::parse_document(body);

    let mut links = HashSet::new();
    if let Ok(selector) = Selector::parse("a") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if href.is_empty() {
                continue;
            }

            if let Some(link) = resolve_href(base_url, href) {
                if profile.is_admissible(&link) {
                    links.insert(link);
                }
            }
        }
    }

    ExtractedPage {
        links,
        title: extract_title(&document),
    }
}

/// Resolves an href against the base URL and strips the fragment
fn resolve_href(base_url: &Url, href: &str) -> Option<String> {
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// First title element's text, transliterated to ASCII
fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| deunicode(element.text().collect::<String>().trim()))
        .unwrap_or_default()
}
