//! Listing page parser
//!
//! This module reads listing pages:
//! - The total number of listing pages, from the "(N Pages" banner or the
//!   numbered pagination links
//! - Candidate detail links, chosen by a swappable `LinkFilter`

use crate::url::{decode_href, is_same_site};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Concatenates an element's text fragments, each trimmed, skipping blanks
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn anchor_selector() -> Selector {
    Selector::parse("a[href]").expect("static anchor selector is valid")
}

/// Determines how many listing pages exist
#[derive(Debug, Clone)]
pub struct PageCountParser {
    pattern: Regex,
}

impl Default for PageCountParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCountParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\(\s*(\d+)\s+Pages").expect("static page count pattern is valid"),
        }
    }

    /// Returns the total number of listing pages described by `html`
    ///
    /// Resolution order:
    /// 1. The first text fragment matching `(N Pages`
    /// 2. The largest purely numeric link text
    /// 3. 1, so an unrecognized listing is harvested as a single page
    ///
    /// # Example
    ///
    /// ```
    /// use verse_harvest::crawler::PageCountParser;
    ///
    /// let parser = PageCountParser::new();
    /// let html = "<p>(771 Pages, 50 Poems Shown)</p>";
    /// assert_eq!(parser.total_pages(html), 771);
    /// ```
    pub fn total_pages(&self, html: &str) -> u32 {
        let document = Html::parse_document(html);

        if let Some(total) = self.count_from_banner(&document) {
            tracing::info!("Total pages found: {}", total);
            return total;
        }

        if let Some(total) = max_numeric_link(&document) {
            tracing::info!("Total pages determined from links: {}", total);
            return total;
        }

        tracing::warn!("No page count found on listing root, harvesting a single page");
        1
    }

    fn count_from_banner(&self, document: &Html) -> Option<u32> {
        document.root_element().text().find_map(|fragment| {
            self.pattern
                .captures(fragment)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .filter(|total| *total > 0)
        })
    }
}

/// Largest page number among links whose text is only digits
fn max_numeric_link(document: &Html) -> Option<u32> {
    let selector = anchor_selector();
    document
        .select(&selector)
        .map(stripped_text)
        .filter(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|text| text.parse::<u32>().ok())
        .filter(|page| *page > 0)
        .max()
}

/// Decides whether a decoded link is a detail page worth fetching
pub trait LinkFilter: Send + Sync {
    fn accepts(&self, link: &str) -> bool;
}

impl<F> LinkFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accepts(&self, link: &str) -> bool {
        self(link)
    }
}

/// Accepts slug-style links (`author-name/poem-title`) that stay on the site
///
/// A link qualifies when it contains both `/` and `-`, and, if absolute,
/// contains the site root.
#[derive(Debug, Clone)]
pub struct SlugLinkFilter {
    base_url: String,
}

impl SlugLinkFilter {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl LinkFilter for SlugLinkFilter {
    fn accepts(&self, link: &str) -> bool {
        link.contains('/') && link.contains('-') && is_same_site(link, &self.base_url)
    }
}

/// Extracts candidate detail links from a listing page
///
/// Every `<a href>` is percent-decoded and trimmed, then offered to
/// `filter`. Page order is kept and repeated links are kept as repeats.
pub fn extract_links(html: &str, filter: &dyn LinkFilter) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = anchor_selector();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(decode_href)
        .filter(|link| filter.accepts(link))
        .collect()
}
