//! Detail page extraction
//!
//! Turns a fetched poem page into a `PoemRecord`. Missing fields never fail
//! extraction; they fall back to the defaults described on each field.

use crate::config::SelectorConfig;
use crate::crawler::parser::stripped_text;
use crate::output::PoemRecord;
use crate::HarvestError;
use scraper::{Html, Selector};

fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts title, author and body text from detail pages
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    title: Selector,
    author: Selector,
    text: Selector,
    document_title: Selector,
    author_link: Selector,
    title_prefix: String,
    fallback_title: String,
}

impl DetailExtractor {
    /// Compiles the configured selectors
    pub fn new(config: &SelectorConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            title: parse_selector(&config.title)?,
            author: parse_selector(&config.author)?,
            text: parse_selector(&config.text)?,
            document_title: parse_selector("title")?,
            author_link: parse_selector("a")?,
            title_prefix: config.title_prefix.clone(),
            fallback_title: config.fallback_title.clone(),
        })
    }

    /// Builds the record for one detail page
    ///
    /// * `title`: the title element, else the document `<title>`, else the
    ///   fallback title; the boilerplate prefix is then removed
    /// * `author`: the link inside the author element, else the element's
    ///   own text, else empty
    /// * `text`: every text fragment of the body element joined with `\n`,
    ///   untrimmed, else empty
    pub fn extract(&self, html: &str, id: u64) -> PoemRecord {
        let document = Html::parse_document(html);

        PoemRecord {
            id,
            title: self.extract_title(&document),
            author: self.extract_author(&document),
            text: self.extract_text(&document),
        }
    }

    fn extract_title(&self, document: &Html) -> String {
        let title = document
            .select(&self.title)
            .next()
            .or_else(|| document.select(&self.document_title).next())
            .map(stripped_text)
            .unwrap_or_else(|| self.fallback_title.clone());

        match title.strip_prefix(self.title_prefix.as_str()) {
            Some(stripped) => stripped.to_string(),
            None => title,
        }
    }

    fn extract_author(&self, document: &Html) -> String {
        let Some(element) = document.select(&self.author).next() else {
            return String::new();
        };

        match element.select(&self.author_link).next() {
            Some(link) => stripped_text(link),
            None => stripped_text(element),
        }
    }

    fn extract_text(&self, document: &Html) -> String {
        document
            .select(&self.text)
            .next()
            .map(|element| element.text().collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }
}
