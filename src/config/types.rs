use serde::Deserialize;
use url::Url;

/// Main configuration structure for Verse-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Config {
    /// Parses the configured base URL
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.site.base_url)
    }

    /// Returns the address of the given listing page
    ///
    /// Page 1 is the listing root itself; every later page appends the
    /// page parameter to the root's query string.
    pub fn listing_url(&self, page: u32) -> Result<Url, url::ParseError> {
        crate::url::listing_page_url(
            &self.base_url()?,
            &self.site.list_path,
            &self.site.page_param,
            page,
        )
    }
}

/// The site being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root, e.g. "https://www.public-domain-poetry.com"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing root relative to the base URL
    #[serde(rename = "list-path", default = "default_list_path")]
    pub list_path: String,

    /// Query parameter carrying the listing page number
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,
}

/// Crawler pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fixed delay after every request (milliseconds)
    #[serde(rename = "rate-limit-ms", default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: default_rate_limit_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl std::fmt::Display for UserAgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: CrawlerName/Version (+ContactURL; ContactEmail)
        write!(
            f,
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the line-delimited poem dataset
    #[serde(rename = "dataset-path", default = "default_dataset_path")]
    pub dataset_path: String,

    /// Path to the resumability checkpoint
    #[serde(rename = "checkpoint-path", default = "default_checkpoint_path")]
    pub checkpoint_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            checkpoint_path: default_checkpoint_path(),
        }
    }
}

/// CSS selectors and text rules for detail pages
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Element holding the poem title
    #[serde(default = "default_title_selector")]
    pub title: String,

    /// Element holding the author (usually wrapping a link)
    #[serde(default = "default_author_selector")]
    pub author: String,

    /// Element holding the poem body
    #[serde(default = "default_text_selector")]
    pub text: String,

    /// Boilerplate stripped from the start of titles
    #[serde(rename = "title-prefix", default = "default_title_prefix")]
    pub title_prefix: String,

    /// Title used when the page has neither a title element nor <title>
    #[serde(rename = "fallback-title", default = "default_fallback_title")]
    pub fallback_title: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: default_title_selector(),
            author: default_author_selector(),
            text: default_text_selector(),
            title_prefix: default_title_prefix(),
            fallback_title: default_fallback_title(),
        }
    }
}

fn default_list_path() -> String {
    "/listpoetry.php?letter=All".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_rate_limit_ms() -> u64 {
    1000
}

fn default_dataset_path() -> String {
    "poems.ndjson".to_string()
}

fn default_checkpoint_path() -> String {
    "progress.json".to_string()
}

fn default_title_selector() -> String {
    "font.t0".to_string()
}

fn default_author_selector() -> String {
    "font.t1".to_string()
}

fn default_text_selector() -> String {
    "font.t3a".to_string()
}

fn default_title_prefix() -> String {
    "Public Domain Poetry - ".to_string()
}

fn default_fallback_title() -> String {
    "No Title".to_string()
}
