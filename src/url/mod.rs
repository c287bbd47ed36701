//! URL handling module for Verse-Harvest
//!
//! This module builds listing page addresses, decodes raw `href` values and
//! resolves detail links against the site root.

mod link;
mod listing;

// Re-export main functions
pub use link::{decode_href, is_absolute, is_same_site, resolve_detail_url};
pub use listing::listing_page_url;
