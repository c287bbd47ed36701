use url::Url;

/// Percent-decodes a raw `href` and trims surrounding whitespace
///
/// Byte sequences that are not valid UTF-8 after decoding become U+FFFD.
///
/// # Examples
///
/// ```
/// use verse_harvest::url::decode_href;
///
/// assert_eq!(decode_href(" /Some%20Poem-Title "), "/Some Poem-Title");
/// ```
pub fn decode_href(href: &str) -> String {
    let bytes = urlencoding::decode_binary(href.as_bytes());
    String::from_utf8_lossy(&bytes).trim().to_string()
}

/// Returns true if the link names its own scheme or host
///
/// Protocol-relative links (`//host/path`) count as absolute since joining
/// them replaces the host.
pub fn is_absolute(link: &str) -> bool {
    link.starts_with("http") || link.starts_with("//")
}

/// Returns true if the link stays on the harvested site
///
/// Relative links always do. Absolute links must contain the site root.
pub fn is_same_site(link: &str, base_url: &str) -> bool {
    if !is_absolute(link) {
        return true;
    }
    let root = base_url.trim_end_matches('/');
    !root.is_empty() && link.contains(root)
}

/// Resolves a detail link into a fetchable address
///
/// Absolute links are used as they are. Protocol-relative links take the
/// site's scheme. Relative links are joined onto the site root.
pub fn resolve_detail_url(base: &Url, link: &str) -> Result<Url, url::ParseError> {
    if link.starts_with("http") {
        Url::parse(link)
    } else {
        base.join(link)
    }
}
