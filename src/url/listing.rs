use url::Url;

/// Builds the address of a listing page
///
/// Page 1 (and page 0, which never occurs in a harvest) is the listing root
/// itself. Later pages append `page_param=N` to the root's query string,
/// keeping any parameters the root already carries.
///
/// # Arguments
///
/// * `base` - The site root
/// * `list_path` - Listing root relative to `base`
/// * `page_param` - Query parameter carrying the page number
/// * `page` - 1-based page number
///
/// # Examples
///
/// ```
/// use url::Url;
/// use verse_harvest::url::listing_page_url;
///
/// let base = Url::parse("https://poems.example.org").unwrap();
/// let url = listing_page_url(&base, "/list.php?letter=All", "page", 4).unwrap();
/// assert_eq!(url.as_str(), "https://poems.example.org/list.php?letter=All&page=4");
/// ```
pub fn listing_page_url(
    base: &Url,
    list_path: &str,
    page_param: &str,
    page: u32,
) -> Result<Url, url::ParseError> {
    let mut url = base.join(list_path)?;
    if page > 1 {
        url.query_pairs_mut()
            .append_pair(page_param, &page.to_string());
    }
    Ok(url)
}
