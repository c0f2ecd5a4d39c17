//! HTML parser for extracting a page's title and outbound links
//!
//! Only two things are read from a page:
//! - The text of the first `<title>` element
//! - The `href` of every `<a>` element

use scraper::{Html, Selector};
use url::Url;

/// Title reported for pages without a usable `<title>`
pub const UNTITLED: &str = "untitled";

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title, or `UNTITLED`
    pub title: String,

    /// Outbound links, `/`-relative ones made absolute against the site root
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the title and links
///
/// # Link Rules
///
/// - Hrefs starting with `/` are joined onto `root`
/// - Every other href is passed through unchanged
/// - Empty hrefs are skipped
///
/// # Example
///
/// ```
/// use betteridge_crawl::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Home</title></head><body><a href="/page">Link</a></body></html>"#;
/// let root = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &root);
/// assert_eq!(parsed.title, "Home");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_page(html: &str, root: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| UNTITLED.to_string());
    let links = extract_links(&document, root);

    ParsedPage { title, links }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the href of every anchor in the document
fn extract_links(document: &Html, root: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(link) = resolve_link(href, root) {
                    links.push(link);
                }
            }
        }
    }

    links
}

/// Resolves `/`-relative hrefs against the root; passes everything else through
fn resolve_link(href: &str, root: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with('/') {
        return root.join(href).ok().map(|url| url.to_string());
    }

    Some(href.to_string())
}

/// Decodes HTML character references left in already-extracted text
///
/// Titles are sometimes escaped twice by the publishing system (`&amp;#39;`),
/// so one round of decoding by the HTML parser is not always enough.
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    // Keep markup-looking text literal
    let fragment = Html::parse_fragment(&text.replace('<', "&lt;"));
    fragment.root_element().text().collect()
}
