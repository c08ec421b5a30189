//! Directory-listing detection and link extraction
//!
//! A fetched page is treated as a directory listing when its URL ends with a
//! path separator and its body contains at least one hyperlink that points at
//! a relative file or subdirectory reference. This is a heuristic, not a
//! Content-Type check: non-HTML index pages produce false negatives and are
//! treated as terminal files, which at worst mis-routes a real directory into
//! a download attempt that fails locally.

use scraper::{Html, Selector};
use url::Url;

/// Decides whether a fetched page is a directory listing and extracts the
/// candidate child links it enumerates.
///
/// Implementations must uphold the contract used by the explorer:
///
/// * `is_directory_listing` returns true only when the URL ends with `/` and
///   the body enumerates at least one relative child reference.
/// * `extract_links` resolves every qualifying relative hyperlink against the
///   page URL and never yields parent (`../`), current (`./`), or root (`/`)
///   self-references.
pub trait ListingClassifier: Send + Sync {
    /// Returns true if the page at `url` is a directory listing.
    fn is_directory_listing(&self, url: &str, body: &str) -> bool;

    /// Extracts absolute child URLs from the listing body.
    fn extract_links(&self, url: &str, body: &str) -> Vec<String>;
}

/// Classifier for HTML index pages of the kind web servers emit for
/// autoindexed directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlListing;

impl ListingClassifier for HtmlListing {
    fn is_directory_listing(&self, url: &str, body: &str) -> bool {
        if !url.ends_with('/') {
            return false;
        }

        let document = Html::parse_document(body);
        let selector = match Selector::parse("a[href]") {
            Ok(s) => s,
            Err(_) => return false,
        };

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .any(|href| is_candidate(href) && (href.ends_with('/') || href.contains('.')))
    }

    fn extract_links(&self, url: &str, body: &str) -> Vec<String> {
        let base = match Url::parse(url) {
            Ok(b) => b,
            Err(_) => return Vec::new(),
        };

        let document = Html::parse_document(body);
        let selector = match Selector::parse("a[href]") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let mut links = Vec::new();
        for element in document.select(&selector) {
            let href = match element.value().attr("href") {
                Some(h) => h,
                None => continue,
            };

            if !is_candidate(href) {
                continue;
            }

            // Parent, current, and root self-references would loop back into
            // the hierarchy being walked.
            if matches!(href, "../" | "./" | "/") {
                continue;
            }

            if let Ok(absolute) = base.join(href) {
                links.push(absolute.to_string());
            }
        }

        links
    }
}

/// A relative hyperlink that could point at a file or subdirectory.
///
/// Absolute links, anchors, and script pseudo-URLs never do.
fn is_candidate(href: &str) -> bool {
    !href.is_empty()
        && !href.starts_with("http")
        && !href.starts_with('#')
        && !href.starts_with("javascript:")
}
