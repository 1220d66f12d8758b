//! Page comparison against the published reference documentation
//!
//! A [`PageComparator`] reads a locally built HTML page, fetches the
//! published page for the same module, extracts the content section from
//! both, and reports the filtered diff residue. Reference bodies are cached
//! per URL so a run fetches each page at most once; the cache is injected
//! so several comparators (or a future parallel runner) can share one.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use kuchikikiki::traits::TendrilSink;
use thiserror::Error;

use crate::diff::{diff_lines, similarity_ratio, DiffLine};
use crate::filters::filter_page_diff;
use crate::normalize::normalize_text;

/// CSS selector for the content container of a generated page.
pub const CONTENT_SELECTOR: &str = "body > div > section > div > div > div.document";

/// Errors that can occur while comparing pages.
#[derive(Error, Debug)]
pub enum CompareError {
    /// The HTTP client could not be constructed.
    #[error("failed to construct HTTP client: {0}")]
    ClientInit(String),

    /// The local page could not be read.
    #[error("failed to read local page '{path}': {source}")]
    ReadPage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The reference page could not be fetched. Distinct from a content
    /// mismatch: the page could not be checked at all.
    #[error("reference page unavailable '{url}': {reason}")]
    ReferenceUnavailable { url: String, reason: String },
}

/// Shared cache of normalized reference bodies, keyed by URL.
pub type ReferenceCache = Arc<Mutex<HashMap<String, String>>>;

/// Compares locally built pages against the published reference site.
pub struct PageComparator {
    client: reqwest::blocking::Client,
    cache: ReferenceCache,
}

impl PageComparator {
    /// Create a comparator with its own empty reference cache.
    pub fn new() -> Result<Self, CompareError> {
        Self::with_cache(Arc::new(Mutex::new(HashMap::new())))
    }

    /// Create a comparator over a shared reference cache.
    ///
    /// Entries already present in the cache are served without any network
    /// access, which is how tests run offline.
    pub fn with_cache(cache: ReferenceCache) -> Result<Self, CompareError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("stubdoc/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| CompareError::ClientInit(err.to_string()))?;
        Ok(Self { client, cache })
    }

    /// Fetch a reference page body, normalized, through the cache.
    ///
    /// The cache lock is held across the fetch so each URL is requested at
    /// most once per cache instance.
    pub fn fetch_reference(&self, url: &str) -> Result<String, CompareError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(body) = cache.get(url) {
            return Ok(body.clone());
        }

        let response = self.client.get(url).send().map_err(|err| {
            CompareError::ReferenceUnavailable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        })?;
        if !response.status().is_success() {
            return Err(CompareError::ReferenceUnavailable {
                url: url.to_string(),
                reason: format!("HTTP status {}", response.status()),
            });
        }
        let body = response
            .text()
            .map_err(|err| CompareError::ReferenceUnavailable {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        let normalized = normalize_text(&body);
        cache.insert(url.to_string(), normalized.clone());
        Ok(normalized)
    }

    /// Compare a local page against its reference URL.
    ///
    /// Returns the filtered residue: removed lines are content present only
    /// in the reference, added lines content present only locally.
    pub fn compare(
        &self,
        local_page: &Path,
        reference_url: &str,
    ) -> Result<Vec<DiffLine>, CompareError> {
        let (reference_lines, local_lines) = self.extract_both(local_page, reference_url)?;
        let diff = diff_lines(&reference_lines, &local_lines);
        Ok(filter_page_diff(diff, &local_lines))
    }

    /// Similarity ratio between the two extracted line sequences.
    ///
    /// Computed over the raw extraction, independent of the filter
    /// pipeline. Reported for diagnostics only.
    pub fn similarity(
        &self,
        local_page: &Path,
        reference_url: &str,
    ) -> Result<f64, CompareError> {
        let (reference_lines, local_lines) = self.extract_both(local_page, reference_url)?;
        Ok(similarity_ratio(&reference_lines, &local_lines))
    }

    fn extract_both(
        &self,
        local_page: &Path,
        reference_url: &str,
    ) -> Result<(Vec<String>, Vec<String>), CompareError> {
        let local_html =
            fs::read_to_string(local_page).map_err(|source| CompareError::ReadPage {
                path: local_page.to_path_buf(),
                source,
            })?;
        let reference_html = self.fetch_reference(reference_url)?;

        let reference_lines = split_lines(&extract_section(&reference_html, CONTENT_SELECTOR));
        let local_lines = split_lines(&extract_section(&local_html, CONTENT_SELECTOR));
        Ok((reference_lines, local_lines))
    }
}

/// Extract the text of the first element matching `selector`.
///
/// Returns the empty string when nothing matches. A page without the
/// expected container then diffs as all-removed, which surfaces the
/// problem through the comparison instead of an error.
#[must_use]
pub fn extract_section(html: &str, selector: &str) -> String {
    let document = kuchikikiki::parse_html().one(html);
    match document.select_first(selector) {
        Ok(node) => normalize_text(&node.as_node().text_contents()),
        Err(()) => String::new(),
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(content: &str) -> String {
        format!(
            "<html><body><div><section><div><div><div class=\"document\">{content}</div></div></div></section></div></body></html>"
        )
    }

    fn seeded_comparator(url: &str, reference_html: &str) -> PageComparator {
        let cache: ReferenceCache = Arc::new(Mutex::new(HashMap::new()));
        cache
            .lock()
            .unwrap()
            .insert(url.to_string(), normalize_text(reference_html));
        PageComparator::with_cache(cache).unwrap()
    }

    fn write_page(dir: &tempfile::TempDir, name: &str, html: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, html).unwrap();
        path
    }

    #[test]
    fn test_extract_section_matches() {
        let html = page("<p>os \u{2013} services</p>\n<p>body text</p>");
        let text = extract_section(&html, CONTENT_SELECTOR);
        assert!(text.contains("os \u{2013} services"));
        assert!(text.contains("body text"));
    }

    #[test]
    fn test_extract_section_no_match_is_empty() {
        let html = "<html><body><p>elsewhere</p></body></html>";
        assert_eq!(extract_section(html, CONTENT_SELECTOR), "");
    }

    #[test]
    fn test_extract_section_strips_anchor_glyphs() {
        let html = page("<h2>Functions\u{f0c1}</h2>");
        let text = extract_section(&html, CONTENT_SELECTOR);
        assert!(text.contains("Functions"));
        assert!(!text.contains('\u{f0c1}'));
    }

    #[test]
    fn test_compare_identical_pages_empty_residue() {
        let url = "https://example.invalid/library/os.html";
        let html = page("<p>os - services</p>\n<p>same body</p>");
        let comparator = seeded_comparator(url, &html);

        let dir = tempfile::tempdir().unwrap();
        let local = write_page(&dir, "os.html", &html);
        let residue = comparator.compare(&local, url).unwrap();
        assert!(residue.is_empty());
    }

    #[test]
    fn test_compare_reports_reference_only_content() {
        let url = "https://example.invalid/library/machine.html";
        let reference = page("<p>machine - hardware</p>\n<p>wake_reason()</p>\n<p>shared</p>");
        let local = page("<p>machine - hardware</p>\n<p>shared</p>");
        let comparator = seeded_comparator(url, &reference);

        let dir = tempfile::tempdir().unwrap();
        let local_path = write_page(&dir, "machine.html", &local);
        let residue = comparator.compare(&local_path, url).unwrap();
        assert_eq!(residue.len(), 1);
        assert!(residue[0].is_removed());
        assert_eq!(residue[0].text, "wake_reason()");
    }

    #[test]
    fn test_compare_missing_selector_locally_is_all_removed() {
        let url = "https://example.invalid/library/sys.html";
        let reference = page("<p>sys - system</p>\n<p>exit()</p>");
        let comparator = seeded_comparator(url, &reference);

        let dir = tempfile::tempdir().unwrap();
        let local_path = write_page(&dir, "sys.html", "<html><body>bare</body></html>");
        let residue = comparator.compare(&local_path, url).unwrap();
        assert!(!residue.is_empty());
        assert!(residue.iter().all(DiffLine::is_removed));
    }

    #[test]
    fn test_similarity_identical_pages() {
        let url = "https://example.invalid/library/os.html";
        let html = page("<p>one</p>\n<p>two</p>");
        let comparator = seeded_comparator(url, &html);

        let dir = tempfile::tempdir().unwrap();
        let local = write_page(&dir, "os.html", &html);
        let ratio = comparator.similarity(&local, url).unwrap();
        assert!((ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fetch_reference_served_from_cache() {
        let url = "https://example.invalid/cached.html";
        let comparator = seeded_comparator(url, "<html>seeded</html>");
        let body = comparator.fetch_reference(url).unwrap();
        assert_eq!(body, "<html>seeded</html>");
    }

    #[test]
    fn test_fetch_reference_unreachable_host() {
        let comparator = PageComparator::new().unwrap();
        let err = comparator
            .fetch_reference("http://127.0.0.1:1/never.html")
            .unwrap_err();
        assert!(matches!(err, CompareError::ReferenceUnavailable { .. }));
    }

    #[test]
    fn test_compare_missing_local_page() {
        let url = "https://example.invalid/library/os.html";
        let comparator = seeded_comparator(url, &page("<p>x</p>"));
        let err = comparator
            .compare(Path::new("/nonexistent/os.html"), url)
            .unwrap_err();
        assert!(matches!(err, CompareError::ReadPage { .. }));
    }

    #[test]
    fn test_shared_cache_between_comparators() {
        let url = "https://example.invalid/shared.html";
        let cache: ReferenceCache = Arc::new(Mutex::new(HashMap::new()));
        cache
            .lock()
            .unwrap()
            .insert(url.to_string(), "body".to_string());

        let first = PageComparator::with_cache(Arc::clone(&cache)).unwrap();
        let second = PageComparator::with_cache(cache).unwrap();
        assert_eq!(first.fetch_reference(url).unwrap(), "body");
        assert_eq!(second.fetch_reference(url).unwrap(), "body");
    }
}
