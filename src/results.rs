//! One fetched batch of search results plus paging metadata.

use serde::Serialize;

/// A single search result as the session sees it.
///
/// `engines` records every backend that reported the result, in server
/// order, deduplicated. Media fields are optional and only present for
/// the categories that carry them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    pub engines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnetlink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: String::new(),
            engines: Vec::new(),
            category: None,
            published_date: None,
            source: None,
            resolution: None,
            img_src: None,
            author: None,
            length: None,
            journal: None,
            publisher: None,
            magnetlink: None,
            seed: None,
            leech: None,
            filesize: None,
            metadata: None,
        }
    }

    /// The host part of the result URL, for the compact listing.
    pub fn domain(&self) -> &str {
        let rest = match self.url.split_once("//") {
            Some((_, rest)) => rest,
            None => &self.url,
        };
        match rest.split_once('/') {
            Some((host, _)) => host,
            None => rest,
        }
    }
}

/// Strip non-printable characters from a URL before it is displayed,
/// copied, or handed to the browser.
pub fn sanitize_url(raw: &str) -> String {
    raw.trim().chars().filter(|c| !c.is_control()).collect()
}

/// One fetched, ordered batch of results. Order is the server's
/// relevance order and is never re-sorted. A page is immutable once
/// constructed; the session swaps the whole value on each search.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    results: Vec<SearchResult>,
    page_index: usize,
    total_available: Option<u64>,
    has_more: bool,
}

impl ResultPage {
    pub fn new(
        results: Vec<SearchResult>,
        page_index: usize,
        total_available: Option<u64>,
        has_more: bool,
    ) -> Self {
        Self {
            results,
            page_index,
            total_available,
            has_more,
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.results.get(index)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Which page of the owning context's paging sequence this is.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Total results the server claims to have, when it says.
    pub fn total_available(&self) -> Option<u64> {
        self.total_available
    }

    /// Whether another page likely exists.
    pub fn has_more(&self) -> bool {
        self.has_more
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, url: &str) -> SearchResult {
        let mut r = SearchResult::new(title, url);
        r.engines = vec!["duckduckgo".to_string()];
        r
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(
            sanitize_url("https://example.com/a\u{0}b\n "),
            "https://example.com/ab"
        );
        assert_eq!(sanitize_url(" https://ok.example "), "https://ok.example");
    }

    #[test]
    fn domain_extraction() {
        let r = result("t", "https://news.example.com/article/1");
        assert_eq!(r.domain(), "news.example.com");
        let bare = result("t", "example.org");
        assert_eq!(bare.domain(), "example.org");
    }

    #[test]
    fn page_preserves_order() {
        let page = ResultPage::new(
            vec![result("first", "https://a"), result("second", "https://b")],
            0,
            Some(2),
            false,
        );
        let titles: Vec<_> = page.results().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert!(page.get(2).is_none());
    }
}
