//! Search parameters for one request: query text, filters, and paging state.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A field value was rejected at construction or mutation time.
///
/// Construction never substitutes a default for an explicitly-given
/// invalid value; the offending token is carried in the error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("invalid safe search level '{0}' (use 'none', 'moderate', or 'strict')")]
    InvalidSafeSearch(String),

    #[error("invalid time range '{0}' (use 'day', 'week', 'month', 'year', or 'none')")]
    InvalidTimeRange(String),

    #[error("invalid category '{0}' (use 'general', 'news', 'videos', 'images', 'music', 'map', 'science', 'it', 'files', or 'social+media')")]
    InvalidCategory(String),

    #[error("site filter must not be empty")]
    EmptySite,
}

/// Paging was requested while `page_size` is 0, so no page boundary exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("paging is unavailable: result count per page is 0 (server default)")]
pub struct PagingUnavailableError;

/// Safe search filtering level. SearXNG encodes this as 0/1/2 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    None,
    Moderate,
    Strict,
}

impl SafeSearch {
    pub fn wire(self) -> u8 {
        match self {
            SafeSearch::None => 0,
            SafeSearch::Moderate => 1,
            SafeSearch::Strict => 2,
        }
    }
}

impl FromStr for SafeSearch {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SafeSearch::None),
            "moderate" => Ok(SafeSearch::Moderate),
            "strict" => Ok(SafeSearch::Strict),
            other => Err(ValidationError::InvalidSafeSearch(other.to_string())),
        }
    }
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SafeSearch::None => "none",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Strict => "strict",
        })
    }
}

/// Time window to restrict results to. Absence (no restriction) is
/// modelled as `Option<TimeRange>`; `parse_token` maps "none" to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Parse a user-supplied token, accepting the single-letter short forms.
    pub fn parse_token(s: &str) -> Result<Option<TimeRange>, ValidationError> {
        match s {
            "none" => Ok(None),
            "d" | "day" => Ok(Some(TimeRange::Day)),
            "w" | "week" => Ok(Some(TimeRange::Week)),
            "m" | "month" => Ok(Some(TimeRange::Month)),
            "y" | "year" => Ok(Some(TimeRange::Year)),
            other => Err(ValidationError::InvalidTimeRange(other.to_string())),
        }
    }

    pub fn wire(self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}

/// SearXNG result category tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    News,
    Videos,
    Images,
    Music,
    Map,
    Science,
    It,
    Files,
    #[serde(rename = "social media")]
    SocialMedia,
}

impl Category {
    /// Name the server expects in the `categories` request parameter.
    pub fn wire(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::News => "news",
            Category::Videos => "videos",
            Category::Images => "images",
            Category::Music => "music",
            Category::Map => "map",
            Category::Science => "science",
            Category::It => "it",
            Category::Files => "files",
            Category::SocialMedia => "social media",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Category::General),
            "news" => Ok(Category::News),
            "videos" => Ok(Category::Videos),
            "images" => Ok(Category::Images),
            "music" => Ok(Category::Music),
            "map" => Ok(Category::Map),
            "science" => Ok(Category::Science),
            "it" => Ok(Category::It),
            "files" => Ok(Category::Files),
            "social" | "social+media" | "social media" => Ok(Category::SocialMedia),
            other => Err(ValidationError::InvalidCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::SocialMedia => f.write_str("social+media"),
            other => f.write_str(other.wire()),
        }
    }
}

/// One edit to the engine or category selection, parsed from a command
/// line. A bare list replaces the whole set; `+`/`-` prefixed names
/// adjust the existing set. The two forms never mix within one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetEdit<T> {
    Replace(Vec<T>),
    Patch { add: Vec<T>, remove: Vec<T> },
}

impl<T: Ord + Clone> SetEdit<T> {
    /// Apply the edit to `set`. Replacement discards the previous
    /// contents entirely; patches are applied add-first so `+a -a`
    /// on an empty set stays empty.
    pub fn apply_to(&self, set: &mut BTreeSet<T>) {
        match self {
            SetEdit::Replace(values) => {
                set.clear();
                set.extend(values.iter().cloned());
            }
            SetEdit::Patch { add, remove } => {
                set.extend(add.iter().cloned());
                for value in remove {
                    set.remove(value);
                }
            }
        }
    }
}

/// Which page boundary to move to relative to the current offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Next,
    Previous,
    First,
}

/// The full set of parameters describing one search request.
///
/// All mutations are all-or-nothing: a rejected value leaves the
/// context exactly as it was.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct QueryContext {
    query: String,
    categories: BTreeSet<Category>,
    engines: BTreeSet<String>,
    safe_search: SafeSearch,
    time_range: Option<TimeRange>,
    site: Option<String>,
    language: Option<String>,
    page_size: usize,
    offset: usize,
}

impl QueryContext {
    pub fn new(query: impl Into<String>) -> Result<Self, ValidationError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self {
            query,
            categories: BTreeSet::new(),
            engines: BTreeSet::new(),
            safe_search: SafeSearch::Strict,
            time_range: None,
            site: None,
            language: None,
            page_size: 10,
            offset: 0,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Empty set means "use the server default categories".
    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    /// Empty set means "all available engines". Engine names are opaque
    /// strings; unknown values pass through for the server to judge.
    pub fn engines(&self) -> &BTreeSet<String> {
        &self.engines
    }

    pub fn safe_search(&self) -> SafeSearch {
        self.safe_search
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Results per page; 0 defers to the server default and disables paging.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Zero-based page counter derived from the offset.
    pub fn page_index(&self) -> usize {
        if self.page_size == 0 {
            0
        } else {
            self.offset / self.page_size
        }
    }

    /// Replace the query text and rewind to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) -> Result<(), ValidationError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        self.query = query;
        self.offset = 0;
        Ok(())
    }

    pub fn set_safe_search(&mut self, level: SafeSearch) {
        self.safe_search = level;
        self.offset = 0;
    }

    pub fn set_time_range(&mut self, range: Option<TimeRange>) {
        self.time_range = range;
        self.offset = 0;
    }

    pub fn set_site(&mut self, site: Option<String>) -> Result<(), ValidationError> {
        if let Some(ref s) = site {
            if s.trim().is_empty() {
                return Err(ValidationError::EmptySite);
            }
        }
        self.site = site;
        self.offset = 0;
        Ok(())
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
        self.offset = 0;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.offset = 0;
    }

    pub fn apply_engines(&mut self, edit: &SetEdit<String>) {
        edit.apply_to(&mut self.engines);
        self.offset = 0;
    }

    pub fn apply_categories(&mut self, edit: &SetEdit<Category>) {
        edit.apply_to(&mut self.categories);
        self.offset = 0;
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.insert(category);
    }

    /// Compute the offset a paging move would land on. Pure arithmetic;
    /// the caller decides whether to commit it.
    pub fn paged_offset(&self, direction: PageDirection) -> Result<usize, PagingUnavailableError> {
        if self.page_size == 0 {
            return Err(PagingUnavailableError);
        }
        Ok(match direction {
            PageDirection::Next => self.offset + self.page_size,
            PageDirection::Previous => self.offset.saturating_sub(self.page_size),
            PageDirection::First => 0,
        })
    }

    pub(crate) fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Same context at a different offset, for a prospective page fetch.
    pub fn at_offset(&self, offset: usize) -> Self {
        let mut ctx = self.clone();
        ctx.offset = offset;
        ctx
    }
}
