use serde::{Deserialize, Serialize};

/// Main configuration structure
///
/// Everything except the instance URL has a sensible default, so a
/// config file containing only `searxng_url` is complete. String-typed
/// fields (safe search, http method) are validated at bootstrap, not
/// silently replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SearXNG instance URL, e.g. "https://searxng.example.com"
    #[serde(default)]
    pub searxng_url: Option<String>,

    /// Results shown per page; 0 defers to the server default
    #[serde(default = "default_result_count")]
    pub result_count: usize,

    /// Default categories to search in
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Default engines to restrict to; empty means all available
    #[serde(default)]
    pub engines: Vec<String>,

    /// Safe search level: none, moderate, or strict
    #[serde(default = "default_safe_search")]
    pub safe_search: String,

    /// Show full URLs in result listings
    #[serde(default)]
    pub expand: bool,

    /// Preferred result language, e.g. "en"
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,

    /// Command used to open URLs; platform default when unset
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url_handler: Option<String>,

    /// Enable debug logging to the config directory
    #[serde(default)]
    pub debug: bool,

    /// HTTP method for search requests: GET or POST
    #[serde(default = "default_http_method")]
    pub http_method: String,

    /// Skip SSL certificate verification (not recommended)
    #[serde(default)]
    pub no_verify_ssl: bool,

    /// Send no User-Agent header
    #[serde(default)]
    pub no_user_agent: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// HTTP basic auth, for instances behind a proxy
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<String>,

    /// Disable ANSI colors
    #[serde(default)]
    pub no_color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            searxng_url: None,
            result_count: default_result_count(),
            categories: default_categories(),
            engines: Vec::new(),
            safe_search: default_safe_search(),
            expand: false,
            language: None,
            url_handler: None,
            debug: false,
            http_method: default_http_method(),
            no_verify_ssl: false,
            no_user_agent: false,
            timeout_secs: default_timeout_secs(),
            username: None,
            password: None,
            no_color: false,
        }
    }
}

fn default_result_count() -> usize {
    10
}

fn default_categories() -> Vec<String> {
    vec!["general".to_string()]
}

fn default_safe_search() -> String {
    "strict".to_string()
}

fn default_http_method() -> String {
    "GET".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
