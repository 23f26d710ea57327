//! HTTP client for the SearXNG JSON API.

use crate::client::{SearchClient, SearchError};
use crate::query::QueryContext;
use crate::results::{sanitize_url, ResultPage, SearchResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn default_user_agent() -> String {
    format!("searxngr/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP method used for search requests. Some instances only accept one
/// of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => anyhow::bail!("invalid http method '{other}' (use GET or POST)"),
        }
    }
}

/// Connection settings for one instance, fixed at bootstrap.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub verify_ssl: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub http_method: HttpMethod,
    /// `None` suppresses the User-Agent header entirely.
    pub user_agent: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            verify_ssl: true,
            username: None,
            password: None,
            http_method: HttpMethod::Get,
            user_agent: Some(default_user_agent()),
        }
    }
}

/// One engine from the instance's roster, as reported by `/config`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    #[serde(default)]
    pub shortcut: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

/// Client for one SearXNG instance.
pub struct SearxngClient {
    client: reqwest::Client,
    base_url: String,
    options: ClientOptions,
}

impl SearxngClient {
    pub fn new(base_url: impl Into<String>, options: ClientOptions) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(!options.verify_ssl);
        if let Some(ua) = &options.user_agent {
            builder = builder.user_agent(ua.clone());
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            options,
        })
    }

    /// Request parameters for a context, shared by GET and POST.
    fn build_params(context: &QueryContext) -> Vec<(&'static str, String)> {
        let query = match context.site() {
            Some(site) => format!("site:{site} {}", context.query()),
            None => context.query().to_string(),
        };

        let mut params = vec![("q", query), ("format", "json".to_string())];

        if !context.categories().is_empty() {
            let joined = context
                .categories()
                .iter()
                .map(|c| c.wire())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("categories", joined));
        }
        if !context.engines().is_empty() {
            let joined = context.engines().iter().cloned().collect::<Vec<_>>().join(",");
            params.push(("engines", joined));
        }
        if let Some(language) = context.language() {
            params.push(("language", language.to_string()));
        }
        params.push(("safesearch", context.safe_search().wire().to_string()));
        if let Some(range) = context.time_range() {
            params.push(("time_range", range.wire().to_string()));
        }
        let pageno = context.page_index() + 1;
        if pageno > 1 {
            params.push(("pageno", pageno.to_string()));
        }

        params
    }

    async fn send(&self, params: &[(&'static str, String)]) -> Result<reqwest::Response, SearchError> {
        let url = format!("{}/search", self.base_url);
        let mut request = match self.options.http_method {
            HttpMethod::Get => self.client.get(&url).query(params),
            HttpMethod::Post => self.client.post(&url).form(params),
        };
        if let Some(username) = &self.options.username {
            request = request.basic_auth(username, self.options.password.as_deref());
        }
        Ok(request.send().await?)
    }

    /// Fetch the instance's engine roster from `/config`. Advisory only:
    /// engine names in a query always pass through unvalidated.
    pub async fn fetch_engines(&self) -> Result<Vec<EngineInfo>, SearchError> {
        let url = format!("{}/config", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let config: InstanceConfig =
            serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))?;
        let mut engines = config.engines;
        engines.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(engines)
    }
}

#[async_trait::async_trait]
impl SearchClient for SearxngClient {
    async fn execute(&self, context: &QueryContext) -> Result<ResultPage, SearchError> {
        let params = Self::build_params(context);

        tracing::debug!(
            query = %context.query(),
            page = context.page_index(),
            engines = context.engines().len(),
            "searxng request"
        );

        let response = self.send(&params).await?;
        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() == 429 {
            tracing::warn!(status = %status, "instance rate limited the request");
            return Err(SearchError::RateLimited(body));
        }
        if !status.is_success() {
            tracing::warn!(status = %status, "searxng returned an error response");
            return Err(SearchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))?;

        for engine in &parsed.unresponsive_engines {
            tracing::warn!(engine = %engine, "engine did not respond");
        }

        let raw_count = parsed.results.len();
        let mut results: Vec<SearchResult> = parsed.results.into_iter().map(convert).collect();
        let page_size = context.page_size();
        if page_size > 0 && results.len() > page_size {
            results.truncate(page_size);
        }
        let has_more = if page_size > 0 {
            raw_count >= page_size
        } else {
            raw_count > 0
        };

        tracing::debug!(returned = raw_count, kept = results.len(), "searxng response");

        Ok(ResultPage::new(
            results,
            context.page_index(),
            parsed.number_of_results.map(|n| n as u64),
            has_more,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WireResult>,
    #[serde(default)]
    number_of_results: Option<f64>,
    #[serde(default)]
    unresponsive_engines: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct InstanceConfig {
    #[serde(default)]
    engines: Vec<EngineInfo>,
}

/// Result entry as the server sends it. Everything defaults: engines
/// disagree wildly about which fields they fill in.
#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    engine: Option<String>,
    #[serde(default)]
    engines: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(rename = "publishedDate", default)]
    published_date: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    img_src: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    length: Option<Value>,
    #[serde(default)]
    journal: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    magnetlink: Option<String>,
    #[serde(default)]
    seed: Option<Value>,
    #[serde(default)]
    leech: Option<Value>,
    #[serde(default)]
    filesize: Option<Value>,
    #[serde(default)]
    size: Option<Value>,
    #[serde(default)]
    metadata: Option<Value>,
}

fn convert(wire: WireResult) -> SearchResult {
    let mut engines = Vec::new();
    let reported = if wire.engines.is_empty() {
        wire.engine.into_iter().collect()
    } else {
        wire.engines
    };
    for engine in reported {
        if !engine.is_empty() && !engines.contains(&engine) {
            engines.push(engine);
        }
    }

    let mut result = SearchResult::new(wire.title, sanitize_url(&wire.url));
    result.content = wire.content.unwrap_or_default();
    result.engines = engines;
    result.category = wire.category;
    result.published_date = wire.published_date.filter(|d| !d.trim().is_empty());
    result.source = wire.source;
    result.resolution = wire.resolution;
    result.img_src = wire.img_src.map(|u| sanitize_url(&u));
    result.author = wire.author;
    result.length = wire.length.and_then(format_length);
    result.journal = wire.journal;
    result.publisher = wire.publisher;
    result.magnetlink = wire.magnetlink.map(|u| sanitize_url(&u));
    result.seed = wire.seed.and_then(value_text);
    result.leech = wire.leech.and_then(value_text);
    result.filesize = wire.filesize.or(wire.size).and_then(value_text);
    result.metadata = wire.metadata.and_then(value_text);
    result
}

/// Engines report media length either preformatted or as seconds.
fn format_length(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => {
            let seconds = n.as_f64()?;
            let seconds = seconds.max(0.0) as u64;
            Some(format!("{:02}:{:02}", seconds / 60, seconds % 60))
        }
        _ => None,
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
