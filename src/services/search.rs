use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

static A_TAG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static H3_TAG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("valid selector"));

/// One organic result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search API key is not configured")]
    MissingApiKey,
    #[error("Search requires a non-empty query")]
    EmptyQuery,
    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Search returned status {0}")]
    Status(u16),
    #[error("Blocked by captcha on query: {0}")]
    CaptchaBlocked(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, num: usize) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Serialize)]
struct SerpQuery<'a> {
    engine: &'a str,
    q: &'a str,
    api_key: &'a str,
    num: usize,
}

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<SerpOrganicResult>,
}

// Fields can come back as null, so they are read leniently.
#[derive(Deserialize)]
struct SerpOrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

pub struct SerpApiClient {
    client: Client,
    api_key: String,
    url: String,
}

impl SerpApiClient {
    pub fn new(api_key: String, url: String, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(SerpApiClient {
            client,
            api_key,
            url,
        })
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str, num: usize) -> Result<Vec<SearchHit>, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey);
        }
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let res = self
            .client
            .get(&self.url)
            .query(&SerpQuery {
                engine: "google",
                q: query,
                api_key: &self.api_key,
                num,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let json = res.json::<SerpResponse>().await?;
        let hits: Vec<SearchHit> = json
            .organic_results
            .into_iter()
            .take(num)
            .map(|item| SearchHit {
                title: item.title.unwrap_or_default(),
                link: item.link.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
            })
            .collect();

        log::info!("Search '{}' returned {} organic results", query, hits.len());

        Ok(hits)
    }
}

/// Keyless provider that reads Google's html results page.
pub struct GoogleHtmlSearch {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct GoogleQuery<'a> {
    q: &'a str,
    num: usize,
}

impl GoogleHtmlSearch {
    pub fn new(url: String, timeout: Duration, user_agent: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .read_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(GoogleHtmlSearch { client, url })
    }
}

#[async_trait]
impl SearchProvider for GoogleHtmlSearch {
    async fn search(&self, query: &str, num: usize) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let res = self
            .client
            .get(&self.url)
            .query(&GoogleQuery { q: query, num })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let html_content = res.text().await?;

        match parse_google_results(&html_content, num) {
            Some(hits) => {
                log::info!("Found {} h3_tags on query: {}", hits.len(), query);
                Ok(hits)
            }
            None => match html_content.contains("did not match any documents") {
                true => {
                    log::warn!("Found no results on query: {}", query);
                    Ok(vec![])
                }
                false => {
                    log::error!("Blocked by captcha on query: {}", query);
                    Err(SearchError::CaptchaBlocked(query.to_string()))
                }
            },
        }
    }
}

/// Result anchors are the `a` tags wrapping an `h3`. `None` when the page has no headings at all.
pub fn parse_google_results(html_content: &str, num: usize) -> Option<Vec<SearchHit>> {
    let html_document = Html::parse_document(html_content);

    if html_document.select(&H3_TAG).next().is_none() {
        return None;
    }

    let hits = html_document
        .select(&A_TAG)
        .filter_map(|a_tag| {
            let heading = a_tag.select(&H3_TAG).next()?;
            let link = unwrap_redirect(a_tag.value().attr("href")?)?;

            Some(SearchHit {
                title: element_text(heading),
                link,
                snippet: "".to_string(),
            })
        })
        .take(num)
        .collect();

    Some(hits)
}

fn element_text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

/// Resolves `/url?q=<target>&...` redirect links; other absolute links pass through.
fn unwrap_redirect(href: &str) -> Option<String> {
    if href.starts_with("/url?") {
        let redirect = Url::parse(&format!("https://www.google.com{}", href)).ok()?;
        return redirect
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, target)| target.to_string());
    }

    match href.starts_with("http://") || href.starts_with("https://") {
        true => Some(href.to_string()),
        false => None,
    }
}
