use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};

use crate::domain::html_to_text;

pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Headless-browser capability. Implementations never fail: any problem yields an empty string.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> String;
}

pub struct PageFetcher {
    client: Client,
    renderer: Option<Box<dyn Renderer>>,
}

impl PageFetcher {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        renderer: Option<Box<dyn Renderer>>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(PageFetcher { client, renderer })
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Plain GET reduced to text. Error statuses and network failures give an empty string.
    pub async fn fetch_static(&self, url: &str) -> String {
        match self.client.get(url).header(ACCEPT, BROWSER_ACCEPT).send().await {
            Ok(res) => {
                let status = res.status();
                if status.as_u16() >= 400 {
                    log::warn!("Fetch {} returned HTTP {}", url, status.as_u16());
                    return "".to_string();
                }

                match res.text().await {
                    Ok(html_content) => html_to_text(&html_content),
                    Err(e) => {
                        log::error!("Failed to read body of {}. Error: {:?}", url, e);
                        "".to_string()
                    }
                }
            }
            Err(e) => {
                log::error!("Fetch error for {}: {:?}", url, e);
                "".to_string()
            }
        }
    }

    pub async fn fetch_rendered(&self, url: &str) -> String {
        match &self.renderer {
            Some(renderer) => renderer.render(url).await,
            None => "".to_string(),
        }
    }

    /// Rendered text when available, static text otherwise.
    pub async fn fetch_text(&self, url: &str) -> String {
        let rendered = self.fetch_rendered(url).await;
        if !rendered.is_empty() {
            return rendered;
        }

        self.fetch_static(url).await
    }
}
