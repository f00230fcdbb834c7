#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use startup_lens::services::{
    ContextGatherer, ModelBackend, ModelError, PageFetcher, SerpApiClient,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Backend that replays scripted results in order.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<Value, ModelError>>>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<Value, ModelError>>) -> Self {
        ScriptedBackend {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn create(&self, _model: &str, _input: &str) -> Result<Value, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Api("no scripted response left".to_string())))
    }
}

pub fn http_error(status: u16) -> Result<Value, ModelError> {
    Err(ModelError::Http {
        status,
        message: format!("status {}", status),
    })
}

pub fn output_text(text: &str) -> Value {
    json!({ "output_text": text })
}

pub fn page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html")
}

pub async fn mount_search_results(server: &MockServer, results: Value) {
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic_results": results
        })))
        .mount(server)
        .await;
}

pub fn gatherer_for(server: &MockServer) -> ContextGatherer {
    let search = SerpApiClient::new(
        "test-key".to_string(),
        format!("{}/search.json", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let fetcher = PageFetcher::new("test-agent", Duration::from_secs(5), None).unwrap();

    ContextGatherer::new(Box::new(search), fetcher)
}
