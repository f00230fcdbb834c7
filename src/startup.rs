use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use serde_json::Value;

use crate::{
    configuration::{ModelApi, SearchProviderKind, Settings},
    services::{
        load_traits, ContextGatherer, GoogleHtmlSearch, ModelBackend, ModelInvoker, OpenaiClient,
        PageFetcher, Renderer, ResponsesClient, RetryPolicy, RowPipeline, SearchProvider,
        SerpApiClient, UiComposer, GOOGLE_SEARCH_URL,
    },
};

pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub model: Option<String>,
    pub max_pages: Option<usize>,
    pub max_chars: Option<usize>,
}

pub struct ComposeOptions {
    pub traits_file: Option<PathBuf>,
    pub output: PathBuf,
    pub model: Option<String>,
}

pub fn build_search(settings: &Settings) -> anyhow::Result<Box<dyn SearchProvider>> {
    let timeout = Duration::from_secs(settings.search.timeout_secs);

    match settings.search.provider {
        SearchProviderKind::Serpapi => {
            if settings.api_keys.serpapi.trim().is_empty() {
                log::warn!("SERPAPI_API_KEY is not set, every search query will be skipped");
            }
            let client = SerpApiClient::new(
                settings.api_keys.serpapi.clone(),
                settings.search.base_url.clone(),
                timeout,
            )?;
            Ok(Box::new(client))
        }
        SearchProviderKind::GoogleHtml => {
            let client = GoogleHtmlSearch::new(
                GOOGLE_SEARCH_URL.to_string(),
                timeout,
                &settings.fetch.user_agent,
            )?;
            Ok(Box::new(client))
        }
    }
}

/// Resolved once per run; `None` when no webdriver is configured or reachable.
#[cfg(feature = "render")]
pub async fn build_renderer(settings: &Settings) -> Option<Box<dyn Renderer>> {
    let webdriver_url = settings.render.webdriver_url.as_deref()?;
    let timeout = Duration::from_secs(settings.render.timeout_secs);

    crate::services::Droid::detect(webdriver_url, timeout)
        .await
        .map(|droid| Box::new(droid) as Box<dyn Renderer>)
}

#[cfg(not(feature = "render"))]
pub async fn build_renderer(settings: &Settings) -> Option<Box<dyn Renderer>> {
    if settings.render.webdriver_url.is_some() {
        log::warn!("webdriver_url is set but this build has no render feature; using static fetches");
    }
    None
}

pub fn build_backend(settings: &Settings) -> anyhow::Result<Box<dyn ModelBackend>> {
    let api_key = settings.api_keys.openai.clone();
    if api_key.trim().is_empty() {
        bail!("AZURE_OPENAI_API_KEY must be present in the environment");
    }
    let api_base = settings.model.api_base.clone();
    let timeout = Duration::from_secs(settings.model.timeout_secs);

    match settings.model.api {
        ModelApi::Responses => Ok(Box::new(ResponsesClient::new(api_key, api_base, timeout)?)),
        ModelApi::Chat => Ok(Box::new(OpenaiClient::new(api_key, api_base, timeout)?)),
    }
}

pub fn build_invoker(settings: &Settings, model: Option<String>) -> anyhow::Result<ModelInvoker> {
    let model = model.unwrap_or_else(|| settings.model.deployment.clone());
    log::info!("Using model deployment: {}", model);

    let policy = RetryPolicy {
        max_attempts: settings.model.max_attempts,
        base_delay: Duration::from_millis(settings.model.base_delay_ms),
    };

    Ok(ModelInvoker::new(build_backend(settings)?, model).with_policy(policy))
}

pub async fn build_pipeline(
    settings: &Settings,
    options: &AnalyzeOptions,
) -> anyhow::Result<RowPipeline> {
    let renderer = build_renderer(settings).await;
    let fetcher = PageFetcher::new(
        &settings.fetch.user_agent,
        Duration::from_secs(settings.fetch.timeout_secs),
        renderer,
    )?;
    let gatherer = ContextGatherer::new(build_search(settings)?, fetcher)
        .with_queries(
            settings.search.queries.clone(),
            settings.search.results_per_query,
        )
        .with_gathering(&settings.gathering);
    let invoker = build_invoker(settings, options.model.clone())?;

    Ok(RowPipeline::new(
        gatherer,
        invoker,
        options.max_pages.unwrap_or(settings.gathering.max_pages),
        options.max_chars.unwrap_or(settings.gathering.max_chars),
    ))
}

pub async fn run_analysis(settings: &Settings, options: AnalyzeOptions) -> anyhow::Result<usize> {
    let pipeline = build_pipeline(settings, &options).await?;

    pipeline
        .run_files(&options.input, &options.output)
        .await
        .with_context(|| format!("Failed to analyze {}", options.input.display()))
}

pub async fn run_compose(settings: &Settings, options: ComposeOptions) -> anyhow::Result<Value> {
    let traits = load_traits(options.traits_file.as_deref())?;
    let composer = UiComposer::new(build_invoker(settings, options.model)?);

    let schema = composer.compose_to_file(&traits, &options.output).await?;
    Ok(schema)
}
