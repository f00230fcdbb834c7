mod common;

use common::{gatherer_for, mount_search_results, page};
use serde_json::json;
use wiremock::{
    matchers::{any, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn gather_homepage_only_when_search_is_empty() {
    let server = MockServer::start().await;
    mount_search_results(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page("<h1>Payments API</h1><p>for startups</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let context = gatherer_for(&server).gather(&server.uri(), 5, 6000).await;

    assert_eq!(
        context,
        format!("URL: {}\nPayments API for startups", server.uri())
    );
}

#[tokio::test]
async fn gather_runs_every_query_scoped_to_host() {
    let server = MockServer::start().await;
    let queries = [
        "site:127.0.0.1 product OR platform OR solution",
        "site:127.0.0.1 blog OR research OR engineering",
        "site:127.0.0.1 docs OR api OR developer",
        "site:127.0.0.1 features OR technology",
        "site:127.0.0.1 ai OR genai OR llm",
        "site:127.0.0.1 pricing OR plans",
    ];
    for query in queries {
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", query))
            .and(query_param("engine", "google"))
            .and(query_param("num", "6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"organic_results": []})))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page("home"))
        .mount(&server)
        .await;

    gatherer_for(&server).gather(&server.uri(), 5, 6000).await;
}

#[tokio::test]
async fn gather_deduplicates_on_canonical_link() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_search_results(
        &server,
        json!([
            {"title": "Acme Platform", "link": format!("{}/platform", uri), "snippet": "Our platform"},
            {"title": "Acme Platform", "link": format!("{}/platform/", uri), "snippet": null},
            {"title": "Pricing anchor", "link": format!("{}/platform#pricing", uri)},
            {"title": "Home again", "link": format!("{}/", uri)},
            {"title": "Lookalike", "link": "https://notacme.com/platform"}
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/platform"))
        .respond_with(page("Acme platform page"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page("Acme home"))
        .expect(1)
        .mount(&server)
        .await;

    let context = gatherer_for(&server).gather(&uri, 5, 6000).await;

    assert_eq!(
        context,
        format!(
            "URL: {uri}/platform\nAcme platform page\n\n---\n\nURL: {uri}\nAcme home",
            uri = uri
        )
    );
}

#[tokio::test]
async fn gather_respects_char_and_page_budgets() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let results: Vec<_> = (1..=4)
        .map(|i| json!({"title": "Engineering blog", "link": format!("{}/blog/post-{}", uri, i)}))
        .collect();
    mount_search_results(&server, json!(results)).await;
    Mock::given(method("GET"))
        .respond_with(page(&"x".repeat(3000)))
        .mount(&server)
        .await;

    let gatherer = gatherer_for(&server);

    let context = gatherer.gather(&uri, 5, 6000).await;
    assert!(context.chars().count() <= 6000);
    assert_eq!(context.matches("URL: ").count(), 2);
    assert!(context.contains("x...\n\n---\n\nURL: "));

    let single = gatherer.gather(&uri, 1, 6000).await;
    assert_eq!(single.matches("URL: ").count(), 1);
    assert!(single.starts_with(&format!("URL: {}/blog/post-1\n", uri)));

    let tiny = gatherer.gather(&uri, 5, 100).await;
    assert_eq!(tiny.chars().count(), 100);
    assert!(tiny.ends_with("\n..."));
}

#[tokio::test]
async fn gather_skips_pages_without_text() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_search_results(
        &server,
        json!([
            {"title": "Docs", "link": format!("{}/docs", uri)},
            {"title": "Script only", "link": format!("{}/api", uri)}
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(page("<script>render()</script>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(page("Developer docs"))
        .mount(&server)
        .await;

    let context = gatherer_for(&server).gather(&uri, 1, 6000).await;

    assert_eq!(context, format!("URL: {}/docs\nDeveloper docs", uri));
}

#[tokio::test]
async fn gather_survives_search_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(6)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page("Still here"))
        .mount(&server)
        .await;

    let context = gatherer_for(&server).gather(&server.uri(), 5, 6000).await;

    assert_eq!(context, format!("URL: {}\nStill here", server.uri()));
}

#[tokio::test]
async fn gather_non_http_root_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let gatherer = gatherer_for(&server);
    let schemeless = server.uri().replace("http://", "");

    assert_eq!(gatherer.gather("", 5, 6000).await, "");
    assert_eq!(gatherer.gather("N/A", 5, 6000).await, "");
    assert_eq!(gatherer.gather("ftp://acme.com", 5, 6000).await, "");
    assert_eq!(gatherer.gather(&schemeless, 5, 6000).await, "");
    assert_eq!(gatherer.gather("http://", 5, 6000).await, "");
}
