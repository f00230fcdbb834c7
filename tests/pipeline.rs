mod common;

use std::{sync::atomic::Ordering, time::Duration};

use common::{gatherer_for, http_error, mount_search_results, output_text, page, ScriptedBackend};
use serde_json::json;
use startup_lens::{
    domain::ANALYSIS_COLUMNS,
    services::{ModelInvoker, ResponsesClient, RowPipeline},
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn read_output(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|row| row.unwrap().iter().map(String::from).collect())
        .collect();

    (headers, rows)
}

fn column(headers: &[String], name: &str) -> usize {
    headers.iter().position(|h| h == name).unwrap()
}

#[tokio::test]
async fn run_files_appends_analysis_columns() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_search_results(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page("<h1>Acme</h1><p>Payouts for marketplaces</p>"))
        .mount(&server)
        .await;
    let answer = json!({
        "startup_name": "Acme",
        "url": uri,
        "products_summary": "Payout infrastructure",
        "startup_vertical": "FinTech",
        "startup_sub_vertical": "Payments",
        "use_case": "Marketplace payouts",
        "uses_genai": false,
        "genai_details": "",
        "uses_traditional_ml": true,
        "ml_details": "Fraud scoring",
        "unique_value": "Instant payouts",
        "site_context_summary": "Homepage describes payouts",
        "evidence": ["Payouts for marketplaces", "Fraud scoring"]
    });
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(output_text(&answer.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("startups.csv");
    let output = dir.path().join("startups.with_analysis.csv");
    std::fs::write(
        &input,
        format!(
            "Transaction Name,Organization Website,Organization Description,Organization Industries\n\
             Seed Round - Acme,{},Payments API,\"Fintech, Payments\"\n",
            uri
        ),
    )
    .unwrap();

    let client =
        ResponsesClient::new("test-key".to_string(), uri.clone(), Duration::from_secs(5)).unwrap();
    let invoker = ModelInvoker::new(Box::new(client), "gpt-5-mini".to_string());
    let pipeline = RowPipeline::new(gatherer_for(&server), invoker, 5, 6000);

    let total = pipeline.run_files(&input, &output).await.unwrap();

    assert_eq!(total, 1);
    let (headers, rows) = read_output(&output);
    assert_eq!(headers.len(), 4 + ANALYSIS_COLUMNS.len());
    assert_eq!(&headers[4..], ANALYSIS_COLUMNS.map(String::from).as_slice());
    let row = &rows[0];
    assert_eq!(row[column(&headers, "Organization Industries")], "Fintech, Payments");
    assert_eq!(row[column(&headers, "startup_vertical")], "FinTech");
    assert_eq!(row[column(&headers, "uses_genai")], "false");
    assert_eq!(row[column(&headers, "uses_traditional_ml")], "true");
    assert_eq!(
        row[column(&headers, "evidence")],
        "Payouts for marketplaces | Fraud scoring"
    );

    let requests = server.received_requests().await.unwrap();
    let model_request = requests
        .iter()
        .find(|request| request.url.path() == "/responses")
        .unwrap();
    let body: serde_json::Value = model_request.body_json().unwrap();
    let prompt = body["input"].as_str().unwrap();
    assert!(prompt.contains(&format!("URL: {}\nAcme Payouts for marketplaces", uri)));
    assert!(prompt.contains("Organization Description (from CSV): Payments API"));
    assert!(prompt.contains("Organization Industries (from CSV): Fintech, Payments"));
}

#[tokio::test]
async fn run_keeps_going_after_a_failed_row() {
    let server = MockServer::start().await;
    let backend = ScriptedBackend::new(vec![
        http_error(400),
        Ok(output_text("{\"use_case\": \"Lending\", \"uses_genai\": true}")),
    ]);
    let calls = backend.calls.clone();
    let invoker = ModelInvoker::new(Box::new(backend), "gpt-5-mini".to_string());
    let pipeline = RowPipeline::new(gatherer_for(&server), invoker, 5, 6000);
    let input = "Transaction Name,Organization Website\n\
                 Series A - Broken,N/A\n\
                 Seed - Lendly,\n";
    let mut output = Vec::new();

    let total = pipeline.run(input.as_bytes(), &mut output).await.unwrap();

    assert_eq!(total, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let mut reader = csv::Reader::from_reader(output.as_slice());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    let genai_details = column(&headers, "genai_details");
    let evidence = column(&headers, "evidence");
    assert!(rows[0][genai_details].starts_with("Error: "));
    assert!(rows[0][evidence].starts_with("Error: "));
    assert_eq!(&rows[0][column(&headers, "use_case")], "");

    assert_eq!(&rows[1][column(&headers, "Organization Website")], "");
    assert_eq!(&rows[1][column(&headers, "use_case")], "Lending");
    assert_eq!(&rows[1][column(&headers, "uses_genai")], "true");
    assert_eq!(&rows[1][evidence], "");
}

#[tokio::test]
async fn run_writes_error_row_for_unreadable_record() {
    let server = MockServer::start().await;
    let backend = ScriptedBackend::new(vec![Ok(output_text("{\"use_case\": \"Lending\"}"))]);
    let calls = backend.calls.clone();
    let invoker = ModelInvoker::new(Box::new(backend), "gpt-5-mini".to_string());
    let pipeline = RowPipeline::new(gatherer_for(&server), invoker, 5, 6000);
    let input: &[u8] = b"Transaction Name,Organization Website\n\
                         Seed - Bad\xff,N/A\n\
                         Seed - Lendly,\n";
    let mut output = Vec::new();

    let total = pipeline.run(input, &mut output).await.unwrap();

    assert_eq!(total, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let mut reader = csv::Reader::from_reader(output.as_slice());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    assert!(rows[0][column(&headers, "evidence")].starts_with("Error: Unreadable input row"));
    assert_eq!(&rows[0][column(&headers, "Transaction Name")], "");
    assert_eq!(&rows[1][column(&headers, "Transaction Name")], "Seed - Lendly");
    assert_eq!(&rows[1][column(&headers, "use_case")], "Lending");
}

#[tokio::test]
async fn run_requires_website_column() {
    let server = MockServer::start().await;
    let invoker = ModelInvoker::new(Box::new(ScriptedBackend::new(vec![])), "m".to_string());
    let pipeline = RowPipeline::new(gatherer_for(&server), invoker, 5, 6000);
    let mut output = Vec::new();

    let result = pipeline
        .run("Name,Website\nAcme,https://acme.com\n".as_bytes(), &mut output)
        .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("Organization Website"));
}

#[tokio::test]
async fn run_files_rejects_non_csv_input() {
    let server = MockServer::start().await;
    let invoker = ModelInvoker::new(Box::new(ScriptedBackend::new(vec![])), "m".to_string());
    let pipeline = RowPipeline::new(gatherer_for(&server), invoker, 5, 6000);
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("startups.xlsx");
    std::fs::write(&input, "not a csv").unwrap();

    let result = pipeline
        .run_files(&input, &dir.path().join("out.csv"))
        .await;

    assert!(result.is_err());
    assert!(!dir.path().join("out.csv").exists());
}
