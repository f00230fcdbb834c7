mod common;

use common::{output_text, ScriptedBackend};
use serde_json::json;
use startup_lens::{
    domain::ui_schema::{sample_traits, SchemaError},
    services::{load_traits, ComposeError, ModelInvoker, UiComposer},
};

fn composer(text: &str) -> UiComposer {
    let backend = ScriptedBackend::new(vec![Ok(output_text(text))]);
    UiComposer::new(ModelInvoker::new(Box::new(backend), "gpt-5-mini".to_string()))
}

#[tokio::test]
async fn compose_to_file_writes_fenced_schema() {
    let schema = json!({
        "version": "1.0",
        "sections": [
            {"id": "balances", "component": "Balances", "props": {}},
            {"id": "actions", "component": "ActionGrid", "props": {"actions": ["FX", "TRANSFER"]}}
        ]
    });
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("public").join("llm_schema.json");

    let written = composer(&format!("```json\n{}\n```", schema))
        .compose_to_file(&sample_traits(), &output)
        .await
        .unwrap();

    assert_eq!(written, schema);
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(on_disk, schema);
}

#[tokio::test]
async fn generate_rejects_schema_without_required_components() {
    let schema = json!({
        "version": "1.0",
        "sections": [{"id": "hero", "component": "HeroCard", "props": {}}]
    });

    let result = composer(&schema.to_string()).generate(&sample_traits()).await;

    assert!(matches!(
        result,
        Err(ComposeError::Invalid(SchemaError::MissingRequiredComponents))
    ));
}

#[tokio::test]
async fn generate_rejects_non_json() {
    let result = composer("Here is your layout!").generate(&sample_traits()).await;

    assert!(matches!(result, Err(ComposeError::Parse(_))));
}

#[test]
fn load_traits_from_file_or_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("traits.json");
    std::fs::write(&path, r#"{"fxAffinity": 0.9, "locale": "tr"}"#).unwrap();

    assert_eq!(
        load_traits(Some(path.as_path())).unwrap(),
        json!({"fxAffinity": 0.9, "locale": "tr"})
    );
    assert_eq!(load_traits(None).unwrap(), sample_traits());
    assert_eq!(
        load_traits(Some(dir.path().join("missing.json").as_path())).unwrap(),
        sample_traits()
    );
}
