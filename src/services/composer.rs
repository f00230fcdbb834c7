use std::path::Path;

use serde_json::Value;

use crate::{
    domain::{
        analysis::strip_code_fence,
        safe_preview,
        ui_schema::{self, SchemaError},
    },
    services::{ModelError, ModelInvoker},
};

pub const DEFAULT_UI_SCHEMA_OUTPUT: &str = "public/llm_schema.json";

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] SchemaError),
    #[error("Failed to write schema: {0}")]
    Io(#[from] std::io::Error),
}

/// Asks the model for a personalized banking layout and validates the result.
pub struct UiComposer {
    invoker: ModelInvoker,
}

impl UiComposer {
    pub fn new(invoker: ModelInvoker) -> Self {
        UiComposer { invoker }
    }

    pub async fn generate(&self, traits: &Value) -> Result<Value, ComposeError> {
        let input = ui_schema::compose(traits);
        log::info!(
            "Calling {} for a UI schema, input length: {} chars",
            self.invoker.model(),
            input.chars().count()
        );

        let text = self.invoker.invoke_text(&input).await?;
        log::info!("Response received ({} chars)", text.chars().count());

        let schema = serde_json::from_str::<Value>(strip_code_fence(&text)).map_err(|e| {
            log::error!("Response preview: {}", safe_preview(&text, 500));
            e
        })?;
        ui_schema::validate_schema(&schema)?;
        log::info!("Schema validation passed");

        Ok(schema)
    }

    /// Generates, validates and writes the schema as pretty JSON.
    pub async fn compose_to_file(&self, traits: &Value, output: &Path) -> Result<Value, ComposeError> {
        let schema = self.generate(traits).await?;

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output, serde_json::to_string_pretty(&schema)?)?;
        log::info!("Schema written to {}", output.display());

        Ok(schema)
    }
}

/// Traits from `path`, or the built-in sample when no readable file is given.
pub fn load_traits(path: Option<&Path>) -> Result<Value, ComposeError> {
    match path {
        Some(path) if path.exists() => {
            log::info!("Loading traits from {}", path.display());
            let raw = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        _ => {
            log::info!("Using sample traits (no traits file provided)");
            Ok(ui_schema::sample_traits())
        }
    }
}
