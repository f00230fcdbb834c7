use serde::Serialize;
use serde_json::{json, Value};

pub const SCHEMA_VERSION: &str = "1.0";
pub const MAX_SECTIONS: usize = 5;
pub const REQUIRED_COMPONENTS: [&str; 2] = ["Balances", "ActionGrid"];
const MAX_SEARCH_TERMS: usize = 5;

const COMPOSER_INSTRUCTION: &str = r#"You are a UI layout composer for a modern banking app. Your task is to generate a personalized UI schema based on user behavior and preferences.

# UISchema Contract

type ActionId = "TRANSFER" | "PAY_BILL" | "FX" | "OPEN_SAVINGS";

type UISchema = {
  version: "1.0",
  sections: Array<
    | { id: string; component: "HeroCard"; props: { title: string; subtitle?: string } }
    | { id: string; component: "ActionGrid"; props: { actions: { label: string; actionId: ActionId }[] } }
    | { id: string; component: "FXRates"; props: { expanded?: boolean } }
    | { id: string; component: "Balances"; props: {} }
    | { id: string; component: "OffersCard"; props: { title: string; body: string; cta?: { text: string; actionId: ActionId } } }
    | { id: string; component: "RecentBeneficiaries"; props: { aliases: string[] } }
    | { id: string; component: "ContinueBillPay"; props: { visible: boolean } }
  >;
};

# Constraints

1. JSON only, at most 5 sections
2. Always include "Balances" and "ActionGrid" components
3. Only use allowlisted ActionIds: TRANSFER, PAY_BILL, FX, OPEN_SAVINGS
4. Locale: if TR use Turkish copy; else English
5. Neutral copy (no fees/rates/APR/claims), no PII
6. Aliases only for beneficiaries (e.g., "Alias-A", "Alias-B")

# Layout Rules

1. If fxAffinity > 0.4 include FXRates near top; expanded=true if "exchange" searched at least twice in last 7 days
2. If transferAffinity > 0.4 prioritize TRANSFER or PAY_BILL based on topActions
3. If lastPaths contains /payments/utilities put PAY_BILL first in ActionGrid
4. If aliases exist include RecentBeneficiaries with 2-3 masked strings
5. If explorerScore high or Savings dwell detected include OffersCard (Auto-Save) with OPEN_SAVINGS CTA
6. If incompleteBillPay include ContinueBillPay with visible=true
7. Respect prefersDense; keep copy concise
8. Obey locale (TR/EN)

# Self-Check

Before returning:
- Valid JSON?
- At most 5 sections?
- Includes Balances and ActionGrid?
- All ActionIds from allowlist?
- Locale matches user?
- No PII or hard-coded rates?

Return JSON only, no markdown."#;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),
    #[error("Invalid section count: {0}")]
    InvalidSectionCount(usize),
    #[error("Missing required components (Balances, ActionGrid)")]
    MissingRequiredComponents,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Behavior {
    fx_affinity: Value,
    transfer_affinity: Value,
    explorer_score: Value,
    top_actions: Value,
    last_paths: Value,
    search_terms: Value,
    incomplete_bill_pay: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Preferences {
    locale: Value,
    prefers_dense: Value,
    dark_mode: Value,
}

fn trait_or(traits: &Value, key: &str, default: Value) -> Value {
    traits.get(key).cloned().unwrap_or(default)
}

pub fn sample_traits() -> Value {
    json!({
        "fxAffinity": 0.6,
        "transferAffinity": 0.3,
        "explorerScore": 0.4,
        "topActions": ["FX", "TRANSFER"],
        "lastPaths": ["/", "/exchange", "/transfers"],
        "searchTerms": [
            {"term": "exchange rates", "count": 3, "lastSeen": 1234567890}
        ],
        "incompleteBillPay": null,
        "locale": "en",
        "prefersDense": false,
        "darkMode": false
    })
}

pub fn user_instruction(traits: &Value) -> String {
    let search_terms = match traits.get("searchTerms") {
        Some(Value::Array(terms)) => {
            Value::Array(terms.iter().take(MAX_SEARCH_TERMS).cloned().collect())
        }
        Some(other) => other.clone(),
        None => json!([]),
    };
    let behavior = Behavior {
        fx_affinity: trait_or(traits, "fxAffinity", json!(0)),
        transfer_affinity: trait_or(traits, "transferAffinity", json!(0)),
        explorer_score: trait_or(traits, "explorerScore", json!(0)),
        top_actions: trait_or(traits, "topActions", json!([])),
        last_paths: trait_or(traits, "lastPaths", json!([])),
        search_terms,
        incomplete_bill_pay: trait_or(traits, "incompleteBillPay", Value::Null),
    };
    let preferences = Preferences {
        locale: trait_or(traits, "locale", json!("en")),
        prefers_dense: trait_or(traits, "prefersDense", json!(false)),
        dark_mode: trait_or(traits, "darkMode", json!(false)),
    };

    // Serializing these structs cannot fail: every field is already a Value.
    let behavior = serde_json::to_string_pretty(&behavior).unwrap_or_default();
    let preferences = serde_json::to_string_pretty(&preferences).unwrap_or_default();

    format!(
        "Generate a personalized UI schema for this user:\n\n# User Traits\n{}\n\n# User Preferences\n{}\n\nReturn a valid UISchema JSON object following all constraints and rules.",
        behavior, preferences
    )
}

pub fn compose(traits: &Value) -> String {
    format!("{}\n\n{}", COMPOSER_INSTRUCTION, user_instruction(traits))
}

pub fn validate_schema(schema: &Value) -> Result<(), SchemaError> {
    match schema.get("version").and_then(Value::as_str) {
        Some(SCHEMA_VERSION) => {}
        Some(other) => return Err(SchemaError::InvalidVersion(other.to_string())),
        None => return Err(SchemaError::InvalidVersion("missing".to_string())),
    }

    let sections: &[Value] = match schema.get("sections") {
        Some(Value::Array(sections)) => sections.as_slice(),
        _ => &[],
    };
    if sections.is_empty() || sections.len() > MAX_SECTIONS {
        return Err(SchemaError::InvalidSectionCount(sections.len()));
    }

    let components: Vec<&str> = sections
        .iter()
        .filter_map(|section| section.get("component").and_then(Value::as_str))
        .collect();
    match REQUIRED_COMPONENTS
        .iter()
        .all(|required| components.contains(required))
    {
        true => Ok(()),
        false => Err(SchemaError::MissingRequiredComponents),
    }
}
