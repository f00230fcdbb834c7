use url::Url;

use super::{analysis::Subject, taxonomy::taxonomy_json};

const SYSTEM_INSTRUCTION: &str = r#"You are a startup domain analyst. Classify the company's verticals and summarize their offering. Ground claims STRICTLY in verifiable descriptions from official sources: the provided CSV fields (Organization Description, Organization Industries) and the company's OFFICIAL WEBSITE. Do NOT hallucinate or invent details. If information is not available from these sources, leave the field empty ("") or set booleans to false. Return ONLY a valid single-line JSON object with these keys:
- startup_name (string)
- url (string)
- products_summary (string, concise)
- startup_vertical (string; primary industry vertical)
- startup_sub_vertical (string; more specific sub-vertical)
- use_case (string, concise)
- uses_genai (boolean; uses LLMs or other GenAI models)
- genai_details (string; if uses_genai is true, explain how GenAI/LLMs are used; else empty)
- uses_traditional_ml (boolean; uses traditional ML or CV, non-generative)
- ml_details (string; if uses_traditional_ml is true, explain briefly; else empty)
- unique_value (string; 1-2 sentences on differentiation/secret sauce)
- site_context_summary (string; 2-3 sentences summarizing fetched website context, focusing on products/services and AI/GenAI usage; leave empty if no context)
- evidence (array of short strings citing sources or quotes).
Use ONLY the following taxonomy for startup_vertical and startup_sub_vertical (exact strings, case-sensitive):
"#;

const SYSTEM_CONSTRAINTS: &str = r#"
Hard constraints: do NOT invent providers, models, features or product claims not supported by the sources. Evidence must cite only the CSV fields or the official website (by URL and/or short quote).
Self-check (internal, do NOT output the check): verify all required keys are present; booleans are strictly true/false; evidence is an array of up to 3 short items; startup_vertical is EXACTLY one of the taxonomy keys; startup_sub_vertical is EXACTLY one item from that key's list; and the final answer is ONE single-line JSON object. Fix issues before returning.
Output JSON only. No prose, no markdown, no tool logs."#;

const USER_TASK: &str = "Task: Identify their products, classify the startup_vertical and startup_sub_vertical, and state the primary use_case. \
Then assess if they use GenAI/LLMs (uses_genai) and describe briefly (genai_details). If they use traditional ML/CV (non-generative), set uses_traditional_ml=true and describe briefly (ml_details). \
Provide a short 'unique_value' explanation (1-2 sentences) focusing on differentiation/secret sauce. \
Do NOT make up information: if a detail is not supported by the provided CSV or the official site, leave it empty or set the boolean to false. \
Based ONLY on the 'Website context' above and CSV fields, provide 'site_context_summary' (2-3 sentences) that captures what the company/product does and any explicit AI/GenAI details disclosed; leave empty if insufficient context. \
Before returning, perform an internal self-reflection to ensure the output matches the required JSON keys and types; then output ONLY the final single-line JSON object.";

pub fn system_instruction() -> String {
    format!("{}{}{}", SYSTEM_INSTRUCTION, taxonomy_json(), SYSTEM_CONSTRAINTS)
}

pub fn user_instruction(subject: &Subject, context: &str) -> String {
    let description = match subject.description.is_empty() {
        true => "".to_string(),
        false => format!(
            "\nOrganization Description (from CSV): {}",
            subject.description
        ),
    };
    let industries = match subject.industries.is_empty() {
        true => "".to_string(),
        false => format!("\nOrganization Industries (from CSV): {}", subject.industries),
    };
    let context = match context.is_empty() {
        true => "".to_string(),
        false => format!(
            "\n\nWebsite context (search-crawled excerpts):\n{}\n",
            context
        ),
    };

    format!(
        "Startup URL: {}\nStartup name: {}.{}{}{}\n{}",
        subject.url, subject.name, description, industries, context, USER_TASK
    )
}

/// One input string: system instruction, blank line, user instruction.
pub fn compose(subject: &Subject, context: &str) -> String {
    format!(
        "{}\n\n{}",
        system_instruction(),
        user_instruction(subject, context)
    )
}

/// Display name guessed from the website: first host label, capitalized.
pub fn infer_startup_name(url: &str) -> String {
    let host = match Url::parse(url.trim()) {
        Ok(parsed_url) => parsed_url.host_str().unwrap_or("").to_string(),
        Err(_) => url.trim().split('/').next().unwrap_or("").to_string(),
    };
    let host = host.replace("www.", "");
    let label = host.split('.').next().unwrap_or("").to_lowercase();

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "".to_string(),
    }
}

/// Name for a row: inferred from the website, else the tail of the transaction name.
pub fn startup_name_for_row(website: &str, transaction_name: &str) -> String {
    let inferred = match website.trim() {
        "" | "N/A" => "".to_string(),
        website => infer_startup_name(website),
    };
    if !inferred.is_empty() {
        return inferred;
    }

    match transaction_name.rsplit(" - ").next().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "Startup".to_string(),
    }
}
