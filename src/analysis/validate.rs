use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::{AnalysisRecord, AnalysisStatus, RiskLevel, MAX_RECOMMENDATIONS};

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(?:json)?\s*").unwrap());

/// Turn raw model output into a validated record. Total function — every
/// input yields a usable record, and `source_text` retains the raw text
/// verbatim for manual review.
///
/// Strategy: strip code fences, try a strict parse, then fall back to the
/// first balanced `{...}` substring (models often wrap the object in
/// prose). A parsed object is repaired field by field; anything else
/// becomes the safe degraded default.
pub fn validate(raw_text: &str) -> AnalysisRecord {
    let stripped = FENCE_RE.replace_all(raw_text, "");
    let stripped = stripped.trim();

    let parsed = serde_json::from_str::<Value>(stripped)
        .ok()
        .filter(Value::is_object)
        .or_else(|| {
            extract_balanced_object(stripped)
                .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
                .filter(Value::is_object)
        });

    match parsed {
        Some(Value::Object(map)) => repair(&map, raw_text),
        _ => {
            tracing::warn!("No balanced JSON object in model response, using degraded default");
            AnalysisRecord::degraded_default(raw_text)
        }
    }
}

/// Find the first balanced `{...}` substring, respecting JSON string
/// literals and escapes so braces inside strings don't confuse the scan.
fn extract_balanced_object(text: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if start.is_some() => in_string = true,
            '{' => {
                if start.is_none() {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if start.is_some() => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start?..idx + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn repair(map: &serde_json::Map<String, Value>, raw_text: &str) -> AnalysisRecord {
    let mut repaired = false;

    let stress = score_field(map, "stress", &mut repaired);
    let anxiety = score_field(map, "anxiety", &mut repaired);
    let depression = score_field(map, "depression", &mut repaired);
    let summary = string_field(map, "summary", &mut repaired);
    let supportive_message = string_field(map, "supportive_message", &mut repaired);
    let recommendations = recommendations_field(map, &mut repaired);

    // Optional field — an unrecognized value is dropped without counting
    // as a repair.
    let model_risk_level = map
        .get("risk_level")
        .and_then(Value::as_str)
        .and_then(RiskLevel::parse_lenient);

    if repaired {
        tracing::info!("Model response repaired during validation");
    }

    AnalysisRecord {
        stress,
        anxiety,
        depression,
        summary,
        supportive_message,
        recommendations,
        model_risk_level,
        source_text: raw_text.to_string(),
        status: if repaired {
            AnalysisStatus::Repaired
        } else {
            AnalysisStatus::Ok
        },
    }
}

/// A score must be a number in [0, 1]. Out of range clamps; a numeric
/// string is salvaged; anything else defaults to 0.0. Every deviation
/// marks the record repaired.
fn score_field(map: &serde_json::Map<String, Value>, key: &str, repaired: &mut bool) -> f64 {
    match map.get(key) {
        Some(Value::Number(n)) => {
            let v = n.as_f64().unwrap_or(0.0);
            if (0.0..=1.0).contains(&v) {
                v
            } else {
                *repaired = true;
                v.clamp(0.0, 1.0)
            }
        }
        Some(Value::String(s)) => {
            *repaired = true;
            match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v.clamp(0.0, 1.0),
                _ => 0.0,
            }
        }
        _ => {
            *repaired = true;
            0.0
        }
    }
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str, repaired: &mut bool) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => {
            *repaired = true;
            String::new()
        }
    }
}

fn recommendations_field(
    map: &serde_json::Map<String, Value>,
    repaired: &mut bool,
) -> Vec<String> {
    match map.get("recommendations") {
        Some(Value::Array(items)) => {
            if items.len() > MAX_RECOMMENDATIONS {
                *repaired = true;
            }
            items
                .iter()
                .take(MAX_RECOMMENDATIONS)
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => {
                        *repaired = true;
                        other.to_string()
                    }
                })
                .collect()
        }
        _ => {
            *repaired = true;
            Vec::new()
        }
    }
}
