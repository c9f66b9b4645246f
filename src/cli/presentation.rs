//! CLI presentation: text and json formatters for sample, resolve and candidates.

use crate::cli::route::Resolution;
use crate::node::{NodeCandidate, NodePath};
use crate::value::Value;
use serde_json::json;

/// Samples as JSON: a single document for one instance, an array otherwise.
pub fn format_samples(values: &[Value], pretty: bool) -> Result<String, serde_json::Error> {
    let document = match values {
        [single] => single.to_json(),
        many => serde_json::Value::Array(many.iter().map(Value::to_json).collect()),
    };
    if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
}

pub fn format_resolution_text(resolution: &Resolution) -> String {
    let mut output = format!("Type: {} ({})\n", resolution.ty, resolution.shape);
    if resolution.concrete.is_empty() {
        output.push_str("No concrete types.\n");
        return output;
    }
    output.push_str("Concrete types:\n");
    for ty in &resolution.concrete {
        output.push_str(&format!("  {}\n", ty));
    }
    output.push_str(&format!("\nTotal: {} type(s)\n", resolution.concrete.len()));
    output
}

pub fn format_resolution_json(resolution: &Resolution) -> String {
    let concrete: Vec<String> = resolution.concrete.iter().map(|ty| ty.to_string()).collect();
    let out = json!({
        "type": resolution.ty.to_string(),
        "shape": resolution.shape,
        "concrete": concrete,
        "total": resolution.concrete.len(),
    });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

fn candidate_position(candidate: &NodeCandidate) -> String {
    match &candidate.segment {
        Some(segment) => NodePath::root().join(segment.clone()).to_string(),
        None => "$[*]".to_string(),
    }
}

pub fn format_candidates_text(ty: &str, candidates: &[NodeCandidate]) -> String {
    if candidates.is_empty() {
        return format!("{} has no child positions.\n", ty);
    }
    let mut output = format!("Candidates of {}:\n", ty);
    for candidate in candidates {
        let nullable = if candidate.nullable { " (nullable)" } else { "" };
        output.push_str(&format!(
            "  {:<20} {:<24} {}{}\n",
            candidate_position(candidate),
            candidate.ty,
            candidate.display_name(),
            nullable
        ));
    }
    output.push_str(&format!("\nTotal: {} candidate(s)\n", candidates.len()));
    output
}

pub fn format_candidates_json(ty: &str, candidates: &[NodeCandidate]) -> String {
    let list: Vec<_> = candidates
        .iter()
        .map(|candidate| {
            json!({
                "position": candidate_position(candidate),
                "type": candidate.ty.to_string(),
                "name": candidate.name,
                "nullable": candidate.nullable,
            })
        })
        .collect();
    let out = json!({ "type": ty, "candidates": list, "total": candidates.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
