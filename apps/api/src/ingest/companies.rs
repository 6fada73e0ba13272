//! Company slug normalization and deterministic company document ids, so
//! `job_post` documents from every source reference the same company record.

use serde_json::{json, Value};

/// Lowercases, replaces non-alphanumeric runs with a single hyphen, and
/// trims. Empty or all-symbol input becomes `unknown`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

pub fn company_id(name: &str) -> String {
    format!("company:{}", slug(name))
}

/// The stored `company` document for a raw company name.
pub fn company_doc(name: &str, created_at: &str) -> (String, Value) {
    let s = slug(name);
    let doc_id = format!("company:{s}");
    let display_name = {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            "Unknown"
        } else {
            trimmed
        }
    };
    let doc = json!({
        "_id": doc_id,
        "type": "company",
        "name": display_name,
        "normalized_name": s.replace('-', " "),
        "created_at": created_at,
    });
    (doc_id, doc)
}
