//! Salary benchmark documents and the API response shapes built from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored salary observation: the query dimensions plus the provider's
/// payload under `api_response`. `_id` is derived from the dimensions so a
/// given query maps to exactly one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub api_response: Value,
    pub fetched_at: String,
}

/// Compensation numbers extracted from the provider payload.
#[derive(Debug, Clone, Serialize)]
pub struct SalaryInfo {
    pub median_salary: Option<f64>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub median_base_salary: Option<f64>,
    pub salary_currency: String,
    pub salary_period: String,
    pub publisher_name: String,
    pub confidence: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryRecord {
    pub job_title: String,
    pub location: Option<String>,
    pub years_of_experience: Option<String>,
    pub company: Option<String>,
    pub salary: SalaryInfo,
}

#[derive(Debug, Serialize)]
pub struct SalaryResponse {
    pub count: usize,
    pub data: Vec<SalaryRecord>,
}

fn opt_str(doc: &Value, key: &str) -> Option<String> {
    doc.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

impl SalaryRecord {
    pub fn from_doc(doc: &Value) -> Self {
        let api = doc.get("api_response").cloned().unwrap_or(Value::Null);
        SalaryRecord {
            job_title: opt_str(doc, "job_title").unwrap_or_default(),
            location: opt_str(doc, "location"),
            years_of_experience: opt_str(doc, "years_of_experience"),
            company: opt_str(doc, "company"),
            salary: SalaryInfo {
                median_salary: api.get("median_salary").and_then(|v| v.as_f64()),
                min_salary: api.get("min_salary").and_then(|v| v.as_f64()),
                max_salary: api.get("max_salary").and_then(|v| v.as_f64()),
                median_base_salary: api.get("median_base_salary").and_then(|v| v.as_f64()),
                salary_currency: opt_str(&api, "salary_currency")
                    .unwrap_or_else(|| "USD".to_string()),
                salary_period: opt_str(&api, "salary_period")
                    .unwrap_or_else(|| "YEAR".to_string()),
                publisher_name: opt_str(&api, "publisher_name").unwrap_or_default(),
                confidence: opt_str(&api, "confidence").unwrap_or_default(),
            },
        }
    }
}
