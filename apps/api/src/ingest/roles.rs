//! Canonical roles and raw-title → role_id mapping.
//!
//! Order matters: the first role whose keyword appears in the title wins,
//! so more specific roles sit earlier in the table.

use serde_json::{json, Value};

pub struct Role {
    pub id: &'static str,
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub const DEFAULT_ROLES: [Role; 5] = [
    Role {
        id: "software-engineer",
        name: "Software Engineer",
        keywords: &[
            "software engineer",
            "backend engineer",
            "frontend engineer",
            "full stack",
            "fullstack",
            "python developer",
            "python architect",
            "java developer",
            "developer",
            "engineer",
            "architect",
            "programmer",
            "software development",
            "application developer",
        ],
    },
    Role {
        id: "data-scientist",
        name: "Data Scientist",
        keywords: &[
            "data scientist",
            "data engineer",
            "data analyst",
            "analytics",
            "machine learning",
            "ml engineer",
            "ai engineer",
            "research scientist",
        ],
    },
    Role {
        id: "devops",
        name: "DevOps / SRE",
        keywords: &[
            "devops",
            "sre",
            "site reliability",
            "platform engineer",
            "cloud engineer",
            "infrastructure",
        ],
    },
    Role {
        id: "product-manager",
        name: "Product Manager",
        keywords: &["product manager", "product owner", "technical product"],
    },
    Role {
        id: "other",
        name: "Other",
        keywords: &[],
    },
];

/// Maps a raw job title to a canonical role document id, e.g.
/// `role:software-engineer`. Case-insensitive; falls back to `role:other`.
pub fn map_title_to_role_id(title: &str) -> String {
    let normalized = title.trim().to_lowercase();
    if normalized.is_empty() {
        return "role:other".to_string();
    }
    for role in &DEFAULT_ROLES {
        if role.id == "other" {
            continue;
        }
        if role.keywords.iter().any(|kw| normalized.contains(kw)) {
            return format!("role:{}", role.id);
        }
    }
    "role:other".to_string()
}

/// The stored `role` document for one canonical role.
pub fn role_doc(role: &Role, created_at: &str) -> (String, Value) {
    let doc_id = format!("role:{}", role.id);
    let doc = json!({
        "_id": doc_id,
        "type": "role",
        "name": role.name,
        "created_at": created_at,
    });
    (doc_id, doc)
}
