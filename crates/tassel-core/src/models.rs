use std::collections::BTreeMap;

/// Sentinel the standardizer returns when it cannot infer a university.
pub const UNKNOWN_UNIVERSITY: &str = "Unknown";

/// Minimal record parsed from one listing-page row pair, prior to detail
/// enrichment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StubRecord {
    /// Numeric id parsed from the record link. Always positive.
    pub id: u64,
    pub date_added: Option<String>,
    pub term: Option<String>,
    pub gre_total: Option<String>,
    pub gre_verbal: Option<String>,
    pub gre_aw: Option<String>,
}

/// Label → value map scraped from a record's detail page, merged with the
/// stub's inline fields.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DetailRecord {
    pub id: u64,
    /// Detail page URL; the downstream unique key.
    pub url: String,
    /// Keys are source-defined labels ("Program", "Institution", ...).
    /// A sorted map keeps serialized artifacts deterministic.
    pub fields: BTreeMap<String, String>,
}

/// Canonical record schema produced by normalization.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedRecord {
    /// Combined "program, university" free text.
    pub program: String,
    pub comments: Option<String>,
    pub date_added: Option<String>,
    pub applicant_status: Option<String>,
    /// DD/MM/YYYY; only set when the status is "Accepted".
    pub acceptance_date: Option<String>,
    /// DD/MM/YYYY; only set when the status is "Rejected".
    pub rejection_date: Option<String>,
    pub term: Option<String>,
    pub nationality_bucket: Option<String>,
    pub gre_total: Option<String>,
    pub gre_verbal: Option<String>,
    pub degree: Option<String>,
    pub gpa: Option<String>,
    pub gre_aw: Option<String>,
    pub url: String,
}

/// One standardized (program, university) pair from the external text
/// standardizer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StandardizedProgram {
    pub program: String,
    pub university: String,
}

/// Normalized record with the standardizer's output attached; the shape
/// handed to the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StandardizedRecord {
    #[serde(flatten)]
    pub record: NormalizedRecord,
    #[serde(rename = "llm-generated-program")]
    pub standardized_program: String,
    #[serde(rename = "llm-generated-university")]
    pub standardized_university: String,
}
