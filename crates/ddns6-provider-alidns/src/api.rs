//! Alidns response bodies (JSON format)

use serde::Deserialize;

/// `DescribeDomainRecords` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDomainRecordsResponse {
    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub domain_records: DomainRecords,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainRecords {
    #[serde(default)]
    pub record: Vec<DomainRecord>,
}

/// One record as listed by `DescribeDomainRecords`
#[derive(Debug, Clone, Deserialize)]
pub struct DomainRecord {
    #[serde(rename = "RecordId")]
    pub record_id: String,

    #[serde(rename = "RR")]
    pub rr: String,

    #[serde(rename = "Type")]
    pub record_type: String,

    #[serde(rename = "Value")]
    pub value: String,
}

impl DomainRecord {
    /// Exact host label and AAAA type
    pub fn is_aaaa_for(&self, host_label: &str) -> bool {
        self.rr == host_label && self.record_type.eq_ignore_ascii_case("AAAA")
    }
}

/// `AddDomainRecord` / `UpdateDomainRecord` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordMutationResponse {
    pub record_id: String,

    #[serde(default)]
    pub request_id: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub request_id: Option<String>,
}
