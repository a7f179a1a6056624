use serde::{Deserialize, Serialize};

/// Identity of a running workload, looked up by pod name when enriching metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataRecord {
    pub pod: String,
    pub service: String,
    pub team: String,
    /// Criticality classification, e.g. "critical"
    pub tier: String,
}

/// A named grouping of label keys; each view yields one copy of a series
/// carrying only these labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DuplicationViewRecord {
    pub view: String,
    /// Order is significant and preserved end to end
    pub labels: Vec<String>,
}

impl MetadataRecord {
    pub fn new(pod: &str, service: &str, team: &str, tier: &str) -> Self {
        Self {
            pod: pod.to_string(),
            service: service.to_string(),
            team: team.to_string(),
            tier: tier.to_string(),
        }
    }
}

impl DuplicationViewRecord {
    pub fn new(view: &str, labels: &[&str]) -> Self {
        Self {
            view: view.to_string(),
            labels: labels.iter().map(|label| label.to_string()).collect(),
        }
    }
}
