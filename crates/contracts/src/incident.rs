//! Incident records and the idempotent create/auto-resolve payloads

use serde::{Deserialize, Serialize};

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Info,
    Warning,
    Critical,
}

/// Incident lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    Resolved,
}

/// An operational incident, deduplicated on `dedupe_key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,

    /// Unique key; a second create with the same key is a no-op
    pub dedupe_key: String,

    #[serde(rename = "type")]
    pub incident_type: String,

    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub title: String,
    pub detail: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,

    /// Originating subsystem, e.g. a workflow name
    pub source: String,
}

/// Parameters for `CreateIncident`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIncidentParams {
    pub dedupe_key: String,

    #[serde(rename = "type")]
    pub incident_type: String,

    pub severity: IncidentSeverity,
    pub title: String,
    pub detail: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub source: String,
}

/// Result of `CreateIncident`
///
/// `created` is true only for the call that actually inserted the incident;
/// duplicate-key calls return the existing id with `created = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIncidentResult {
    pub id: String,
    pub created: bool,
}

/// Parameters for `AutoResolveIncidents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoResolveIncidentsInput {
    pub resource_type: String,
    pub resource_id: String,

    /// Incident-type prefix to resolve, e.g. `replication_`
    pub type_prefix: String,

    /// Human-readable resolution note
    pub resolution: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(IncidentSeverity::Warning > IncidentSeverity::Info);
        assert!(IncidentSeverity::Critical > IncidentSeverity::Warning);
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&IncidentSeverity::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn test_create_params_type_field() {
        let params = CreateIncidentParams {
            dedupe_key: "cephfs_unmounted:n1".into(),
            incident_type: "cephfs_unmounted".into(),
            severity: IncidentSeverity::Critical,
            title: "CephFS unmounted".into(),
            detail: "mount missing on n1".into(),
            resource_type: Some("nodes".into()),
            resource_id: Some("n1".into()),
            source: "CheckCephFSHealth".into(),
        };

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["type"], "cephfs_unmounted");
    }
}
