//! Managed-DNS entities

use serde::{Deserialize, Serialize};

use crate::resource::ResourceStatus;

/// An authoritative DNS zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub tenant_id: Option<String>,

    /// Zone apex, e.g. `example.com`
    pub name: String,

    pub status: ResourceStatus,
}

/// A record within a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    pub zone_id: String,

    /// Record owner name, e.g. `www.example.com`
    pub name: String,

    /// Record type: SOA, NS, A, AAAA, MX, TXT, CNAME, ...
    #[serde(rename = "type")]
    pub record_type: String,

    pub content: String,
    pub ttl: u32,

    /// MX/SRV priority
    pub priority: Option<u16>,

    pub status: ResourceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_field_renamed() {
        let record = ZoneRecord {
            id: "r1".into(),
            zone_id: "z1".into(),
            name: "www.example.com".into(),
            record_type: "A".into(),
            content: "192.0.2.10".into(),
            ttl: 300,
            priority: None,
            status: ResourceStatus::Pending,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "A");
    }
}
