//! Record types and API wire models

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// DNS record types the backend knows how to manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    TXT,
    NS,
    SRV,
    MX,
    PTR,
    CAA,
    SOA,
}

impl RecordType {
    /// Get the record type name as used in zone data
    pub fn name(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::TXT => "TXT",
            RecordType::NS => "NS",
            RecordType::SRV => "SRV",
            RecordType::MX => "MX",
            RecordType::PTR => "PTR",
            RecordType::CAA => "CAA",
            RecordType::SOA => "SOA",
        }
    }

    /// Parse a record type from its name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::AAAA),
            "CNAME" => Some(RecordType::CNAME),
            "TXT" => Some(RecordType::TXT),
            "NS" => Some(RecordType::NS),
            "SRV" => Some(RecordType::SRV),
            "MX" => Some(RecordType::MX),
            "PTR" => Some(RecordType::PTR),
            "CAA" => Some(RecordType::CAA),
            "SOA" => Some(RecordType::SOA),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A domain registered in the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: i64,
    pub name: String,
}

/// Request body for domain creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewDomain {
    pub name: String,
}

/// A record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub domain: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    pub can_edit: bool,
}

/// Request body for record creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecord {
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub ttl: Option<u32>,
    pub priority: Option<u32>,
}

/// Request body for partial record updates.
///
/// An absent field leaves the stored value unchanged. `priority` is the one
/// nullable column, so it distinguishes three states: absent (unchanged),
/// explicit `null` (clear), and a value (overwrite).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPatch {
    pub content: Option<String>,
    pub ttl: Option<u32>,
    #[serde(default, deserialize_with = "double_option")]
    pub priority: Option<Option<u32>>,
}

/// Request body for token issuance
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub namespace: String,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u32>::deserialize(deserializer).map(Some)
}
