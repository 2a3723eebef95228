// 👤 Party + PartyRole - people and organizations attached to a business
//
// A party is filed once with a list of roles; each role becomes a PartyRole
// that carries its own copy of the party plus appointment/cessation dates.

use super::Address;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    #[default]
    Person,
    Organization,
}

impl PartyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyType::Person => "person",
            PartyType::Organization => "organization",
        }
    }

    /// Filings use "org" as well as "organization"
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "org" | "organization" => PartyType::Organization,
            _ => PartyType::Person,
        }
    }
}

// ============================================================================
// PARTY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub party_type: PartyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_initial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailing_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
}

// ============================================================================
// PARTY ROLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRole {
    /// Normalized role, e.g. "director", "completing_party"
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cessation_date: Option<NaiveDate>,
    pub party: Party,
}

/// "Completing Party" -> "completing_party"
pub fn normalize_role(role_type: &str) -> String {
    role_type.trim().to_lowercase().replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_role() {
        assert_eq!(normalize_role("Completing Party"), "completing_party");
        assert_eq!(normalize_role("Director"), "director");
        assert_eq!(normalize_role(" incorporator "), "incorporator");
    }
}
