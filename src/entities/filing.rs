// 📄 Filing Entity - a legal submission waiting to be applied to the registry
//
// Before incorporation completes, a filing is keyed only by its bootstrap
// identifier (temp_reg). The stored filing_json is replaced, not patched, once
// the business identifier and founding date are known.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// FILING STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilingStatus {
    Draft,
    Pending,
    Completed,
    Error,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Draft => "DRAFT",
            FilingStatus::Pending => "PENDING",
            FilingStatus::Completed => "COMPLETED",
            FilingStatus::Error => "ERROR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(FilingStatus::Draft),
            "PENDING" => Some(FilingStatus::Pending),
            "COMPLETED" => Some(FilingStatus::Completed),
            "ERROR" => Some(FilingStatus::Error),
            _ => None,
        }
    }
}

/// Filing type name used in `filing.header.name`
pub const INCORPORATION_APPLICATION: &str = "incorporationApplication";

// ============================================================================
// FILING ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
    /// Row id, 0 until persisted
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<i64>,
    /// Bootstrap identifier the filing was submitted under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_reg: Option<String>,
    pub filing_type: String,
    filing_json: Value,
    pub filing_date: DateTime<Utc>,
    pub effective_date: DateTime<Utc>,
    pub status: FilingStatus,
}

impl Filing {
    /// New, unsaved filing. Effective immediately unless changed.
    pub fn new(temp_reg: Option<String>, filing_json: Value) -> Self {
        let now = Utc::now();
        let filing_type = filing_json
            .pointer("/filing/header/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Filing {
            id: 0,
            business_id: None,
            temp_reg,
            filing_type,
            filing_json,
            filing_date: now,
            effective_date: now,
            status: FilingStatus::Draft,
        }
    }

    /// Rebuild a filing from storage
    #[allow(clippy::too_many_arguments)]
    pub fn from_row(
        id: i64,
        business_id: Option<i64>,
        temp_reg: Option<String>,
        filing_type: String,
        filing_json: Value,
        filing_date: DateTime<Utc>,
        effective_date: DateTime<Utc>,
        status: FilingStatus,
    ) -> Self {
        Filing {
            id,
            business_id,
            temp_reg,
            filing_type,
            filing_json,
            filing_date,
            effective_date,
            status,
        }
    }

    pub fn filing_json(&self) -> &Value {
        &self.filing_json
    }

    /// Swap in a finalized payload (the only way stored JSON changes)
    pub fn replace_filing_json(&mut self, filing_json: Value) {
        self.filing_json = filing_json;
    }

    /// Name reservation number, if the filing names one
    pub fn nr_number(&self) -> Option<&str> {
        self.filing_json
            .pointer("/filing/incorporationApplication/nameRequest/nrNumber")
            .and_then(Value::as_str)
            .filter(|nr| !nr.is_empty())
    }

    pub fn is_completed(&self) -> bool {
        self.status == FilingStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_filing_reads_type_from_header() {
        let filing = Filing::new(
            Some("Tb31yQIuBw".to_string()),
            json!({"filing": {"header": {"name": "incorporationApplication"}}}),
        );

        assert_eq!(filing.filing_type, INCORPORATION_APPLICATION);
        assert_eq!(filing.status, FilingStatus::Draft);
        assert_eq!(filing.id, 0);
    }

    #[test]
    fn test_nr_number() {
        let with_nr = Filing::new(
            None,
            json!({"filing": {"incorporationApplication": {"nameRequest": {"nrNumber": "NR 1234567"}}}}),
        );
        assert_eq!(with_nr.nr_number(), Some("NR 1234567"));

        let without_nr = Filing::new(
            None,
            json!({"filing": {"incorporationApplication": {"nameRequest": {"legalType": "BC"}}}}),
        );
        assert_eq!(without_nr.nr_number(), None);
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in [FilingStatus::Draft, FilingStatus::Pending, FilingStatus::Completed, FilingStatus::Error] {
            assert_eq!(FilingStatus::parse(status.as_str()), Some(status));
        }
    }
}
