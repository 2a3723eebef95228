// 🪪 Registration Bootstrap - placeholder identity before incorporation
//
// Created when an incorporation is first submitted. The account is affiliated
// with the bootstrap identifier until the real business identifier exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Corp type code used for affiliations anchored to a bootstrap identifier
pub const TEMP_CORP_TYPE: &str = "TMP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationBootstrap {
    /// "T" followed by 9 alphanumeric characters
    pub identifier: String,
    /// Account that owns the pending registration
    pub account: String,
    pub last_modified: DateTime<Utc>,
}

impl RegistrationBootstrap {
    /// New bootstrap with a freshly generated identifier
    pub fn new(account: impl Into<String>) -> Self {
        RegistrationBootstrap {
            identifier: generate_identifier(),
            account: account.into(),
            last_modified: Utc::now(),
        }
    }
}

/// Temporary identifiers always start with "T"
pub fn is_temp_identifier(identifier: &str) -> bool {
    identifier.starts_with('T')
}

fn generate_identifier() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("T{}", &random[..9])
}
