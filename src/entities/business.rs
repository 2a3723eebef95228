// 🏢 Business Entity - the registry aggregate
//
// A Business is created exactly once, by a successful incorporation filing.
// Its identifier is minted by the corporate number allocator and never changes.
//
// Child entities (offices, party roles, share classes, aliases) are built first
// and attached in a single step via `with_components`, so a Business value either
// carries its whole incorporation batch or none of it.

use super::{Alias, Office, PartyRole, ShareClass};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Same RFC 3339 rendering the finalized filing JSON carries
fn serialize_founding_date<S: Serializer>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

// ============================================================================
// BUSINESS COMPONENTS
// ============================================================================

/// Everything an incorporation attaches to a Business, built before the Business itself
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessComponents {
    pub offices: Vec<Office>,
    pub party_roles: Vec<PartyRole>,
    pub share_classes: Vec<ShareClass>,
    pub aliases: Vec<Alias>,
}

// ============================================================================
// BUSINESS ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    /// Row id, None until persisted
    #[serde(skip)]
    pub id: Option<i64>,

    // ========================================================================
    // IDENTITY (assigned at incorporation, never changes)
    // ========================================================================
    pub identifier: String,

    // ========================================================================
    // VALUES
    // ========================================================================
    pub legal_name: String,
    pub legal_type: String,
    /// Equals the incorporation filing's effective date
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_founding_date")]
    pub founding_date: Option<DateTime<Utc>>,
    pub last_modified: DateTime<Utc>,

    // ========================================================================
    // CHILDREN (attached in one batch)
    // ========================================================================
    #[serde(flatten)]
    components: BusinessComponents,
}

impl Business {
    /// Empty business shell awaiting incorporation details
    pub fn new() -> Self {
        Business {
            id: None,
            identifier: String::new(),
            legal_name: String::new(),
            legal_type: String::new(),
            founding_date: None,
            last_modified: Utc::now(),
            components: BusinessComponents::default(),
        }
    }

    /// Attach the full set of child entities, replacing whatever was there
    pub fn with_components(mut self, components: BusinessComponents) -> Self {
        self.components = components;
        self
    }

    pub fn offices(&self) -> &[Office] {
        &self.components.offices
    }

    pub fn party_roles(&self) -> &[PartyRole] {
        &self.components.party_roles
    }

    pub fn share_classes(&self) -> &[ShareClass] {
        &self.components.share_classes
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.components.aliases
    }

    pub fn components(&self) -> &BusinessComponents {
        &self.components
    }

    /// Founding date rendered the way it is stored in filing JSON
    pub fn founding_date_iso(&self) -> Option<String> {
        self.founding_date.map(|dt| dt.to_rfc3339())
    }

    /// Public JSON view used by the API
    pub fn json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

impl Default for Business {
    fn default() -> Self {
        Self::new()
    }
}
