// 📬 Office + Address - where a business can be reached
//
// Filing JSON shape:
//   "offices": {
//     "registeredOffice": {
//       "mailingAddress":  { "streetAddress": ..., "addressCity": ... },
//       "deliveryAddress": { ... }
//     },
//     "recordsOffice": { ... }
//   }

use serde::{Deserialize, Serialize};

// ============================================================================
// ADDRESS TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Mailing,
    Delivery,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Mailing => "mailing",
            AddressType::Delivery => "delivery",
        }
    }

    /// Map a filing key ("mailingAddress", "deliveryAddress") or stored value to a type
    pub fn from_key(key: &str) -> Option<Self> {
        let base = key.strip_suffix("Address").unwrap_or(key);
        match base.to_lowercase().as_str() {
            "mailing" => Some(AddressType::Mailing),
            "delivery" => Some(AddressType::Delivery),
            _ => None,
        }
    }
}

// ============================================================================
// ADDRESS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Not part of the address object itself; set from the key it was filed under
    #[serde(default)]
    pub address_type: AddressType,

    #[serde(default)]
    pub street_address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address_additional: Option<String>,

    #[serde(default)]
    pub address_city: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_region: Option<String>,

    #[serde(default)]
    pub address_country: String,

    #[serde(default)]
    pub postal_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_instructions: Option<String>,
}

// ============================================================================
// OFFICE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    /// e.g. "registeredOffice", "recordsOffice"
    pub office_type: String,
    pub addresses: Vec<Address>,
}

impl Office {
    pub fn address(&self, address_type: AddressType) -> Option<&Address> {
        self.addresses.iter().find(|a| a.address_type == address_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_type_from_key() {
        assert_eq!(AddressType::from_key("mailingAddress"), Some(AddressType::Mailing));
        assert_eq!(AddressType::from_key("deliveryAddress"), Some(AddressType::Delivery));
        assert_eq!(AddressType::from_key("delivery"), Some(AddressType::Delivery));
        assert_eq!(AddressType::from_key("billingAddress"), None);
    }

    #[test]
    fn test_address_deserialize_camel_case() {
        let address: Address = serde_json::from_value(serde_json::json!({
            "streetAddress": "1234 Main St",
            "addressCity": "Victoria",
            "addressRegion": "BC",
            "addressCountry": "CA",
            "postalCode": "V8W 2C3"
        }))
        .unwrap();

        assert_eq!(address.address_type, AddressType::Mailing);
        assert_eq!(address.street_address, "1234 Main St");
        assert_eq!(address.address_region.as_deref(), Some("BC"));
        assert_eq!(address.delivery_instructions, None);
    }
}
