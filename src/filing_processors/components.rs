// 🧩 Filing Components - child entities built from filing JSON
//
// Pure mapping from filing sub-objects to entities. Nothing here touches the
// database or a remote service; the incorporation processor collects the
// results into a BusinessComponents batch before a Business value exists.

use crate::entities::{
    normalize_role, Address, AddressType, Alias, BusinessComponents, Office, Party, PartyRole,
    PartyType, ShareClass,
};
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("shareClasses missing from filing")]
    MissingShareClasses,

    #[error("invalid share class: {0}")]
    InvalidShareClass(serde_json::Error),

    #[error("invalid {address_type} address: {source}")]
    InvalidAddress {
        address_type: String,
        source: serde_json::Error,
    },
}

// ============================================================================
// OFFICES
// ============================================================================

/// Build one address from a filing address object, typed by the key it came from
pub fn create_address(address_type: AddressType, address_info: &Value) -> Result<Address, ComponentError> {
    let mut address: Address =
        serde_json::from_value(address_info.clone()).map_err(|source| ComponentError::InvalidAddress {
            address_type: address_type.as_str().to_string(),
            source,
        })?;
    address.address_type = address_type;
    Ok(address)
}

/// Build an office from `{ "mailingAddress": {...}, "deliveryAddress": {...} }`
///
/// Keys that are not a known address type are ignored.
pub fn create_office(office_type: &str, addresses: &Value) -> Result<Office, ComponentError> {
    let mut office = Office {
        office_type: office_type.to_string(),
        addresses: Vec::new(),
    };

    if let Some(addresses) = addresses.as_object() {
        for (key, address_info) in addresses {
            if let Some(address_type) = AddressType::from_key(key) {
                office.addresses.push(create_address(address_type, address_info)?);
            }
        }
    }

    Ok(office)
}

// ============================================================================
// PARTIES + ROLES
// ============================================================================

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn date_field(value: &Value, key: &str) -> Option<NaiveDate> {
    value
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn optional_address(party_info: &Value, key: &str, address_type: AddressType) -> Result<Option<Address>, ComponentError> {
    match party_info.get(key) {
        Some(info) if info.is_object() => create_address(address_type, info).map(Some),
        _ => Ok(None),
    }
}

/// Build a party from `{ "officer": {...}, "mailingAddress": {...}, ... }`
pub fn create_party(party_info: &Value) -> Result<Party, ComponentError> {
    let officer = party_info.get("officer").unwrap_or(&Value::Null);

    Ok(Party {
        party_type: str_field(officer, "partyType")
            .map(|t| PartyType::parse(&t))
            .unwrap_or_default(),
        first_name: str_field(officer, "firstName"),
        middle_initial: str_field(officer, "middleInitial"),
        last_name: str_field(officer, "lastName"),
        organization_name: str_field(officer, "orgName"),
        email: str_field(officer, "email"),
        mailing_address: optional_address(party_info, "mailingAddress", AddressType::Mailing)?,
        delivery_address: optional_address(party_info, "deliveryAddress", AddressType::Delivery)?,
    })
}

/// Build a role for a party from `{ "roleType": ..., "appointmentDate": ..., "cessationDate": ... }`
pub fn create_role(party: &Party, role_info: &Value) -> PartyRole {
    PartyRole {
        role: normalize_role(role_info.get("roleType").and_then(Value::as_str).unwrap_or_default()),
        appointment_date: date_field(role_info, "appointmentDate"),
        cessation_date: date_field(role_info, "cessationDate"),
        party: party.clone(),
    }
}

// ============================================================================
// SHARE CLASSES + ALIASES
// ============================================================================

pub fn create_share_class(share_class_info: &Value) -> Result<ShareClass, ComponentError> {
    serde_json::from_value(share_class_info.clone()).map_err(ComponentError::InvalidShareClass)
}

/// nameTranslations entries are either plain strings or `{ "name": ... }` objects
pub fn create_aliases(name_translations: &Value) -> Vec<Alias> {
    name_translations
        .as_array()
        .map(|translations| {
            translations
                .iter()
                .filter_map(|t| match t {
                    Value::String(name) => Some(name.clone()),
                    other => str_field(other, "name"),
                })
                .map(Alias::translation)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// WHOLE BATCH
// ============================================================================

/// Build every child entity named by an incorporationApplication.
///
/// `offices` and `parties` may be absent; `shareClasses` must be present
/// (an explicit null or empty list yields no share classes).
pub fn build_components(incorp_filing: &Value) -> Result<BusinessComponents, ComponentError> {
    let mut components = BusinessComponents::default();

    if let Some(offices) = incorp_filing.get("offices").and_then(Value::as_object) {
        for (office_type, addresses) in offices {
            components.offices.push(create_office(office_type, addresses)?);
        }
    }

    if let Some(parties) = incorp_filing.get("parties").and_then(Value::as_array) {
        for party_info in parties {
            let party = create_party(party_info)?;
            let roles = party_info.get("roles").and_then(Value::as_array);
            for role_info in roles.into_iter().flatten() {
                components.party_roles.push(create_role(&party, role_info));
            }
        }
    }

    let share_classes = incorp_filing
        .get("shareClasses")
        .ok_or(ComponentError::MissingShareClasses)?;
    for share_class_info in share_classes.as_array().into_iter().flatten() {
        components.share_classes.push(create_share_class(share_class_info)?);
    }

    if let Some(name_translations) = incorp_filing.get("nameTranslations") {
        components.aliases = create_aliases(name_translations);
    }

    Ok(components)
}
