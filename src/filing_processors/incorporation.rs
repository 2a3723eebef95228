// 🏛️ Incorporation Filing Processor
//
// Turns an incorporationApplication into a Business:
//
//   validate -> idempotency guard -> allocate identifier -> build children
//   -> build business (children attached in one step) -> finalize filing JSON
//
// Persisting the result is the caller's job. After it is persisted, three
// best-effort steps follow, each returning Result<_, MonitoredFailure> instead
// of raising:
//   update_affiliation -> consume_nr -> post_process

use super::components::build_components;
use crate::entities::{Business, Filing, RegistrationBootstrap, TEMP_CORP_TYPE};
use crate::error::{Component, MonitoredFailure, QueueError};
use crate::services::{
    is_affiliation_success, AccountService, BusinessProfileService, ContactPoint, CorpNumberAllocator, NameService,
};
use reqwest::StatusCode;
use serde_json::{Map, Value};

/// JSON truthiness: null, false, "", 0, [] and {} are all "nothing"
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ============================================================================
// BUSINESS AGGREGATE BUILDER
// ============================================================================

/// Stamp identity and naming onto `business` from the nameRequest section.
///
/// Returns None unless the identifier, name request and filing are all present.
/// Without a filed legal name the business is named after its number:
/// "BC1234567" -> "1234567 B.C. LTD.". The founding date always comes from the
/// filing record's effective date.
pub fn update_business_info(
    corp_num: &str,
    mut business: Business,
    business_info: &Value,
    filing: &Value,
    filing_rec: &Filing,
) -> Option<Business> {
    if corp_num.is_empty() || !is_truthy(business_info) || !is_truthy(filing) {
        return None;
    }

    let legal_name = business_info
        .get("legalName")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty());

    business.identifier = corp_num.to_string();
    business.legal_name = match legal_name {
        Some(name) => name.to_string(),
        None => format!("{} B.C. LTD.", corp_num.chars().skip(2).collect::<String>()),
    };
    business.legal_type = business_info
        .get("legalType")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    business.founding_date = Some(filing_rec.effective_date);

    Some(business)
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Write the final identifier and founding date into `filing.business`
fn finalize_filing_json(filing_json: &Value, business: &Business) -> Option<Value> {
    let mut ia_json = filing_json.clone();

    let filing = ia_json.get_mut("filing")?.as_object_mut()?;
    let section = filing
        .entry("business")
        .or_insert_with(|| Value::Object(Map::new()));
    if section.is_null() {
        *section = Value::Object(Map::new());
    }
    let section = section.as_object_mut()?;

    section.insert("identifier".to_string(), Value::String(business.identifier.clone()));
    section.insert(
        "foundingDate".to_string(),
        business.founding_date_iso().map_or(Value::Null, Value::String),
    );

    Some(ia_json)
}

/// Process an incoming incorporation filing.
///
/// `business` is whatever the filing already resolves to; anything other than
/// None means this filing was applied before and is rejected. `filing` is the
/// `filing` object of the message payload. Returns the new Business and the
/// filing record carrying the finalized JSON, neither persisted.
pub async fn process(
    allocator: &dyn CorpNumberAllocator,
    business: Option<Business>,
    filing: &Value,
    mut filing_rec: Filing,
) -> Result<(Business, Filing), QueueError> {
    let filing_id = filing_rec.id;

    let incorp_filing = filing
        .get("incorporationApplication")
        .filter(|ia| is_truthy(ia))
        .ok_or_else(|| {
            QueueError::processing(format!(
                "IA legal_filing:incorporationApplication missing from {filing_id}"
            ))
        })?;

    if let Some(existing) = business {
        tracing::warn!(filing_id, identifier = %existing.identifier, "Filing already applied");
        return Err(QueueError::processing(format!(
            "Business Already Exist: IA legal_filing:incorporationApplication {filing_id}"
        )));
    }

    let business_info = incorp_filing.get("nameRequest").unwrap_or(&Value::Null);
    let legal_type = business_info
        .get("legalType")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            QueueError::processing(format!(
                "incorporationApplication {filing_id} has no nameRequest.legalType."
            ))
        })?;

    // Reserve the corp number for this entity
    let corp_num = allocator.get_next_corp_num(legal_type).await.ok_or_else(|| {
        QueueError::processing(format!(
            "incorporationApplication {filing_id} unable to get a business registration number."
        ))
    })?;
    tracing::info!(filing_id, corp_num = %corp_num, "Allocated business identifier");

    let components = build_components(incorp_filing).map_err(|e| {
        QueueError::processing(format!("IA incorporationApplication {filing_id}, {e}"))
    })?;

    let business = update_business_info(
        &corp_num,
        Business::new().with_components(components),
        business_info,
        incorp_filing,
        &filing_rec,
    )
    .ok_or_else(|| {
        QueueError::processing(format!(
            "IA incorporationApplication {filing_id}, Unable to create business."
        ))
    })?;

    let ia_json = finalize_filing_json(filing_rec.filing_json(), &business).ok_or_else(|| {
        QueueError::processing(format!(
            "IA incorporationApplication {filing_id}, stored filing JSON has no filing section."
        ))
    })?;
    filing_rec.replace_filing_json(ia_json);

    Ok((business, filing_rec))
}

// ============================================================================
// AFFILIATION RECONCILER
// ============================================================================

/// What happened to the account's affiliations, step by step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationOutcome {
    /// The account could not be affiliated with the business; the cleanup
    /// deletion on the business identifier answered `deaffiliation`
    NotAffiliated {
        affiliation: StatusCode,
        deaffiliation: StatusCode,
    },
    /// Business affiliation created and the bootstrap flipped to point at it
    Affiliated {
        old_bootstrap_deleted: StatusCode,
        new_bootstrap_affiliation: StatusCode,
    },
}

impl AffiliationOutcome {
    /// None when the flip was never attempted
    pub fn reaffiliated(&self) -> Option<bool> {
        match self {
            AffiliationOutcome::NotAffiliated { .. } => None,
            AffiliationOutcome::Affiliated {
                old_bootstrap_deleted,
                new_bootstrap_affiliation,
            } => Some(is_affiliation_success(*new_bootstrap_affiliation) && *old_bootstrap_deleted == StatusCode::OK),
        }
    }

    pub fn is_success(&self) -> bool {
        self.reaffiliated() == Some(true)
    }
}

/// Move the account's affiliation from the bootstrap identifier to the business.
///
/// Never propagates: every failure comes back as a MonitoredFailure for the
/// caller to report. If the old bootstrap affiliation is deleted but the new
/// TMP affiliation fails, the bootstrap is left unaffiliated; that state is
/// reported, not repaired.
pub async fn update_affiliation(
    accounts: &dyn AccountService,
    business: &Business,
    filing: &Filing,
    bootstrap: Option<&RegistrationBootstrap>,
) -> Result<AffiliationOutcome, MonitoredFailure> {
    let failure = |message: String| MonitoredFailure::new(filing.id, Component::Affiliation, message);

    let bootstrap = bootstrap.ok_or_else(|| {
        failure(format!(
            "no registration bootstrap for temp_reg {}",
            filing.temp_reg.as_deref().unwrap_or("<none>")
        ))
    })?;

    let affiliation = accounts
        .create_affiliation(
            &bootstrap.account,
            &business.identifier,
            &business.legal_name,
            &business.legal_type,
        )
        .await;

    let outcome = if !is_affiliation_success(affiliation) {
        let deaffiliation = accounts
            .delete_affiliation(&bootstrap.account, &business.identifier)
            .await;
        AffiliationOutcome::NotAffiliated {
            affiliation,
            deaffiliation,
        }
    } else {
        // flip the registration: the bootstrap now names the new business
        let old_bootstrap_deleted = accounts
            .delete_affiliation(&bootstrap.account, &bootstrap.identifier)
            .await;
        let new_bootstrap_affiliation = accounts
            .create_affiliation(
                &bootstrap.account,
                &bootstrap.identifier,
                &business.identifier,
                TEMP_CORP_TYPE,
            )
            .await;
        AffiliationOutcome::Affiliated {
            old_bootstrap_deleted,
            new_bootstrap_affiliation,
        }
    };

    match outcome {
        AffiliationOutcome::Affiliated { .. } if outcome.is_success() => {
            tracing::info!(
                filing_id = filing.id,
                identifier = %business.identifier,
                bootstrap = %bootstrap.identifier,
                "Affiliation moved to business"
            );
            Ok(outcome)
        }
        AffiliationOutcome::Affiliated {
            old_bootstrap_deleted,
            new_bootstrap_affiliation,
        } => Err(failure(format!(
            "reaffiliation of {} failed (old delete {}, new affiliation {})",
            bootstrap.identifier,
            old_bootstrap_deleted.as_u16(),
            new_bootstrap_affiliation.as_u16()
        ))),
        AffiliationOutcome::NotAffiliated {
            affiliation,
            deaffiliation,
        } => Err(failure(format!(
            "Unable to affiliate business:{} (status {}), cleanup deaffiliation status {}",
            business.identifier,
            affiliation.as_u16(),
            deaffiliation.as_u16()
        ))),
    }
}

// ============================================================================
// NAME RESERVATION CONSUMER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NrConsumption {
    /// The filing names no NR; no calls were made
    NothingToConsume,
    Consumed { affiliation_removed: bool },
}

/// Mark the filing's name reservation consumed by the new business, then
/// drop the NR's affiliation from the bootstrap account.
pub async fn consume_nr(
    accounts: &dyn AccountService,
    namex: &dyn NameService,
    business: &Business,
    filing: &Filing,
    bootstrap: Option<&RegistrationBootstrap>,
) -> Result<NrConsumption, MonitoredFailure> {
    let Some(nr_number) = filing.nr_number() else {
        return Ok(NrConsumption::NothingToConsume);
    };
    let failure = |message: String| MonitoredFailure::new(filing.id, Component::ConsumeNr, message);

    let token = accounts
        .get_bearer_token()
        .await
        .map_err(|e| failure(e.to_string()))?;

    let status = namex
        .consume(nr_number, &business.identifier, &token)
        .await
        .map_err(|e| failure(e.to_string()))?;
    if status != StatusCode::OK {
        return Err(failure(format!("{nr_number} consume returned status {}", status.as_u16())));
    }

    // the NR is consumed at this point; only the affiliation removal can still fail
    let bootstrap = bootstrap.ok_or_else(|| {
        failure(format!(
            "{nr_number} consumed, but no registration bootstrap to remove its affiliation from"
        ))
    })?;
    let removed = accounts.delete_affiliation(&bootstrap.account, nr_number).await;
    if removed != StatusCode::OK {
        tracing::warn!(nr_number, status = %removed, "NR consumed but affiliation not removed");
    }

    Ok(NrConsumption::Consumed {
        affiliation_removed: removed == StatusCode::OK,
    })
}

// ============================================================================
// POST-PROCESSOR
// ============================================================================

/// Push the filed contact point to the business profile.
///
/// Takes shared references only: nothing here can change the stored Business
/// or Filing. A filing without a usable contactPoint is skipped silently.
pub async fn post_process(
    profile: &dyn BusinessProfileService,
    business: &Business,
    filing: &Filing,
) -> Result<(), MonitoredFailure> {
    let contact_point = filing
        .filing_json()
        .pointer("/filing/incorporationApplication/contactPoint")
        .and_then(|cp| serde_json::from_value::<ContactPoint>(cp.clone()).ok());

    let Some(contact_point) = contact_point else {
        tracing::debug!(filing_id = filing.id, "No usable contact point, skipping profile update");
        return Ok(());
    };

    profile
        .update_business_profile(&business.identifier, &contact_point)
        .await
        .map_err(|e| MonitoredFailure::new(filing.id, Component::BusinessProfile, e.to_string()))
}
