// Test doubles for the outbound services plus filing fixtures

use crate::entities::{Filing, FilingStatus, INCORPORATION_APPLICATION};
use crate::error::ServiceError;
use crate::services::{
    format_corp_num, AccountService, BusinessProfileService, ContactPoint, CorpNumberAllocator, Level, Monitor,
    NameService, Services,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// ALLOCATOR
// ============================================================================

#[derive(Default)]
pub struct FakeAllocator {
    corp_num: Option<i64>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeAllocator {
    pub fn returning(corp_num: i64) -> Self {
        FakeAllocator {
            corp_num: Some(corp_num),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        FakeAllocator::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CorpNumberAllocator for FakeAllocator {
    async fn get_next_corp_num(&self, business_type: &str) -> Option<String> {
        self.calls.lock().unwrap().push(business_type.to_string());
        self.corp_num.and_then(|n| format_corp_num(business_type, n))
    }
}

// ============================================================================
// ACCOUNTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCall {
    Token,
    Create {
        account: String,
        identifier: String,
        name: String,
        corp_type: String,
    },
    Delete {
        account: String,
        identifier: String,
    },
}

/// Scripted accounts service. Statuses are consumed in call order; once a
/// script runs out every call answers 200.
#[derive(Default)]
pub struct FakeAccounts {
    create_statuses: Mutex<VecDeque<StatusCode>>,
    delete_statuses: Mutex<VecDeque<StatusCode>>,
    token_fails: bool,
    pub calls: Mutex<Vec<AccountCall>>,
}

impl FakeAccounts {
    pub fn with_create_statuses(self, statuses: Vec<StatusCode>) -> Self {
        *self.create_statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_delete_statuses(self, statuses: Vec<StatusCode>) -> Self {
        *self.delete_statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn failing_token(mut self) -> Self {
        self.token_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<AccountCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AccountCall::Delete { account, identifier } => Some((account, identifier)),
                _ => None,
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<AccountCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, AccountCall::Create { .. }))
            .collect()
    }
}

#[async_trait]
impl AccountService for FakeAccounts {
    async fn get_bearer_token(&self) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push(AccountCall::Token);
        if self.token_fails {
            Err(ServiceError::Status(401))
        } else {
            Ok("tok".to_string())
        }
    }

    async fn create_affiliation(
        &self,
        account: &str,
        business_registration: &str,
        business_name: &str,
        corp_type_code: &str,
    ) -> StatusCode {
        self.calls.lock().unwrap().push(AccountCall::Create {
            account: account.to_string(),
            identifier: business_registration.to_string(),
            name: business_name.to_string(),
            corp_type: corp_type_code.to_string(),
        });
        self.create_statuses.lock().unwrap().pop_front().unwrap_or(StatusCode::OK)
    }

    async fn delete_affiliation(&self, account: &str, business_registration: &str) -> StatusCode {
        self.calls.lock().unwrap().push(AccountCall::Delete {
            account: account.to_string(),
            identifier: business_registration.to_string(),
        });
        self.delete_statuses.lock().unwrap().pop_front().unwrap_or(StatusCode::OK)
    }
}

// ============================================================================
// NAMEX + PROFILE + MONITOR
// ============================================================================

pub struct FakeNamex {
    status: StatusCode,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeNamex {
    pub fn answering(status: StatusCode) -> Self {
        FakeNamex {
            status,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for FakeNamex {
    fn default() -> Self {
        FakeNamex::answering(StatusCode::OK)
    }
}

#[async_trait]
impl NameService for FakeNamex {
    async fn consume(&self, nr_number: &str, corp_num: &str, _token: &str) -> Result<StatusCode, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((nr_number.to_string(), corp_num.to_string()));
        Ok(self.status)
    }
}

#[derive(Default)]
pub struct FakeProfile {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, ContactPoint)>>,
}

#[async_trait]
impl BusinessProfileService for FakeProfile {
    async fn update_business_profile(&self, identifier: &str, contact_point: &ContactPoint) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((identifier.to_string(), contact_point.clone()));
        if self.fail {
            Err(ServiceError::Status(500))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct RecordingMonitor {
    pub messages: Mutex<Vec<(String, Level)>>,
}

impl RecordingMonitor {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }
}

impl Monitor for RecordingMonitor {
    fn capture_message(&self, message: &str, level: Level) {
        self.messages.lock().unwrap().push((message.to_string(), level));
    }
}

// ============================================================================
// SERVICE BUNDLE
// ============================================================================

/// Fakes wired into a `Services` bundle, with handles kept for assertions
pub struct FakeServices {
    pub allocator: Arc<FakeAllocator>,
    pub accounts: Arc<FakeAccounts>,
    pub namex: Arc<FakeNamex>,
    pub profile: Arc<FakeProfile>,
    pub monitor: Arc<RecordingMonitor>,
}

impl FakeServices {
    pub fn new(allocator: FakeAllocator, accounts: FakeAccounts) -> Self {
        FakeServices {
            allocator: Arc::new(allocator),
            accounts: Arc::new(accounts),
            namex: Arc::new(FakeNamex::default()),
            profile: Arc::new(FakeProfile::default()),
            monitor: Arc::new(RecordingMonitor::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            allocator: self.allocator.clone(),
            accounts: self.accounts.clone(),
            namex: self.namex.clone(),
            business_profile: self.profile.clone(),
            monitor: self.monitor.clone(),
        }
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub const TEMP_REG: &str = "Tb31yQIuBw";
pub const ACCOUNT: &str = "2";

fn address(street: &str) -> Value {
    json!({
        "streetAddress": street,
        "addressCity": "Victoria",
        "addressRegion": "BC",
        "addressCountry": "CA",
        "postalCode": "V8W 2C3"
    })
}

/// Minimal incorporation with one office, one party (one role) and one share class
pub fn incorporation_filing_json() -> Value {
    json!({
        "filing": {
            "header": {"name": INCORPORATION_APPLICATION, "accountId": ACCOUNT},
            "business": {"identifier": TEMP_REG},
            "incorporationApplication": {
                "nameRequest": {"legalType": "BC"},
                "offices": {
                    "registeredOffice": {
                        "mailingAddress": address("PO Box 1"),
                        "deliveryAddress": address("1 Main St")
                    }
                },
                "parties": [{
                    "officer": {"firstName": "Joe", "lastName": "Swanson", "partyType": "person"},
                    "mailingAddress": address("2 Main St"),
                    "roles": [{"roleType": "Director", "appointmentDate": "2020-01-01"}]
                }],
                "shareClasses": [{
                    "name": "Class A Shares",
                    "priority": 1,
                    "hasMaximumShares": true,
                    "maxNumberOfShares": 100,
                    "hasParValue": false,
                    "hasRightsOrRestrictions": false,
                    "series": []
                }],
                "contactPoint": {"email": "test@test.com", "phone": "(250) 555-1234"}
            }
        }
    })
}

/// A pending filing record for `filing_json`, effective 2020-03-01T08:00:00Z
pub fn filing_record(filing_json: Value) -> Filing {
    let mut filing = Filing::new(Some(TEMP_REG.to_string()), filing_json);
    filing.id = 1;
    filing.status = FilingStatus::Pending;
    filing.effective_date = Utc.with_ymd_and_hms(2020, 3, 1, 8, 0, 0).unwrap();
    filing
}
