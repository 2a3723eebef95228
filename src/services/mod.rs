// Outbound services - black-box remote APIs the filer talks to
//
// Each service is a trait so the processors can be driven by fakes in tests;
// the *Client types are the reqwest-backed implementations.

pub mod accounts;
pub mod business_profile;
pub mod colin;
pub mod monitoring;
pub mod namex;

pub use accounts::{is_affiliation_success, register_bootstrap, AccountService, AccountsClient};
pub use business_profile::{BusinessProfileClient, BusinessProfileService, ContactPoint};
pub use colin::{format_corp_num, ColinClient, CorpNumberAllocator};
pub use monitoring::{Level, Monitor, TracingMonitor};
pub use namex::{NameService, NamexClient};

use crate::config::Config;
use crate::error::ServiceError;
use std::sync::Arc;

/// Every outbound collaborator the filer needs, bundled for the worker
#[derive(Clone)]
pub struct Services {
    pub allocator: Arc<dyn CorpNumberAllocator>,
    pub accounts: Arc<dyn AccountService>,
    pub namex: Arc<dyn NameService>,
    pub business_profile: Arc<dyn BusinessProfileService>,
    pub monitor: Arc<dyn Monitor>,
}

impl Services {
    /// Real HTTP clients built from configuration
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let accounts: Arc<dyn AccountService> = Arc::new(AccountsClient::new(&config.accounts)?);
        let timeout = config.accounts.timeout();

        Ok(Services {
            allocator: Arc::new(ColinClient::new(&config.colin)?),
            namex: Arc::new(NamexClient::new(&config.namex, timeout)?),
            business_profile: Arc::new(BusinessProfileClient::new(
                &config.accounts.entity_url,
                timeout,
                accounts.clone(),
            )?),
            accounts,
            monitor: Arc::new(TracingMonitor),
        })
    }
}
