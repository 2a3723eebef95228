// Business Registry Filer - Core Library
// Exposes all modules for use in the filer CLI, the legal API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod filing_processors;
pub mod services;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    Event,
    setup_database, insert_bootstrap, find_bootstrap_by_identifier, delete_bootstrap,
    insert_filing, find_filing_by_id, find_filings_by_temp_reg, update_filing_status,
    save_incorporation, find_business_by_identifier, find_business_by_id, count_businesses,
    insert_event, get_events_for_entity,
};
pub use entities::{
    Business, BusinessComponents, Filing, FilingStatus, RegistrationBootstrap,
    Office, Address, AddressType, Party, PartyRole, PartyType, ShareClass, ShareSeries, Alias, AliasType,
    INCORPORATION_APPLICATION, TEMP_CORP_TYPE, is_temp_identifier,
};
pub use error::{Component, MonitoredFailure, QueueError, ServiceError};
pub use services::{register_bootstrap, Monitor, Services, TracingMonitor};
pub use worker::{run_worker, FilingMessage, FilingWorker, ProcessOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
