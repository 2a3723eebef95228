// Entity Models - the business registry data model
//
// Business is the aggregate root; offices, party roles, share classes and
// aliases belong to exactly one Business. Filing and RegistrationBootstrap
// live alongside it and are linked by identifier.

pub mod alias;
pub mod bootstrap;
pub mod business;
pub mod filing;
pub mod office;
pub mod party;
pub mod share_class;

pub use alias::{Alias, AliasType};
pub use bootstrap::{is_temp_identifier, RegistrationBootstrap, TEMP_CORP_TYPE};
pub use business::{Business, BusinessComponents};
pub use filing::{Filing, FilingStatus, INCORPORATION_APPLICATION};
pub use office::{Address, AddressType, Office};
pub use party::{normalize_role, Party, PartyRole, PartyType};
pub use share_class::{ShareClass, ShareSeries};
