// Filing processors - one module per filing type, plus the shared
// child-entity builders

pub mod components;
pub mod incorporation;

pub use components::{build_components, ComponentError};
pub use incorporation::{
    consume_nr, post_process, process, update_affiliation, update_business_info, AffiliationOutcome,
    NrConsumption,
};
