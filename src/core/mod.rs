pub mod offer_rules;
pub mod property_rules;
pub mod service;
