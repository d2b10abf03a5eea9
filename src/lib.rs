pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{FixedClock, InMemoryStore, SystemClock};
pub use crate::config::{toml_config::EstateConfig, RefusePolicy, RulesConfig};
pub use crate::core::service::EstateService;
pub use crate::utils::error::{EstateError, Result};
