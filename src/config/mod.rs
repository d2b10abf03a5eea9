#[cfg(feature = "cli")]
pub mod cli;
pub mod seed;
pub mod toml_config;

use crate::domain::model::GardenOrientation;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use serde::{Deserialize, Serialize};

/// What happens to the other offers of a property when one offer is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusePolicy {
    /// Every other offer becomes accepted.
    #[default]
    AcceptOthers,
    /// Other offers keep their status.
    LeaveOthers,
}

/// Tunable constants of the property rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Lowest selling price, as a share of the expected price, allowed while an offer is accepted.
    pub min_selling_ratio: f64,
    pub offer_validity_days: u32,
    pub availability_delay_months: u32,
    pub default_bedrooms: u32,
    pub garden_default_area: u32,
    pub garden_default_orientation: GardenOrientation,
    pub refuse_policy: RefusePolicy,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_selling_ratio: 0.9,
            offer_validity_days: 7,
            availability_delay_months: 3,
            default_bedrooms: 2,
            garden_default_area: 10,
            garden_default_orientation: GardenOrientation::North,
            refuse_policy: RefusePolicy::AcceptOthers,
        }
    }
}

impl Validate for RulesConfig {
    fn validate(&self) -> Result<()> {
        validate_range("rules.min_selling_ratio", self.min_selling_ratio, f64::EPSILON, 1.0)?;
        validate_positive_number("rules.offer_validity_days", self.offer_validity_days, 1)?;
        validate_range("rules.availability_delay_months", self.availability_delay_months, 0, 1200)?;
        Ok(())
    }
}
