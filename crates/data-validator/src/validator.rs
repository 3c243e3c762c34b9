//! Sanity Validator for Status Range Checking

use crate::error::ValidationError;
use loadcell_protocol::LoadCellStatus;
use serde::{Deserialize, Serialize};

/// Upper bounds for each status field (all fields are unsigned)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    /// Battery level maximum (%)
    pub battery_percent_max: u8,
    /// Charge status maximum (0 = not charging, 1 = charging)
    pub charge_status_max: u8,
    /// Online status maximum
    pub online_status_max: u8,
    /// Gross/net mark maximum
    pub gross_net_mark_max: u8,
    /// Overload mark maximum
    pub overload_mark_max: u8,
    /// Out-of-tolerance mark maximum
    pub out_of_tolerance_mark_max: u8,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            battery_percent_max: 100,
            charge_status_max: 1,
            online_status_max: 2,
            gross_net_mark_max: 1,
            overload_mark_max: 1,
            out_of_tolerance_mark_max: 2,
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Joined error messages, empty when valid
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Pure range check over decoded load cell status
#[derive(Debug, Clone, Default)]
pub struct SanityValidator {
    config: SanityConfig,
}

impl SanityValidator {
    /// Create a new validator with given config
    pub fn new(config: SanityConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against an upper bound
    pub fn validate_max(
        &self,
        field: &'static str,
        value: u8,
        max: u8,
    ) -> Result<(), ValidationError> {
        if value > max {
            Err(ValidationError::OutOfRange { field, value, max })
        } else {
            Ok(())
        }
    }

    /// Check every status field, collecting all violations
    pub fn validate(&self, status: &LoadCellStatus) -> ValidationResult {
        let c = &self.config;
        let checks = [
            ("right_battery_percent", status.right_battery_percent, c.battery_percent_max),
            ("left_battery_percent", status.left_battery_percent, c.battery_percent_max),
            ("right_charge_status", status.right_charge_status, c.charge_status_max),
            ("left_charge_status", status.left_charge_status, c.charge_status_max),
            ("right_online_status", status.right_online_status, c.online_status_max),
            ("left_online_status", status.left_online_status, c.online_status_max),
            ("gross_net_mark", status.gross_net_mark, c.gross_net_mark_max),
            ("overload_mark", status.overload_mark, c.overload_mark_max),
            (
                "out_of_tolerance_mark",
                status.out_of_tolerance_mark,
                c.out_of_tolerance_mark_max,
            ),
        ];

        let errors: Vec<_> = checks
            .iter()
            .filter_map(|&(field, value, max)| self.validate_max(field, value, max).err())
            .collect();

        ValidationResult {
            valid: errors.is_empty(),
            errors,
            fields_checked: checks.len(),
        }
    }

    /// Check every status field, stopping at the first violation
    pub fn check(&self, status: &LoadCellStatus) -> Result<(), ValidationError> {
        match self.validate(status).errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Get the configured bounds
    pub fn config(&self) -> &SanityConfig {
        &self.config
    }
}
