//! Record validity policies.
//!
//! Exactly one rule is active per run; records it rejects are reported
//! through the skip logger and never reach the aggregation table.

use crate::record::Prescription;
use clap::ValueEnum;
use std::fmt;

/// Which validity rule gates records before aggregation.
///
/// Both predicates are pure and total: they classify any structurally
/// valid [`Prescription`] and never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ValidationRule {
    /// Accept any record with a non-empty drug name.
    #[default]
    Permissive,

    /// Additionally require non-empty prescriber names and a
    /// non-negative cost.
    Strict,
}

impl ValidationRule {
    /// Returns `true` if `prescription` may participate in aggregation.
    pub fn accepts(&self, prescription: &Prescription) -> bool {
        match self {
            ValidationRule::Permissive => !prescription.drug_name.is_empty(),
            ValidationRule::Strict => {
                !prescription.prescriber_last_name.is_empty()
                    && !prescription.prescriber_first_name.is_empty()
                    && !prescription.drug_name.is_empty()
                    && !prescription.drug_cost.is_negative()
            }
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Permissive => write!(f, "permissive"),
            ValidationRule::Strict => write!(f, "strict"),
        }
    }
}
