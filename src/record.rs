//! Prescription record model and raw-field conversion.
//!
//! Input rows arrive as positional text fields in the order
//! `id, prescriber_last_name, prescriber_first_name, drug_name, drug_cost`.
//! Conversion is all-or-nothing: a record either yields a fully
//! normalized [`Prescription`] or a [`ParseError`] naming what failed.

use crate::currency::Currency;
use crate::error::ParseError;
use csv::StringRecord;
use std::str::FromStr;

/// A normalized prescription record.
///
/// Name and drug fields are uppercased on construction so that records
/// differing only in case aggregate under the same keys.
#[derive(Debug, Clone)]
pub struct Prescription {
    /// Record identifier
    pub id: i64,

    /// Prescriber last name, uppercased
    pub prescriber_last_name: String,

    /// Prescriber first name, uppercased
    pub prescriber_first_name: String,

    /// Drug name, uppercased; the aggregation key
    pub drug_name: String,

    /// Cost billed for this prescription
    pub drug_cost: Currency,
}

impl Prescription {
    /// Number of fields in a raw input record.
    pub const FIELD_COUNT: usize = 5;

    /// Converts a raw delimited record into a normalized prescription.
    ///
    /// Fails with [`ParseError::FieldCount`] when the record does not have
    /// exactly five fields, or [`ParseError::FieldConversion`] when any
    /// single field rejects its converter. Deterministic and side-effect
    /// free: the same raw input always yields the same result.
    pub fn from_record(record: &StringRecord) -> std::result::Result<Self, ParseError> {
        if record.len() != Self::FIELD_COUNT {
            return Err(ParseError::FieldCount {
                expected: Self::FIELD_COUNT,
                found: record.len(),
            });
        }

        Ok(Prescription {
            id: convert_integer("id", &record[0])?,
            prescriber_last_name: normalize_case(&record[1]),
            prescriber_first_name: normalize_case(&record[2]),
            drug_name: normalize_case(&record[3]),
            drug_cost: convert_currency("drug_cost", &record[4])?,
        })
    }

    /// Identity used to deduplicate prescribers within one drug.
    ///
    /// Derived from the normalized name fields; computed on demand and
    /// never stored on the record.
    pub fn prescriber_id(&self) -> String {
        format!(
            "{},{}",
            self.prescriber_last_name, self.prescriber_first_name
        )
    }
}

/// Case normalization applied to name and drug fields.
fn normalize_case(value: &str) -> String {
    value.to_uppercase()
}

fn convert_integer(field: &'static str, value: &str) -> std::result::Result<i64, ParseError> {
    i64::from_str(value).map_err(|_| ParseError::conversion(field, "integer", value))
}

fn convert_currency(field: &'static str, value: &str) -> std::result::Result<Currency, ParseError> {
    Currency::from_str(value).map_err(|_| ParseError::conversion(field, "decimal", value))
}
