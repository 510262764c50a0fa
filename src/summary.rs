//! Per-drug summary accumulator.
//!
//! Each summary tracks the running exact total cost and the set of
//! distinct prescribers seen for one drug name.

use crate::currency::Currency;
use crate::record::Prescription;
use serde::Serialize;
use std::collections::HashSet;

/// One row of the final report, in output column order.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    /// Drug name (normalized)
    pub drug_name: String,

    /// Count of distinct prescribers for this drug
    pub num_prescriber: usize,

    /// Exact accumulated cost, rendered without rounding
    pub total_cost: Currency,
}

/// Capability shared by drug-summary accumulator variants.
///
/// There is one concrete implementation, [`DrugSummary`]; alternatives
/// (e.g. an approximate prescriber counter for memory-constrained runs)
/// can satisfy the same trait later.
pub trait DrugAccumulator {
    /// Creates an empty accumulator for the given drug name.
    fn new(name: &str) -> Self
    where
        Self: Sized;

    /// Absorbs one prescription into the running aggregate.
    ///
    /// The caller guarantees the prescription's drug name matches this
    /// accumulator; it is not re-checked here. Never fails.
    fn absorb(&mut self, prescription: &Prescription);

    /// The drug name this accumulator was created for.
    fn name(&self) -> &str;

    /// Exact sum of every absorbed cost.
    fn total_cost(&self) -> Currency;

    /// Count of distinct prescribers absorbed so far.
    fn num_prescriber(&self) -> usize;

    /// Renders the aggregate as an output row.
    fn to_row(&self) -> ReportRow {
        ReportRow {
            drug_name: self.name().to_owned(),
            num_prescriber: self.num_prescriber(),
            total_cost: self.total_cost(),
        }
    }
}

/// Aggregate state for one drug name.
///
/// The total cost can be accumulated directly; prescribers must be kept
/// as a set because only the distinct count is reported.
#[derive(Debug, Clone)]
pub struct DrugSummary {
    name: String,
    total_cost: Currency,
    prescribers: HashSet<String>,
}

impl DrugAccumulator for DrugSummary {
    fn new(name: &str) -> Self {
        DrugSummary {
            name: name.to_owned(),
            total_cost: Currency::ZERO,
            prescribers: HashSet::new(),
        }
    }

    fn absorb(&mut self, prescription: &Prescription) {
        self.total_cost += prescription.drug_cost;
        self.prescribers.insert(prescription.prescriber_id());
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn total_cost(&self) -> Currency {
        self.total_cost
    }

    fn num_prescriber(&self) -> usize {
        self.prescribers.len()
    }
}
