//! # Pharmacy Report
//!
//! A batch aggregation pipeline that reads delimited prescription
//! records and reports, per drug, the number of distinct prescribers
//! and the total cost billed.
//!
//! ## Design Principles
//!
//! - **Exact arithmetic**: costs are summed with `rust_decimal`, never
//!   binary floating point
//! - **Row-local failures**: a record that fails parsing or validation
//!   is skipped and reported; the run continues
//! - **Deterministic output**: rows ordered by total cost descending,
//!   drug name ascending on ties
//!
//! ## Example
//!
//! ```no_run
//! use pharmacy_report::{ReportConfig, ReportEngine};
//! use std::io::Cursor;
//!
//! let csv = "id,prescriber_last_name,prescriber_first_name,drug_name,drug_cost\n\
//!            1000000001,Smith,James,AMBIEN,100\n";
//! let mut engine = ReportEngine::new(ReportConfig::default());
//! engine.process_csv(Cursor::new(csv)).unwrap();
//! engine.write_output(std::io::stdout()).unwrap();
//! ```

pub mod currency;
pub mod engine;
pub mod error;
pub mod record;
pub mod summary;
pub mod validate;

pub use currency::Currency;
pub use engine::{rank, ReportConfig, ReportEngine, SkipLog, WarnSkipLog};
pub use error::{ParseError, ReportError, Result};
pub use record::Prescription;
pub use summary::{DrugAccumulator, DrugSummary, ReportRow};
pub use validate::ValidationRule;
