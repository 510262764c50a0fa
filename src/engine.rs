//! Core report engine.
//!
//! One linear pass: read all input records, accumulate per-drug
//! summaries, then rank and emit the report. Records that fail parsing
//! or validation are skipped row-locally and reported through the
//! pluggable skip logger; only I/O errors abort the run.

use crate::error::Result;
use crate::record::Prescription;
use crate::summary::{DrugAccumulator, DrugSummary};
use crate::validate::ValidationRule;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, warn};
use std::collections::HashMap;
use std::io::{Read, Write};

/// Runtime options for one aggregation pass.
#[derive(Debug, Clone, Copy)]
pub struct ReportConfig {
    /// Validity rule applied to each parsed record.
    pub rule: ValidationRule,

    /// Stop after this many data records; `None` means unlimited.
    pub max_records: Option<u64>,

    /// Field delimiter for both input and output.
    pub delimiter: u8,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            rule: ValidationRule::default(),
            max_records: None,
            delimiter: b',',
        }
    }
}

/// Side channel notified once per skipped input record.
///
/// Implementations must not fail; any return value is ignored.
pub trait SkipLog {
    /// Reports that the record at `line` (1-based file line, the header
    /// being line 1) was skipped, with a human-readable reason.
    fn skipped(&mut self, line: u64, message: &str);
}

/// Default skip logger: reports through the `log` facade at warn level.
#[derive(Debug, Default)]
pub struct WarnSkipLog;

impl SkipLog for WarnSkipLog {
    fn skipped(&mut self, line: u64, message: &str) {
        warn!("Skipping line {}: {}", line, message);
    }
}

/// The report engine.
///
/// Owns the aggregation table mapping each normalized drug name to its
/// [`DrugSummary`]. The table lives for one pass and is discarded with
/// the engine; output ordering never depends on insertion order.
pub struct ReportEngine {
    /// Drug summaries indexed by normalized drug name.
    table: HashMap<String, DrugSummary>,

    config: ReportConfig,

    skip_log: Box<dyn SkipLog>,
}

impl ReportEngine {
    /// Creates an engine that reports skips through [`WarnSkipLog`].
    pub fn new(config: ReportConfig) -> Self {
        Self::with_skip_log(config, Box::new(WarnSkipLog))
    }

    /// Creates an engine with a caller-supplied skip logger.
    pub fn with_skip_log(config: ReportConfig, skip_log: Box<dyn SkipLog>) -> Self {
        ReportEngine {
            table: HashMap::new(),
            config,
            skip_log,
        }
    }

    /// Consumes prescription records from a CSV reader in one pass.
    ///
    /// The first line is a header and is consumed by the reader. Each
    /// data record is parsed and validated independently; failures skip
    /// that record only. Stops early once `max_records` data records
    /// have been seen.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .delimiter(self.config.delimiter)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.records().enumerate() {
            if let Some(max) = self.config.max_records {
                if row_idx as u64 >= max {
                    break;
                }
            }

            let line = row_idx as u64 + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => self.process_record(&record, line),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    self.skip_log
                        .skipped(line, &format!("malformed record: {}", e));
                }
            }
        }

        Ok(())
    }

    /// Parses, validates, and absorbs a single raw record.
    fn process_record(&mut self, record: &StringRecord, line: u64) {
        let prescription = match Prescription::from_record(record) {
            Ok(p) => p,
            Err(e) => {
                self.skip_log.skipped(line, &e.to_string());
                return;
            }
        };

        if !self.config.rule.accepts(&prescription) {
            self.skip_log.skipped(
                line,
                &format!(
                    "prescription failed the {} validation rule: {:?}",
                    self.config.rule, prescription
                ),
            );
            return;
        }

        // Lazily creates the summary on first sight of a drug name; the
        // missing key itself is the constructor argument.
        let summary = self
            .table
            .entry(prescription.drug_name.clone())
            .or_insert_with_key(|name| DrugSummary::new(name));
        summary.absorb(&prescription);

        debug!(
            "Line {}: added {} to {} (total {}, {} prescribers)",
            line,
            prescription.drug_cost,
            summary.name(),
            summary.total_cost(),
            summary.num_prescriber()
        );
    }

    /// Writes the final report to CSV.
    ///
    /// Emits the `drug_name,num_prescriber,total_cost` header followed
    /// by the ranked rows. Cost text is the exact accumulated decimal.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(false)
            .from_writer(writer);

        csv_writer.write_record(["drug_name", "num_prescriber", "total_cost"])?;

        for summary in rank(self.table.values()) {
            csv_writer.serialize(summary.to_row())?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Returns a reference to a drug's summary (for testing).
    #[cfg(test)]
    pub fn summary(&self, drug_name: &str) -> Option<&DrugSummary> {
        self.table.get(drug_name)
    }
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

/// Orders summaries by total cost descending, drug name ascending on ties.
///
/// The comparator is a strict total order: names are unique table keys,
/// so no two summaries compare equal and the result is reproducible
/// regardless of insertion order.
pub fn rank<'a, S, I>(summaries: I) -> Vec<&'a S>
where
    S: DrugAccumulator + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut ranked: Vec<&S> = summaries.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.total_cost()
            .cmp(&a.total_cost())
            .then_with(|| a.name().cmp(b.name()))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    fn process_csv_str(csv: &str) -> ReportEngine {
        let mut engine = ReportEngine::default();
        engine.process_csv(Cursor::new(csv)).unwrap();
        engine
    }

    fn output_str(engine: &ReportEngine) -> String {
        let mut output = Vec::new();
        engine.write_output(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    /// Skip logger that records every invocation.
    #[derive(Clone, Default)]
    struct CollectSkips(Rc<RefCell<Vec<(u64, String)>>>);

    impl SkipLog for CollectSkips {
        fn skipped(&mut self, line: u64, message: &str) {
            self.0.borrow_mut().push((line, message.to_owned()));
        }
    }

    const HEADER: &str = "id,prescriber_last_name,prescriber_first_name,drug_name,drug_cost";

    #[test]
    fn test_aggregates_per_drug() {
        let csv = format!(
            "{HEADER}\n\
             1000000001,Smith,James,AMBIEN,100\n\
             1000000002,Garcia,Maria,AMBIEN,200\n\
             1000000003,Johnson,James,CHLORPROMAZINE,1000\n\
             1000000004,Rodriguez,Maria,CHLORPROMAZINE,2000\n\
             1000000005,Smith,David,BENZTROPINE,1500\n"
        );

        let engine = process_csv_str(&csv);

        let ambien = engine.summary("AMBIEN").unwrap();
        assert_eq!(ambien.total_cost().to_string(), "300");
        assert_eq!(ambien.num_prescriber(), 2);

        let benztropine = engine.summary("BENZTROPINE").unwrap();
        assert_eq!(benztropine.total_cost().to_string(), "1500");
        assert_eq!(benztropine.num_prescriber(), 1);
    }

    #[test]
    fn test_same_prescriber_counted_once() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DRUG1,100\n\
             2,Smith,John,DRUG1,200\n"
        );

        let engine = process_csv_str(&csv);
        let summary = engine.summary("DRUG1").unwrap();
        assert_eq!(summary.total_cost().to_string(), "300");
        assert_eq!(summary.num_prescriber(), 1);
    }

    #[test]
    fn test_distinct_prescribers_counted_each() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DRUG1,100\n\
             3,Doe,Jane,DRUG1,300\n"
        );

        let engine = process_csv_str(&csv);
        let summary = engine.summary("DRUG1").unwrap();
        assert_eq!(summary.total_cost().to_string(), "400");
        assert_eq!(summary.num_prescriber(), 2);
    }

    #[test]
    fn test_drug_name_case_collapses_to_one_key() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DruG1,100\n\
             2,Doe,Jane,Drug1,200\n\
             3,Garcia,Maria,DRUG1,300\n"
        );

        let engine = process_csv_str(&csv);
        let summary = engine.summary("DRUG1").unwrap();
        assert_eq!(summary.total_cost().to_string(), "600");
        assert_eq!(summary.num_prescriber(), 3);

        let output = output_str(&engine);
        assert_eq!(output.lines().count(), 2); // header plus one row
    }

    #[test]
    fn test_output_ranked_by_cost_then_name() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,A,400\n\
             2,Doe,Jane,C,600\n\
             3,Garcia,Maria,B,600\n"
        );

        let engine = process_csv_str(&csv);
        let output = output_str(&engine);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "drug_name,num_prescriber,total_cost");
        assert_eq!(lines[1], "B,1,600");
        assert_eq!(lines[2], "C,1,600");
        assert_eq!(lines[3], "A,1,400");
    }

    #[test]
    fn test_output_cost_text_is_exact() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DRUG1,100.10\n\
             2,Doe,Jane,DRUG1,200.20\n"
        );

        let engine = process_csv_str(&csv);
        let output = output_str(&engine);
        assert!(output.contains("DRUG1,2,300.30"));
    }

    #[test]
    fn test_header_only_input_yields_header_only_output() {
        let engine = process_csv_str(&format!("{HEADER}\n"));
        assert_eq!(output_str(&engine), "drug_name,num_prescriber,total_cost\n");
    }

    #[test]
    fn test_short_record_is_skipped_and_reported_once() {
        let skips = CollectSkips::default();
        let mut engine =
            ReportEngine::with_skip_log(ReportConfig::default(), Box::new(skips.clone()));

        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DRUG1\n\
             2,Doe,Jane,DRUG2,200\n"
        );
        engine.process_csv(Cursor::new(csv)).unwrap();

        let skipped = skips.0.borrow();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, 2);
        assert!(skipped[0].1.contains("expected 5 fields, found 4"));

        assert!(engine.summary("DRUG1").is_none());
        assert!(engine.summary("DRUG2").is_some());
    }

    #[test]
    fn test_bad_id_is_skipped_and_reported_once() {
        let skips = CollectSkips::default();
        let mut engine =
            ReportEngine::with_skip_log(ReportConfig::default(), Box::new(skips.clone()));

        let csv = format!(
            "{HEADER}\n\
             abc,Smith,John,DRUG1,100\n"
        );
        engine.process_csv(Cursor::new(csv)).unwrap();

        assert_eq!(skips.0.borrow().len(), 1);
        assert!(engine.summary("DRUG1").is_none());
    }

    #[test]
    fn test_empty_drug_name_fails_permissive_rule() {
        let skips = CollectSkips::default();
        let mut engine =
            ReportEngine::with_skip_log(ReportConfig::default(), Box::new(skips.clone()));

        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,,100\n"
        );
        engine.process_csv(Cursor::new(csv)).unwrap();

        let skipped = skips.0.borrow();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].1.contains("permissive"));

        let output = output_str(&engine);
        assert_eq!(output.lines().count(), 1); // header only
    }

    #[test]
    fn test_strict_rule_rejects_negative_cost() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DRUG1,-100\n\
             2,Doe,Jane,DRUG1,300\n"
        );

        let config = ReportConfig {
            rule: ValidationRule::Strict,
            ..ReportConfig::default()
        };
        let mut engine = ReportEngine::new(config);
        engine.process_csv(Cursor::new(csv)).unwrap();

        let summary = engine.summary("DRUG1").unwrap();
        assert_eq!(summary.total_cost().to_string(), "300");
        assert_eq!(summary.num_prescriber(), 1);
    }

    #[test]
    fn test_permissive_rule_keeps_negative_cost() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DRUG1,-100\n\
             2,Doe,Jane,DRUG1,300\n"
        );

        let engine = process_csv_str(&csv);
        assert_eq!(
            engine.summary("DRUG1").unwrap().total_cost().to_string(),
            "200"
        );
    }

    #[test]
    fn test_max_records_stops_the_pass() {
        let csv = format!(
            "{HEADER}\n\
             1,Smith,John,DRUG1,100\n\
             2,Doe,Jane,DRUG2,200\n\
             3,Garcia,Maria,DRUG3,300\n"
        );

        let config = ReportConfig {
            max_records: Some(2),
            ..ReportConfig::default()
        };
        let mut engine = ReportEngine::new(config);
        engine.process_csv(Cursor::new(csv)).unwrap();

        assert!(engine.summary("DRUG1").is_some());
        assert!(engine.summary("DRUG2").is_some());
        assert!(engine.summary("DRUG3").is_none());
    }

    #[test]
    fn test_whitespace_is_trimmed_before_conversion() {
        let csv = format!(
            "{HEADER}\n\
             1, Smith , John , ambien , 100\n\
             2,Garcia,Maria,AMBIEN,200\n"
        );

        let engine = process_csv_str(&csv);
        let summary = engine.summary("AMBIEN").unwrap();
        assert_eq!(summary.total_cost().to_string(), "300");
        assert_eq!(summary.num_prescriber(), 2);
    }

    #[test]
    fn test_rank_is_reproducible_across_insertion_orders() {
        let forward = format!(
            "{HEADER}\n\
             1,Smith,John,A,400\n\
             2,Doe,Jane,B,600\n\
             3,Garcia,Maria,C,600\n"
        );
        let reverse = format!(
            "{HEADER}\n\
             3,Garcia,Maria,C,600\n\
             2,Doe,Jane,B,600\n\
             1,Smith,John,A,400\n"
        );

        let a = output_str(&process_csv_str(&forward));
        let b = output_str(&process_csv_str(&reverse));
        assert_eq!(a, b);
    }
}
