//! Analytical benchmark report table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A benchmark passes when the solver is within this many percent of the analytical value.
pub const PASS_THRESHOLD_PERCENT: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkRow {
    pub name: String,
    pub analytical: f64,
    pub solver: f64,
    pub percent_error: f64,
    pub pass: bool,
}

impl BenchmarkRow {
    pub fn new(name: impl Into<String>, analytical: f64, solver: f64) -> Self {
        let percent_error = if analytical == 0.0 {
            100.0 * solver.abs()
        } else {
            100.0 * ((solver - analytical) / analytical).abs()
        };
        Self {
            name: name.into(),
            analytical,
            solver,
            percent_error,
            pass: percent_error.is_finite() && percent_error <= PASS_THRESHOLD_PERCENT,
        }
    }

    /// A benchmark whose solver run failed outright.
    pub fn failed(name: impl Into<String>, analytical: f64) -> Self {
        Self {
            name: name.into(),
            analytical,
            solver: f64::NAN,
            percent_error: f64::NAN,
            pass: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkTable {
    pub rows: Vec<BenchmarkRow>,
}

impl BenchmarkTable {
    pub fn push(&mut self, row: BenchmarkRow) {
        self.rows.push(row);
    }

    pub fn all_pass(&self) -> bool {
        self.rows.iter().all(|r| r.pass)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BenchmarkRow> {
        self.rows.iter().filter(|r| !r.pass)
    }
}

impl fmt::Display for BenchmarkTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.name.len())
            .max()
            .unwrap_or(0)
            .max("benchmark".len());
        writeln!(
            f,
            "{:<width$}  {:>14}  {:>14}  {:>13}  {}",
            "benchmark", "analytical", "solver", "percent_error", "pass"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<width$}  {:>14.6}  {:>14.6}  {:>13.5}  {}",
                r.name,
                r.analytical,
                r.solver,
                r.percent_error,
                if r.pass { "PASS" } else { "FAIL" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive_at_one_tenth_percent() {
        assert!(BenchmarkRow::new("ok", 1000.0, 1000.9).pass);
        assert!(!BenchmarkRow::new("bad", 1000.0, 1001.1).pass);
    }

    #[test]
    fn failed_run_never_passes() {
        let mut table = BenchmarkTable::default();
        table.push(BenchmarkRow::new("ok", 210.0, 210.0));
        table.push(BenchmarkRow::failed("crashed", 300.0));
        assert!(!table.all_pass());
        assert_eq!(table.failures().count(), 1);

        let text = table.to_string();
        assert!(text.starts_with("benchmark"));
        assert!(text.contains("FAIL"));
    }
}
