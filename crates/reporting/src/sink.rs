//! Visualization sinks. The only contract with a plotting consumer is a set of
//! equal-length numeric series, one per option.

use abtest_core::{AbTestError, AbTestResult, ExperimentReport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSeries {
    pub label: String,
    pub true_rate: f64,
    /// Estimate after each iteration, iteration 1 first.
    pub values: Vec<f64>,
}

/// Consumer of per-option estimate histories.
pub trait HistorySink {
    fn consume(&mut self, series: &[OptionSeries]) -> AbTestResult<()>;
}

pub fn series_from_report(report: &ExperimentReport) -> Vec<OptionSeries> {
    report
        .options
        .iter()
        .map(|o| OptionSeries {
            label: format!("Option {} (true rate {})", o.index + 1, o.true_rate),
            true_rate: o.true_rate,
            values: o.history.clone(),
        })
        .collect()
}

fn check_equal_lengths(series: &[OptionSeries]) -> AbTestResult<usize> {
    let len = series.first().map(|s| s.values.len()).unwrap_or(0);
    if let Some(bad) = series.iter().find(|s| s.values.len() != len) {
        return Err(AbTestError::Internal(anyhow::anyhow!(
            "series '{}' has {} points, expected {}",
            bad.label,
            bad.values.len(),
            len
        )));
    }
    Ok(len)
}

// ─── CSV ────────────────────────────────────────────────────────────────────

/// One `iteration` column (1-based) followed by one column per series.
pub fn render_csv(series: &[OptionSeries]) -> AbTestResult<String> {
    let len = check_equal_lengths(series)?;

    let mut header = vec!["iteration".to_string()];
    header.extend(
        series
            .iter()
            .map(|s| format!("\"{}\"", s.label.replace('"', "\"\""))),
    );
    let mut csv = header.join(",");
    csv.push('\n');

    for i in 0..len {
        let mut cells = Vec::with_capacity(series.len() + 1);
        cells.push((i + 1).to_string());
        cells.extend(series.iter().map(|s| s.values[i].to_string()));
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
    Ok(csv)
}

pub struct CsvHistorySink {
    path: PathBuf,
}

impl CsvHistorySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistorySink for CsvHistorySink {
    fn consume(&mut self, series: &[OptionSeries]) -> AbTestResult<()> {
        let csv = render_csv(series)?;
        std::fs::write(&self.path, csv)?;
        info!(path = %self.path.display(), series = series.len(), "Wrote history CSV");
        Ok(())
    }
}

// ─── JSON ───────────────────────────────────────────────────────────────────

pub struct JsonHistorySink {
    path: PathBuf,
}

impl JsonHistorySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistorySink for JsonHistorySink {
    fn consume(&mut self, series: &[OptionSeries]) -> AbTestResult<()> {
        check_equal_lengths(series)?;
        let json = serde_json::to_string_pretty(series)?;
        std::fs::write(&self.path, json)?;
        info!(path = %self.path.display(), series = series.len(), "Wrote history JSON");
        Ok(())
    }
}

/// Writes the whole report, counters included, as pretty JSON.
pub fn write_report_json(report: &ExperimentReport, path: &Path) -> AbTestResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Wrote experiment report");
    Ok(())
}

// ─── In-memory ──────────────────────────────────────────────────────────────

/// Keeps everything it is given; handy for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub received: Vec<Vec<OptionSeries>>,
}

impl HistorySink for MemorySink {
    fn consume(&mut self, series: &[OptionSeries]) -> AbTestResult<()> {
        check_equal_lengths(series)?;
        self.received.push(series.to_vec());
        Ok(())
    }
}
