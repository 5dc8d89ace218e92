//! Column profiling
//!
//! Classifies each column as numeric or categorical and computes summary
//! statistics over the retained rows of a [`Dataset`]. Everything here is
//! pure and deterministic.

use crate::tabular::Dataset;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// Number of `(value, count)` pairs kept for categorical columns
pub const TOP_VALUES: usize = 5;

/// Number of rows echoed back as a preview
pub const SAMPLE_ROWS: usize = 5;

// A column is numeric when numeric / non_empty > 7 / 10 (strictly).
const NUMERIC_RATIO_NUM: usize = 7;
const NUMERIC_RATIO_DEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric {
        min: f64,
        max: f64,
        mean: f64,
    },
    Categorical {
        top_values: Vec<ValueCount>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub non_empty_count: usize,
    pub missing_count: usize,
    /// Distinct parsed numbers for numeric columns, distinct raw strings otherwise
    pub unique_count: usize,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnProfile {
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Numeric { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub total_rows: usize,
    pub total_columns: usize,
    pub profiled_rows: usize,
    pub columns: Vec<ColumnProfile>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
}

impl DatasetProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Narrative summary handed to the completion provider as dataset context
    pub fn context_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "The dataset has {} rows and {} columns ({} rows profiled).",
            self.total_rows, self.total_columns, self.profiled_rows
        );

        if !self.numeric_columns.is_empty() {
            let _ = writeln!(out, "Numeric columns:");
            for column in self.columns.iter() {
                if let ColumnKind::Numeric { min, max, mean } = column.kind {
                    let _ = writeln!(
                        out,
                        "- {}: min {}, max {}, mean {:.2}, {} unique",
                        column.name,
                        format_number(min),
                        format_number(max),
                        mean,
                        column.unique_count
                    );
                }
            }
        }

        if !self.categorical_columns.is_empty() {
            let _ = writeln!(out, "Categorical columns:");
            for column in self.columns.iter() {
                if let ColumnKind::Categorical { top_values } = &column.kind {
                    let top = top_values
                        .iter()
                        .map(|vc| format!("{} ({})", vc.value, vc.count))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let _ = writeln!(
                        out,
                        "- {}: {} unique; top values: {}",
                        column.name, column.unique_count, top
                    );
                }
            }
        }

        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.missing_count > 0)
            .map(|c| format!("{} ({} missing)", c.name, c.missing_count))
            .collect();
        if !missing.is_empty() {
            let _ = writeln!(out, "Columns with missing values: {}", missing.join(", "));
        }

        out
    }
}

/// Result of profiling an upload, as exposed by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "profile", rename_all = "snake_case")]
pub enum DatasetOverview {
    NoData,
    Ready(DatasetProfile),
}

/// Profile every column of `dataset`, preserving header order
pub fn profile(dataset: &Dataset) -> DatasetProfile {
    let columns: Vec<ColumnProfile> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| profile_column(name, dataset.column_values(idx), dataset.rows.len()))
        .collect();

    let (numeric_columns, categorical_columns): (Vec<_>, Vec<_>) =
        columns.iter().partition(|c| c.is_numeric());

    DatasetProfile {
        total_rows: dataset.total_rows,
        total_columns: dataset.columns.len(),
        profiled_rows: dataset.rows.len(),
        numeric_columns: numeric_columns.into_iter().map(|c| c.name.clone()).collect(),
        categorical_columns: categorical_columns
            .into_iter()
            .map(|c| c.name.clone())
            .collect(),
        sample_rows: dataset.rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        columns,
    }
}

fn profile_column<'a>(
    name: &str,
    values: impl Iterator<Item = &'a str>,
    row_count: usize,
) -> ColumnProfile {
    let non_empty: Vec<&str> = values.filter(|v| !v.is_empty()).collect();
    let numbers: Vec<f64> = non_empty.iter().filter_map(|v| parse_number(v)).collect();

    let missing_count = row_count.saturating_sub(non_empty.len());

    if is_numeric_ratio(numbers.len(), non_empty.len()) {
        let (min, max, mean) = numeric_stats(&numbers);
        let unique: HashSet<u64> = numbers.iter().map(|n| canonical_bits(*n)).collect();
        return ColumnProfile {
            name: name.to_string(),
            non_empty_count: non_empty.len(),
            missing_count,
            unique_count: unique.len(),
            kind: ColumnKind::Numeric { min, max, mean },
        };
    }

    let unique: HashSet<&str> = non_empty.iter().copied().collect();
    ColumnProfile {
        name: name.to_string(),
        non_empty_count: non_empty.len(),
        missing_count,
        unique_count: unique.len(),
        kind: ColumnKind::Categorical {
            top_values: top_values(&non_empty),
        },
    }
}

fn is_numeric_ratio(numeric: usize, non_empty: usize) -> bool {
    non_empty > 0 && numeric * NUMERIC_RATIO_DEN > non_empty * NUMERIC_RATIO_NUM
}

/// Finite decimal numbers only; `NaN` and `inf` spellings are text.
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn canonical_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

/// Caller guarantees `numbers` is non-empty.
fn numeric_stats(numbers: &[f64]) -> (f64, f64, f64) {
    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
    // Summation rounding can push the mean just outside the observed range.
    (min, max, mean.clamp(min, max))
}

fn top_values(values: &[&str]) -> Vec<ValueCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut ranked: Vec<ValueCount> = order
        .into_iter()
        .map(|value| ValueCount {
            value: value.to_string(),
            count: counts.get(value).copied().unwrap_or(0),
        })
        .collect();
    // Stable: ties keep first-encountered order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_VALUES);
    ranked
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
