//! Delimited-text parsing
//!
//! Splits raw uploaded text into a header and positional rows. Only the first
//! `max_rows` data rows are kept for profiling, but every data line is
//! counted in [`Dataset::total_rows`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of data rows retained for profiling
pub const DEFAULT_MAX_ROWS: usize = 100;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("Malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("max_rows must be at least 1")]
    InvalidMaxRows,
}

/// How a line is split into fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// RFC 4180 quoting: delimiters inside double quotes are kept
    #[default]
    Quoted,
    /// Split on every delimiter, then strip one pair of surrounding quotes
    Naive,
}

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub delimiter: u8,
    pub max_rows: usize,
    pub mode: SplitMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_rows: DEFAULT_MAX_ROWS,
            mode: SplitMode::Quoted,
        }
    }
}

impl ParseOptions {
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Parsed header plus the retained rows.
///
/// Every row has exactly `columns.len()` values: short rows are padded with
/// `""` and surplus fields are dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Data lines read, including those beyond `max_rows`
    pub total_rows: usize,
}

impl Dataset {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in the retained row `row`
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx)).map(String::as_str)
    }

    /// Iterate one column's values across the retained rows
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or(""))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Fewer than two non-empty lines: no header or no data
    NoData,
    Parsed(Dataset),
}

impl ParseOutcome {
    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            ParseOutcome::NoData => None,
            ParseOutcome::Parsed(dataset) => Some(dataset),
        }
    }
}

/// Parse delimited text into a [`Dataset`].
///
/// Blank lines are skipped. An input without a header line or without any
/// data line is [`ParseOutcome::NoData`], not an error.
pub fn parse(text: &str, options: &ParseOptions) -> Result<ParseOutcome, TabularError> {
    if options.max_rows == 0 {
        return Err(TabularError::InvalidMaxRows);
    }

    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let records = match options.mode {
        SplitMode::Quoted => quoted_records(text, options.delimiter)?,
        SplitMode::Naive => naive_records(text, options.delimiter),
    };

    let mut records = records.into_iter();
    let Some(header) = records.next() else {
        return Ok(ParseOutcome::NoData);
    };

    let columns: Vec<String> = header;
    let width = columns.len();
    let mut rows = Vec::with_capacity(options.max_rows.min(DEFAULT_MAX_ROWS));
    let mut total_rows = 0usize;

    for mut record in records {
        total_rows += 1;
        if rows.len() < options.max_rows {
            record.resize(width, String::new());
            rows.push(record);
        }
    }

    if total_rows == 0 {
        return Ok(ParseOutcome::NoData);
    }

    tracing::debug!(
        columns = width,
        total_rows,
        retained = rows.len(),
        "Parsed delimited text"
    );

    Ok(ParseOutcome::Parsed(Dataset {
        columns,
        rows,
        total_rows,
    }))
}

fn quoted_records(text: &str, delimiter: u8) -> Result<Vec<Vec<String>>, TabularError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty) && record.len() <= 1
}

fn naive_records(text: &str, delimiter: u8) -> Vec<Vec<String>> {
    let delimiter = char::from(delimiter);
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(delimiter).map(clean_naive_field).collect())
        .collect()
}

fn clean_naive_field(raw: &str) -> String {
    let field = raw.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    let field = field.strip_suffix('"').unwrap_or(field);
    field.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parsed(text: &str, options: &ParseOptions) -> Dataset {
        parse(text, options).unwrap().into_dataset().unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let ds = parsed("name, age\nalice,30\nbob,41\n", &ParseOptions::default());
        assert_eq!(ds.columns, vec!["name", "age"]);
        assert_eq!(ds.rows.len(), 2);
        assert_eq!(ds.total_rows, 2);
        assert_eq!(ds.value(1, "age"), Some("41"));
        assert_eq!(ds.value(0, "missing"), None);
    }

    #[test]
    fn test_header_only_is_no_data() {
        let outcome = parse("a,b,c\n", &ParseOptions::default()).unwrap();
        assert_eq!(outcome, ParseOutcome::NoData);
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert_eq!(parse("", &ParseOptions::default()).unwrap(), ParseOutcome::NoData);
        assert_eq!(
            parse("\n\n", &ParseOptions::default().with_mode(SplitMode::Naive)).unwrap(),
            ParseOutcome::NoData
        );
    }

    #[test]
    fn test_short_rows_are_padded_and_long_rows_truncated() {
        for mode in [SplitMode::Quoted, SplitMode::Naive] {
            let opts = ParseOptions::default().with_mode(mode);
            let ds = parsed("a,b,c\n1\n1,2,3,4\n", &opts);
            assert_eq!(ds.rows[0], vec!["1", "", ""]);
            assert_eq!(ds.rows[1], vec!["1", "2", "3"]);
        }
    }

    #[test]
    fn test_quoted_mode_keeps_commas_inside_quotes() {
        let ds = parsed(
            "city,amount\n\"Portland, OR\",12\n",
            &ParseOptions::default(),
        );
        assert_eq!(ds.value(0, "city"), Some("Portland, OR"));
        assert_eq!(ds.value(0, "amount"), Some("12"));
    }

    #[test]
    fn test_naive_mode_splits_inside_quotes() {
        let opts = ParseOptions::default().with_mode(SplitMode::Naive);
        let ds = parsed("city,amount\n\"Portland, OR\",12\n", &opts);
        assert_eq!(ds.rows[0], vec!["Portland", "OR"]);
    }

    #[test]
    fn test_naive_mode_strips_quotes_and_whitespace() {
        let opts = ParseOptions::default().with_mode(SplitMode::Naive);
        let ds = parsed("\"name\" , \"score\"\r\n \"ann\" , 7 \r\n", &opts);
        assert_eq!(ds.columns, vec!["name", "score"]);
        assert_eq!(ds.rows[0], vec!["ann", "7"]);
    }

    #[test]
    fn test_max_rows_caps_retained_but_counts_all() {
        let mut text = String::from("n\n");
        for i in 0..250 {
            text.push_str(&format!("{i}\n"));
        }
        let ds = parsed(&text, &ParseOptions::default());
        assert_eq!(ds.rows.len(), DEFAULT_MAX_ROWS);
        assert_eq!(ds.total_rows, 250);
        assert_eq!(ds.value(99, "n"), Some("99"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let ds = parsed("\u{feff}id,label\n1,x\n", &ParseOptions::default());
        assert_eq!(ds.columns[0], "id");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let ds = parsed("a,b\n\n1,2\n\n3,4\n", &ParseOptions::default());
        assert_eq!(ds.total_rows, 2);
    }

    #[test]
    fn test_zero_max_rows_rejected() {
        let opts = ParseOptions::default().with_max_rows(0);
        assert!(matches!(parse("a\n1\n", &opts), Err(TabularError::InvalidMaxRows)));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let opts = ParseOptions {
            delimiter: b';',
            ..ParseOptions::default()
        };
        let ds = parsed("a;b\n1;2\n", &opts);
        assert_eq!(ds.value(0, "b"), Some("2"));
    }
}
