//! Neurika Analysis Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pure, synchronous building blocks behind question answering:
//!
//! - **Tabular parsing** ([`tabular`]): header + positional rows from delimited text
//! - **Profiling** ([`profile`]): numeric vs categorical columns and their statistics
//! - **Routing** ([`router`]): keyword rules mapping a question to an answer category
//! - **Formatting** ([`formatter`]): structured view model for metric-style answers
//! - **Overrides** ([`overrides`]): predefined answers matched by keyword
//! - **Charts** ([`chart`]): chart specs embedded in answers
//!
//! # Example
//!
//! ```
//! use neurika_analysis::{profile, tabular};
//!
//! let text = "region,revenue\nEast,600\nWest,634.56\n";
//! let dataset = tabular::parse(text, &tabular::ParseOptions::default())
//!     .unwrap()
//!     .into_dataset()
//!     .unwrap();
//! let profile = profile::profile(&dataset);
//! assert_eq!(profile.numeric_columns, vec!["revenue"]);
//! ```

pub mod chart;
pub mod formatter;
pub mod overrides;
pub mod profile;
pub mod router;
pub mod tabular;

pub use chart::{extract_chart, ChartSpec};
pub use formatter::{FormattedResponse, ResponseFormatter};
pub use overrides::{find_override, OverrideRule};
pub use profile::{DatasetOverview, DatasetProfile};
pub use router::{classify, classify_with_reason};
pub use tabular::{Dataset, ParseOptions, ParseOutcome, SplitMode};

/// Parse and profile in one step
pub fn overview(text: &str, options: &ParseOptions) -> Result<DatasetOverview, tabular::TabularError> {
    Ok(match tabular::parse(text, options)? {
        ParseOutcome::NoData => DatasetOverview::NoData,
        ParseOutcome::Parsed(dataset) => DatasetOverview::Ready(profile::profile(&dataset)),
    })
}
