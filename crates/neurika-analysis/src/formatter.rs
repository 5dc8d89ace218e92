//! Answer formatting
//!
//! Turns the semi-structured markdown some answers use into a view model.
//! Anything without a `**Total` or `**Average` metric line passes through
//! verbatim as [`FormattedResponse::Markdown`].
//!
//! Recognised layout:
//!
//! ```text
//! 📊 Revenue Overview
//! **Total Revenue**: $1,234.56
//! **Breakdown by Region**
//! - East: $600.00 (48.6%)
//! - West: $634.56 (51.4%)
//! **Key Insights**
//! - West leads slightly
//! **Recommendations**
//! - Expand the West sales team
//! ```

use regex::Regex;
use serde::Serialize;

const METRIC_MARKERS: [&str; 2] = ["**Total", "**Average"];
const BREAKDOWN_HEADER: &str = "**Breakdown by";
const INSIGHTS_HEADER: &str = "**Key Insights";
const RECOMMENDATIONS_HEADER: &str = "**Recommendations";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum FormattedResponse {
    Markdown(String),
    Structured(StructuredResponse),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StructuredResponse {
    pub title: String,
    pub metric: Option<Metric>,
    pub breakdown_dimension: Option<String>,
    pub breakdown: Vec<BreakdownRow>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    /// Lines that fit no section or bullet shape, kept in order
    pub unparsed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub value: String,
    pub percentage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Breakdown,
    Insights,
    Recommendations,
}

impl Section {
    fn of_header(line: &str) -> Option<Self> {
        if line.contains(BREAKDOWN_HEADER) {
            Some(Section::Breakdown)
        } else if line.contains(INSIGHTS_HEADER) {
            Some(Section::Insights)
        } else if line.contains(RECOMMENDATIONS_HEADER) {
            Some(Section::Recommendations)
        } else {
            None
        }
    }
}

/// Compiled patterns for [`ResponseFormatter::format_response`].
///
/// Build once and share; formatting itself never fails.
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    metric: Regex,
    dimension: Regex,
    bullet: Regex,
    breakdown_row: Regex,
}

impl ResponseFormatter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            metric: Regex::new(r"\*\*((?:Total|Average)[^*:]*):?\*\*:?\s*(.+?)\s*$")?,
            dimension: Regex::new(r"\*\*Breakdown by\s+([^*:]+?)\s*:?\*\*")?,
            bullet: Regex::new(r"^(?:[-•]|\*\s|\d+\.\s)\s*(.+?)\s*$")?,
            breakdown_row: Regex::new(
                r"^(.+?):\s*(.+?)\s*(?:\((\d+(?:\.\d+)?\s?%)[^)]*\))?$",
            )?,
        })
    }

    pub fn format_response(&self, text: &str) -> FormattedResponse {
        if !METRIC_MARKERS.iter().any(|m| text.contains(m)) {
            return FormattedResponse::Markdown(text.to_string());
        }
        FormattedResponse::Structured(self.parse_structured(text))
    }

    fn parse_structured(&self, text: &str) -> StructuredResponse {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut out = StructuredResponse::default();
        let mut body = lines.as_slice();

        // The first line is the title unless the answer opens with a metric or header.
        if let Some((first, rest)) = lines.split_first() {
            let is_title = !METRIC_MARKERS.iter().any(|m| first.contains(m))
                && Section::of_header(first).is_none();
            if is_title {
                out.title = clean_title(first);
                body = rest;
            }
        }

        let mut current: Option<Section> = None;
        for line in body {
            if out.metric.is_none() && METRIC_MARKERS.iter().any(|m| line.contains(m)) {
                match self.metric.captures(line) {
                    Some(caps) => {
                        out.metric = Some(Metric {
                            label: caps[1].trim().to_string(),
                            value: caps[2].to_string(),
                        })
                    },
                    None => out.unparsed.push(line.to_string()),
                }
                continue;
            }

            if let Some(section) = Section::of_header(line) {
                if section == Section::Breakdown && out.breakdown_dimension.is_none() {
                    out.breakdown_dimension = self
                        .dimension
                        .captures(line)
                        .map(|caps| caps[1].trim().to_string());
                }
                current = Some(section);
                continue;
            }

            let Some(section) = current else {
                out.unparsed.push(line.to_string());
                continue;
            };

            let Some(item) = self.bullet.captures(line).map(|c| c[1].to_string()) else {
                out.unparsed.push(line.to_string());
                continue;
            };

            match section {
                Section::Breakdown => match self.breakdown_row(&item) {
                    Some(row) => out.breakdown.push(row),
                    None => out.unparsed.push(line.to_string()),
                },
                Section::Insights => out.insights.push(item),
                Section::Recommendations => out.recommendations.push(item),
            }
        }

        out
    }

    fn breakdown_row(&self, item: &str) -> Option<BreakdownRow> {
        let caps = self.breakdown_row.captures(item)?;
        Some(BreakdownRow {
            label: strip_emphasis(caps[1].trim()),
            value: caps[2].trim().to_string(),
            percentage: caps.get(3).map(|m| m.as_str().replace(' ', "")),
        })
    }
}

fn clean_title(line: &str) -> String {
    let title = line.trim_start_matches('📊').trim_start_matches('#').trim();
    strip_emphasis(title)
}

fn strip_emphasis(s: &str) -> String {
    s.trim_matches('*').trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn structured(text: &str) -> StructuredResponse {
        match ResponseFormatter::new().unwrap().format_response(text) {
            FormattedResponse::Structured(s) => s,
            FormattedResponse::Markdown(_) => panic!("expected structured response"),
        }
    }

    const REVENUE: &str = "📊 Revenue Overview
**Total Revenue**: $1,234.56

**Breakdown by Region**
- East: $600.00 (48.6%)
- West: $634.56 (51.4%)

**Key Insights**
- West leads slightly
- East is steady

**Recommendations**
- Expand the West sales team
";

    #[test]
    fn test_plain_text_passes_through_verbatim() {
        let text = "The dataset has **three** regions.\n\n- East\n- West\n";
        let formatted = ResponseFormatter::new().unwrap().format_response(text);
        assert_eq!(formatted, FormattedResponse::Markdown(text.to_string()));
    }

    #[test]
    fn test_full_structured_answer() {
        let s = structured(REVENUE);
        assert_eq!(s.title, "Revenue Overview");
        assert_eq!(
            s.metric,
            Some(Metric {
                label: "Total Revenue".into(),
                value: "$1,234.56".into()
            })
        );
        assert_eq!(s.breakdown_dimension.as_deref(), Some("Region"));
        assert_eq!(
            s.breakdown,
            vec![
                BreakdownRow {
                    label: "East".into(),
                    value: "$600.00".into(),
                    percentage: Some("48.6%".into()),
                },
                BreakdownRow {
                    label: "West".into(),
                    value: "$634.56".into(),
                    percentage: Some("51.4%".into()),
                },
            ]
        );
        assert_eq!(s.insights, vec!["West leads slightly", "East is steady"]);
        assert_eq!(s.recommendations, vec!["Expand the West sales team"]);
        assert!(s.unparsed.is_empty());
    }

    #[test]
    fn test_average_metric_with_colon_inside_bold() {
        let s = structured("Order size\n**Average Order Value:** 42.10 units\n");
        assert_eq!(
            s.metric,
            Some(Metric {
                label: "Average Order Value".into(),
                value: "42.10 units".into()
            })
        );
        assert!(s.breakdown.is_empty());
        assert!(s.insights.is_empty());
    }

    #[test]
    fn test_sections_bounded_by_next_header_in_any_order() {
        let text = "Stock\n**Total Units**: 90\n**Recommendations**\n- Reorder widgets\n**Key Insights**\n- Widgets sell fastest\n";
        let s = structured(text);
        assert_eq!(s.recommendations, vec!["Reorder widgets"]);
        assert_eq!(s.insights, vec!["Widgets sell fastest"]);
    }

    #[test]
    fn test_breakdown_without_percentage_and_long_suffix() {
        let text = "Inv\n**Total Value**: $10\n**Breakdown by Condition**\n- New: $7.00 (70.0% of total)\n- Used: $3.00\n";
        let s = structured(text);
        assert_eq!(s.breakdown[0].percentage.as_deref(), Some("70.0%"));
        assert_eq!(s.breakdown[1].value, "$3.00");
        assert_eq!(s.breakdown[1].percentage, None);
    }

    #[test]
    fn test_malformed_breakdown_lines_are_kept() {
        let text = "Inv\n**Total Value**: $10\n**Breakdown by Condition**\n- no separator here\nfree text line\n- Good: $1.00\n";
        let s = structured(text);
        assert_eq!(s.breakdown.len(), 1);
        assert_eq!(s.unparsed, vec!["- no separator here", "free text line"]);
    }

    #[test]
    fn test_lines_outside_sections_are_kept() {
        let text = "Report\n**Total Revenue**\n$1,234.56\nRevenue is up on last quarter.\n**Key Insights**\n- West leads\n";
        let s = structured(text);
        assert_eq!(s.title, "Report");
        assert_eq!(s.metric, None);
        assert_eq!(
            s.unparsed,
            vec!["**Total Revenue**", "$1,234.56", "Revenue is up on last quarter."]
        );
        assert_eq!(s.insights, vec!["West leads"]);
    }

    #[test]
    fn test_header_with_trailing_text_on_same_line() {
        let text = "Inv\n**Total Value**: $10\n**Key Insights**:\n* Asterisk bullets work\n";
        let s = structured(text);
        assert_eq!(s.insights, vec!["Asterisk bullets work"]);
    }

    #[test]
    fn test_answer_opening_with_metric_has_no_title() {
        let s = structured("**Total Orders**: 311\n**Key Insights**\n- Orders peak on Fridays\n");
        assert_eq!(s.title, "");
        assert_eq!(s.metric.unwrap().value, "311");
        assert_eq!(s.insights.len(), 1);
    }

    #[test]
    fn test_structured_serializes_with_kind_tag() {
        let formatted = ResponseFormatter::new().unwrap().format_response(REVENUE);
        let json = serde_json::to_value(&formatted).unwrap();
        assert_eq!(json["kind"], "structured");
        assert_eq!(json["content"]["breakdown"][0]["label"], "East");
    }
}
