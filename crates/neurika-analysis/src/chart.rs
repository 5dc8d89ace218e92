//! Chart specifications embedded in answers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chartType", rename_all = "lowercase")]
pub enum ChartSpec {
    Bar(CategoryChart),
    Line(CategoryChart),
    Pie(CategoryChart),
    Scatter(ScatterChart),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChart {
    pub title: String,
    pub data: Vec<CategoryPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterChart {
    pub title: String,
    pub data: Vec<ScatterPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar(c) | ChartSpec::Line(c) | ChartSpec::Pie(c) => &c.title,
            ChartSpec::Scatter(c) => &c.title,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Bar(c) | ChartSpec::Line(c) | ChartSpec::Pie(c) => c.data.is_empty(),
            ChartSpec::Scatter(c) => c.data.is_empty(),
        }
    }
}

/// First fenced ```` ```json ```` block in `text` that is a valid chart spec.
///
/// Blocks that are not JSON, or are JSON of another shape, are skipped.
pub fn extract_chart(text: &str) -> Option<ChartSpec> {
    json_blocks(text).find_map(|block| serde_json::from_str::<ChartSpec>(block).ok())
}

fn json_blocks(text: &str) -> impl Iterator<Item = &str> + '_ {
    const OPEN: &str = "```json";
    const CLOSE: &str = "```";

    let mut rest = text;
    std::iter::from_fn(move || {
        let start = rest.find(OPEN)? + OPEN.len();
        let body = &rest[start..];
        let end = body.find(CLOSE)?;
        rest = &body[end + CLOSE.len()..];
        Some(body[..end].trim())
    })
}
