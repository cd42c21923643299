use serde::{Deserialize, Serialize};

/// Representation requested from the diff endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffFormat {
    Unified,
    SideBySide,
    Html,
}

impl DiffFormat {
    pub fn as_query(&self) -> &'static str {
        match self {
            DiffFormat::Unified => "unified",
            DiffFormat::SideBySide => "side-by-side",
            DiffFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

impl std::str::FromStr for DiffFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unified" => Ok(DiffFormat::Unified),
            "side-by-side" | "side_by_side" | "split" => Ok(DiffFormat::SideBySide),
            "html" => Ok(DiffFormat::Html),
            other => Err(format!("Unknown diff format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Unchanged,
    Added,
    Deleted,
}

/// One row of a side-by-side column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffLine {
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SideBySideDiff {
    #[serde(default)]
    pub old_lines: Vec<DiffLine>,
    #[serde(default)]
    pub new_lines: Vec<DiffLine>,
}

/// Payload of the diff endpoint; which field is populated depends on the
/// requested format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiffResponse {
    #[serde(default)]
    pub pull_request_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub unified_diff: Option<String>,
    #[serde(default)]
    pub side_by_side_diff: Option<SideBySideDiff>,
    #[serde(default)]
    pub html_diff: Option<String>,
}
