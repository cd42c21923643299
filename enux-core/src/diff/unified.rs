use serde::{Deserialize, Serialize};

/// Styling class of one unified diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnifiedLineKind {
    FileHeader,
    HunkHeader,
    Addition,
    Deletion,
    Context,
}

/// Classify a line by its leading token. File headers win over single
/// `+`/`-` so `+++ b/file` is never counted as an addition.
pub fn classify_line(line: &str) -> UnifiedLineKind {
    if line.starts_with("---") || line.starts_with("+++") {
        UnifiedLineKind::FileHeader
    } else if line.starts_with("@@") {
        UnifiedLineKind::HunkHeader
    } else if line.starts_with('+') {
        UnifiedLineKind::Addition
    } else if line.starts_with('-') {
        UnifiedLineKind::Deletion
    } else {
        UnifiedLineKind::Context
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedLine {
    pub kind: UnifiedLineKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn from_unified(diff: &str) -> Self {
        diff.lines()
            .fold(DiffStats::default(), |mut stats, line| {
                match classify_line(line) {
                    UnifiedLineKind::Addition => stats.additions += 1,
                    UnifiedLineKind::Deletion => stats.deletions += 1,
                    _ => {}
                }
                stats
            })
    }

    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

impl std::fmt::Display for DiffStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "+{} -{}", self.additions, self.deletions)
    }
}

pub fn unified_lines(diff: &str) -> Vec<UnifiedLine> {
    diff.lines()
        .map(|line| UnifiedLine {
            kind: classify_line(line),
            text: line.to_string(),
        })
        .collect()
}
