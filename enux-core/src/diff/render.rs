use serde::Serialize;

use super::unified::{unified_lines, UnifiedLine};
use crate::models::{DiffLine, SideBySideDiff};

pub const SIDE_BY_SIDE_UNAVAILABLE: &str = "Side-by-side diff not available";
pub const HTML_UNAVAILABLE: &str = "HTML diff not available";

/// Which representation of a diff is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DiffTab {
    #[default]
    Unified,
    SideBySide,
    Html,
}

impl std::fmt::Display for DiffTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffTab::Unified => write!(f, "Unified"),
            DiffTab::SideBySide => write!(f, "Side by Side"),
            DiffTab::Html => write!(f, "HTML"),
        }
    }
}

/// Content ready for display, or the placeholder to show instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DiffView {
    Unified(Vec<UnifiedLine>),
    SideBySide(SideBySideView),
    /// Trusted markup from the backend, passed through unchanged.
    Html(String),
    Unavailable(&'static str),
}

impl DiffView {
    pub fn is_available(&self) -> bool {
        !matches!(self, DiffView::Unavailable(_))
    }
}

/// Original and modified columns of a side-by-side diff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideBySideView {
    pub original: Vec<DiffLine>,
    pub modified: Vec<DiffLine>,
}

impl SideBySideView {
    /// Pair the columns row by row; the shorter column is padded with `None`.
    pub fn rows(&self) -> impl Iterator<Item = (Option<&DiffLine>, Option<&DiffLine>)> {
        let len = self.original.len().max(self.modified.len());
        (0..len).map(move |i| (self.original.get(i), self.modified.get(i)))
    }
}

pub fn render_unified(diff: &str) -> DiffView {
    DiffView::Unified(unified_lines(diff))
}

pub fn render_side_by_side(diff: Option<&SideBySideDiff>) -> DiffView {
    match diff {
        Some(diff) => DiffView::SideBySide(SideBySideView {
            original: diff.old_lines.clone(),
            modified: diff.new_lines.clone(),
        }),
        None => DiffView::Unavailable(SIDE_BY_SIDE_UNAVAILABLE),
    }
}

pub fn render_html(html: Option<&str>) -> DiffView {
    match html {
        Some(html) if !html.trim().is_empty() => DiffView::Html(html.to_string()),
        _ => DiffView::Unavailable(HTML_UNAVAILABLE),
    }
}
