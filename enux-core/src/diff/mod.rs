//! Presentation of backend-computed diffs.
//!
//! No diffing happens here. The backend supplies unified text, an optional
//! side-by-side structure, and an optional HTML fragment; this module
//! classifies, counts, and lays them out.

mod render;
mod unified;
mod viewer;

pub use render::{
    render_html, render_side_by_side, render_unified, DiffTab, DiffView, SideBySideView,
    HTML_UNAVAILABLE, SIDE_BY_SIDE_UNAVAILABLE,
};
pub use unified::{classify_line, unified_lines, DiffStats, UnifiedLine, UnifiedLineKind};
pub use viewer::{ApiDiffSource, DiffSource, DiffViewer};
