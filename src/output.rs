//! Result types returned by the generation entry points.

use crate::error::FieldWarning;
use crate::pipeline::layout::PageContent;
use serde::{Deserialize, Serialize};

/// Everything produced by one generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// The finished PDF.
    pub pdf: Vec<u8>,
    /// Laid-out pages, one per record, in input order.
    pub pages: Vec<PageContent>,
    /// What was read from the spreadsheet.
    pub summary: SheetSummary,
    pub stats: GenerationStats,
    /// Non-fatal diagnostics; the run still succeeded.
    pub warnings: Vec<FieldWarning>,
}

/// Counters and timings for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Data rows below the header row.
    pub total_rows: usize,
    /// Pages in the output, one per valid record.
    pub pages: usize,
    /// Rows skipped because `SL NO` was not numeric.
    pub skipped_rows: usize,
    /// Charge cells counted as zero.
    pub warnings: usize,
    /// Whether a watermark was painted.
    pub watermarked: bool,
    /// Size of the PDF in bytes.
    pub bytes: usize,
    pub load_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// What a spreadsheet contains, without rendering anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub path: String,
    /// Name of the worksheet that was read (always the first).
    pub sheet_name: String,
    /// Header row as text, in column order.
    pub headers: Vec<String>,
    pub total_rows: usize,
    pub valid_records: usize,
    /// 1-based spreadsheet row numbers that were skipped.
    pub skipped_rows: Vec<usize>,
    pub has_parking_column: bool,
    pub has_toll_column: bool,
}
