//! Error types for the tripsheet library.
//!
//! Two distinct types reflect two distinct outcomes:
//!
//! * [`TripSheetError`] — **Fatal**: the run cannot produce a document at
//!   all (unreadable workbook, missing header, unwritable output). Returned
//!   as `Err(TripSheetError)` from every `generate*` entry point, and no
//!   output file is left behind.
//!
//! * [`FieldWarning`] — **Non-fatal**: a charge cell held text that could not
//!   be read as a number and was counted as zero. The record is still
//!   rendered; warnings are collected in
//!   [`crate::output::GenerationOutput`] for a post-run report.
//!
//! Every fatal variant is classified by [`TripSheetError::kind`] into one of
//! three coarse kinds, so callers can branch on "bad file", "bad header" or
//! "could not render" without matching every variant.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`TripSheetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The input cannot be parsed as tabular spreadsheet data.
    FileFormat,
    /// A required column header is missing.
    Schema,
    /// Page construction or the final document flush failed.
    Render,
}

/// All fatal errors returned by the tripsheet library.
#[derive(Debug, Error)]
pub enum TripSheetError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The workbook could not be opened or parsed.
    #[error("Cannot read spreadsheet '{path}': {detail}\nSave the file as .xlsx and try again.")]
    FileFormat { path: PathBuf, detail: String },

    /// The workbook contains no worksheet to read rows from.
    #[error("Spreadsheet '{path}' contains no worksheets")]
    NoWorksheet { path: PathBuf },

    /// One or more required header names are absent from the first row.
    #[error(
        "Spreadsheet '{path}' is missing required column(s): {}\n\
Header names are case-sensitive and must match exactly.",
        missing.join(", ")
    )]
    Schema { path: PathBuf, missing: Vec<String> },

    // ── Render errors ─────────────────────────────────────────────────────
    /// The watermark file exists but is not a decodable image.
    #[error("Watermark image '{path}' could not be decoded: {detail}")]
    WatermarkDecode { path: PathBuf, detail: String },

    /// Every row was filtered out; a document needs at least one page.
    #[error("No trip records to render: none of the {total_rows} data rows has a numeric SL NO")]
    NoRecords { total_rows: usize },

    /// A record's wrapped text makes its trip sheet taller than one page.
    #[error(
        "Trip sheet {sequence_no} (row {row}) does not fit on one page: it needs \
{needed_pt:.0}pt but only {available_pt:.0}pt are available.\n\
Shorten the longest values in that row and try again."
    )]
    PageOverflow {
        sequence_no: String,
        row: usize,
        needed_pt: f32,
        available_pt: f32,
    },

    /// The PDF serialiser rejected the page content.
    #[error("Failed to build PDF document: {0}")]
    Render(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TripSheetError {
    /// Classify this error into one of the three reported kinds.
    ///
    /// Configuration and internal failures surface as [`ErrorKind::Render`]:
    /// they stop the document from being built.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TripSheetError::FileFormat { .. } | TripSheetError::NoWorksheet { .. } => {
                ErrorKind::FileFormat
            }
            TripSheetError::Schema { .. } => ErrorKind::Schema,
            TripSheetError::WatermarkDecode { .. }
            | TripSheetError::NoRecords { .. }
            | TripSheetError::PageOverflow { .. }
            | TripSheetError::Render(_)
            | TripSheetError::OutputWriteFailed { .. }
            | TripSheetError::InvalidConfig(_)
            | TripSheetError::Internal(_) => ErrorKind::Render,
        }
    }
}

/// A non-fatal data-quality diagnostic for a single cell.
///
/// Produced when a non-blank charge cell could not be read as a number and
/// was counted as zero. The record is rendered regardless.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("Row {row}: column '{column}' value {raw:?} is not a number; counted as 0")]
pub struct FieldWarning {
    /// 1-based spreadsheet row number.
    pub row: usize,
    /// Header name of the offending column.
    pub column: String,
    /// The cell's text as found in the workbook.
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_display_lists_every_missing_header() {
        let e = TripSheetError::Schema {
            path: PathBuf::from("trips.xlsx"),
            missing: vec!["CAB TYPE".into(), "END LOACTION".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("CAB TYPE, END LOACTION"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::Schema);
    }

    #[test]
    fn no_worksheet_is_a_file_format_error() {
        let e = TripSheetError::NoWorksheet {
            path: PathBuf::from("empty.xlsx"),
        };
        assert_eq!(e.kind(), ErrorKind::FileFormat);
    }

    #[test]
    fn output_write_failure_is_a_render_error() {
        let e = TripSheetError::OutputWriteFailed {
            path: PathBuf::from("/nope/out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(e.kind(), ErrorKind::Render);
        assert!(e.to_string().contains("/nope/out.pdf"));
    }

    #[test]
    fn no_records_display() {
        let e = TripSheetError::NoRecords { total_rows: 4 };
        assert!(e.to_string().contains("4 data rows"));
        assert_eq!(e.kind(), ErrorKind::Render);
    }

    #[test]
    fn page_overflow_names_the_row() {
        let e = TripSheetError::PageOverflow {
            sequence_no: "12".into(),
            row: 14,
            needed_pt: 1010.4,
            available_pt: 768.5,
        };
        let msg = e.to_string();
        assert!(msg.contains("Trip sheet 12 (row 14)"), "got: {msg}");
        assert!(msg.contains("1010pt"));
        assert_eq!(e.kind(), ErrorKind::Render);
    }

    #[test]
    fn field_warning_display() {
        let w = FieldWarning {
            row: 7,
            column: "TOLL".into(),
            raw: "n/a".into(),
        };
        let msg = w.to_string();
        assert!(msg.contains("Row 7"));
        assert!(msg.contains("TOLL"));
        assert!(msg.contains("\"n/a\""));
    }
}
