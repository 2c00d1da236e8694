//! Input loading: read the first worksheet of a workbook into trip records.
//!
//! The first row of the sheet's used range is the header row. Every other
//! row becomes a [`TripRecord`] if, and only if, its `SL NO` cell is a plain
//! run of digits; blank separator rows, subtotal rows and notes typed into
//! the sheet are skipped without aborting the load.

use crate::error::{FieldWarning, TripSheetError};
use crate::output::SheetSummary;
use crate::pipeline::cell::{cell_text, coerce_charge, is_sequence_number};
use crate::pipeline::metrics::unencodable_chars;
use crate::record::{Field, TripRecord, PARKING_HEADER, TOLL_HEADER};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything read from one workbook.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    /// Valid records, in spreadsheet order.
    pub records: Vec<TripRecord>,
    pub summary: SheetSummary,
    /// Charge cells that were counted as zero.
    pub warnings: Vec<FieldWarning>,
}

/// Column positions of the headers we read, resolved once per sheet.
#[derive(Debug, Clone)]
struct ColumnMap {
    fields: [usize; Field::ALL.len()],
    parking: Option<usize>,
    toll: Option<usize>,
}

impl ColumnMap {
    /// Locate every required header; the first occurrence of a name wins.
    fn resolve(headers: &[String], path: &Path) -> Result<Self, TripSheetError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let mut fields = [0usize; Field::ALL.len()];
        let mut missing = Vec::new();
        for (slot, field) in fields.iter_mut().zip(Field::ALL) {
            match find(field.header()) {
                Some(idx) => *slot = idx,
                None => missing.push(field.header().to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(TripSheetError::Schema {
                path: path.to_path_buf(),
                missing,
            });
        }

        Ok(Self {
            fields,
            parking: find(PARKING_HEADER),
            toll: find(TOLL_HEADER),
        })
    }

    fn cell<'a>(&self, row: &'a [Data], field: Field) -> Option<&'a Data> {
        let idx = Field::ALL.iter().position(|f| *f == field)?;
        row.get(self.fields[idx])
    }
}

/// Load and filter the trip records of a workbook.
///
/// # Errors
/// - [`TripSheetError::FileFormat`] if the file cannot be opened or parsed
/// - [`TripSheetError::NoWorksheet`] if the workbook has no sheets
/// - [`TripSheetError::Schema`] if a required header is absent
pub fn load_sheet(path: &Path) -> Result<LoadedSheet, TripSheetError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| TripSheetError::FileFormat {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TripSheetError::NoWorksheet {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TripSheetError::FileFormat {
            path: path.to_path_buf(),
            detail: format!("sheet '{sheet_name}': {e}"),
        })?;
    debug!("Reading sheet '{}' ({:?} cells)", sheet_name, range.get_size());

    // Spreadsheet row numbers are 1-based and absolute, so offset by where
    // the used range begins.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(|c| cell_text(Some(c))).collect())
        .unwrap_or_default();
    let columns = ColumnMap::resolve(&headers, path)?;

    let mut records = Vec::new();
    let mut skipped_rows = Vec::new();
    let mut warnings = Vec::new();
    let mut total_rows = 0usize;

    for (offset, row) in rows.enumerate() {
        total_rows += 1;
        let row_number = first_row + offset + 2;

        let sequence_no = cell_text(columns.cell(row, Field::SequenceNo));
        if !is_sequence_number(&sequence_no) {
            debug!("Skipping row {}: SL NO {:?} is not numeric", row_number, sequence_no);
            skipped_rows.push(row_number);
            continue;
        }

        let mut record = TripRecord {
            row: row_number,
            ..Default::default()
        };
        for field in Field::ALL {
            *record.text_mut(field) = cell_text(columns.cell(row, field));
        }
        record.sequence_no = sequence_no.trim().to_string();

        record.parking = read_charge(row, columns.parking, PARKING_HEADER, row_number, &mut warnings);
        record.toll = read_charge(row, columns.toll, TOLL_HEADER, row_number, &mut warnings);

        report_unencodable(&record);
        records.push(record);
    }

    info!(
        "Loaded {} trip records from '{}' ({} of {} rows skipped)",
        records.len(),
        path.display(),
        skipped_rows.len(),
        total_rows
    );

    let summary = SheetSummary {
        path: path.display().to_string(),
        sheet_name,
        headers,
        total_rows,
        valid_records: records.len(),
        skipped_rows,
        has_parking_column: columns.parking.is_some(),
        has_toll_column: columns.toll.is_some(),
    };

    Ok(LoadedSheet {
        records,
        summary,
        warnings,
    })
}

/// Coerce one charge cell, recording a warning when text had to be dropped.
fn read_charge(
    row: &[Data],
    column: Option<usize>,
    header: &str,
    row_number: usize,
    warnings: &mut Vec<FieldWarning>,
) -> f64 {
    let coerced = coerce_charge(column.and_then(|idx| row.get(idx)));
    if let Some(raw) = coerced.defaulted_from {
        let warning = FieldWarning {
            row: row_number,
            column: header.to_string(),
            raw,
        };
        warn!("{}", warning);
        warnings.push(warning);
    }
    coerced.value
}

/// Log each value holding characters the built-in fonts cannot print.
/// Returns how many values were logged.
fn report_unencodable(record: &TripRecord) -> usize {
    let mut reported = 0;
    for field in Field::ALL {
        let text = record.text(field);
        let missing = unencodable_chars(text);
        if missing.is_empty() {
            continue;
        }
        warn!(
            "Row {}: column '{}' value {:?} contains {} which the built-in font cannot print; \
             it will not appear as typed",
            record.row,
            field.header(),
            text,
            missing.iter().map(|c| format!("{c:?}")).collect::<Vec<_>>().join(", ")
        );
        reported += 1;
    }
    reported
}
