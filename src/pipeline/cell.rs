//! Cell values: rendering to text and numeric coercion.
//!
//! Both operations are total. A cell never fails to render (the worst case
//! is an empty string) and a charge never fails to coerce (the worst case is
//! zero). Booking spreadsheets are maintained by hand, so blanks, stray text
//! and error cells are expected input rather than exceptional.

use calamine::{Data, ExcelDateTime};
use chrono::Timelike;

/// Render a cell as the text printed on a trip sheet.
///
/// A missing, empty or error cell renders as `""`.
pub fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) | Some(Data::Error(_)) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) => format_number(*f),
        Some(Data::Bool(b)) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Some(Data::DateTime(dt)) => format_excel_datetime(dt),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => s.clone(),
    }
}

/// Format a number the way it reads on paper: integral values without a
/// decimal point, everything else in shortest round-trip form.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return String::new();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Does this text identify a trip sheet row? Non-empty and all ASCII digits
/// once surrounding whitespace is removed.
pub fn is_sequence_number(text: &str) -> bool {
    let t = text.trim();
    !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit())
}

/// Coerce a cell to a number, defaulting to zero.
pub fn coerce_number(cell: Option<&Data>) -> f64 {
    coerce_charge(cell).value
}

/// Result of coercing a charge cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    /// The numeric value; zero when the cell could not be read.
    pub value: f64,
    /// The cell's text, when a non-blank cell had to be counted as zero.
    pub defaulted_from: Option<String>,
}

/// Coerce a charge cell, reporting non-blank cells that were defaulted.
pub fn coerce_charge(cell: Option<&Data>) -> Coerced {
    match cell {
        None | Some(Data::Empty) => Coerced {
            value: 0.0,
            defaulted_from: None,
        },
        Some(Data::Int(i)) => Coerced {
            value: *i as f64,
            defaulted_from: None,
        },
        Some(Data::Float(f)) if f.is_finite() => Coerced {
            value: *f,
            defaulted_from: None,
        },
        Some(Data::Error(e)) => Coerced {
            value: 0.0,
            defaulted_from: Some(e.to_string()),
        },
        Some(other) => {
            let raw = cell_text(Some(other));
            match parse_number(&raw) {
                Some(value) => Coerced {
                    value,
                    defaulted_from: None,
                },
                None if raw.trim().is_empty() => Coerced {
                    value: 0.0,
                    defaulted_from: None,
                },
                None => Coerced {
                    value: 0.0,
                    defaulted_from: Some(raw),
                },
            }
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_excel_datetime(dt: &ExcelDateTime) -> String {
    let serial = dt.as_f64();
    if dt.is_duration() {
        return format_duration(serial);
    }
    let Some(ndt) = dt.as_datetime() else {
        return format_number(serial);
    };
    // Round to the nearest second; Excel stores times as fractions of a day.
    let ndt = (ndt + chrono::Duration::milliseconds(500))
        .with_nanosecond(0)
        .unwrap_or(ndt);
    if serial < 1.0 {
        ndt.format("%H:%M:%S").to_string()
    } else if ndt.num_seconds_from_midnight() == 0 {
        ndt.format("%Y-%m-%d").to_string()
    } else {
        ndt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn format_duration(days: f64) -> String {
    let total = (days * 86_400.0).round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
