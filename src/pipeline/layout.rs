//! Page layout: turn one [`TripRecord`] into positioned cells and text lines.
//!
//! Layout is pure. The same record and config always produce an equal
//! [`PageContent`], and nothing here touches the PDF library; the document
//! stage only replays the geometry computed here. Coordinates are points with
//! the origin at the page's top-left corner and `y` growing downwards.
//!
//! Every page uses the same fixed grid of five columns and twelve rows:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       company name                           │
//! │                         address                              │
//! │                          phone                               │
//! ├────────────┬────────────┬──────────┬──────────────┬──────────┤
//! │ Trip Sheet │ SL NO      │TRIP SHEET│ Date:        │ DATE     │
//! │ Guest Name:│ EMP NAME                                        │
//! │ Cab Booked:│ CAB TYPE   │ Car No:  │ CAB REG NO              │
//! │    ...     │            │          │                         │
//! │ Start Km:  │ START KM   │ End Km:  │ END KM       │ TOTAL KM │
//! │ Parking /  │ sum        │ Service  │ city                    │
//! └────────────┴────────────┴──────────┴─────────────────────────┘
//!                                                        Signature
//! ```

use crate::config::{mm, SheetConfig, TextStyle};
use crate::error::TripSheetError;
use crate::pipeline::cell::format_number;
use crate::pipeline::metrics::{text_width, wrap};
use crate::record::{Field, TripRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of grid columns.
pub const COLUMNS: usize = 5;

// ── Output types ─────────────────────────────────────────────────────────

/// An axis-aligned rectangle in points, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One line of text, already positioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    pub style: TextStyle,
    /// Left edge of the text.
    pub x: f32,
    /// Baseline, measured down from the page top.
    pub baseline: f32,
}

/// A grid cell with its final geometry and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub row: usize,
    /// First grid column covered by the cell.
    pub col: usize,
    pub col_span: usize,
    pub rect: Rect,
    /// Whether the cell is outlined.
    pub bordered: bool,
    /// Wrapped text; empty for a blank value.
    pub lines: Vec<TextLine>,
}

impl PlacedCell {
    /// The cell text with wrapped lines joined by single spaces.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The laid-out content of one trip sheet page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// `SL NO` of the record on this page.
    pub sequence_no: String,
    /// Grid cells in row-major order.
    pub grid: Vec<PlacedCell>,
    /// The borderless sign-off line below the grid.
    pub signature: PlacedCell,
}

impl PageContent {
    /// Text of the cell starting at `(row, col)`, if there is one.
    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        self.grid
            .iter()
            .find(|c| c.row == row && c.col == col)
            .map(PlacedCell::text)
    }

    /// Every cell of one grid row, left to right.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &PlacedCell> {
        self.grid.iter().filter(move |c| c.row == row)
    }
}

// ── Grid template ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Content {
    CompanyName,
    Address,
    Phone,
    Label(&'static str),
    Value(Field),
    ParkingPlusToll,
    ServiceCity,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    content: Content,
    span: usize,
}

const fn label(text: &'static str) -> Slot {
    Slot {
        content: Content::Label(text),
        span: 1,
    }
}

const fn value(field: Field) -> Slot {
    Slot {
        content: Content::Value(field),
        span: 1,
    }
}

const fn wide(content: Content, span: usize) -> Slot {
    Slot { content, span }
}

const GRID: [&[Slot]; 12] = [
    &[wide(Content::CompanyName, COLUMNS)],
    &[wide(Content::Address, COLUMNS)],
    &[wide(Content::Phone, COLUMNS)],
    &[
        label("Trip Sheet No:"),
        value(Field::SequenceNo),
        label("TRIP SHEET"),
        label("Date:"),
        value(Field::Date),
    ],
    &[label("Guest Name:"), wide(Content::Value(Field::GuestName), 4)],
    &[
        label("Cab Booked:"),
        value(Field::CabType),
        label("Car No:"),
        wide(Content::Value(Field::CabRegNo), 2),
    ],
    &[
        label("Driver Name:"),
        value(Field::DriverName),
        label("Driver Mob:"),
        wide(Content::Value(Field::DriverMobile), 2),
    ],
    &[
        label("Reporting Time:"),
        value(Field::PickupTime),
        label("Duty Type:"),
        wide(Content::Value(Field::DutyType), 2),
    ],
    &[
        label("Start Location:"),
        value(Field::StartLocation),
        label("End Location:"),
        wide(Content::Value(Field::EndLocation), 2),
    ],
    &[
        label("Start Time:"),
        value(Field::PickupTime),
        label("End Time:"),
        value(Field::EndTime),
        value(Field::TotalHours),
    ],
    &[
        label("Start Km:"),
        value(Field::StartKm),
        label("End Km:"),
        value(Field::EndKm),
        value(Field::TotalKm),
    ],
    &[
        label("Parking / Toll:"),
        wide(Content::ParkingPlusToll, 1),
        label("Service City:"),
        wide(Content::ServiceCity, 2),
    ],
];

const SIGNATURE_LABEL: &str = "Signature";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Content {
    fn text(self, record: &TripRecord, config: &SheetConfig) -> String {
        match self {
            Content::CompanyName => config.company_name.clone(),
            Content::Address => config.address.clone(),
            Content::Phone => config.phone.clone(),
            Content::Label(text) => text.to_string(),
            Content::Value(field) => record.text(field).to_string(),
            Content::ParkingPlusToll => format_number(record.parking_plus_toll()),
            Content::ServiceCity => config.service_city.clone(),
        }
    }

    fn style(self, config: &SheetConfig) -> TextStyle {
        let style = &config.style;
        match self {
            Content::CompanyName => style.title,
            Content::Address | Content::Phone => style.letterhead,
            Content::Label(_) => style.label,
            Content::Value(_) | Content::ParkingPlusToll | Content::ServiceCity => style.value,
        }
    }

    fn align(self) -> Align {
        match self {
            Content::CompanyName | Content::Address | Content::Phone => Align::Center,
            _ => Align::Left,
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

/// A cell whose text has been wrapped but not yet placed vertically.
struct Pending {
    col: usize,
    span: usize,
    x: f32,
    width: f32,
    style: TextStyle,
    align: Align,
    lines: Vec<String>,
}

/// Lay out one record as a trip sheet page.
///
/// # Errors
/// [`TripSheetError::PageOverflow`] if wrapped values push the signature line
/// past the bottom margin. A trip sheet is never split across pages.
pub fn render_page(
    record: &TripRecord,
    config: &SheetConfig,
) -> Result<PageContent, TripSheetError> {
    let style = &config.style;
    let pad = style.cell_padding;

    let mut col_x = [0f32; COLUMNS + 1];
    col_x[0] = style.grid_left_pt();
    for (i, w) in style.column_widths_mm.iter().enumerate() {
        col_x[i + 1] = col_x[i] + mm(*w);
    }

    let mut grid = Vec::with_capacity(40);
    let mut y = style.content_top_pt();

    for (row, slots) in GRID.iter().enumerate() {
        let mut pending = Vec::with_capacity(slots.len());
        let mut col = 0;
        for slot in slots.iter() {
            let end = (col + slot.span).min(COLUMNS);
            let x = col_x[col];
            let width = col_x[end] - x;
            let text_style = slot.content.style(config);
            let lines = wrap(
                &slot.content.text(record, config),
                text_style,
                width - pad.left - pad.right,
            );
            pending.push(Pending {
                col,
                span: end - col,
                x,
                width,
                style: text_style,
                align: slot.content.align(),
                lines,
            });
            col = end;
        }

        let content_height = pending
            .iter()
            .map(|p| p.lines.len().max(1) as f32 * style.leading(p.style))
            .fold(0.0, f32::max);
        let height = content_height + pad.top + pad.bottom;

        for p in pending {
            let rect = Rect {
                x: p.x,
                y,
                width: p.width,
                height,
            };
            let lines = place_lines(
                &p.lines,
                p.style,
                p.align,
                rect,
                pad.left,
                pad.right,
                style.leading(p.style),
            );
            grid.push(PlacedCell {
                row,
                col: p.col,
                col_span: p.span,
                rect,
                bordered: true,
                lines,
            });
        }
        y += height;
    }

    let sig_pad = style.signature_padding;
    let sig_style = style.signature;
    let sig_leading = style.leading(sig_style);
    let sig_rect = Rect {
        x: style.grid_left_pt(),
        y: y + mm(style.signature_gap_mm),
        width: mm(style.signature_width_mm),
        height: sig_leading + sig_pad.top + sig_pad.bottom,
    };
    let signature = PlacedCell {
        row: GRID.len(),
        col: 0,
        col_span: COLUMNS,
        rect: sig_rect,
        bordered: false,
        lines: place_lines(
            &[SIGNATURE_LABEL.to_string()],
            sig_style,
            Align::Right,
            sig_rect,
            sig_pad.left,
            sig_pad.right,
            sig_leading,
        ),
    };

    let bottom = sig_rect.y + sig_rect.height;
    if bottom > style.content_bottom_pt() {
        let top = style.content_top_pt();
        return Err(TripSheetError::PageOverflow {
            sequence_no: record.sequence_no.clone(),
            row: record.row,
            needed_pt: bottom - top,
            available_pt: style.content_bottom_pt() - top,
        });
    }

    Ok(PageContent {
        sequence_no: record.sequence_no.clone(),
        grid,
        signature,
    })
}

/// Position wrapped lines inside a cell, centred vertically.
fn place_lines(
    lines: &[String],
    style: TextStyle,
    align: Align,
    rect: Rect,
    pad_left: f32,
    pad_right: f32,
    leading: f32,
) -> Vec<TextLine> {
    let block = lines.len() as f32 * leading;
    let top = rect.y + (rect.height - block) / 2.0;
    // Helvetica ascender 718, descender 207 per 1000 em.
    let baseline_offset = (leading - 0.925 * style.size) / 2.0 + 0.718 * style.size;

    lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let w = text_width(text, style);
            let x = match align {
                Align::Left => rect.x + pad_left,
                Align::Center => rect.x + (rect.width - w) / 2.0,
                Align::Right => rect.x + rect.width - pad_right - w,
            };
            TextLine {
                text: text.clone(),
                style,
                x,
                baseline: top + i as f32 * leading + baseline_offset,
            }
        })
        .collect()
}

/// Lay out every record, in order, reporting each page to the progress
/// callback. Stops at the first record that does not fit.
pub fn render_pages(
    records: &[TripRecord],
    config: &SheetConfig,
) -> Result<Vec<PageContent>, TripSheetError> {
    let total = records.len();
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let page = render_page(record, config)?;
            debug!(
                "Laid out trip sheet {} (row {}) as page {}/{}",
                record.sequence_no,
                record.row,
                i + 1,
                total
            );
            if let Some(cb) = &config.progress_callback {
                cb.on_page_rendered(i + 1, total, &record.sequence_no);
            }
            Ok(page)
        })
        .collect()
}
