//! Configuration types for trip sheet generation.
//!
//! Two values control a run:
//!
//! * [`SheetConfig`] — what is printed around the record data (letterhead,
//!   service city, document title) plus an optional progress callback. Built
//!   via [`SheetConfigBuilder`].
//! * [`SheetStyle`] — the fixed page geometry and typography. Every page of
//!   every run uses the same style so trip sheets line up when printed; it is
//!   constructed once, held immutably inside the config, and passed
//!   explicitly to the renderer.

use crate::error::TripSheetError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PostScript points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimetres to points.
pub fn mm(v: f32) -> f32 {
    v * PT_PER_MM
}

/// Configuration for a trip sheet run.
///
/// Built via [`SheetConfig::builder()`] or using [`SheetConfig::default()`],
/// which carries the letterhead of the original trip sheets.
///
/// # Example
/// ```rust
/// use tripsheet::SheetConfig;
///
/// let config = SheetConfig::builder()
///     .company_name("CITY CABS")
///     .phone("Mob. No.: +91 90000 00000")
///     .build()
///     .unwrap();
/// assert_eq!(config.service_city, "Bengaluru");
/// ```
#[derive(Clone)]
pub struct SheetConfig {
    /// First letterhead line, printed in the title style.
    pub company_name: String,

    /// Second letterhead line.
    pub address: String,

    /// Third letterhead line.
    pub phone: String,

    /// Printed in the "Service City" field of every sheet.
    pub service_city: String,

    /// PDF document title (shown by viewers, not on the page).
    pub title: String,

    /// Page geometry and typography. Fixed; there are no builder setters.
    pub style: SheetStyle,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            company_name: "SHREE MARUTHI TRAVELS".to_string(),
            address: "No.374C, 1st Floor, 4th Cross, 9th Main, 1st Stage, \
                      Gubbalala, Jayanagar Housing Society Layout, Bangalore - 560061"
                .to_string(),
            phone: "Mob. No.: +91 96326 53666".to_string(),
            service_city: "Bengaluru".to_string(),
            title: "Trip Sheets".to_string(),
            style: SheetStyle::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SheetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetConfig")
            .field("company_name", &self.company_name)
            .field("address", &self.address)
            .field("phone", &self.phone)
            .field("service_city", &self.service_city)
            .field("title", &self.title)
            .field("style", &self.style)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl SheetConfig {
    /// Create a new builder for `SheetConfig`.
    pub fn builder() -> SheetConfigBuilder {
        SheetConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SheetConfig`].
#[derive(Debug)]
pub struct SheetConfigBuilder {
    config: SheetConfig,
}

impl SheetConfigBuilder {
    pub fn company_name(mut self, name: impl Into<String>) -> Self {
        self.config.company_name = name.into();
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.config.phone = phone.into();
        self
    }

    pub fn service_city(mut self, city: impl Into<String>) -> Self {
        self.config.service_city = city.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SheetConfig, TripSheetError> {
        let c = &self.config;
        if c.company_name.trim().is_empty() {
            return Err(TripSheetError::InvalidConfig(
                "Company name must not be empty".into(),
            ));
        }
        if c.service_city.trim().is_empty() {
            return Err(TripSheetError::InvalidConfig(
                "Service city must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Style ────────────────────────────────────────────────────────────────

/// Built-in PDF font faces used on a trip sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFace {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
}

/// Font face and size of one text role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub face: FontFace,
    /// Font size in points.
    pub size: f32,
}

/// Inner cell padding in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Fixed page geometry and typography shared by every trip sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetStyle {
    /// Page size in millimetres (A4).
    pub page_width_mm: f32,
    pub page_height_mm: f32,

    /// Content margins in millimetres.
    pub margin_left_mm: f32,
    pub margin_right_mm: f32,
    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,

    /// Inset of the content frame inside the margins, in points.
    pub frame_padding_pt: f32,

    /// Widths of the five grid columns in millimetres.
    pub column_widths_mm: [f32; 5],

    /// Grid border thickness in points.
    pub grid_line_pt: f32,

    pub cell_padding: Padding,

    /// Letterhead company name.
    pub title: TextStyle,
    /// Letterhead address and phone lines.
    pub letterhead: TextStyle,
    /// Field labels ("Date:", "Car No:", …).
    pub label: TextStyle,
    /// Field values.
    pub value: TextStyle,
    /// The "Signature" line.
    pub signature: TextStyle,

    /// Line height as a multiple of the font size.
    pub leading_factor: f32,

    /// Gap between the grid and the signature line, in millimetres.
    pub signature_gap_mm: f32,
    /// Width of the signature cell, in millimetres.
    pub signature_width_mm: f32,
    pub signature_padding: Padding,

    /// Watermark fill alpha (0.0–1.0).
    pub watermark_opacity: f32,
    /// Watermark edge length in millimetres (square).
    pub watermark_size_mm: f32,
    /// Longest watermark edge in pixels before it is downscaled for embedding.
    pub watermark_max_px: u32,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_left_mm: 15.0,
            margin_right_mm: 15.0,
            margin_top_mm: 12.0,
            margin_bottom_mm: 12.0,
            frame_padding_pt: 6.0,
            column_widths_mm: [32.0, 38.0, 28.0, 42.0, 30.0],
            grid_line_pt: 0.7,
            cell_padding: Padding {
                left: 6.0,
                right: 6.0,
                top: 5.0,
                bottom: 5.0,
            },
            title: TextStyle {
                face: FontFace::Bold,
                size: 16.0,
            },
            letterhead: TextStyle {
                face: FontFace::Regular,
                size: 9.0,
            },
            label: TextStyle {
                face: FontFace::Bold,
                size: 9.0,
            },
            value: TextStyle {
                face: FontFace::Regular,
                size: 9.0,
            },
            signature: TextStyle {
                face: FontFace::Bold,
                size: 9.0,
            },
            leading_factor: 1.2,
            signature_gap_mm: 6.0,
            signature_width_mm: 170.0,
            signature_padding: Padding {
                left: 6.0,
                right: 6.0,
                top: 3.0,
                bottom: 3.0,
            },
            watermark_opacity: 0.07,
            watermark_size_mm: 120.0,
            watermark_max_px: 1200,
        }
    }
}

impl SheetStyle {
    /// Page width in points.
    pub fn page_width_pt(&self) -> f32 {
        mm(self.page_width_mm)
    }

    /// Page height in points.
    pub fn page_height_pt(&self) -> f32 {
        mm(self.page_height_mm)
    }

    /// Total grid width in points.
    pub fn grid_width_pt(&self) -> f32 {
        self.column_widths_mm.iter().map(|w| mm(*w)).sum()
    }

    /// Left edge of the grid: centred in the content frame.
    pub fn grid_left_pt(&self) -> f32 {
        let frame_left = mm(self.margin_left_mm) + self.frame_padding_pt;
        let frame_width = self.page_width_pt()
            - mm(self.margin_left_mm)
            - mm(self.margin_right_mm)
            - 2.0 * self.frame_padding_pt;
        frame_left + (frame_width - self.grid_width_pt()) / 2.0
    }

    /// Top edge of the content frame, measured down from the page top.
    pub fn content_top_pt(&self) -> f32 {
        mm(self.margin_top_mm) + self.frame_padding_pt
    }

    /// Bottom edge of the content frame, measured down from the page top.
    pub fn content_bottom_pt(&self) -> f32 {
        self.page_height_pt() - mm(self.margin_bottom_mm) - self.frame_padding_pt
    }

    /// Line height for the given text style.
    pub fn leading(&self, text: TextStyle) -> f32 {
        text.size * self.leading_factor
    }
}
