//! # tripsheet
//!
//! Turn a bookings spreadsheet into printable trip sheets: one watermarked A4
//! page per trip, all in a single PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .xlsx
//!  │
//!  ├─ 1. Input      first worksheet → header map → rows with a numeric SL NO
//!  ├─ 2. Cells      render values as text, coerce PARKING / TOLL to numbers
//!  ├─ 3. Layout     fixed 5 × 12 grid per record (pure, no PDF types)
//!  ├─ 4. Watermark  decode once, paint beneath every page at low opacity
//!  └─ 5. Document   serialise with printpdf, write atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tripsheet::generate;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stats = generate("bookings.xlsx", "Trip_Sheets_Output.pdf", "hanuman.png")?;
//!     eprintln!("{} pages, {} rows skipped", stats.pages, stats.skipped_rows);
//!     Ok(())
//! }
//! ```
//!
//! A missing watermark file is not an error; the sheets are produced without
//! one.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tripsheet` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! tripsheet = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod record;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FontFace, SheetConfig, SheetConfigBuilder, SheetStyle, TextStyle};
pub use error::{ErrorKind, FieldWarning, TripSheetError};
pub use generate::{
    generate, generate_async, generate_from_bytes, generate_to_bytes, generate_with_config,
    inspect,
};
pub use output::{GenerationOutput, GenerationStats, SheetSummary};
pub use pipeline::layout::{render_page, PageContent};
pub use pipeline::watermark::Watermark;
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use record::{Field, TripRecord};
