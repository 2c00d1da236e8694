//! Pipeline stages for spreadsheet-to-trip-sheet generation.
//!
//! Each submodule implements one transformation step. Only [`document`] and
//! [`watermark`] know about PDF types; layout is plain geometry so it can be
//! tested without parsing PDFs.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ layout ──▶ document
//! (calamine)  (pure)    (printpdf) ◀── watermark (image)
//! ```
//!
//! 1. [`input`]     — read the first worksheet, resolve headers, keep rows
//!    whose `SL NO` is numeric
//! 2. [`cell`]      — cell-to-text rendering and charge coercion, used by
//!    `input`
//! 3. [`layout`]    — place every record on the fixed grid; wraps text using
//!    [`metrics`]
//! 4. [`watermark`] — decode and downscale the background image once per run
//! 5. [`document`]  — replay the layout as PDF operations and serialise

pub mod cell;
pub mod document;
pub mod input;
pub mod layout;
pub mod metrics;
pub mod watermark;
