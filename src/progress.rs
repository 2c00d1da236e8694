//! Progress-callback trait for per-page generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::SheetConfigBuilder::progress_callback`] to receive
//! events as the pipeline lays out each trip sheet.
//!
//! # Example
//!
//! ```rust
//! use tripsheet::{GenerationProgressCallback, SheetConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_page_rendered(&self, page_num: usize, total_pages: usize, sequence_no: &str) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Trip sheet {sequence_no}: page {page_num}/{total_pages}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { rendered: AtomicUsize::new(0) });
//!
//! let config = SheetConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the generation pipeline as it processes each record.
///
/// Implementations must be `Send + Sync` so a config can be moved onto the
/// blocking pool by [`crate::generate::generate_async`]. All methods have
/// default no-op implementations so callers only override what they care
/// about.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once after the spreadsheet has been loaded and filtered.
    ///
    /// # Arguments
    /// * `total_records` — number of trip sheets that will be rendered
    fn on_generation_start(&self, total_records: usize) {
        let _ = total_records;
    }

    /// Called after a record's page has been laid out.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `sequence_no` — the record's `SL NO`
    fn on_page_rendered(&self, page_num: usize, total_pages: usize, sequence_no: &str) {
        let _ = (page_num, total_pages, sequence_no);
    }

    /// Called once the document bytes are complete, before they are written.
    ///
    /// # Arguments
    /// * `total_pages` — pages in the finished document
    /// * `bytes`       — size of the serialised PDF
    fn on_generation_complete(&self, total_pages: usize, bytes: usize) {
        let _ = (total_pages, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SheetConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
