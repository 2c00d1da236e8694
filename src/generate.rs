//! Generation entry points: spreadsheet in, trip sheet PDF out.
//!
//! Every entry point runs the same straight-line pipeline and differs only in
//! where the input comes from and where the PDF goes. A run either produces
//! a complete document or fails without touching the destination file.

use crate::config::SheetConfig;
use crate::error::TripSheetError;
use crate::output::{GenerationOutput, GenerationStats, SheetSummary};
use crate::pipeline::{document, input, layout, watermark::Watermark};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Generate trip sheets with the default letterhead and write them to
/// `output_path`.
///
/// This is the primary entry point for the library. A watermark that does
/// not exist is skipped; everything else that goes wrong is an error.
///
/// # Example
/// ```rust,no_run
/// use tripsheet::generate;
///
/// let stats = generate("bookings.xlsx", "Trip_Sheets_Output.pdf", "hanuman.png")?;
/// println!("{} trip sheets", stats.pages);
/// # Ok::<(), tripsheet::TripSheetError>(())
/// ```
pub fn generate(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    watermark_path: impl AsRef<Path>,
) -> Result<GenerationStats, TripSheetError> {
    generate_with_config(
        input_path,
        output_path,
        watermark_path,
        &SheetConfig::default(),
    )
}

/// Like [`generate`], with an explicit configuration.
///
/// The PDF is written atomically: a temporary file in the destination
/// directory is filled and then renamed over `output_path`.
pub fn generate_with_config(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    watermark_path: impl AsRef<Path>,
    config: &SheetConfig,
) -> Result<GenerationStats, TripSheetError> {
    let output = generate_to_bytes(input_path, watermark_path, config)?;
    let path = output_path.as_ref();
    write_atomically(path, &output.pdf)?;
    info!("Wrote {} bytes to '{}'", output.pdf.len(), path.display());
    Ok(output.stats)
}

/// Run the pipeline and return the PDF in memory.
///
/// # Errors
/// - [`TripSheetError::FileFormat`] / [`TripSheetError::NoWorksheet`] if the
///   workbook cannot be read
/// - [`TripSheetError::Schema`] if a required header is missing
/// - [`TripSheetError::NoRecords`] if no row has a numeric `SL NO`
/// - [`TripSheetError::WatermarkDecode`] if the watermark exists but is not an
///   image
/// - [`TripSheetError::PageOverflow`] if a record's values are too long to fit
///   on one page
pub fn generate_to_bytes(
    input_path: impl AsRef<Path>,
    watermark_path: impl AsRef<Path>,
    config: &SheetConfig,
) -> Result<GenerationOutput, TripSheetError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Generating trip sheets from '{}'", input_path.display());

    // ── Step 1: Load and filter rows ─────────────────────────────────────
    let sheet = input::load_sheet(input_path)?;
    let load_duration_ms = total_start.elapsed().as_millis() as u64;
    if sheet.records.is_empty() {
        return Err(TripSheetError::NoRecords {
            total_rows: sheet.summary.total_rows,
        });
    }

    // ── Step 2: Watermark ────────────────────────────────────────────────
    let watermark =
        Watermark::load_with_max_px(watermark_path.as_ref(), config.style.watermark_max_px)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(sheet.records.len());
    }

    // ── Step 3: Lay out pages ────────────────────────────────────────────
    let render_start = Instant::now();
    let pages = layout::render_pages(&sheet.records, config)?;

    // ── Step 4: Serialise ────────────────────────────────────────────────
    let pdf = document::build_document(&pages, watermark.as_ref(), config)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(pages.len(), pdf.len());
    }

    let stats = GenerationStats {
        total_rows: sheet.summary.total_rows,
        pages: pages.len(),
        skipped_rows: sheet.summary.skipped_rows.len(),
        warnings: sheet.warnings.len(),
        watermarked: watermark.is_some(),
        bytes: pdf.len(),
        load_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generation complete: {} pages, {} rows skipped, {}ms total",
        stats.pages, stats.skipped_rows, stats.total_duration_ms
    );

    Ok(GenerationOutput {
        pdf,
        pages,
        summary: sheet.summary,
        stats,
        warnings: sheet.warnings,
    })
}

/// Generate from spreadsheet bytes already in memory, such as an upload.
///
/// The bytes are staged in a temporary `.xlsx` file that is removed when the
/// call returns, on success or failure.
pub fn generate_from_bytes(
    bytes: &[u8],
    watermark_path: impl AsRef<Path>,
    config: &SheetConfig,
) -> Result<GenerationOutput, TripSheetError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("tripsheet-upload-")
        .suffix(".xlsx")
        .tempfile()
        .map_err(|e| TripSheetError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| TripSheetError::Internal(format!("tempfile write: {e}")))?;
    debug!("Staged {} upload bytes at '{}'", bytes.len(), tmp.path().display());
    // `tmp` is dropped (and the file deleted) when this returns
    generate_to_bytes(tmp.path(), watermark_path, config)
}

/// Async wrapper around [`generate_with_config`].
///
/// The pipeline is blocking (file I/O, image decoding, PDF serialisation),
/// so it runs on tokio's blocking pool. Concurrent calls share nothing.
pub async fn generate_async(
    input_path: impl Into<PathBuf>,
    output_path: impl Into<PathBuf>,
    watermark_path: impl Into<PathBuf>,
    config: SheetConfig,
) -> Result<GenerationStats, TripSheetError> {
    let input_path = input_path.into();
    let output_path = output_path.into();
    let watermark_path = watermark_path.into();

    tokio::task::spawn_blocking(move || {
        generate_with_config(&input_path, &output_path, &watermark_path, &config)
    })
    .await
    .map_err(|e| TripSheetError::Internal(format!("Generation task panicked: {e}")))?
}

/// Read a spreadsheet and report what it contains without rendering.
pub fn inspect(input_path: impl AsRef<Path>) -> Result<SheetSummary, TripSheetError> {
    input::load_sheet(input_path.as_ref()).map(|sheet| sheet.summary)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Write `bytes` to `path` via a sibling temp file and a rename.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), TripSheetError> {
    let write_err = |source: std::io::Error| TripSheetError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
