//! End-to-end integration tests for tripsheet.
//!
//! Every test builds its own workbook with `rust_xlsxwriter` in a temporary
//! directory, runs the public API, and reads the resulting PDF back with
//! `lopdf`. Nothing touches the network or the repository tree.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tripsheet::{
    generate, generate_async, generate_from_bytes, generate_to_bytes, generate_with_config,
    inspect, ErrorKind, Field, GenerationProgressCallback, SheetConfig, TripSheetError,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Cell<'a> {
    Text(&'a str),
    Num(f64),
    Blank,
}

fn required_headers() -> Vec<&'static str> {
    Field::ALL.iter().map(|f| f.header()).collect()
}

fn all_headers() -> Vec<&'static str> {
    let mut h = required_headers();
    h.extend(["PARKING", "TOLL"]);
    h
}

/// A complete data row for `all_headers()` with the given SL NO.
fn trip_row(seq: f64, parking: Cell<'static>, toll: Cell<'static>) -> Vec<Cell<'static>> {
    vec![
        Cell::Num(seq),
        Cell::Text("2024-03-01"),
        Cell::Text("Local 8hr/80km"),
        Cell::Text("Asha Rao"),
        Cell::Text("Sedan"),
        Cell::Text("KA 05 AB 1234"),
        Cell::Text("Ravi Kumar"),
        Cell::Num(9876543210.0),
        Cell::Text("08:30"),
        Cell::Text("Jayanagar"),
        Cell::Text("Kempegowda International Airport"),
        Cell::Text("11:00"),
        Cell::Text("2:30"),
        Cell::Num(1200.0),
        Cell::Num(1260.0),
        Cell::Num(60.0),
        parking,
        toll,
    ]
}

fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, col, *s).unwrap();
                }
                Cell::Num(n) => {
                    sheet.write_number(r, col, *n).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save(path).unwrap();
}

fn write_png(path: &Path) {
    let img = image::RgbaImage::from_pixel(32, 32, image::Rgba([255, 153, 0, 255]));
    img.save(path).unwrap();
}

fn pdf_page_count(path: &Path) -> usize {
    let bytes = std::fs::read(path).unwrap();
    lopdf::Document::load_mem(&bytes).unwrap().get_pages().len()
}

/// Decoded content stream of every page, in page order.
fn page_contents(pdf: &[u8]) -> Vec<Vec<u8>> {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| doc.get_page_content(id).unwrap())
        .collect()
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Three data rows where the middle one is blank.
    fn three_rows_with_gap(&self) -> PathBuf {
        let path = self.path("bookings.xlsx");
        write_workbook(
            &path,
            &all_headers(),
            &[
                trip_row(1.0, Cell::Num(50.0), Cell::Num(35.0)),
                vec![Cell::Blank; all_headers().len()],
                trip_row(3.0, Cell::Blank, Cell::Blank),
            ],
        );
        path
    }
}

// ── Generation ───────────────────────────────────────────────────────────────

#[test]
fn test_blank_row_is_skipped() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let output = fx.path("out.pdf");

    let stats = generate(&input, &output, fx.path("hanuman.png")).unwrap();

    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.skipped_rows, 1);
    assert_eq!(pdf_page_count(&output), 2);
}

#[test]
fn test_missing_header_is_schema_error_and_writes_nothing() {
    let fx = Fixture::new();
    let input = fx.path("no_cab_type.xlsx");
    let headers: Vec<&str> = all_headers()
        .into_iter()
        .filter(|h| *h != "CAB TYPE")
        .collect();
    let mut row = trip_row(1.0, Cell::Blank, Cell::Blank);
    row.remove(4);
    write_workbook(&input, &headers, &[row]);
    let output = fx.path("out.pdf");

    let err = generate(&input, &output, fx.path("hanuman.png")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
    match &err {
        TripSheetError::Schema { missing, .. } => assert_eq!(missing, &vec!["CAB TYPE"]),
        other => panic!("expected Schema, got {other:?}"),
    }
    assert!(err.to_string().contains("CAB TYPE"));
    assert!(!output.exists());
}

#[test]
fn test_missing_watermark_still_generates() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let output = fx.path("out.pdf");

    let stats = generate(&input, &output, fx.path("does-not-exist.png")).unwrap();

    assert!(!stats.watermarked);
    assert_eq!(pdf_page_count(&output), 2);
}

#[test]
fn test_watermark_is_applied_when_present() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let wm = fx.path("hanuman.png");
    write_png(&wm);

    let with = generate_to_bytes(&input, &wm, &SheetConfig::default()).unwrap();
    let without = generate_to_bytes(&input, fx.path("none.png"), &SheetConfig::default()).unwrap();

    assert!(with.stats.watermarked);
    assert!(!without.stats.watermarked);
    assert_eq!(with.pages, without.pages);
    assert!(with.pdf.len() > without.pdf.len());
}

#[test]
fn test_corrupt_watermark_is_render_error() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let wm = fx.path("hanuman.png");
    std::fs::write(&wm, b"not an image").unwrap();
    let output = fx.path("out.pdf");

    let err = generate(&input, &output, &wm).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Render);
    assert!(!output.exists());
}

#[test]
fn test_generation_is_idempotent() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let wm = fx.path("hanuman.png");
    write_png(&wm);
    let config = SheetConfig::default();

    let first = generate_to_bytes(&input, &wm, &config).unwrap();
    let second = generate_to_bytes(&input, &wm, &config).unwrap();

    assert_eq!(first.pages, second.pages);
    assert_eq!(first.stats.pages, second.stats.pages);
    assert_eq!(first.summary, second.summary);

    let streams = page_contents(&first.pdf);
    assert_eq!(streams.len(), 2);
    assert_eq!(streams, page_contents(&second.pdf));
}

#[test]
fn test_oversized_row_is_render_error_and_writes_nothing() {
    let fx = Fixture::new();
    let input = fx.path("long_location.xlsx");
    let long = "Jayanagar 4th Block ".repeat(60);
    let mut tall: Vec<Cell<'_>> = trip_row(2.0, Cell::Blank, Cell::Blank);
    tall[9] = Cell::Text(long.as_str());
    write_workbook(
        &input,
        &all_headers(),
        &[trip_row(1.0, Cell::Blank, Cell::Blank), tall],
    );
    let output = fx.path("out.pdf");

    let err = generate(&input, &output, fx.path("wm.png")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Render);
    match &err {
        TripSheetError::PageOverflow {
            sequence_no, row, ..
        } => {
            assert_eq!(sequence_no, "2");
            assert_eq!(*row, 3);
        }
        other => panic!("expected PageOverflow, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_text_outside_the_builtin_font_still_renders() {
    let fx = Fixture::new();
    let input = fx.path("kannada.xlsx");
    let mut row: Vec<Cell<'_>> = trip_row(1.0, Cell::Blank, Cell::Blank);
    row[3] = Cell::Text("ಆಶಾ ರಾವ್");
    write_workbook(&input, &all_headers(), &[row]);

    let out = generate_to_bytes(&input, fx.path("wm.png"), &SheetConfig::default()).unwrap();

    assert_eq!(out.pages.len(), 1);
    assert_eq!(out.pages[0].cell_text(4, 1).as_deref(), Some("ಆಶಾ ರಾವ್"));
    assert!(out.warnings.is_empty(), "encoding gaps are logged, not counted");
}

#[test]
fn test_parking_without_toll_column() {
    let fx = Fixture::new();
    let input = fx.path("parking_only.xlsx");
    let headers: Vec<&str> = all_headers().into_iter().filter(|h| *h != "TOLL").collect();
    let mut row = trip_row(1.0, Cell::Text("50"), Cell::Blank);
    row.pop();
    write_workbook(&input, &headers, &[row]);

    let out = generate_to_bytes(&input, fx.path("wm.png"), &SheetConfig::default()).unwrap();

    assert_eq!(out.pages.len(), 1);
    assert_eq!(out.pages[0].cell_text(11, 0).as_deref(), Some("Parking / Toll:"));
    assert_eq!(out.pages[0].cell_text(11, 1).as_deref(), Some("50"));
    assert!(!out.summary.has_toll_column);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_unreadable_charges_warn_and_count_as_zero() {
    let fx = Fixture::new();
    let input = fx.path("charges.xlsx");
    write_workbook(
        &input,
        &all_headers(),
        &[trip_row(1.0, Cell::Text("paid by guest"), Cell::Num(40.0))],
    );

    let out = generate_to_bytes(&input, fx.path("wm.png"), &SheetConfig::default()).unwrap();

    assert_eq!(out.pages[0].cell_text(11, 1).as_deref(), Some("40"));
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].row, 2);
    assert_eq!(out.warnings[0].column, "PARKING");
    assert_eq!(out.stats.warnings, 1);
}

#[test]
fn test_record_fields_reach_the_page() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();

    let out = generate_to_bytes(&input, fx.path("wm.png"), &SheetConfig::default()).unwrap();
    let page = &out.pages[0];

    assert_eq!(page.sequence_no, "1");
    assert_eq!(page.cell_text(3, 1).as_deref(), Some("1"));
    assert_eq!(page.cell_text(4, 1).as_deref(), Some("Asha Rao"));
    assert_eq!(page.cell_text(6, 3).as_deref(), Some("9876543210"));
    assert_eq!(page.cell_text(10, 4).as_deref(), Some("60"));
    assert_eq!(page.cell_text(11, 1).as_deref(), Some("85"));
    assert_eq!(out.pages[1].cell_text(11, 1).as_deref(), Some("0"));
    assert_eq!(out.pages[1].sequence_no, "3");
}

#[test]
fn test_no_valid_rows_is_render_error() {
    let fx = Fixture::new();
    let input = fx.path("totals_only.xlsx");
    let mut row = trip_row(0.0, Cell::Blank, Cell::Blank);
    row[0] = Cell::Text("TOTAL");
    write_workbook(&input, &all_headers(), &[row]);
    let output = fx.path("out.pdf");

    let err = generate(&input, &output, fx.path("wm.png")).unwrap_err();

    assert!(matches!(err, TripSheetError::NoRecords { total_rows: 1 }));
    assert_eq!(err.kind(), ErrorKind::Render);
    assert!(!output.exists());
}

#[test]
fn test_not_a_workbook_is_file_format_error() {
    let fx = Fixture::new();
    let input = fx.path("bookings.xlsx");
    std::fs::write(&input, b"SL NO,DATE\n1,2024-03-01\n").unwrap();

    let err = generate(&input, fx.path("out.pdf"), fx.path("wm.png")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FileFormat);
}

#[test]
fn test_output_replaces_existing_file() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let output = fx.path("out.pdf");
    std::fs::write(&output, b"stale").unwrap();

    generate(&input, &output, fx.path("wm.png")).unwrap();

    assert_eq!(pdf_page_count(&output), 2);
}

#[test]
fn test_progress_callback_sees_every_page() {
    #[derive(Default)]
    struct Counter {
        started: AtomicUsize,
        rendered: AtomicUsize,
        completed: AtomicUsize,
    }
    impl GenerationProgressCallback for Counter {
        fn on_generation_start(&self, total_records: usize) {
            self.started.store(total_records, Ordering::SeqCst);
        }
        fn on_page_rendered(&self, _page: usize, _total: usize, _seq: &str) {
            self.rendered.fetch_add(1, Ordering::SeqCst);
        }
        fn on_generation_complete(&self, total_pages: usize, _bytes: usize) {
            self.completed.store(total_pages, Ordering::SeqCst);
        }
    }

    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let counter = Arc::new(Counter::default());
    let config = SheetConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    generate_with_config(&input, fx.path("out.pdf"), fx.path("wm.png"), &config).unwrap();

    assert_eq!(counter.started.load(Ordering::SeqCst), 2);
    assert_eq!(counter.rendered.load(Ordering::SeqCst), 2);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_custom_letterhead() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let config = SheetConfig::builder()
        .company_name("CITY CABS")
        .service_city("Mysuru")
        .build()
        .unwrap();

    let out = generate_to_bytes(&input, fx.path("wm.png"), &config).unwrap();

    assert_eq!(out.pages[0].cell_text(0, 0).as_deref(), Some("CITY CABS"));
    assert_eq!(out.pages[0].cell_text(11, 3).as_deref(), Some("Mysuru"));
}

// ── In-memory input ──────────────────────────────────────────────────────────

#[test]
fn test_generate_from_bytes_cleans_up() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let bytes = std::fs::read(&input).unwrap();

    let staged = || {
        std::fs::read_dir(std::env::temp_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| {
                        e.file_name()
                            .to_string_lossy()
                            .starts_with("tripsheet-upload-")
                    })
                    .count()
            })
            .unwrap_or(0)
    };
    let before = staged();

    let out = generate_from_bytes(&bytes, fx.path("wm.png"), &SheetConfig::default()).unwrap();

    assert_eq!(out.pages.len(), 2);
    assert!(out.pdf.starts_with(b"%PDF"));
    assert_eq!(staged(), before, "staging file should be removed");
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[test]
fn test_inspect_reports_skipped_rows() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();

    let summary = inspect(&input).unwrap();

    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.valid_records, 2);
    assert_eq!(summary.skipped_rows, vec![3]);
    assert!(summary.has_parking_column);
    assert!(summary.has_toll_column);
    assert_eq!(summary.headers, all_headers());
}

#[test]
fn test_inspect_nonexistent() {
    let err = inspect("/no/such/bookings.xlsx").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileFormat);
}

// ── Async ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_async_writes_file() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let output = fx.path("async.pdf");

    let stats = generate_async(
        input,
        output.clone(),
        fx.path("wm.png"),
        SheetConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(stats.pages, 2);
    assert_eq!(pdf_page_count(&output), 2);
}

#[tokio::test]
async fn test_concurrent_runs_are_isolated() {
    let fx = Fixture::new();
    let input = fx.three_rows_with_gap();
    let bad = fx.path("bad.xlsx");
    std::fs::write(&bad, b"garbage").unwrap();

    let (good, failed) = tokio::join!(
        generate_async(
            input,
            fx.path("a.pdf"),
            fx.path("wm.png"),
            SheetConfig::default()
        ),
        generate_async(
            bad,
            fx.path("b.pdf"),
            fx.path("wm.png"),
            SheetConfig::default()
        ),
    );

    assert_eq!(good.unwrap().pages, 2);
    assert_eq!(failed.unwrap_err().kind(), ErrorKind::FileFormat);
    assert!(fx.path("a.pdf").exists());
    assert!(!fx.path("b.pdf").exists());
}
