//! CLI binary for tripsheet.
//!
//! A thin shim over the library crate that maps CLI flags to `SheetConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tripsheet::{
    generate_async, inspect, GenerationProgressCallback, ProgressCallback, SheetConfig,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the workbook is read, then a
/// bar that advances once per trip sheet.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// The bar length is set by `on_generation_start`, once the number of
    /// valid rows is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading spreadsheet…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} sheets  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.set_message("");
    }
}

/// The config owning the callback is dropped when generation returns. On a
/// failed run the bar is still ticking at that point; stop it so the error
/// is not printed under a live spinner.
impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, total_records: usize) {
        self.activate_bar(total_records);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_records} trip sheets…"))
        ));
    }

    fn on_page_rendered(&self, _page_num: usize, _total_pages: usize, sequence_no: &str) {
        self.bar.set_message(dim(&format!("SL NO {sequence_no}")));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total_pages: usize, bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} trip sheets rendered  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{:.1} KiB", bytes as f64 / 1024.0)),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate Trip_Sheets_Output.pdf, watermarked with ./hanuman.png if present
  tripsheet bookings.xlsx

  # Choose the output file and watermark
  tripsheet bookings.xlsx -o march.pdf -w logo.png

  # Check a spreadsheet without rendering
  tripsheet --inspect-only bookings.xlsx

  # Machine-readable run statistics
  tripsheet --json bookings.xlsx > stats.json

INPUT:
  The first worksheet is read. Its first row must contain these headers
  (exact spelling, case-sensitive):

    SL NO, DATE, DUTY TYPE, EMP NAME, CAB TYPE, CAB REG NO, NAME, MOBIL NO,
    PICKUP TIME, PLAND START, END LOACTION, END TIME, TOTAL HRS SMT,
    START KM, END KM, SMT TOTAL KM

  PARKING and TOLL are optional. Rows whose SL NO is not a whole number
  (blank rows, totals, notes) are skipped.

ENVIRONMENT VARIABLES:
  TRIPSHEET_OUTPUT        Output PDF path
  TRIPSHEET_WATERMARK     Watermark image path
  TRIPSHEET_INSPECT_ONLY  Print the sheet summary only
  TRIPSHEET_JSON          Print JSON instead of text
  TRIPSHEET_NO_PROGRESS   Disable the progress bar
  TRIPSHEET_VERBOSE       Enable debug logs
  TRIPSHEET_QUIET         Errors only
  RUST_LOG                Override the log filter entirely
"#;

/// Render a bookings spreadsheet as printable trip sheets.
#[derive(Parser, Debug)]
#[command(
    name = "tripsheet",
    version,
    about = "Render a bookings spreadsheet as printable trip sheets",
    long_about = "Read trip records from the first worksheet of an .xlsx file and render each \
valid row as one watermarked A4 trip sheet page, all in a single PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Spreadsheet to read (.xlsx).
    input: PathBuf,

    /// Write the PDF to this file.
    #[arg(short, long, env = "TRIPSHEET_OUTPUT", default_value = "Trip_Sheets_Output.pdf")]
    output: PathBuf,

    /// Background watermark image (PNG or JPEG). Skipped if the file is absent.
    #[arg(short, long, env = "TRIPSHEET_WATERMARK", default_value = "hanuman.png")]
    watermark: PathBuf,

    /// Print the spreadsheet summary only, no rendering.
    #[arg(long, env = "TRIPSHEET_INSPECT_ONLY")]
    inspect_only: bool,

    /// Output structured JSON (GenerationStats or SheetSummary).
    #[arg(long, env = "TRIPSHEET_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "TRIPSHEET_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TRIPSHEET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TRIPSHEET_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep library INFO logs out of the way of the progress bar; skipped
    // charge cells still surface as warnings.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress || cli.json {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let summary = inspect(&cli.input).context("Failed to inspect spreadsheet")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
            );
        } else {
            println!("File:          {}", summary.path);
            println!("Sheet:         {}", summary.sheet_name);
            println!("Data rows:     {}", summary.total_rows);
            println!("Trip sheets:   {}", summary.valid_records);
            if summary.skipped_rows.is_empty() {
                println!("Skipped rows:  none");
            } else {
                let rows: Vec<String> =
                    summary.skipped_rows.iter().map(|r| r.to_string()).collect();
                println!("Skipped rows:  {}", rows.join(", "));
            }
            println!("PARKING:       {}", presence(summary.has_parking_column));
            println!("TOLL:          {}", presence(summary.has_toll_column));
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = SheetConfig::builder();
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new_dynamic();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run generation ───────────────────────────────────────────────────
    let stats = generate_async(
        cli.input.clone(),
        cli.output.clone(),
        cli.watermark.clone(),
        config,
    )
    .await
    .context("Generation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}/{} rows  {}ms  →  {}",
            green("✔"),
            stats.pages,
            stats.total_rows,
            stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        if stats.skipped_rows > 0 {
            eprintln!(
                "   {} rows skipped (SL NO not a number)",
                dim(&stats.skipped_rows.to_string())
            );
        }
        if !stats.watermarked {
            eprintln!(
                "   {} no watermark at {}",
                yellow("⚠"),
                cli.watermark.display()
            );
        }
        if stats.warnings > 0 {
            eprintln!(
                "   {} {} charge cells were not numbers and counted as 0",
                yellow("⚠"),
                stats.warnings
            );
        }
    }

    Ok(())
}

fn presence(found: bool) -> &'static str {
    if found {
        "present"
    } else {
        "absent (counted as 0)"
    }
}
