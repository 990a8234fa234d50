//! agenda-compare
//!
//! Compares the numbered proposals of a proxy statement (document A) with
//! those of the meeting notice (document B), writes a report and prints the
//! labels that did not match.

use std::path::PathBuf;
use std::process::ExitCode;

use agenda_core::{compare_documents, Alignment, CompareOptions, ComparisonRun};
use agenda_pdf::PdfSource;
use agenda_report::{
    JsonReportRenderer, PdfReportRenderer, Report, ReportRenderer, TextReportRenderer,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit status for `--strict` when the run is not clean
const STRICT_FAILURE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Pdf,
    Text,
    Json,
}

impl ReportFormat {
    fn renderer(self) -> Box<dyn ReportRenderer> {
        match self {
            ReportFormat::Pdf => Box::new(PdfReportRenderer),
            ReportFormat::Text => Box::new(TextReportRenderer),
            ReportFormat::Json => Box::new(JsonReportRenderer),
        }
    }
}

/// Command-line arguments for agenda-compare
#[derive(Parser, Debug)]
#[command(name = "agenda-compare")]
#[command(version, about = "Compare proxy statement proposals against a meeting notice")]
struct Args {
    /// Proxy statement PDF (document A)
    #[arg(long)]
    proxy: PathBuf,

    /// Meeting notice PDF (document B)
    #[arg(long)]
    notice: PathBuf,

    /// Where to write the report
    #[arg(long, default_value = "comparison_report.pdf")]
    out: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value = "pdf")]
    format: ReportFormat,

    /// Leave the trailing NOTE block out of the comparison
    #[arg(long)]
    no_note: bool,

    /// Width of the left-column clip, in points
    #[arg(long, default_value = "540", value_parser = positive_points)]
    left_clip_width: f64,

    /// Pair items by position instead of by label
    #[arg(long)]
    positional: bool,

    /// Exit with status 2 unless every label matched
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn positive_points(value: &str) -> Result<f64, String> {
    let points: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if points.is_finite() && points > 0.0 {
        Ok(points)
    } else {
        Err(format!("width must be positive, got {}", value))
    }
}

impl Args {
    fn options(&self) -> CompareOptions {
        let alignment = if self.positional {
            Alignment::Positional
        } else {
            Alignment::ByLabel
        };
        CompareOptions::default()
            .with_note(!self.no_note)
            .with_left_clip_width(self.left_clip_width)
            .with_alignment(alignment)
    }
}

/// `<label>: <STATUS> -> <reason>` for every label that did not match
fn summary_lines(run: &ComparisonRun) -> Vec<String> {
    run.mismatches()
        .map(|result| {
            format!(
                "{}: {} -> {}",
                result.label,
                result.status,
                result.reason.as_deref().unwrap_or_default()
            )
        })
        .collect()
}

fn run(args: &Args) -> anyhow::Result<ComparisonRun> {
    let proxy = PdfSource::open(&args.proxy)
        .with_context(|| format!("Failed to open proxy {}", args.proxy.display()))?;
    let notice = PdfSource::open(&args.notice)
        .with_context(|| format!("Failed to open notice {}", args.notice.display()))?;

    let run = compare_documents(&proxy, &notice, &args.options())?;

    let report = Report::new(run, proxy.id(), notice.id(), chrono::Local::now());
    let bytes = args
        .format
        .renderer()
        .render(&report)
        .context("Failed to render report")?;
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("Failed to write report to {}", args.out.display()))?;
    info!(path = %args.out.display(), format = ?args.format, "Report written");

    Ok(report.run)
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // Logs go to stderr so stdout carries only the summary
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let run = run(&args)?;

    println!("Report written to: {}", args.out.display());
    for line in summary_lines(&run) {
        println!("{}", line);
    }

    if args.strict && !run.is_clean() {
        return Ok(ExitCode::from(STRICT_FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}
