//! Masktrace: segmentation mask decoding and boundary tracing.
//!
//! Masktrace decodes run-length encoded binary masks (COCO compressed RLE
//! strings, plain count arrays and a bit-packed run format) and traces
//! their pixel boundaries into closed polygon loops. Loops that bound
//! holes are reversed, so the paths fill correctly under the nonzero
//! winding rule.
//!
//! # Modules
//!
//! - [`mask`]: RLE and bit-packed codecs, dense mask buffers, JSON documents
//! - [`trace`]: breakpoints, boundary segment graph, loop assembly
//! - [`inspect`]: per-mask statistics reports
//! - [`error`]: Error types for masktrace operations

pub mod error;
pub mod inspect;
pub mod mask;
pub mod trace;

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

pub use error::MasktraceError;

use mask::{BitBuffer, ColorMap, Dims, MaskEntry};
use trace::{EvenOdd, NonzeroWinding, PointInPolygon, TracedLoop};

/// The masktrace CLI application.
#[derive(Parser)]
#[command(name = "masktrace")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Trace mask boundaries into path strings.
    Trace(TraceArgs),
    /// Print statistics for every mask in a document.
    Inspect(InspectArgs),
    /// Decode a bit-packed mask into an RLE JSON object.
    Unpack(UnpackArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TraceOutput {
    Text,
    Json,
    Svg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportOutput {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FillRule {
    Nonzero,
    Evenodd,
}

/// Arguments for the trace subcommand.
#[derive(clap::Args)]
struct TraceArgs {
    /// Mask JSON document (RLE object, list of them, or COCO dataset).
    input: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = TraceOutput::Text)]
    output: TraceOutput,

    /// Seed for SVG fill colors; colors are random if unset.
    #[arg(long, env = "MASKTRACE_SEED")]
    seed: Option<u64>,

    /// Containment rule used to detect holes.
    #[arg(long, value_enum, default_value_t = FillRule::Nonzero)]
    fill_rule: FillRule,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Mask JSON document.
    input: PathBuf,

    /// Number of top labels to show in the histogram.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportOutput::Text)]
    output: ReportOutput,
}

/// Arguments for the unpack subcommand.
#[derive(clap::Args)]
struct UnpackArgs {
    /// Bit-packed mask file.
    input: PathBuf,

    /// Mask height.
    #[arg(long)]
    rows: u32,

    /// Mask width.
    #[arg(long)]
    cols: u32,
}

#[derive(Serialize)]
struct TracedMask<'a> {
    index: usize,
    label: Option<&'a str>,
    size: [u32; 2],
    paths: Vec<String>,
    depths: Vec<usize>,
}

/// Run the masktrace CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), MasktraceError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Trace(args)) => run_trace(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Unpack(args)) => run_unpack(args),
        None => {
            println!("masktrace {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Decode run-length masks and trace them into SVG paths.");
            println!();
            println!("Run 'masktrace --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the trace subcommand.
fn run_trace(args: TraceArgs) -> Result<(), MasktraceError> {
    let entries = mask::io_json::read_mask_json(&args.input)?;
    tracing::debug!(masks = entries.len(), input = %args.input.display(), "loaded masks");

    let containment: &dyn PointInPolygon = match args.fill_rule {
        FillRule::Nonzero => &NonzeroWinding,
        FillRule::Evenodd => &EvenOdd,
    };
    let traced = entries
        .iter()
        .map(|entry| trace::trace_sized_with(entry.dims, &entry.counts, containment))
        .collect::<Result<Vec<_>, _>>()?;

    match args.output {
        TraceOutput::Text => {
            for path in traced.iter().flatten() {
                println!("{path}");
            }
        }
        TraceOutput::Json => {
            let masks: Vec<TracedMask<'_>> = entries
                .iter()
                .zip(&traced)
                .map(|(entry, loops)| TracedMask {
                    index: entry.index,
                    label: entry.label.as_deref(),
                    size: [entry.dims.rows, entry.dims.cols],
                    paths: loops.iter().map(TracedLoop::to_path_string).collect(),
                    depths: loops.iter().map(TracedLoop::depth).collect(),
                })
                .collect();
            let json =
                serde_json::to_string_pretty(&masks).map_err(MasktraceError::MaskJsonWrite)?;
            println!("{json}");
        }
        TraceOutput::Svg => {
            let mut colors = ColorMap::new();
            let svg = match args.seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    render_svg(&entries, &traced, &mut colors, &mut rng)
                }
                None => render_svg(&entries, &traced, &mut colors, &mut rand::rng()),
            };
            print!("{svg}");
        }
    }

    Ok(())
}

/// Renders one filled `<path>` per mask, colored by label.
fn render_svg<R: rand::Rng + ?Sized>(
    entries: &[MaskEntry],
    traced: &[Vec<TracedLoop>],
    colors: &mut ColorMap,
    rng: &mut R,
) -> String {
    let width = entries.iter().map(|e| e.dims.cols).max().unwrap_or(0);
    let height = entries.iter().map(|e| e.dims.rows).max().unwrap_or(0);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    for (entry, loops) in entries.iter().zip(traced) {
        if loops.is_empty() {
            continue;
        }
        let category = entry
            .label
            .clone()
            .unwrap_or_else(|| format!("mask-{}", entry.index));
        let color = colors.color_for(&category, rng);
        let data: Vec<String> = loops.iter().map(TracedLoop::to_path_string).collect();
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="{color}" fill-opacity="0.5" fill-rule="nonzero"/>"#,
            data.join(" ")
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), MasktraceError> {
    let entries = mask::io_json::read_mask_json(&args.input)?;

    let opts = inspect::InspectOptions {
        top_labels: args.top,
        ..Default::default()
    };
    let report = inspect::inspect_masks(&entries, &opts)?;

    match args.output {
        ReportOutput::Json => {
            let json =
                serde_json::to_string_pretty(&report).map_err(MasktraceError::MaskJsonWrite)?;
            println!("{json}");
        }
        ReportOutput::Text => print!("{report}"),
    }

    Ok(())
}

/// Execute the unpack subcommand.
fn run_unpack(args: UnpackArgs) -> Result<(), MasktraceError> {
    let dims = Dims::new(args.rows, args.cols);
    let bytes = std::fs::read(&args.input)?;

    let decoded = BitBuffer::from_bytes(bytes).decode_bounded(dims.len())?;
    let mut counts = decoded.to_counts();
    pad_counts(&mut counts, dims.len().saturating_sub(decoded.len()));
    tracing::debug!(bits = decoded.len(), runs = counts.len(), "unpacked mask");

    println!("{}", mask::io_json::to_rle_json_string(dims, &counts)?);
    Ok(())
}

/// Extends `counts` with `missing` trailing background pixels.
fn pad_counts(counts: &mut Vec<u32>, missing: usize) {
    if missing == 0 {
        return;
    }
    let missing = u32::try_from(missing).unwrap_or(u32::MAX);
    // Odd length: the sequence already ends with a background run.
    let ends_in_background = counts.len() % 2 == 1;
    match counts.last_mut() {
        Some(last) if ends_in_background => *last = last.saturating_add(missing),
        _ => counts.push(missing),
    }
}
