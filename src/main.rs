use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dirt_core::{ColumnRange, Error, RankConfig, RankingEngine, ResultSet};
use dirt_storage::{merge, ResultWriter, TableReader};
use std::ops::Range;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Rows ranked when no explicit end is given
const DEFAULT_ROW_COUNT: usize = 10;

/// Candidate index gene finder
#[derive(Parser, Debug)]
#[command(name = "dirt")]
#[command(about = "Rank genes by ratio stability across control samples", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank candidate index genes for a range of target rows
    Rank(RankArgs),
    /// Concatenate result files from separate row ranges
    Merge(MergeArgs),
}

#[derive(clap::Args, Debug)]
struct RankArgs {
    /// Expression table with a Geneid column followed by sample columns
    #[arg(short, long)]
    input: PathBuf,

    /// Result file (.gz to compress)
    #[arg(short, long, default_value = "DiRT_test.csv")]
    output: PathBuf,

    /// First target row (0-based)
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// One past the last target row [default: start + 10, capped at the table size]
    #[arg(long, conflicts_with = "all")]
    end: Option<usize>,

    /// Rank every row from --start to the end of the table
    #[arg(long)]
    all: bool,

    /// Control columns as START:END [default: C1:C9]
    #[arg(long)]
    control: Option<ColumnRange>,

    /// Output ratio columns as START:END [default: C1:T9]
    #[arg(long)]
    full: Option<ColumnRange>,

    /// Candidates kept per target [default: 10]
    #[arg(long)]
    top_n: Option<usize>,

    /// JSON file with control, full and top_n; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads; 0 uses every core, 1 runs sequentially
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Field delimiter for input and output ("tab" for TSV)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,
}

#[derive(clap::Args, Debug)]
struct MergeArgs {
    /// Merged result file
    #[arg(short, long)]
    output: PathBuf,

    /// Result files, concatenated in the order given
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Field delimiter ("tab" for TSV)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single ASCII character, got '{}'", s)),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting DiRT v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Rank(args) => run_rank(args),
        Command::Merge(args) => run_merge(args),
    }
}

fn run_rank(args: RankArgs) -> anyhow::Result<()> {
    let config = merge_config(&args)?;

    info!("Input: {:?}", args.input);
    info!("Control columns: {}", config.control);
    info!("Ratio columns: {}", config.full);
    info!("Top candidates per target: {}", config.top_n);

    let table = TableReader::with_delimiter(args.delimiter).read_path(&args.input)?;
    info!(
        "Loaded {} genes x {} samples",
        table.len(),
        table.sample_count()
    );

    let engine = RankingEngine::new(&table, &config)?;
    let targets = resolve_rows(&args, table.len())?;

    info!("Ranking target rows {}..{}", targets.start, targets.end);
    let started = Instant::now();
    let count = targets.len();
    let results = rank_targets(&engine, targets, args.jobs)?;

    info!(
        "Ranked {} targets in {:.2?} ({} result rows)",
        count,
        started.elapsed(),
        results.len()
    );

    let degenerate = results.degenerate_count();
    if degenerate > 0 {
        warn!(
            "{} result rows have a NaN or infinite ndiv (written as NaN/inf/-inf)",
            degenerate
        );
    }

    ResultWriter::with_delimiter(args.delimiter).write_path(&args.output, &results)?;
    println!("Wrote: {}", args.output.display());
    Ok(())
}

/// JSON config (or defaults) with command-line flags applied on top
fn merge_config(args: &RankArgs) -> anyhow::Result<RankConfig> {
    let mut config = match &args.config {
        Some(path) => RankConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RankConfig::default(),
    };
    if let Some(control) = &args.control {
        config.control = control.clone();
    }
    if let Some(full) = &args.full {
        config.full = full.clone();
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    config.validate()?;
    Ok(config)
}

/// Target rows for a table with `rows` rows
///
/// Without `--end` or `--all` the range is `start..start+10`, clamped to the
/// table. An explicit `--end` past the table is an index error.
fn resolve_rows(args: &RankArgs, rows: usize) -> anyhow::Result<Range<usize>> {
    let end = if args.all {
        rows
    } else if let Some(end) = args.end {
        if end > rows {
            return Err(Error::RowOutOfRange {
                index: end - 1,
                rows,
            }
            .into());
        }
        end
    } else {
        let wanted = args.start.saturating_add(DEFAULT_ROW_COUNT);
        if wanted > rows {
            warn!("Table has {} rows; ranking rows {}..{}", rows, args.start, rows);
        }
        wanted.min(rows)
    };
    if args.start >= end {
        bail!("Empty target row range {}..{}", args.start, end);
    }
    Ok(args.start..end)
}

/// Rank `targets` sequentially, or on a dedicated pool when `jobs != 1`
fn rank_targets(
    engine: &RankingEngine<'_>,
    targets: Range<usize>,
    jobs: usize,
) -> anyhow::Result<ResultSet> {
    let results = match jobs {
        1 => engine.rank_rows(targets)?,
        jobs => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("Failed to start worker pool")?;
            info!("Using {} worker threads", pool.current_num_threads());
            pool.install(|| engine.par_rank_rows(targets))?
        }
    };
    Ok(results)
}

fn run_merge(args: MergeArgs) -> anyhow::Result<()> {
    let merged = merge(&args.inputs, &args.output, args.delimiter)?;
    println!(
        "Wrote: {} ({} rows from {} files)",
        args.output.display(),
        merged.len(),
        args.inputs.len()
    );
    Ok(())
}
