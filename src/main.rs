use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};
use trajectory_fixer::{
    config::{ColumnLayout, OutputLayout, RowPolicy},
    fixer::{self, TrajectoryFixer},
    import_data, logs,
    progress::LogProgress,
    FixerConfig,
};

#[derive(Parser)]
#[command(name = "trajectory_fixer")]
#[command(about = "Cleans and splits per-entity GPS probe logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to rotating files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Args)]
struct InputArgs {
    /// Semicolon-delimited input with one header line
    input: PathBuf,

    /// Output file (defaults to a prefixed name next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file; flags given on the command line win
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input column layout: `four` (id;lat;lng;timestamp) or `five`
    /// (driver_id;id;lat;lng;timestamp)
    #[arg(long)]
    layout: Option<ColumnLayout>,

    /// What to do with malformed rows: `fail-fast` or `skip-and-log`
    #[arg(long)]
    on_bad_row: Option<RowPolicy>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove GPS noise and split each entity into clean segments
    Fix {
        #[command(flatten)]
        input: InputArgs,

        /// Maximum distance between consecutive points, in degrees
        #[arg(long)]
        spatial_limit: Option<f64>,

        /// Maximum time between consecutive points, in timestamp units
        #[arg(long)]
        time_limit: Option<i64>,

        /// Minimum bounding box extent of a kept segment, in degrees
        #[arg(long)]
        min_boundary: Option<f64>,

        /// Output layout: `with-entity` or `simple`
        #[arg(long)]
        output_layout: Option<OutputLayout>,

        /// Write run statistics as JSON to this file
        #[arg(long)]
        stats: Option<PathBuf>,
    },

    /// Rewrite the input as one line per entity: id;lat;lng;lat;lng;...
    Convert {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn load_config(input: &InputArgs) -> Result<FixerConfig> {
    let mut config = match &input.config {
        Some(path) => FixerConfig::load(path)?,
        None => FixerConfig::default(),
    };
    if let Some(layout) = input.layout {
        config.columns = layout.mapping();
    }
    if let Some(policy) = input.on_bad_row {
        config.row_policy = policy;
    }
    Ok(config)
}

fn output_path(input: &InputArgs, prefix: &str) -> Result<PathBuf> {
    match &input.output {
        Some(path) => Ok(path.clone()),
        None => fixer::default_output_path(&input.input, prefix),
    }
}

fn write_stats(path: &Path, summary: &fixer::RunSummary) -> Result<()> {
    let snapshot = summary
        .statistics
        .snapshot(summary.elapsed.num_seconds());
    let content = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))?;
    info!("statistics saved to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logs::init(level, cli.log_dir.as_deref())?;

    match cli.command {
        Commands::Fix {
            input,
            spatial_limit,
            time_limit,
            min_boundary,
            output_layout,
            stats,
        } => {
            let mut config = load_config(&input)?;
            if let Some(value) = spatial_limit {
                config.spatial_limit = value;
            }
            if let Some(value) = time_limit {
                config.time_limit = value;
            }
            if let Some(value) = min_boundary {
                config.min_boundary = value;
            }
            if let Some(value) = output_layout {
                config.output_layout = value;
            }
            config.validate()?;
            let output = output_path(&input, "fixed_")?;
            if output == input.input {
                bail!("output would overwrite the input: {}", output.display());
            }

            let cancel_flag = Arc::new(AtomicBool::new(false));
            {
                let cancel_flag = cancel_flag.clone();
                ctrlc::set_handler(move || {
                    eprintln!("\nReceived Ctrl+C! Stopping after the current entity...");
                    cancel_flag.store(true, Ordering::Relaxed);
                })?;
            }

            let total = import_data::count_records(&input.input)
                .with_context(|| format!("cannot read {}", input.input.display()))?;
            let fixer = TrajectoryFixer::new(config).with_cancel_flag(cancel_flag);
            let summary =
                fixer.fix_file(&input.input, &output, &mut LogProgress::new(), Some(total))?;

            if summary.skipped_rows > 0 {
                warn!("{} malformed rows skipped", summary.skipped_rows);
            }
            if summary.cancelled {
                warn!("run cancelled, output is partial but well-formed");
            }
            info!("\n{}", summary.statistics);
            if let Some(path) = stats {
                write_stats(&path, &summary)?;
            }
        }
        Commands::Convert { input } => {
            let config = load_config(&input)?;
            let output = output_path(&input, "converted_")?;
            if output == input.input {
                bail!("output would overwrite the input: {}", output.display());
            }
            let lines = fixer::convert_file(&input.input, &output, &config)?;
            info!("{} trajectories written", lines);
        }
    }
    Ok(())
}
