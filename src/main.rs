use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use rontrace::analysis::plot_data::{self, PlotData};
use rontrace::analysis::report::{self, AnalysisReport, ComparisonMetric, ReportMetadata};
use rontrace::analysis::{apply_labels, LabelMode, TraceGroup, TraceRun};
use rontrace::config::AnalyzerConfig;
use rontrace::config_loader::{self, CliOverrides};

/// Analyze resilient overlay network simulation traces and compare groups of runs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "(*1/N): These arguments are applied to their respective groups in the \
order they are given. If only one argument is given, it is applied to all the groups.")]
struct Args {
    /// Files from which to read trace data (each file is its own group)
    #[arg(short, long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Directories from which to read trace data files (each directory is one group).
    /// Hidden files and subdirectories are ignored.
    #[arg(short, long, num_args = 1..)]
    dirs: Vec<PathBuf>,

    /// Label each respective group with these instead of the file/directory names
    #[arg(short, long, num_args = 1..)]
    label: Vec<String>,

    /// (*1/N) Prepend the given arguments to the group labels
    #[arg(long, num_args = 1..)]
    prepend_label: Vec<String>,

    /// (*1/N) Append the given arguments to the group labels
    #[arg(long, num_args = 1..)]
    append_label: Vec<String>,

    /// Export cumulative ACKs received over time
    #[arg(short, long)]
    time: bool,

    /// Export connection attempts over time for each group
    #[arg(short, long)]
    congestion: bool,

    /// Export percent improvement over not using an overlay for each group
    #[arg(short, long)]
    improvement: bool,

    /// Export average utility vs. failure probability per heuristic, and
    /// compare utility instead of # ACKs in the t-test
    #[arg(short, long)]
    utility: bool,

    /// Don't average together the runs within a directory: put each in its own group
    #[arg(long)]
    separate: bool,

    /// Time resolution (in seconds) for time-based data
    #[arg(long)]
    resolution: Option<f64>,

    /// Path to an analyzer configuration YAML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base directory for the JSON report
    #[arg(long)]
    output_dir: Option<String>,

    /// Don't write the JSON report
    #[arg(long)]
    no_save: bool,

    /// Print statistics summary about each group
    #[arg(short, long)]
    summary: bool,

    /// Compute a 2-sample t-test for every pair of groups, taken two at a time in order
    #[arg(long)]
    t_test: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    if args.files.is_empty() && args.dirs.is_empty() {
        bail!("You must specify some files or directories to parse!");
    }

    let mut config = match args.config {
        Some(ref path) => config_loader::load_config(path)?,
        None => AnalyzerConfig::default(),
    };
    config_loader::apply_overrides(
        &mut config,
        &CliOverrides {
            time_resolution: args.resolution,
            output_dir: args.output_dir.clone(),
        },
    )?;
    info!("Time resolution: {}s", config.time_resolution);

    let mut groups = load_groups(&args, &config)?;
    let total_runs: usize = groups.iter().map(TraceGroup::len).sum();
    info!("Loaded {} groups from {} runs", groups.len(), total_runs);

    relabel(&mut groups, &args)?;

    let summary = report::summarize(&groups);
    if args.summary {
        println!("\n{}\n", report::format_summary_table(&summary));
    }

    let t_test = if args.t_test {
        let metric = if args.utility {
            ComparisonMetric::Utility
        } else {
            ComparisonMetric::NetAcks
        };
        let t_test = report::pairwise_t_tests(&groups, metric);
        println!("\n{}\n", report::format_t_test_table(&t_test));
        Some(t_test)
    } else {
        None
    };

    if args.no_save {
        return Ok(());
    }

    let report = AnalysisReport {
        metadata: ReportMetadata {
            analysis_timestamp: chrono::Utc::now().to_rfc3339(),
            time_resolution: config.time_resolution,
            total_groups: groups.len(),
            total_runs,
        },
        summary,
        t_test,
        plots: build_plot_data(&args, &groups),
    };

    let output_dir = Path::new(&config.output_dir);
    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;
    report::generate_json_report(&report, &output_dir.join("report.json"))?;

    Ok(())
}

/// Parse every requested file and directory into groups, in command-line order
fn load_groups(args: &Args, config: &AnalyzerConfig) -> Result<Vec<TraceGroup>> {
    let mut groups = Vec::new();

    for file in &args.files {
        let run = TraceRun::from_path(file, config)
            .wrap_err_with(|| format!("Failed to load trace {}", file.display()))?;
        groups.push(TraceGroup::single(run));
    }

    for dir in &args.dirs {
        let group = TraceGroup::from_dir(dir, config)
            .wrap_err_with(|| format!("Failed to load trace directory {}", dir.display()))?;
        if args.separate {
            groups.extend(group.separate());
        } else {
            groups.push(group);
        }
    }

    Ok(groups)
}

fn relabel(groups: &mut [TraceGroup], args: &Args) -> Result<()> {
    let passes = [
        (&args.label, LabelMode::Replace),
        (&args.prepend_label, LabelMode::Prepend),
        (&args.append_label, LabelMode::Append),
    ];

    for (labels, mode) in passes {
        if !labels.is_empty() {
            apply_labels(groups, labels, mode)?;
        }
    }

    Ok(())
}

fn build_plot_data(args: &Args, groups: &[TraceGroup]) -> PlotData {
    PlotData {
        cumulative_acks: args.time.then(|| plot_data::cumulative_ack_curves(groups)),
        congestion: args.congestion.then(|| plot_data::congestion_curves(groups)),
        improvement: args.improvement.then(|| plot_data::improvement_bars(groups)),
        utility: args.utility.then(|| plot_data::utility_curves(groups)),
    }
}
