use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use corpus_report::config;
use corpus_report::orchestrator::{analyze_file, run_jobs, JobInput};

/// Corpus Report - clean, analyze and report on keyword corpora
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out", global = true)]
    output_dir: PathBuf,

    /// Path to config file (overrides REPORT_CONFIG environment variable)
    #[arg(short, long, env = "REPORT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a mock search per keyword and report on each
    Scrape {
        /// Keyword to search for (repeatable)
        #[arg(short, long, required = true)]
        keyword: Vec<String>,
    },
    /// Report on JSON record files (one report per file)
    Report {
        /// JSON array of records (repeatable)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Only keep records whose title or content contains this term
        #[arg(short, long)]
        search: Option<String>,

        /// Report title (defaults to one derived from the records)
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Print the analysis of a record file as JSON
    Analyze {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    let args = Args::parse();
    info!("Starting corpus-report");

    let cfg = config::load(args.config.as_deref())?;
    debug!(
        "Config loaded - timezone={}, top_n={}, window_days={}, renderers={:?}",
        cfg.analysis.timezone, cfg.analysis.top_n, cfg.analysis.window_days, cfg.render.order
    );

    let inputs: Vec<JobInput> = match args.command {
        Command::Analyze { input } => {
            let result = analyze_file(&cfg, &input)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }
        Command::Scrape { keyword } => keyword.into_iter().map(JobInput::Keyword).collect(),
        Command::Report { input, search, title } => input
            .into_iter()
            .map(|path| JobInput::File {
                path,
                search: search.clone(),
                title: title.clone(),
            })
            .collect(),
    };

    let outcomes = run_jobs(&cfg, &inputs, &args.output_dir).await?;
    for o in &outcomes {
        println!(
            "{}\t{}\t{}/{} records\t{} via {}",
            o.report_id,
            o.label,
            o.cleaned_count,
            o.raw_count,
            o.dir.join(format!("report.{}", o.format.extension())).display(),
            o.renderer
        );
    }
    Ok(())
}
