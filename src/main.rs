use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

use peakhours::analyze::{analyze, AnalyzeRequest, FetchLimits};
use peakhours::config::Settings;
use peakhours::progress::FetchProgress;
use peakhours::source::ScrapeDumpSource;
use peakhours::summary::ActivitySummary;
use peakhours::{logging, renderer, status};

#[derive(Parser)]
#[command(name = "peakhours")]
#[command(about = "Posting-time patterns (hour of day, day of week) for a public profile", long_about = None)]
struct Cli {
    /// Write logs to this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize when a profile posts
    Analyze {
        /// Profile handle, with or without a leading '@'
        identifier: String,

        /// Use synthetic demo data instead of captured posts
        #[arg(long)]
        demo: bool,

        /// Seed for demo data, for reproducible output
        #[arg(long, requires = "demo")]
        seed: Option<u64>,

        /// Directory holding captured scrape dumps (<handle>.json)
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Most posts to analyze
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_posts: Option<u64>,

        /// Output formats (comma-separated: json,md)
        #[arg(long, default_value = "json")]
        render: String,

        /// Output directory for rendered files. JSON goes to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show mode, settings and captured profiles
    Status {
        /// Directory holding captured scrape dumps
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let log_dir = cli.log_dir.clone();
    match log_dir {
        Some(dir) => {
            logging::init_file_logging(&dir, &std::env::args().collect::<Vec<_>>().join(" "))?;
        }
        None => logging::init_stderr_logging(),
    }

    match cli.command {
        Commands::Analyze {
            identifier,
            demo,
            seed,
            source_dir,
            max_posts,
            render,
            output,
        } => {
            let source_dir = source_dir.unwrap_or_else(|| settings.profiles_dir());
            let limits = FetchLimits {
                max_posts: match max_posts {
                    Some(n) => usize::try_from(n).context("--max-posts is too large")?,
                    None => settings.max_posts,
                },
                timeout: settings.fetch_timeout,
            };
            let request = AnalyzeRequest { identifier, demo };

            let summary = tokio::runtime::Runtime::new()
                .context("Failed to create Tokio runtime")?
                .block_on(run_analyze(&request, source_dir, limits, seed))?;

            write_outputs(&summary, &render, output.as_deref())
        }
        Commands::Status { source_dir, json } => {
            let source_dir = source_dir.unwrap_or_else(|| settings.profiles_dir());
            status::run(&settings, source_dir, json)
        }
    }
}

async fn run_analyze(
    request: &AnalyzeRequest,
    source_dir: PathBuf,
    limits: FetchLimits,
    seed: Option<u64>,
) -> Result<ActivitySummary> {
    let source = ScrapeDumpSource::new(source_dir);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let progress = (!request.demo).then(|| FetchProgress::start(request.identifier.trim()));

    let result = analyze(request, &source, limits, &mut rng).await;

    match result {
        Ok(summary) => {
            if let Some(progress) = progress {
                progress.finish(&format!(
                    "✅ Analyzed {} posts for @{}",
                    summary.total_count, summary.identifier
                ));
            }
            Ok(summary)
        }
        Err(e) => {
            if let Some(progress) = progress {
                progress.finish("❌ Fetch failed");
            }
            Err(anyhow!("{} (status {})", e, e.status_code()))
        }
    }
}

fn write_outputs(summary: &ActivitySummary, render_arg: &str, output_dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    // Parse formats
    let formats: Vec<&str> = if render_arg.trim().is_empty() {
        // Empty string means render all
        vec!["json", "md"]
    } else {
        render_arg.split(',').map(|s| s.trim()).collect()
    };

    for format in formats {
        match format {
            "json" => {
                let json = serde_json::to_string_pretty(summary)?;
                match output_dir {
                    Some(dir) => {
                        let output_path = dir.join(json_filename(summary));
                        std::fs::write(&output_path, json)?;
                        eprintln!("JSON summary written to: {}", output_path.display());
                    }
                    None => println!("{}", json),
                }
            }
            "md" => {
                let markdown = renderer::md::render(summary)?;
                let dir = output_dir.unwrap_or_else(|| Path::new("."));
                let output_path = dir.join(renderer::md::default_filename(summary));
                std::fs::write(&output_path, markdown)?;
                eprintln!("Markdown report written to: {}", output_path.display());
            }
            _ => {
                eprintln!("Warning: Unknown format '{}', skipping", format);
            }
        }
    }

    Ok(())
}

fn json_filename(summary: &ActivitySummary) -> String {
    if summary.is_demo {
        format!("peakhours-{}-demo.json", summary.identifier)
    } else {
        format!("peakhours-{}.json", summary.identifier)
    }
}
