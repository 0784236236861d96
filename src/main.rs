use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dect::combine::combine;
use dect::config::{Dirs, LlmConfig};
use dect::llm::LlmClient;
use dect::pipeline::{run_batch, ProgressTracker};
use dect::prompts::AVAILABLE_STEPS;
use dect::store::StepStore;
use dect::tasks::load_tasks;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dect")]
#[command(about = "Turn functional-requirement documents into QA test-case suites", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding per-step checkpoint files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for the combined artifacts
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for every selected requirement, then combine
    Run {
        /// Path to the selected-tasks JSON file
        #[arg(long, default_value = "start/tasks.json")]
        tasks: PathBuf,

        /// Steps to run, e.g. "3" or "2-5" (default: all eight)
        #[arg(long)]
        steps: Option<String>,

        /// Skip the combine pass after the batch
        #[arg(long)]
        no_combine: bool,
    },

    /// Combine existing step-8 checkpoints into the final artifacts
    Combine,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut dirs = Dirs::default();
    if let Some(data_dir) = cli.data_dir {
        dirs.data_dir = data_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        dirs.output_dir = output_dir;
    }
    let store = StepStore::new(&dirs.data_dir);

    match cli.command {
        Commands::Run {
            tasks,
            steps,
            no_combine,
        } => {
            let selection = load_tasks(&tasks)
                .with_context(|| format!("loading tasks from {}", tasks.display()))?;
            let steps = match steps {
                Some(spec) => parse_steps(&spec)?,
                None => AVAILABLE_STEPS.to_vec(),
            };

            let config = LlmConfig::from_env()?;
            let client = LlmClient::new(config);
            let progress = ProgressTracker::new();

            let summary = run_batch(&store, &client, &progress, &selection, &steps).await?;
            println!(
                "Processed {} documents / {} requirements",
                summary.documents, summary.requirements
            );

            if !no_combine {
                let output = combine(&store, &dirs.output_dir)?;
                report_combine(&output);
            }
        }
        Commands::Combine => {
            let output = combine(&store, &dirs.output_dir)?;
            report_combine(&output);
        }
    }

    Ok(())
}

fn report_combine(output: &dect::combine::CombineOutput) {
    if output.suite.is_placeholder() {
        println!("No pipeline output found; wrote placeholder suite.");
    }
    println!("Final output saved to: {}", output.json_path.display());
    println!("CSV export saved to: {}", output.csv_path.display());
}

/// Parse "5" or "2-5" into an ascending step list.
fn parse_steps(spec: &str) -> Result<Vec<u8>> {
    let spec = spec.trim();
    let parsed = match spec.split_once('-') {
        Some((start, end)) => {
            let start: u8 = start.trim().parse()?;
            let end: u8 = end.trim().parse()?;
            anyhow::ensure!(start <= end, "invalid step range {:?}", spec);
            (start..=end).collect()
        }
        None => vec![spec.parse()?],
    };
    Ok(parsed)
}
