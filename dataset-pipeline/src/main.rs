use clap::{Parser, Subcommand};
use std::error::Error;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dataset_pipeline::{AppError, Dependencies, PipelineConfig};
use dataset_pipeline_stages::{Stage, WorkflowDefinition};

#[derive(Parser)]
#[command(name = "dataset-pipeline")]
#[command(about = "Batch pipeline that loads, extracts, cleans and indexes a tabular dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage in order, halting at the first failure
    Run,
    /// Load the source file into the relational store
    Ingest,
    /// Extract the table into the intermediate file
    Extract,
    /// Clean the intermediate file into the clean file
    Clean,
    /// Bulk-index the clean file into the search engine
    Index,
    /// Print the workflow definition
    Describe,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

async fn execute(command: Commands) -> Result<(), AppError> {
    let stage = match command {
        Commands::Describe => {
            println!("{}", WorkflowDefinition::default());
            return Ok(());
        }
        Commands::Run => None,
        Commands::Ingest => Some(Stage::Ingest),
        Commands::Extract => Some(Stage::Extract),
        Commands::Clean => Some(Stage::Clean),
        Commands::Index => Some(Stage::Index),
    };

    let config = PipelineConfig::from_env()?;
    let dependencies = Dependencies::new(&config)?;

    match stage {
        Some(stage) => {
            dependencies.orchestrator.run_stage(stage).await?;
        }
        None => {
            let report = dependencies.orchestrator.run().await?;
            info!(
                run_id = %report.run_id,
                stages = report.stages.len(),
                "Pipeline run finished"
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Dataset pipeline failed");
            eprintln!("Error: {}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("  Caused by: {}", err);
                source = err.source();
            }

            ExitCode::FAILURE
        }
    }
}
