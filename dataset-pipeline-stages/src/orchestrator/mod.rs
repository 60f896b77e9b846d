//! Orchestrator module for the dataset pipeline.
//!
//! Runs the four stages as one linear chain. Each stage is awaited to
//! completion before the next starts, and the first failure halts the chain.

mod workflow;

pub use workflow::WorkflowDefinition;

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::cleaner::{CleanReport, Cleaner};
use crate::errors::PipelineError;
use crate::extractor::{ExtractReport, Extractor};
use crate::indexer::{IndexReport, Indexer};
use crate::ingestor::{IngestReport, Ingestor};

/// One named unit of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingest,
    Extract,
    Clean,
    Index,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 4] = [Stage::Ingest, Stage::Extract, Stage::Clean, Stage::Index];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Extract => "extract",
            Stage::Clean => "clean",
            Stage::Index => "index",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| format!("unknown stage '{}'", s))
    }
}

/// Report of one completed stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageReport {
    Ingest(IngestReport),
    Extract(ExtractReport),
    Clean(CleanReport),
    Index(IndexReport),
}

impl StageReport {
    pub fn stage(&self) -> Stage {
        match self {
            StageReport::Ingest(_) => Stage::Ingest,
            StageReport::Extract(_) => Stage::Extract,
            StageReport::Clean(_) => Stage::Clean,
            StageReport::Index(_) => Stage::Index,
        }
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageReport::Ingest(report) => fmt::Display::fmt(report, f),
            StageReport::Extract(report) => fmt::Display::fmt(report, f),
            StageReport::Clean(report) => fmt::Display::fmt(report, f),
            StageReport::Index(report) => fmt::Display::fmt(report, f),
        }
    }
}

/// Report of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
}

/// Orchestrator that runs the pipeline stages in order.
pub struct Orchestrator {
    ingestor: Ingestor,
    extractor: Extractor,
    cleaner: Cleaner,
    indexer: Indexer,
}

impl Orchestrator {
    /// Create a new orchestrator with the given stages.
    pub fn new(ingestor: Ingestor, extractor: Extractor, cleaner: Cleaner, indexer: Indexer) -> Self {
        Self {
            ingestor,
            extractor,
            cleaner,
            indexer,
        }
    }

    /// Run the whole chain.
    ///
    /// Stops at the first failing stage and returns its error; later stages
    /// are not started.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!("pipeline_run", run_id = %run_id);

        async {
            info!(started_at = %started_at.to_rfc3339(), "Starting dataset pipeline");

            let mut stages = Vec::with_capacity(Stage::ALL.len());
            for stage in Stage::ALL {
                match self.run_stage(stage).await {
                    Ok(report) => stages.push(report),
                    Err(e) => {
                        error!(stage = %stage, error = %e, "Stage failed, halting pipeline");
                        return Err(e);
                    }
                }
            }

            let finished_at = Utc::now();
            info!(
                elapsed_ms = (finished_at - started_at).num_milliseconds(),
                "Dataset pipeline complete"
            );

            Ok(PipelineReport {
                run_id,
                started_at,
                finished_at,
                stages,
            })
        }
        .instrument(span)
        .await
    }

    /// Run a single stage and print its summary line.
    pub async fn run_stage(&self, stage: Stage) -> Result<StageReport, PipelineError> {
        info!(stage = %stage, "Running stage");

        let report = match stage {
            Stage::Ingest => StageReport::Ingest(self.ingestor.run().await?),
            Stage::Extract => StageReport::Extract(self.extractor.run().await?),
            Stage::Clean => StageReport::Clean(self.cleaner.run()?),
            Stage::Index => StageReport::Index(self.indexer.run().await?),
        };

        println!("{}", report);
        Ok(report)
    }
}
