//! Workflow definition handed to the external scheduler.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

use super::Stage;

/// Identity, schedule and task chain of the pipeline workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDefinition {
    pub id: String,
    pub owner: String,
    /// Cron expression.
    pub schedule: String,
    /// Whether missed runs between `start_date` and now are backfilled.
    pub catchup: bool,
    pub start_date: NaiveDateTime,
    /// Tasks in execution order; each runs only after its predecessor succeeds.
    pub tasks: Vec<Stage>,
}

impl Default for WorkflowDefinition {
    fn default() -> Self {
        let start_date = NaiveDate::from_ymd_opt(2023, 12, 24)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap_or_default();

        Self {
            id: "dataset_pipeline".to_string(),
            owner: "data-engineering".to_string(),
            schedule: "30 6 * * *".to_string(),
            catchup: false,
            start_date,
            tasks: Stage::ALL.to_vec(),
        }
    }
}

impl fmt::Display for WorkflowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self
            .tasks
            .iter()
            .map(Stage::name)
            .collect::<Vec<_>>()
            .join(" >> ");

        writeln!(f, "workflow:   {}", self.id)?;
        writeln!(f, "owner:      {}", self.owner)?;
        writeln!(f, "schedule:   {}", self.schedule)?;
        writeln!(f, "catchup:    {}", self.catchup)?;
        writeln!(f, "start date: {}", self.start_date.format("%Y-%m-%d %H:%M"))?;
        write!(f, "tasks:      {}", chain)
    }
}
