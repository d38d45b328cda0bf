use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StepStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepStatus {
    Completed { detail: String },
    Skipped { reason: String },
    Failed { kind: String, error: String },
    /// Never attempted: an earlier failure stopped the run, or a required
    /// step did not complete.
    NotRun { reason: String },
}

impl StepStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Completed { .. } => "completed",
            StepStatus::Skipped { .. } => "skipped",
            StepStatus::Failed { .. } => "failed",
            StepStatus::NotRun { .. } => "not_run",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StepStatus::Completed { detail } => detail,
            StepStatus::Skipped { reason } | StepStatus::NotRun { reason } => reason,
            StepStatus::Failed { error, .. } => error,
        }
    }

    /// Completed or Skipped: dependents may run.
    pub fn is_ok(&self) -> bool {
        matches!(self, StepStatus::Completed { .. } | StepStatus::Skipped { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub id: String,
    pub status: StepStatus,
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Outcome of one workflow run. The caller decides the exit code from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub workflow: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub steps: Vec<StepReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(workflow: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            workflow: workflow.into(),
            network: None,
            chain_id: None,
            steps: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_ok())
    }

    pub fn step(&self, id: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed { .. }))
    }

    pub fn count(&self, label: &str) -> usize {
        self.steps.iter().filter(|s| s.status.label() == label).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, status: StepStatus) -> StepReport {
        StepReport {
            id: id.to_string(),
            status,
        }
    }

    #[test]
    fn skipped_steps_still_succeed() {
        let mut report = RunReport::new("deploy");
        report.steps.push(step(
            "a",
            StepStatus::Completed {
                detail: "ok".into(),
            },
        ));
        report.steps.push(step(
            "b",
            StepStatus::Skipped {
                reason: "already wired".into(),
            },
        ));
        assert!(report.is_success());
        assert_eq!(report.count("skipped"), 1);
    }

    #[test]
    fn not_run_fails_the_report() {
        let mut report = RunReport::new("deploy");
        report.steps.push(step(
            "a",
            StepStatus::NotRun {
                reason: "stopped".into(),
            },
        ));
        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn status_json_is_tagged() {
        let status = StepStatus::Failed {
            kind: "transaction_failure".into(),
            error: "reverted".into(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"type\":\"failed\""));
        assert!(json.contains("transaction_failure"));
    }
}
