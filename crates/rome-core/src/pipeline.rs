//! Ordered pipeline of named steps.
//!
//! Each step names the steps it requires. Execution order is a topological
//! order of that graph, so moving a step in the declaration cannot run it
//! before its prerequisites.

use crate::error::{Result, RomeError};
use crate::report::{RunReport, StepReport, StepStatus};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Policy / StepOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Stop at the first failure; later steps are reported as not run.
    FailFast,
    /// Attempt every step whose requirements succeeded.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done(String),
    Skipped(String),
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

type StepFn<'a, C> = Box<dyn Fn(&mut C) -> Result<StepOutcome> + 'a>;

pub struct Step<'a, C> {
    pub id: String,
    pub requires: Vec<String>,
    run: StepFn<'a, C>,
}

impl<'a, C> Step<'a, C> {
    pub fn new(
        id: impl Into<String>,
        requires: &[&str],
        run: impl Fn(&mut C) -> Result<StepOutcome> + 'a,
    ) -> Self {
        Self {
            id: id.into(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
            run: Box::new(run),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub id: String,
    pub requires: Vec<String>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline<'a, C> {
    name: String,
    policy: Policy,
    steps: Vec<Step<'a, C>>,
}

impl<'a, C> Pipeline<'a, C> {
    /// Validate the graph and fix the execution order.
    ///
    /// Among steps that are ready at the same time, declaration order wins.
    pub fn new(name: impl Into<String>, policy: Policy, steps: Vec<Step<'a, C>>) -> Result<Self> {
        let mut ids = HashSet::new();
        for step in &steps {
            if !ids.insert(step.id.as_str()) {
                return Err(RomeError::InvalidPipeline(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
        }
        for step in &steps {
            if let Some(unknown) = step.requires.iter().find(|r| !ids.contains(r.as_str())) {
                return Err(RomeError::InvalidPipeline(format!(
                    "step '{}' requires unknown step '{unknown}'",
                    step.id
                )));
            }
        }

        let mut pending: Vec<Option<Step<'a, C>>> = steps.into_iter().map(Some).collect();
        let mut placed: HashSet<String> = HashSet::new();
        let mut ordered = Vec::with_capacity(pending.len());
        while ordered.len() < pending.len() {
            let next = pending.iter().position(|slot| {
                slot.as_ref()
                    .is_some_and(|s| s.requires.iter().all(|r| placed.contains(r)))
            });
            let Some(idx) = next else {
                let stuck: Vec<&str> = pending
                    .iter()
                    .flatten()
                    .map(|s| s.id.as_str())
                    .collect();
                return Err(RomeError::InvalidPipeline(format!(
                    "dependency cycle among: {}",
                    stuck.join(", ")
                )));
            };
            if let Some(step) = pending[idx].take() {
                placed.insert(step.id.clone());
                ordered.push(step);
            }
        }

        Ok(Self {
            name: name.into(),
            policy,
            steps: ordered,
        })
    }

    pub fn plan(&self) -> Vec<PlannedStep> {
        self.steps
            .iter()
            .map(|s| PlannedStep {
                id: s.id.clone(),
                requires: s.requires.clone(),
            })
            .collect()
    }

    pub fn run(&self, ctx: &mut C) -> RunReport {
        let mut report = RunReport::new(&self.name);
        let mut halted: Option<String> = None;

        for step in &self.steps {
            let status = if let Some(failed) = &halted {
                StepStatus::NotRun {
                    reason: format!("run stopped after '{failed}' failed"),
                }
            } else if let Some(blocker) = step.requires.iter().find(|r| {
                report
                    .step(r)
                    .map_or(true, |prior| !prior.status.is_ok())
            }) {
                StepStatus::NotRun {
                    reason: format!("required step '{blocker}' did not complete"),
                }
            } else {
                tracing::debug!(pipeline = %self.name, step = %step.id, "running step");
                match (step.run)(ctx) {
                    Ok(StepOutcome::Done(detail)) => {
                        tracing::info!(step = %step.id, "{detail}");
                        StepStatus::Completed { detail }
                    }
                    Ok(StepOutcome::Skipped(reason)) => {
                        tracing::info!(step = %step.id, "skipped: {reason}");
                        StepStatus::Skipped { reason }
                    }
                    Err(e) => {
                        tracing::error!(step = %step.id, error = %e, "step failed");
                        if self.policy == Policy::FailFast {
                            halted = Some(step.id.clone());
                        }
                        StepStatus::Failed {
                            kind: e.kind().to_string(),
                            error: e.to_string(),
                        }
                    }
                }
            };
            report.steps.push(StepReport {
                id: step.id.clone(),
                status,
            });
        }

        report.finished_at = Utc::now();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &'static str) -> impl Fn(&mut Vec<String>) -> Result<StepOutcome> {
        move |log: &mut Vec<String>| {
            log.push(id.to_string());
            Ok(StepOutcome::Done(format!("{id} done")))
        }
    }

    fn fail(id: &'static str) -> impl Fn(&mut Vec<String>) -> Result<StepOutcome> {
        move |log: &mut Vec<String>| {
            log.push(id.to_string());
            Err(RomeError::tx_failure(id, "reverted"))
        }
    }

    #[test]
    fn order_follows_requirements_not_declaration() {
        let pipeline = Pipeline::new(
            "t",
            Policy::FailFast,
            vec![
                Step::new("wire", &["deploy"], record("wire")),
                Step::new("deploy", &["resolve"], record("deploy")),
                Step::new("resolve", &[], record("resolve")),
            ],
        )
        .unwrap();
        let mut log = Vec::new();
        let report = pipeline.run(&mut log);
        assert!(report.is_success());
        assert_eq!(log, vec!["resolve", "deploy", "wire"]);
    }

    #[test]
    fn ready_steps_keep_declaration_order() {
        let pipeline: Pipeline<Vec<String>> = Pipeline::new(
            "t",
            Policy::Continue,
            vec![
                Step::new("root", &[], record("root")),
                Step::new("b", &["root"], record("b")),
                Step::new("a", &["root"], record("a")),
            ],
        )
        .unwrap();
        let ids: Vec<_> = pipeline.plan().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["root", "b", "a"]);
    }

    #[test]
    fn cycles_and_unknowns_are_rejected() {
        let cycle: Result<Pipeline<Vec<String>>> = Pipeline::new(
            "t",
            Policy::FailFast,
            vec![
                Step::new("a", &["b"], record("a")),
                Step::new("b", &["a"], record("b")),
            ],
        );
        assert!(matches!(cycle, Err(RomeError::InvalidPipeline(ref m)) if m.contains("cycle")));

        let unknown: Result<Pipeline<Vec<String>>> = Pipeline::new(
            "t",
            Policy::FailFast,
            vec![Step::new("a", &["ghost"], record("a"))],
        );
        assert!(matches!(unknown, Err(RomeError::InvalidPipeline(ref m)) if m.contains("ghost")));

        let dup: Result<Pipeline<Vec<String>>> = Pipeline::new(
            "t",
            Policy::FailFast,
            vec![Step::new("a", &[], record("a")), Step::new("a", &[], record("a"))],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn fail_fast_stops_everything_after_failure() {
        let pipeline = Pipeline::new(
            "t",
            Policy::FailFast,
            vec![
                Step::new("a", &[], fail("a")),
                Step::new("b", &[], record("b")),
            ],
        )
        .unwrap();
        let mut log = Vec::new();
        let report = pipeline.run(&mut log);
        assert_eq!(log, vec!["a"]);
        assert!(!report.is_success());
        assert_eq!(report.step("b").unwrap().status.label(), "not_run");
    }

    #[test]
    fn continue_runs_independent_steps_but_not_dependents() {
        let pipeline = Pipeline::new(
            "t",
            Policy::Continue,
            vec![
                Step::new("a", &[], fail("a")),
                Step::new("b", &["a"], record("b")),
                Step::new("c", &[], record("c")),
            ],
        )
        .unwrap();
        let mut log = Vec::new();
        let report = pipeline.run(&mut log);
        assert_eq!(log, vec!["a", "c"]);
        assert_eq!(report.step("a").unwrap().status.label(), "failed");
        assert_eq!(report.step("b").unwrap().status.label(), "not_run");
        assert_eq!(report.step("c").unwrap().status.label(), "completed");
    }
}
