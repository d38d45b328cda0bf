use crate::output::{print_json, print_table};
use clap::ValueEnum;
use rome_core::pipeline::PlannedStep;
use rome_core::{presale, treasury, treasury::TreasuryAction};

#[derive(Clone, Copy, ValueEnum)]
pub enum PlanTarget {
    /// Presale deployment and wiring
    Deploy,
    /// Treasury permission toggles
    Toggle,
    /// Treasury permission queueing
    Queue,
}

pub fn run(target: PlanTarget, json: bool) -> anyhow::Result<()> {
    let steps: Vec<PlannedStep> = match target {
        PlanTarget::Deploy => presale::plan()?,
        PlanTarget::Toggle => treasury::plan(TreasuryAction::Toggle)?,
        PlanTarget::Queue => treasury::plan(TreasuryAction::Queue)?,
    };

    if json {
        return print_json(&steps);
    }

    let rows = steps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let requires = if s.requires.is_empty() {
                "-".to_string()
            } else {
                s.requires.join(", ")
            };
            vec![(i + 1).to_string(), s.id.clone(), requires]
        })
        .collect();
    print_table(&["#", "STEP", "REQUIRES"], rows);
    Ok(())
}
