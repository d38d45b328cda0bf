use rome_core::report::{RunReport, StepStatus};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Print a run report, then fail if any step did not succeed.
pub fn finish_run(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(report)?;
    } else {
        let target = match (&report.network, report.chain_id) {
            (Some(n), Some(id)) => format!(" on {n} (chain {id})"),
            (Some(n), None) => format!(" on {n}"),
            _ => String::new(),
        };
        println!("{}{target}", report.workflow);
        let rows = report
            .steps
            .iter()
            .map(|s| {
                let mut row = vec![s.status.label().to_string(), s.id.clone()];
                row.push(match &s.status {
                    StepStatus::Failed { kind, error } => format!("[{kind}] {error}"),
                    other => other.message().to_string(),
                });
                row
            })
            .collect();
        print_table(&["STATUS", "STEP", "DETAIL"], rows);
    }

    if !report.is_success() {
        let failed: Vec<&str> = report.failures().map(|s| s.id.as_str()).collect();
        if failed.is_empty() {
            anyhow::bail!("{} did not complete", report.workflow);
        }
        anyhow::bail!("{} failed at: {}", report.workflow, failed.join(", "));
    }
    Ok(())
}
