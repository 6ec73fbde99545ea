//! Final run report rendering. Pure functions of the finished outcomes.

use serde::Serialize;

use crate::accumulator::OutcomeRecord;
use crate::orchestrator::{RunMode, RunReport};

const LIVE_HEAD: [&str; 4] = ["repo", "branch", "tag", "status"];
const CHECK_HEAD: [&str; 5] = ["repo", "branch", "dev keys", "locale keys", "log diff"];

/// `"<n> commit(s)"`, or `"up-to-date"` when nothing is pending.
pub fn diff_summary(diff: u32) -> String {
    if diff == 0 {
        "up-to-date".to_string()
    } else {
        format!("{diff} commit(s)")
    }
}

fn changes_label(changed: bool) -> &'static str {
    if changed {
        "changes"
    } else {
        "no changes"
    }
}

/// Rows of the live report: repo, branch, tag, status.
pub fn live_rows(records: &[OutcomeRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.repo.clone(),
                r.branch.clone(),
                r.tag_str().to_string(),
                r.status.to_string(),
            ]
        })
        .collect()
}

/// Rows of the check report: repo, branch, dev changes, locale changes, diff.
pub fn check_rows(records: &[OutcomeRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.repo.clone(),
                r.branch.clone(),
                changes_label(r.changes.dev).to_string(),
                changes_label(r.changes.locale).to_string(),
                diff_summary(r.changes.diff),
            ]
        })
        .collect()
}

pub fn render_live(records: &[OutcomeRecord]) -> String {
    render_table(&LIVE_HEAD, &live_rows(records))
}

pub fn render_check(records: &[OutcomeRecord]) -> String {
    render_table(&CHECK_HEAD, &check_rows(records))
}

/// Table for whichever mode produced `report`.
pub fn render(report: &RunReport) -> String {
    match report.mode {
        RunMode::Live => render_live(report.outcomes.records()),
        RunMode::Check => render_check(report.outcomes.records()),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mode: &'static str,
    repositories: &'a [OutcomeRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    qa_bumped: Option<&'a str>,
}

/// Machine-readable report.
pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    let doc = JsonReport {
        mode: match report.mode {
            RunMode::Live => "live",
            RunMode::Check => "check",
        },
        repositories: report.outcomes.records(),
        qa_bumped: report.qa_bump.as_ref().map(|plan| plan.repo.as_str()),
    };
    serde_json::to_string_pretty(&doc)
}

/// Box-drawn table with one space of padding per cell.
pub fn render_table(head: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = head.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = rule(&widths, '┌', '┬', '┐');
    out.push_str(&table_row(&widths, head));
    out.push_str(&rule(&widths, '├', '┼', '┤'));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&table_row(&widths, &cells));
    }
    out.push_str(&rule(&widths, '└', '┴', '┘'));
    out
}

fn rule(widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            line.push(mid);
        }
        line.push_str(&"─".repeat(w + 2));
    }
    line.push(right);
    line.push('\n');
    line
}

fn table_row(widths: &[usize], cells: &[&str]) -> String {
    let mut line = String::from("│");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).copied().unwrap_or("");
        let pad = w.saturating_sub(cell.chars().count());
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 1));
        line.push('│');
    }
    line.push('\n');
    line
}
