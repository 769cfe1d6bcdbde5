//! Result table rendering.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;

use gearforge::{Attribute, SearchOutcome, SearchResult, Slot};

/// Renders the top-K table and a one-line summary.
pub fn render(result: &SearchResult) -> String {
    let mut out = String::new();
    let totals = &result.statistics.totals;
    out.push_str(&format!(
        "{} │ {} of {} candidates checked │ {} feasible │ {} accepted\n",
        outcome_label(result.outcome),
        totals.checked.to_formatted_string(&Locale::en),
        result.candidate_count,
        totals.sp_feasible.to_formatted_string(&Locale::en),
        totals.accepted.to_formatted_string(&Locale::en),
    ));
    if !result.lost_partitions.is_empty() {
        out.push_str(&format!(
            "{} {} partitions were lost; results are partial\n",
            "!".bright_red().bold(),
            result.lost_partitions.len()
        ));
    }

    for (rank, candidate) in result.top.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!(
            "{} {}  {}\n",
            format!("#{}", rank + 1).bright_cyan().bold(),
            format!("{:.2}", candidate.score).bright_yellow().bold(),
            format!("level {}", candidate.level).bright_black(),
        ));
        for slot in Slot::ALL {
            out.push_str(&format!("  {:<11}{}\n", slot.to_string(), candidate.item(slot)));
        }
        let assigned: Vec<String> = Attribute::ALL
            .iter()
            .map(|&a| format!("{} {}", a.short_name(), candidate.assignment[a]))
            .collect();
        out.push_str(&format!(
            "  {:<11}{} ({} of budget)\n",
            "skill pts",
            assigned.join(" / "),
            candidate.assigned_sp
        ));
    }
    out
}

fn outcome_label(outcome: SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Found => "FOUND".bright_green().bold().to_string(),
        SearchOutcome::Cancelled => "CANCELLED".yellow().bold().to_string(),
        SearchOutcome::NoBuildsMetThresholds => "NO BUILDS MET THRESHOLDS".bright_red().bold().to_string(),
        SearchOutcome::SpInfeasible => "SKILL POINTS INFEASIBLE".bright_red().bold().to_string(),
    }
}
