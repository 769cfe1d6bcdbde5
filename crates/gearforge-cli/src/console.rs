//! Colorful console output for search events.
//!
//! A `tracing` layer that turns the solver's structured events into one
//! line each.
//!
//! ## Log Levels
//!
//! - **INFO**: search and partition lifecycle
//! - **DEBUG**: periodic progress
//! - **TRACE**: accepted candidates

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

const DEFAULT_FILTER: &str = "gearforge_solver=info";

/// Installs the console layer; only the first call has effect.
///
/// `RUST_LOG` overrides the default `gearforge_solver=info` filter.
pub fn init(verbose: bool) {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if verbose {
                "gearforge_solver=debug"
            } else {
                DEFAULT_FILTER
            })
        });
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SearchConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |e| e.elapsed().as_secs_f64())
}

/// A tracing layer that formats search events with colors.
pub struct SearchConsoleLayer;

impl<S: Subscriber> Layer<S> for SearchConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("gearforge_solver") {
            return;
        }
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    mode: Option<String>,
    outcome: Option<String>,
    candidate_count: Option<String>,
    partition: Option<String>,
    best_score: Option<String>,
    message: Option<String>,
    workers: Option<u64>,
    worker_id: Option<u64>,
    partitions: Option<u64>,
    checked: Option<u64>,
    sp_feasible: Option<u64>,
    accepted: Option<u64>,
    lost_partitions: Option<u64>,
    duration_ms: Option<u64>,
    speed: Option<u64>,
    completed: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "mode" => self.mode = Some(s),
            "outcome" => self.outcome = Some(s),
            "candidate_count" => self.candidate_count = Some(s),
            "partition" => self.partition = Some(s),
            "best_score" => self.best_score = Some(s),
            "message" => self.message = Some(s),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "mode" => self.mode = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "workers" => self.workers = Some(value),
            "worker_id" => self.worker_id = Some(value),
            "partitions" => self.partitions = Some(value),
            "checked" => self.checked = Some(value),
            "sp_feasible" => self.sp_feasible = Some(value),
            "accepted" => self.accepted = Some(value),
            "lost_partitions" => self.lost_partitions = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "speed" => self.speed = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "completed" {
            self.completed = Some(value);
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "search_start" => format_search_start(v),
        "search_end" => format_search_end(v),
        "partition_end" => format_partition_end(v),
        "progress" => format_progress(v),
        "worker_failed" | "worker_lost" => format_worker_failure(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs()).bright_black().to_string()
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_search_start(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Searching │ {} candidates │ {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        v.candidate_count.as_deref().unwrap_or("?").bright_yellow(),
        v.mode.as_deref().unwrap_or("parallel").white().bold(),
    );
    if let Some(workers) = v.workers {
        output.push_str(&format!(
            " │ {} workers │ {} partitions",
            workers.bright_yellow(),
            count(v.partitions).bright_yellow()
        ));
    }
    output
}

fn format_search_end(v: &EventVisitor) -> String {
    let outcome = v.outcome.as_deref().unwrap_or("unknown");
    let status = if outcome == "found" {
        outcome.bright_green().bold().to_string()
    } else {
        outcome.bright_red().bold().to_string()
    };
    let mut output = format!(
        "{} {} Search complete │ {} │ {} checked │ {}/s │ best {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        status,
        count(v.checked).white(),
        count(v.speed).bright_magenta().bold(),
        v.best_score.as_deref().unwrap_or("None"),
    );
    if let Some(lost) = v.lost_partitions.filter(|&l| l > 0) {
        output.push_str(&format!(" │ {} lost partitions", lost.bright_red()));
    }
    output
}

fn format_partition_end(v: &EventVisitor) -> String {
    let marker = if v.completed.unwrap_or(true) {
        "◀".bright_blue().to_string()
    } else {
        "◀".yellow().to_string()
    };
    format!(
        "{} {} worker {} │ {} │ {} checked │ {}",
        format_elapsed(),
        marker,
        v.worker_id.unwrap_or(0),
        v.partition.as_deref().unwrap_or("None").white(),
        count(v.checked),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_progress(v: &EventVisitor) -> String {
    format!(
        "{} {} {:>12} checked │ {:>10} feasible │ best {}",
        format_elapsed(),
        "⚡".bright_cyan(),
        count(v.checked).white(),
        count(v.sp_feasible).bright_magenta(),
        v.best_score.as_deref().unwrap_or("None"),
    )
}

fn format_worker_failure(v: &EventVisitor) -> String {
    format!(
        "{} {} worker {} failed on {} │ {}",
        format_elapsed(),
        "✖".bright_red().bold(),
        v.worker_id.unwrap_or(0),
        v.partition.as_deref().unwrap_or("None"),
        v.message.as_deref().unwrap_or("thread exited"),
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.2}s", ms as f64 / 1000.0)
    }
}
