use crate::config::AppConfig;
use crate::error::{OrganizeError, ScanError};
use crate::events::{EventKind, EventSink, RunEvent};
use crate::models::{MoveOutcome, MoveResult, RunSummary};
use crate::mover::SafeMover;
use crate::planner;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub cancelled: bool,
    /// Same order as the plan, i.e. by source file name.
    pub results: Vec<MoveResult>,
    pub scan_errors: Vec<ScanError>,
    pub summary: RunSummary,
}

/// One synchronous organize run: validate, plan, move, summarize.
///
/// Returns `Err` only for configuration problems, in which case nothing on
/// disk has been changed. Per-file failures end up in the report. Hosts that
/// need a responsive UI should call this from a worker thread.
pub fn run(
    directory: &Path,
    config: &AppConfig,
    sink: &mut dyn EventSink,
    cancel: Option<&AtomicBool>,
) -> Result<RunReport, OrganizeError> {
    let dry_run = config.safety.dry_run;
    let plan = planner::plan(directory, &config.organize, &config.scan)?;

    sink.emit(RunEvent::info(
        EventKind::RunStarted,
        format!(
            "{} {} file(s) in {}",
            if dry_run { "planning" } else { "organizing" },
            plan.entries.len(),
            plan.root.display()
        ),
    ));
    if !plan.shadowed_by_other.is_empty() {
        sink.emit(RunEvent::warn(
            EventKind::Notice,
            format!(
                "'other' is selected but these recognized types are not, so they stay in place: {}",
                plan.shadowed_by_other.join(", ")
            ),
        ));
    }
    for err in &plan.scan_errors {
        sink.emit(RunEvent::warn(EventKind::ScanIssue, err.to_string()));
    }

    let mover = SafeMover::new(config.safety.verify_copy);
    let results: Vec<MoveResult> = if dry_run {
        let planned = mover.preview(&plan.entries, &plan.root);
        for result in &planned {
            sink.emit(outcome_event(result, &plan.root));
        }
        planned
    } else {
        mover.execute_with(&plan.entries, &plan.root, cancel, |result| {
            sink.emit(outcome_event(result, &plan.root))
        })
    };

    let cancelled = cancel.map(|c| c.load(Ordering::SeqCst)).unwrap_or(false)
        && results
            .iter()
            .any(|r| matches!(r.outcome, MoveOutcome::Skipped { .. }));
    if cancelled {
        sink.emit(RunEvent::warn(
            EventKind::Cancelled,
            "run cancelled, remaining files left in place",
        ));
    }

    let summary = RunSummary::from_results(&results, plan.scan_errors.len());
    let summary_event = RunEvent::info(EventKind::RunSummary, summary_line(&summary, dry_run));
    info!("{}", summary_event.message);
    sink.emit(summary_event);

    Ok(RunReport {
        root: plan.root,
        dry_run,
        cancelled,
        results,
        scan_errors: plan.scan_errors,
        summary,
    })
}

pub fn summary_line(summary: &RunSummary, dry_run: bool) -> String {
    if dry_run {
        format!(
            "dry-run: planned={}, scan_errors={}",
            summary.planned, summary.scan_errors
        )
    } else {
        format!(
            "summary: moved={}, renamed={}, failed={}, skipped={}, scan_errors={}",
            summary.moved, summary.renamed, summary.failed, summary.skipped, summary.scan_errors
        )
    }
}

fn outcome_event(result: &MoveResult, root: &Path) -> RunEvent {
    let source = result.entry.record.file_name();
    let shown = |dest: &Path| {
        dest.strip_prefix(root)
            .unwrap_or(dest)
            .to_string_lossy()
            .replace('\\', "/")
    };
    match &result.outcome {
        MoveOutcome::Planned { destination } if *destination != result.entry.destination(root) => {
            RunEvent::info(
                EventKind::FileOutcome,
                format!("would move {} -> {} (name taken)", source, shown(destination)),
            )
        }
        MoveOutcome::Planned { destination } => RunEvent::info(
            EventKind::FileOutcome,
            format!("would move {} -> {}", source, shown(destination)),
        ),
        MoveOutcome::Moved { destination } => RunEvent::info(
            EventKind::FileOutcome,
            format!("moved {} -> {}", source, shown(destination)),
        ),
        MoveOutcome::Renamed { destination } => RunEvent::info(
            EventKind::FileOutcome,
            format!("moved {} -> {} (name taken)", source, shown(destination)),
        ),
        MoveOutcome::Failed { error } => RunEvent::error(
            EventKind::FileOutcome,
            format!("failed {}: {}", source, error.message),
        ),
        MoveOutcome::Skipped { reason } => RunEvent::warn(
            EventKind::FileOutcome,
            format!("skipped {}: {}", source, reason),
        ),
    }
}
