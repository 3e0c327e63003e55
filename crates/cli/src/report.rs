use chrono::SecondsFormat;
use organizer_core::events::{EventLevel, RunEvent};
use organizer_core::models::{FileRecord, MoveOutcome, MoveResult};
use organizer_core::RunReport;
use serde_json::{json, Value};
use std::collections::HashSet;

pub const DEFAULT_FIELDS: &[&str] = &["source", "status", "destination", "error"];

pub fn result_row(result: &MoveResult) -> Value {
    let error = match &result.outcome {
        MoveOutcome::Failed { error } => Some(error.message.clone()),
        MoveOutcome::Skipped { reason } => Some(reason.clone()),
        _ => None,
    };
    let keywords: Vec<Value> = result
        .entry
        .record
        .keywords
        .iter()
        .flatten()
        .map(|k| json!({ "term": k.term, "score": round(k.score) }))
        .collect();
    json!({
        "source": result.entry.record.path.to_string_lossy(),
        "status": result.outcome.label(),
        "destination": result.outcome.destination().map(|d| d.to_string_lossy().into_owned()),
        "segments": result.entry.segments,
        "size": result.entry.record.size,
        "modified": result.entry.record.modified.to_rfc3339_opts(SecondsFormat::Secs, true),
        "keywords": keywords,
        "error": error,
    })
}

pub fn report_json(report: &RunReport, fields: &[String]) -> Value {
    let rows: Vec<Value> = report.results.iter().map(result_row).collect();
    let fields: Vec<String> = if fields.is_empty() {
        DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect()
    } else {
        fields.to_vec()
    };
    json!({
        "root": report.root.to_string_lossy(),
        "dry_run": report.dry_run,
        "cancelled": report.cancelled,
        "summary": report.summary,
        "results": filter_fields(rows, &fields),
        "scan_errors": report.scan_errors,
    })
}

pub fn keyword_rows(records: &[FileRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|r| {
            let keywords: Vec<Value> = r
                .keywords
                .iter()
                .flatten()
                .map(|k| json!({ "term": k.term, "score": round(k.score) }))
                .collect();
            json!({ "file": r.file_name(), "keywords": keywords })
        })
        .collect()
}

pub fn keyword_line(record: &FileRecord) -> String {
    let terms: Vec<String> = record
        .keywords
        .iter()
        .flatten()
        .map(|k| format!("{} ({:.3})", k.term, k.score))
        .collect();
    if terms.is_empty() {
        format!("{}: -", record.file_name())
    } else {
        format!("{}: {}", record.file_name(), terms.join(", "))
    }
}

pub fn event_line(event: &RunEvent) -> String {
    let level = match event.level {
        EventLevel::Info => "INFO",
        EventLevel::Warn => "WARN",
        EventLevel::Error => "ERROR",
    };
    format!(
        "{} {:<5} {}",
        event.timestamp.format("%H:%M:%S"),
        level,
        event.message
    )
}

pub fn filter_fields(mut rows: Vec<Value>, fields: &[String]) -> Vec<Value> {
    if fields.is_empty() {
        return rows;
    }
    let want: HashSet<String> = fields.iter().map(|s| s.to_lowercase()).collect();
    for r in rows.iter_mut() {
        if let Some(obj) = r.as_object_mut() {
            obj.retain(|k, _| want.contains(&k.to_lowercase()));
        }
    }
    rows
}

fn round(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use organizer_core::events::EventKind;
    use organizer_core::models::{Keyword, MovePlanEntry};
    use std::path::PathBuf;

    fn moved() -> MoveResult {
        let mut record = FileRecord::new("/data/a.txt", 12, Utc::now());
        record.keywords = Some(vec![Keyword {
            term: "budget".into(),
            score: 0.123456,
        }]);
        MoveResult {
            entry: MovePlanEntry {
                record,
                segments: vec!["txt".into()],
            },
            outcome: MoveOutcome::Moved {
                destination: PathBuf::from("/data/txt/a.txt"),
            },
        }
    }

    #[test]
    fn row_carries_outcome_and_keywords() {
        let row = result_row(&moved());
        assert_eq!(row["status"], "moved");
        assert_eq!(row["destination"], "/data/txt/a.txt");
        assert_eq!(row["keywords"][0]["score"], 0.1235);
        assert!(row["error"].is_null());
    }

    #[test]
    fn filter_keeps_requested_fields_only() {
        let rows = filter_fields(vec![result_row(&moved())], &["Status".into(), "source".into()]);
        let obj = rows[0].as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("status"));
        assert!(obj.contains_key("source"));
    }

    #[test]
    fn keyword_line_formats_scores() {
        assert_eq!(keyword_line(&moved().entry.record), "a.txt: budget (0.123)");
        let bare = FileRecord::new("/data/b.txt", 1, Utc::now());
        assert_eq!(keyword_line(&bare), "b.txt: -");
    }

    #[test]
    fn event_line_has_level() {
        let line = event_line(&RunEvent::error(EventKind::FileOutcome, "failed a.txt: denied"));
        assert!(line.contains("ERROR failed a.txt: denied"));
    }
}
