//! Structured run events for whatever surface displays progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RunStarted,
    Notice,
    ScanIssue,
    FileOutcome,
    Cancelled,
    RunSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub kind: EventKind,
    pub message: String,
}

impl RunEvent {
    pub fn new(level: EventLevel, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            kind,
            message: message.into(),
        }
    }

    pub fn info(kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(EventLevel::Info, kind, message)
    }

    pub fn warn(kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(EventLevel::Warn, kind, message)
    }

    pub fn error(kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, kind, message)
    }
}

/// Receives events in emission order.
pub trait EventSink {
    fn emit(&mut self, event: RunEvent);
}

impl EventSink for Vec<RunEvent> {
    fn emit(&mut self, event: RunEvent) {
        self.push(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: RunEvent) {
        match event.level {
            EventLevel::Info => info!(kind = ?event.kind, "{}", event.message),
            EventLevel::Warn => warn!(kind = ?event.kind, "{}", event.message),
            EventLevel::Error => error!(kind = ?event.kind, "{}", event.message),
        }
    }
}

/// For hosts running the engine under `spawn_blocking`. Must not be used
/// from inside an async context.
impl EventSink for mpsc::Sender<RunEvent> {
    fn emit(&mut self, event: RunEvent) {
        // Receiver dropped: nobody is listening anymore, keep going.
        let _ = self.blocking_send(event);
    }
}

impl EventSink for mpsc::UnboundedSender<RunEvent> {
    fn emit(&mut self, event: RunEvent) {
        let _ = self.send(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: RunEvent) {
        (**self).emit(event);
    }
}
