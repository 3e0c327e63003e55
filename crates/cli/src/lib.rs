pub mod overrides;
pub mod report;

use anyhow::{Context, Result};
use organizer_core::config::AppConfig;
use organizer_core::events::RunEvent;
use organizer_core::{pipeline, RunReport};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::mpsc;

const EVENT_BUFFER: usize = 64;

/// Runs the engine on a blocking worker and hands every event to
/// `on_event` as it arrives. Setting `cancel` stops the run after the
/// file currently being moved.
pub async fn run_streamed<F>(
    directory: PathBuf,
    cfg: AppConfig,
    cancel: Arc<AtomicBool>,
    mut on_event: F,
) -> Result<RunReport>
where
    F: FnMut(RunEvent),
{
    let (tx, mut rx) = mpsc::channel::<RunEvent>(EVENT_BUFFER);
    let worker = tokio::task::spawn_blocking(move || {
        let mut sink = tx;
        pipeline::run(&directory, &cfg, &mut sink, Some(cancel.as_ref()))
    });

    // Channel closes when the worker drops its sender.
    while let Some(event) = rx.recv().await {
        on_event(event);
    }

    let report = worker.await.context("organize worker panicked")??;
    Ok(report)
}
