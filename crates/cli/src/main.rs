use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cli::overrides::SettingsArgs;
use cli::report;
use organizer_core::config::{self, AppConfig};
use organizer_core::events::{EventSink, TracingSink};
use organizer_core::planner;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Organize {
            dir,
            settings,
            dry_run,
            json,
            fields,
        } => {
            settings.apply(&mut cfg);
            if dry_run {
                cfg.safety.dry_run = true;
            }
            run_organize(cfg, dir, json, fields).await
        }
        Commands::Plan {
            dir,
            settings,
            json,
            fields,
        } => {
            settings.apply(&mut cfg);
            cfg.safety.dry_run = true;
            run_organize(cfg, dir, json, fields).await
        }
        Commands::Keywords {
            dir,
            settings,
            json,
        } => {
            settings.apply(&mut cfg);
            run_keywords(cfg, dir, json).await
        }
    }
}

#[derive(Parser)]
#[command(name = "file-organizer")]
#[command(about = "Sort a folder into type/date/size/keyword subfolders", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move eligible files into classified subfolders
    Organize {
        /// Folder to organize (only its direct children are considered)
        dir: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Plan only; nothing is created or moved
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
        /// Comma-separated fields to keep in JSON rows
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        fields: Vec<String>,
    },
    /// Show where each file would go without moving anything
    Plan {
        dir: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
        #[arg(long)]
        json: bool,
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        fields: Vec<String>,
    },
    /// Print batch TF-IDF keywords for the eligible text files
    Keywords {
        dir: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
        #[arg(long)]
        json: bool,
    },
}

async fn run_organize(cfg: AppConfig, dir: PathBuf, json: bool, fields: Vec<String>) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
            eprintln!("cancelling after the current file...");
        }
    });

    // With --json stdout is reserved for the report.
    let result = cli::run_streamed(dir.clone(), cfg, cancel, |event| {
        if json {
            TracingSink.emit(event);
        } else {
            println!("{}", report::event_line(&event));
        }
    })
    .await;
    ctrl_c.abort();
    let report = result.with_context(|| format!("organize {}", dir.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::report_json(&report, &fields))?
        );
    }
    if report.summary.failed > 0 {
        bail!("{} file(s) could not be moved", report.summary.failed);
    }
    Ok(())
}

async fn run_keywords(cfg: AppConfig, dir: PathBuf, json: bool) -> Result<()> {
    let (records, errors) = tokio::task::spawn_blocking(move || {
        planner::keywords(&dir, &cfg.organize, &cfg.scan)
    })
    .await
    .context("keyword worker panicked")??;

    for err in &errors {
        tracing::warn!("{}", err);
    }
    if json {
        let rows = report::keyword_rows(&records);
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for record in &records {
            println!("{}", report::keyword_line(record));
        }
    }
    Ok(())
}
