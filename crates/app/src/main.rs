use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use quiz_core::QuestionId;
use services::{
    Clock, DEFAULT_SAMPLE_SIZE, PersistenceGateway, QuizLoopService, SessionError, SessionSummary,
};
use storage::Storage;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod db;
mod practice;

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "quiz=info,services=info";

#[derive(Parser)]
#[command(name = "quiz", version, about = "Question bank practice with a mistake review loop")]
struct Cli {
    /// `SQLite` database holding the saved state
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db: String,

    /// Questions per practice run
    #[arg(long, global = true, env = "QUIZ_SAMPLE_SIZE", default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace all questions with a CSV sheet
    Import {
        /// type,prompt,A,B,C,D,answer,explanation; the first row is a header
        sheet: PathBuf,
    },

    /// Replace the whole state with a JSON backup
    Restore { backup: PathBuf },

    /// Answer a random sample of questions
    Practice {
        /// Overrides --sample-size for this run
        #[arg(long)]
        size: Option<usize>,
    },

    /// Go through the current mistakes
    Review,

    /// Show progress counters
    Stats,

    /// List questions in the mistake set
    Mistakes,

    /// Remove a question from the mistake set
    Dismiss { id: QuestionId },

    /// Write a dated JSON backup
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Delete all data, or only progress with --progress
    Reset {
        #[arg(long)]
        yes: bool,

        /// Keep the questions, clear mastery and mistakes
        #[arg(long)]
        progress: bool,
    },
}

/// A valid `RUST_LOG` wins outright; otherwise log our crates at info.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing() -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

async fn open(cli: &Cli) -> anyhow::Result<QuizLoopService> {
    let db_url = db::normalize_sqlite_url(&cli.db);
    // Open + migrate SQLite here so the library crates stay free of path handling.
    db::prepare_sqlite_file(&db_url)?;
    debug!(%db_url, "opening database");
    let storage = Storage::sqlite(&db_url)
        .await
        .with_context(|| format!("opening {db_url}"))?;

    let gateway = PersistenceGateway::new(storage.kv);
    Ok(QuizLoopService::open(gateway, Clock::default())
        .await
        .with_sample_size(cli.sample_size))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut svc = open(&cli).await?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Import { sheet } => {
            let report = svc
                .import_path(&sheet)
                .await
                .with_context(|| format!("importing {}", sheet.display()))?;
            writeln!(out, "Imported {} questions.", report.imported)?;
            for skipped in &report.skipped {
                writeln!(out, "  skipped line {}: {}", skipped.line, skipped.reason)?;
            }
        }
        Commands::Restore { backup } => {
            let raw = std::fs::read_to_string(&backup)
                .with_context(|| format!("reading {}", backup.display()))?;
            let count = svc.restore_backup(&raw).await?;
            writeln!(out, "Restored {count} questions.")?;
        }
        Commands::Practice { size } => {
            if let Some(size) = size {
                svc = svc.with_sample_size(size);
            }
            match svc.start_normal() {
                Err(SessionError::Empty) => {
                    writeln!(out, "No questions yet. Import a sheet first.")?;
                    return Ok(());
                }
                other => {
                    other?;
                }
            }
            practise(&mut svc, &mut out).await?;
        }
        Commands::Review => {
            match svc.start_mistakes() {
                Err(SessionError::Empty) => {
                    writeln!(out, "No mistakes to review.")?;
                    return Ok(());
                }
                other => {
                    other?;
                }
            }
            practise(&mut svc, &mut out).await?;
        }
        Commands::Stats => {
            let dashboard = svc.dashboard();
            writeln!(out, "Questions:  {}", dashboard.total_questions)?;
            writeln!(out, "Mistakes:   {}", dashboard.mistake_count)?;
            writeln!(out, "Completion: {}%", dashboard.completion_rate)?;
            writeln!(out, "Mastered:   {}", dashboard.mastered_count)?;
            writeln!(
                out,
                "Answered:   {} ({} correct, {}%)",
                dashboard.total_answered,
                dashboard.correct_count,
                dashboard.accuracy_percent()
            )?;
        }
        Commands::Mistakes => {
            let store = svc.store();
            if store.mistake_ids().is_empty() {
                writeln!(out, "No mistakes.")?;
            }
            for question in store
                .mistake_ids()
                .iter()
                .filter_map(|id| store.get(id))
            {
                writeln!(
                    out,
                    "{}  [{}] {}",
                    question.id(),
                    question.mastery().value(),
                    question.prompt()
                )?;
            }
        }
        Commands::Dismiss { id } => {
            if !svc.dismiss_mistake(&id).await {
                bail!("{id} is not in the mistake set");
            }
            writeln!(out, "Removed {id} from mistakes.")?;
        }
        Commands::Export { out: dir } => {
            let path = svc
                .export_to(&dir)
                .with_context(|| format!("exporting to {}", dir.display()))?;
            writeln!(out, "Wrote {}", path.display())?;
        }
        Commands::Reset { yes, progress } => {
            if !yes {
                bail!("refusing to reset without --yes");
            }
            if progress {
                svc.reset_progress().await;
                writeln!(out, "Progress cleared.")?;
            } else {
                svc.clear_all().await;
                writeln!(out, "All data deleted.")?;
            }
        }
    }

    Ok(())
}

async fn practise<W: Write>(svc: &mut QuizLoopService, out: &mut W) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let summary = practice::run(svc, &mut input, out).await?;
    if let Some(summary) = summary {
        print_summary(&summary, out)?;
    }
    Ok(())
}

fn print_summary<W: Write>(summary: &SessionSummary, out: &mut W) -> io::Result<()> {
    let status = if summary.completed { "Done" } else { "Stopped" };
    writeln!(
        out,
        "{status}: {}/{} correct ({}%), {} of {} answered.",
        summary.correct,
        summary.answered,
        summary.accuracy_percent(),
        summary.answered,
        summary.total
    )
}

#[tokio::main]
async fn main() {
    if let Err(err) = init_tracing() {
        eprintln!("Error: {err:#}");
    }

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(2);
    }
}
