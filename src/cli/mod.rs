mod scan;

pub use scan::*;

use crate::config::ScanConfig;
use crate::output::{self, Layout};
use anyhow::{Context, Result};
use clap::Parser;
use std::future::Future;
use std::io;
use std::process::ExitCode;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "igscan")]
#[command(about = "Look up public information about an Instagram account", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "Examples:
  igscan -u instagram
  igscan -u nasa -p
  igscan --user cristiano --post")]
struct Cli {
    /// Username of the account to scan (with or without @)
    #[arg(short, long, value_parser = parse_username)]
    user: String,
    /// Also list the account's recent posts
    #[arg(short, long)]
    post: bool,
    /// Show extra profile fields and full diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn parse_username(raw: &str) -> Result<String, String> {
    let name = raw.trim().trim_start_matches('@').trim();
    if name.is_empty() {
        return Err("username cannot be empty".to_string());
    }
    Ok(name.to_string())
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    FetchFailed,
    Cancelled,
    Crashed,
}

impl Outcome {
    pub fn exit_status(self) -> u8 {
        match self {
            Outcome::Completed | Outcome::Cancelled => 0,
            Outcome::FetchFailed | Outcome::Crashed => 1,
        }
    }
}

fn log_subscriber<W>(verbose: bool, ansi: bool, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = if verbose { "igscan=debug" } else { "igscan=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .finish()
}

fn init_tracing(verbose: bool) {
    // Colour codes only when stdout is a terminal, like the rest of the output.
    let subscriber = log_subscriber(verbose, output::is_terminal(), io::stdout);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = drive(scan(&cli), tokio::signal::ctrl_c(), cli.verbose).await;
    ExitCode::from(outcome.exit_status())
}

/// Races the scan against the interrupt signal.
///
/// If the signal handler cannot be installed the scan simply runs to the end.
async fn drive<S, I>(scan: S, interrupt: I, verbose: bool) -> Outcome
where
    S: Future<Output = Result<Outcome>>,
    I: Future<Output = io::Result<()>>,
{
    let mut out = io::stdout();
    tokio::select! {
        Ok(()) = interrupt => {
            let _ = output::print_cancelled(&mut out);
            Outcome::Cancelled
        }
        result = scan => match result {
            Ok(outcome) => outcome,
            Err(err) => {
                let _ = output::print_crash(&mut out, &err, verbose);
                Outcome::Crashed
            }
        },
    }
}

async fn scan(cli: &Cli) -> Result<Outcome> {
    let mut out = io::stdout();

    if output::is_terminal() {
        output::clear_screen(&mut out).context("Failed to clear terminal")?;
    }
    output::print_banner(&mut out).context("Failed to write banner")?;

    let config = ScanConfig::default();
    let Some(profile) = user_info(&config, &cli.user, cli.verbose, &mut out)
        .await
        .context("Failed to write profile report")?
    else {
        output::print_guidance(&mut out)?;
        return Ok(Outcome::FetchFailed);
    };

    if cli.post {
        output::print_divider(&mut out)?;
        post_info(&profile, cli.verbose, Layout::detect(), &mut out)
            .context("Failed to write post listing")?;
    }

    output::print_completion(&mut out)?;
    Ok(Outcome::Completed)
}
