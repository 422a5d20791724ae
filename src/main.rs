//! ntfy-approve CLI - phone approval for agent permission prompts.
//!
//! This is the main binary entry point. See the `ntfy_approve` library
//! for the core functionality.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use ntfy_approve::{approval, CliOverrides, Config, Credentials, ExitCleanup};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

/// Global allocator configured per M-MIMALLOC-APPS guideline.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Log file override.
const ENV_LOG_FILE: &str = "NTFY_APPROVE_LOG_FILE";

// CLI
#[derive(Parser)]
#[command(name = "ntfy-approve")]
#[command(version)]
#[command(about = "Approve or deny agent tool calls from your phone via ntfy")]
struct Cli {
    /// Path to the ntfy credential file [default: ~/.config/ntfy/credentials]
    #[arg(long, global = true)]
    credentials: Option<String>,
    /// Seconds to wait for a decision from the phone [default: 120]
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Seconds between polls of the response topic [default: 3]
    #[arg(long, global = true)]
    poll_interval: Option<u64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as a permission-request hook (default): tool call JSON on stdin
    Hook,
    /// Print the effective settings and credential file (password hidden)
    Config,
}

/// Log destination: `NTFY_APPROVE_LOG_FILE`, else next to the credential file.
///
/// Stdout belongs to the hook protocol, so logging never goes there.
fn log_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_LOG_FILE) {
        return Some(PathBuf::from(path));
    }
    Credentials::default_path().map(|p| p.with_file_name("ntfy-approve.log"))
}

fn init_logging() {
    let target: Box<dyn io::Write + Send> = match log_path()
        .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok())
    {
        Some(file) => Box::new(file),
        None => Box::new(io::sink()),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .format_timestamp_secs()
        .init();
}

/// Hook mode. Every failure ends here as a log line and exit status 0,
/// leaving the terminal prompt to answer.
fn run_hook(config: &Config) {
    if atty::is(atty::Stream::Stdin) {
        log::info!("stdin is a terminal, no hook input to read");
        return;
    }

    let cleanup = ExitCleanup::new();
    if let Err(e) = cleanup.exit_on_signal() {
        log::warn!("{e:#}");
    }
    // Normal-exit path: delete the prompt unless the phone answered
    let _on_exit = scopeguard::guard(cleanup.clone(), |cleanup| cleanup.run());

    if let Err(e) = approval::run(config, io::stdin().lock(), io::stdout().lock(), &cleanup) {
        log::warn!("Hook exited without a decision: {e:#}");
    }
}

fn print_config(config: &Config) -> Result<()> {
    let credentials = match Credentials::load(&config.credentials_path) {
        Ok(creds) => serde_json::to_value(&creds)?,
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    };
    let report = serde_json::json!({
        "config": config,
        "credentials": credentials,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::load(&CliOverrides {
        credentials: cli.credentials,
        timeout_secs: cli.timeout,
        poll_interval_secs: cli.poll_interval,
    });

    match cli.command.unwrap_or(Commands::Hook) {
        Commands::Hook => run_hook(&config),
        Commands::Config => print_config(&config)?,
    }

    Ok(())
}
