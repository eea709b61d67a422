mod admin;
mod api;
mod countdown;
mod event;
mod pool;
mod progress;
mod state;
mod timer;
mod ui;

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::admin::{AdminResult, confirm_on_terminal, process_airdrop};
use crate::api::AirdropClient;
use crate::countdown::SystemClock;
use crate::pool::{CountdownSpec, Dashboard, WatchedJob};
use crate::progress::{JobId, PollTimings};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    #[command(subcommand)]
    command: Command,
    /// Dashboard base URL. Falls back to AIRDROP_BASE_URL, then http://127.0.0.1:5000
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Session cookie sent with every request (e.g. "session=...").
    /// Falls back to AIRDROP_SESSION_COOKIE
    #[arg(long, global = true)]
    session_cookie: Option<String>,
    /// Print one line per change to stdout instead of the full-screen view
    #[arg(long, global = true)]
    pipe: bool,
    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug_log: bool,
    /// Delay between status requests while an airdrop is in progress
    #[arg(long, global = true, value_name = "MS", default_value_t = 3000)]
    poll_interval_ms: u64,
    /// Delay before retrying a failed status request
    #[arg(long, global = true, value_name = "MS", default_value_t = 5000)]
    retry_interval_ms: u64,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Follow the progress of an airdrop until it completes
    Watch {
        job_id: String,
        /// Extra countdown to show alongside the progress
        #[arg(long = "countdown", value_name = "[LABEL=]TIMESTAMP")]
        countdowns: Vec<String>,
    },
    /// Show the time left until one or more instants
    Countdown {
        #[arg(required = true, value_name = "[LABEL=]TIMESTAMP")]
        targets: Vec<String>,
    },
    /// Start sending tokens for an airdrop
    Process {
        job_id: String,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
        /// Watch the airdrop's progress once processing has started
        #[arg(long)]
        watch: bool,
    },
}

impl Config {
    fn timings(&self) -> PollTimings {
        PollTimings {
            interval: Duration::from_millis(self.poll_interval_ms),
            retry: Duration::from_millis(self.retry_interval_ms),
        }
    }
}

fn settings_from_env_if_empty(cli: &mut Config) {
    if cli.base_url.is_none() {
        cli.base_url = read_env("AIRDROP_BASE_URL");
    }
    if cli.session_cookie.is_none() {
        cli.session_cookie = read_env("AIRDROP_SESSION_COOKIE");
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn init_logging(cfg: &Config) {
    // the full-screen view owns the terminal, so it stays quiet unless asked
    let full_screen = !cfg.pipe && !matches!(cfg.command, Command::Process { watch: false, .. });
    let default_filter = if cfg.debug_log {
        "airdrop_watch=debug"
    } else if full_screen {
        "off"
    } else {
        "airdrop_watch=warn"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_dashboard(
    cfg: &Config,
    client: AirdropClient,
    job_id: Option<JobId>,
    countdown_args: &[String],
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let specs: Vec<CountdownSpec> = countdown_args
        .iter()
        .map(|arg| CountdownSpec::parse_arg(arg))
        .collect();
    let job = job_id.map(|job_id| WatchedJob {
        job_id,
        source: Arc::new(client),
        timings: cfg.timings(),
    });
    let dashboard = Dashboard::start(job, &specs, Arc::new(SystemClock));

    if cfg.pipe {
        crate::ui::pipe::display_dashboard_pipe(dashboard).await
    } else {
        crate::ui::modern::display_dashboard_modern(dashboard).await
    }
}

/// Print the outcome of the process action and pick the exit status.
fn report_process(result: &AdminResult) -> ExitCode {
    let message = result.message().unwrap_or_default();
    match result {
        AdminResult::Declined => ExitCode::SUCCESS,
        AdminResult::Started => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        AdminResult::Failed(_) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: Config) -> Result<ExitCode, Box<dyn Error + Send + Sync>> {
    let base_url = cfg.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let client = AirdropClient::new(base_url)?.with_session_cookie(cfg.session_cookie.clone());

    match &cfg.command {
        Command::Watch { job_id, countdowns } => {
            let job_id = JobId::new(job_id.as_str())?;
            run_dashboard(&cfg, client, Some(job_id), countdowns).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Countdown { targets } => {
            run_dashboard(&cfg, client, None, targets).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Process { job_id, yes, watch } => {
            let job_id = JobId::new(job_id.as_str())?;
            let yes = *yes;
            let result = process_airdrop(&client, &job_id, |prompt| {
                yes || confirm_on_terminal(prompt)
            })
            .await;
            let code = report_process(&result);
            if result == AdminResult::Started && *watch {
                run_dashboard(&cfg, client, Some(job_id), &[]).await?;
            }
            Ok(code)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut cfg = Config::parse();
    settings_from_env_if_empty(&mut cfg);
    init_logging(&cfg);

    match run(cfg).await {
        Ok(code) => code,
        Err(e) => {
            // Print error for better diagnostics
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_watch_with_countdowns() {
        let cfg = Config::parse_from([
            "airdrop-watch",
            "--pipe",
            "watch",
            "abc123",
            "--countdown",
            "claim=2030-01-01T00:00:00Z",
            "--poll-interval-ms",
            "1000",
        ]);
        assert!(cfg.pipe);
        assert_eq!(cfg.timings().interval, Duration::from_millis(1000));
        assert_eq!(cfg.timings().retry, Duration::from_millis(5000));
        match cfg.command {
            Command::Watch { job_id, countdowns } => {
                assert_eq!(job_id, "abc123");
                assert_eq!(countdowns, vec!["claim=2030-01-01T00:00:00Z"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn countdown_requires_a_target() {
        assert!(Config::try_parse_from(["airdrop-watch", "countdown"]).is_err());
    }

    #[test]
    fn failed_process_exits_non_zero() {
        let failed = AdminResult::Failed("Error: Airdrop is not pending".into());
        assert_eq!(report_process(&failed), ExitCode::FAILURE);
        assert_eq!(report_process(&AdminResult::Started), ExitCode::SUCCESS);
        assert_eq!(report_process(&AdminResult::Declined), ExitCode::SUCCESS);
    }

    #[test]
    fn process_flags() {
        let cfg = Config::parse_from(["airdrop-watch", "process", "7", "--yes", "--watch"]);
        assert!(matches!(
            cfg.command,
            Command::Process { ref job_id, yes: true, watch: true } if job_id == "7"
        ));
    }
}
