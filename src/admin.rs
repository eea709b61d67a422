//! Admin action: start processing an airdrop.
//!
//! Processing sends tokens to every registered wallet, so the action asks
//! for confirmation first. The messages match the ones the dashboard shows.

use std::io::{self, BufRead, Write};

use tracing::{error, info, warn};

use crate::api::{AirdropClient, ProcessOutcome};
use crate::progress::JobId;

pub const CONFIRM_PROMPT: &str = "Are you sure you want to process this airdrop? This will send tokens to all registered wallets.";
pub const STARTED_MESSAGE: &str = "Airdrop process started successfully!";
pub const FALLBACK_ERROR: &str = "Failed to process airdrop";
pub const TRANSPORT_MESSAGE: &str = "An error occurred while processing the airdrop.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminResult {
    Declined,
    Started,
    Failed(String),
}

impl AdminResult {
    pub fn message(&self) -> Option<&str> {
        match self {
            AdminResult::Declined => None,
            AdminResult::Started => Some(STARTED_MESSAGE),
            AdminResult::Failed(msg) => Some(msg.as_str()),
        }
    }
}

/// Confirm, then ask the backend to process `job_id`.
pub async fn process_airdrop<F>(
    client: &AirdropClient,
    job_id: &JobId,
    confirm: F,
) -> AdminResult
where
    F: FnOnce(&str) -> bool,
{
    if !confirm(CONFIRM_PROMPT) {
        info!(job = %job_id, "airdrop processing declined");
        return AdminResult::Declined;
    }

    match client.process(job_id.as_str()).await {
        Ok(ProcessOutcome::Started) => {
            info!(job = %job_id, "airdrop processing started");
            AdminResult::Started
        }
        Ok(ProcessOutcome::Rejected { status, error }) => {
            warn!(job = %job_id, %status, error = ?error, "airdrop processing rejected");
            AdminResult::Failed(format!(
                "Error: {}",
                error.as_deref().unwrap_or(FALLBACK_ERROR)
            ))
        }
        Err(err) => {
            error!(job = %job_id, error = %err, "error processing airdrop");
            AdminResult::Failed(TRANSPORT_MESSAGE.to_string())
        }
    }
}

/// Ask on the terminal; anything but "y"/"yes" declines.
pub fn confirm_on_terminal(prompt: &str) -> bool {
    let mut stdout = io::stdout();
    if write!(stdout, "{prompt} [y/N] ").and_then(|_| stdout.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
