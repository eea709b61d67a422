use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("airdrop-watch/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

/// Status value the backend reports once every transaction has been handled.
pub const TERMINAL_STATUS: &str = "completed";

/// Snapshot of an airdrop job as reported by `GET /api/airdrops/{id}/status`.
///
/// Every field is optional on the wire; missing counts read as zero and a
/// missing status reads as "in progress". The remaining fields are only
/// logged, so they are kept as whatever JSON the backend sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub status: Option<String>,
    pub total: Option<u64>,
    pub completed: Option<u64>,
    pub success: Option<Value>,
    pub failed: Option<Value>,
    pub airdrop_id: Option<Value>,
    pub progress_percentage: Option<Value>,
}

impl StatusResponse {
    pub fn is_terminal(&self) -> bool {
        self.status.as_deref() == Some(TERMINAL_STATUS)
    }

    pub fn total(&self) -> u64 {
        self.total.unwrap_or(0)
    }

    pub fn completed(&self) -> u64 {
        self.completed.unwrap_or(0)
    }
}

/// Body of a failed `POST /api/airdrop/{id}/process`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessResponse {
    pub error: Option<String>,
}

/// Result of asking the backend to start processing an airdrop.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Started,
    Rejected {
        status: StatusCode,
        error: Option<String>,
    },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(String),
}

pub(crate) fn http_client() -> Client {
    HTTP_CLIENT.clone()
}
