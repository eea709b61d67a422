// api/mod.rs - airdrop dashboard REST client
pub mod client;
pub mod types;

pub use client::{AirdropClient, StatusSource};
pub use types::{ProcessOutcome, StatusResponse};
