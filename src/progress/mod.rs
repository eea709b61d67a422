// progress/mod.rs - airdrop progress polling and its display contract
pub mod display;
pub mod poller;

pub use display::ProgressDisplay;
pub use poller::{JobId, PollTimings, ProgressPoller};
