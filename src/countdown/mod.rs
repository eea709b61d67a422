// countdown/mod.rs - time-left displays for fixed target instants
pub mod target;
pub mod timer;

pub use timer::{Clock, CountdownDisplay, CountdownTimer, SystemClock};
