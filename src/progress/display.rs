use crate::api::StatusResponse;

/// The two regions a progress poller is allowed to touch.
pub trait ProgressDisplay: Send + 'static {
    /// Width of the progress bar, in percent.
    fn set_bar_width(&mut self, percent: u8);
    fn set_status_text(&mut self, text: &str);
}

/// What a single status snapshot should look like on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub text: String,
}

impl ProgressView {
    pub fn completed() -> Self {
        Self {
            percent: 100,
            text: "Completed".to_string(),
        }
    }

    /// The text reports the percentage as computed; only the bar is capped.
    pub fn in_progress(completed: u64, total: u64) -> Self {
        let percent = percentage(completed, total);
        Self {
            percent: bar_width(percent),
            text: format!("{completed} of {total} transactions ({percent}%)"),
        }
    }

    pub fn from_status(status: &StatusResponse) -> Self {
        if status.is_terminal() {
            Self::completed()
        } else {
            Self::in_progress(status.completed(), status.total())
        }
    }

    pub fn render<D: ProgressDisplay + ?Sized>(&self, display: &mut D) {
        display.set_bar_width(self.percent);
        display.set_status_text(&self.text);
    }
}

/// Rounded completion percentage; zero when there is nothing to send.
///
/// Computed as `round(completed / total * 100)` in floating point, halves
/// rounding up. A backend reporting more completed than total yields more
/// than 100.
pub fn percentage(completed: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u64
}

/// Bar width for a percentage, in `0..=100`.
pub fn bar_width(percent: u64) -> u8 {
    percent.min(100) as u8
}
