// state.rs: what the dashboard currently shows

use crate::event::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRegion {
    pub width: u8,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownRegion {
    pub label: String,
    pub text: String,
}

/// Which part of the dashboard an event touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Progress,
    Countdown(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub job_id: Option<String>,
    pub progress: ProgressRegion,
    pub countdowns: Vec<CountdownRegion>,
    pub version: u64, // Incremented on any visible change
}

impl DashboardState {
    pub fn new(job_id: Option<String>, labels: Vec<String>) -> Self {
        Self {
            job_id,
            progress: ProgressRegion::default(),
            countdowns: labels
                .into_iter()
                .map(|label| CountdownRegion {
                    label,
                    text: String::new(),
                })
                .collect(),
            version: 0,
        }
    }

    /// Apply one display mutation. Returns `None` when nothing visible
    /// changed (same value re-rendered, or an unknown countdown slot).
    pub fn apply(&mut self, event: Event) -> Option<Change> {
        let change = match event {
            Event::ProgressWidth(width) => {
                let width = width.min(100);
                if self.progress.width == width {
                    return None;
                }
                self.progress.width = width;
                Change::Progress
            }
            Event::ProgressStatus(status) => {
                if self.progress.status == status {
                    return None;
                }
                self.progress.status = status;
                Change::Progress
            }
            Event::Countdown { slot, text } => {
                let region = self.countdowns.get_mut(slot)?;
                if region.text == text {
                    return None;
                }
                region.text = text;
                Change::Countdown(slot)
            }
        };
        self.version += 1;
        Some(change)
    }
}
