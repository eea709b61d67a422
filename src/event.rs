// event.rs: display mutations forwarded from components to the UI loop

use tokio::sync::mpsc;

use crate::countdown::CountdownDisplay;
use crate::progress::ProgressDisplay;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ProgressWidth(u8),
    ProgressStatus(String),
    Countdown { slot: usize, text: String },
}

/// Progress display backed by the UI event channel.
///
/// Sends are fire-and-forget: once the UI has gone away there is nobody left
/// to render for, and the component keeps running until its handle drops.
#[derive(Debug, Clone)]
pub struct ChannelProgressDisplay {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelProgressDisplay {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }
}

impl ProgressDisplay for ChannelProgressDisplay {
    fn set_bar_width(&mut self, percent: u8) {
        let _ = self.tx.send(Event::ProgressWidth(percent));
    }

    fn set_status_text(&mut self, text: &str) {
        let _ = self.tx.send(Event::ProgressStatus(text.to_string()));
    }
}

/// One countdown line, identified by its slot in the dashboard.
#[derive(Debug, Clone)]
pub struct ChannelCountdownDisplay {
    slot: usize,
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelCountdownDisplay {
    pub fn new(slot: usize, tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { slot, tx }
    }
}

impl CountdownDisplay for ChannelCountdownDisplay {
    fn set_text(&mut self, text: &str) {
        let _ = self.tx.send(Event::Countdown {
            slot: self.slot,
            text: text.to_string(),
        });
    }
}
