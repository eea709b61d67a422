use crate::pool::Dashboard;
use crate::state::{Change, DashboardState};

/// Display the dashboard in pipe mode (one stdout line per change, for scripting).
///
/// Returns once every component has stopped (the watched job completed and
/// no countdowns are running) or on Ctrl-C.
pub async fn display_dashboard_pipe(
    mut dashboard: Dashboard,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        tokio::select! {
            changes = dashboard.next_changes() => {
                let Some(changes) = changes else { break };
                for change in changes {
                    if let Some(line) = render_line(&dashboard.state, change) {
                        println!("{line}");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    dashboard.stop();
    Ok(())
}

pub fn render_line(state: &DashboardState, change: Change) -> Option<String> {
    match change {
        Change::Progress => Some(format!(
            "progress {}% {}",
            state.progress.width, state.progress.status
        )),
        Change::Countdown(slot) => state
            .countdowns
            .get(slot)
            .map(|c| format!("countdown {} {}", c.label, c.text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    #[test]
    fn lines_per_region() {
        let mut state = DashboardState::new(Some("abc123".into()), vec!["claim".into()]);
        state.apply(Event::ProgressWidth(30));
        state.apply(Event::ProgressStatus("3 of 10 transactions (30%)".into()));
        state.apply(Event::Countdown {
            slot: 0,
            text: "1d 1h 1m 1s".into(),
        });

        assert_eq!(
            render_line(&state, Change::Progress).as_deref(),
            Some("progress 30% 3 of 10 transactions (30%)")
        );
        assert_eq!(
            render_line(&state, Change::Countdown(0)).as_deref(),
            Some("countdown claim 1d 1h 1m 1s")
        );
        assert_eq!(render_line(&state, Change::Countdown(3)), None);
    }
}
