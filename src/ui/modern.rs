//! Full-screen terminal dashboard.
//!
//! Shows the watched airdrop as a gauge with its status line underneath, and
//! one line per countdown. The event loop uses `tokio::select!` to handle:
//! - renders coming from the poller and countdown timers
//! - keyboard input (q/ESC/Ctrl-C to quit)

use std::io;
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{Event as TermEvent, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::{Block, Gauge, Paragraph},
};
use tokio::sync::mpsc;

use crate::pool::Dashboard;
use crate::state::DashboardState;
use crate::ui::styles::DashboardStyles;

/// Display the dashboard full-screen until the user quits.
pub async fn display_dashboard_modern(
    mut dashboard: Dashboard,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, &mut dashboard).await;

    dashboard.stop();
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    result
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let styles = DashboardStyles::default();
    // Keyboard reads block, so they run on a plain OS thread and are
    // forwarded with try_send; the thread exits once the receiver is gone.
    let (key_tx, mut key_rx) = mpsc::channel(32);
    thread::spawn(move || {
        loop {
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(ev) = crossterm::event::read()
                        && key_tx.try_send(ev).is_err()
                    {
                        break;
                    }
                }
                Ok(false) => {
                    if key_tx.is_closed() {
                        break;
                    }
                }
                Err(_) => thread::sleep(Duration::from_millis(100)),
            }
        }
    });

    let mut components_done = false;
    terminal.draw(|f| render(f, &dashboard.state, &styles, components_done))?;
    loop {
        tokio::select! {
            changes = dashboard.next_changes(), if !components_done => {
                if changes.is_none() {
                    components_done = true;
                }
                terminal.draw(|f| render(f, &dashboard.state, &styles, components_done))?;
            }
            maybe_event = key_rx.recv() => {
                let Some(event) = maybe_event else { break };
                if is_quit(&event) {
                    break;
                }
                if let TermEvent::Resize(_, _) = event {
                    terminal.draw(|f| render(f, &dashboard.state, &styles, components_done))?;
                }
            }
        }
    }
    Ok(())
}

fn is_quit(event: &TermEvent) -> bool {
    let TermEvent::Key(key) = event else {
        return false;
    };
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub fn render(frame: &mut Frame, state: &DashboardState, styles: &DashboardStyles, done: bool) {
    let progress_height = if state.job_id.is_some() { 4 } else { 0 };
    let [progress_area, countdown_area, footer_area] = Layout::vertical([
        Constraint::Length(progress_height),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    if let Some(job_id) = &state.job_id {
        let [gauge_area, status_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).areas(progress_area);
        let finished = state.progress.width >= 100 && state.progress.status == "Completed";
        let gauge = Gauge::default()
            .block(Block::bordered().title(format!(" Airdrop {job_id} ")))
            .gauge_style(if finished { styles.completed } else { styles.gauge })
            .percent(u16::from(state.progress.width))
            .label(format!("{}%", state.progress.width));
        frame.render_widget(gauge, gauge_area);
        let status = Paragraph::new(state.progress.status.as_str()).style(if finished {
            styles.completed
        } else {
            styles.status
        });
        frame.render_widget(status, status_area);
    }

    let lines: Vec<Line> = state
        .countdowns
        .iter()
        .map(|c| {
            let style = if c.text == "Expired" {
                styles.expired
            } else {
                styles.countdown
            };
            Line::from(vec![
                Span::styled(format!("{}  ", c.label), styles.label),
                Span::styled(c.text.clone(), style),
            ])
        })
        .collect();
    if !lines.is_empty() {
        frame.render_widget(
            Paragraph::new(lines).block(Block::bordered().title(" Countdowns ")),
            countdown_area,
        );
    }

    let footer = if done {
        "q to quit · finished"
    } else {
        "q to quit"
    };
    frame.render_widget(Paragraph::new(footer).style(styles.footer), footer_area);
}
