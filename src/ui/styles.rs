use ratatui::style::{Color, Modifier, Style};

pub struct DashboardStyles {
    pub gauge: Style,
    pub completed: Style,
    pub status: Style,
    pub label: Style,
    pub countdown: Style,
    pub expired: Style,
    pub footer: Style,
}

impl Default for DashboardStyles {
    fn default() -> Self {
        Self {
            gauge: Style::default().fg(Color::Cyan).bg(Color::Black),
            completed: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            status: Style::default(),
            label: Style::default().add_modifier(Modifier::BOLD),
            countdown: Style::default().fg(Color::Yellow),
            expired: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::DIM),
            footer: Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        }
    }
}
