//! TUI rendering

use super::App;
use crate::controller::{NetworkRecord, SessionState, SignalTier};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

const PRIMARY: Color = Color::Rgb(14, 161, 251);
const ACCENT: Color = Color::Rgb(72, 215, 251);
const BG_DARK: Color = Color::Rgb(7, 12, 25);
const ROW_EVEN: Color = Color::Rgb(24, 30, 44);
const ERROR: Color = Color::Rgb(233, 74, 87);
const SUCCESS: Color = Color::Rgb(74, 222, 128);
const WARNING: Color = Color::Rgb(239, 190, 29);

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();
    f.render_widget(Block::default().style(Style::default().bg(BG_DARK)), size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(2), // Scan info
            Constraint::Min(5),    // Network table
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_info(f, chunks[1], app);
    draw_network_table(f, chunks[2], app);
    draw_status_bar(f, chunks[3], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let (label, color) = match app.snapshot.state {
        SessionState::Idle => ("IDLE", Color::Gray),
        SessionState::Scanning => ("SCANNING...", WARNING),
        SessionState::Ready => ("READY", SUCCESS),
        SessionState::Cleared => ("CLEARED", Color::Gray),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "WI-FI NETWORK SCANNER",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  ::  "),
        Span::styled(
            app.session.provider_name(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("    "),
        Span::styled(format!("[ {} ]", label), Style::default().fg(color)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PRIMARY)),
    );

    f.render_widget(header, area);
}

fn draw_info(f: &mut Frame, area: Rect, app: &App) {
    let info = Paragraph::new(vec![
        Line::from(Span::styled(
            app.snapshot.last_scan_text(),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            app.snapshot.connected_text(),
            Style::default().fg(Color::White),
        )),
    ]);

    f.render_widget(info, area);
}

fn draw_network_table(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!(" NETWORKS ({}) ", app.snapshot.network_count))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PRIMARY));

    if app.snapshot.networks.is_empty() {
        let hint = if app.snapshot.state == SessionState::Scanning {
            "Waiting for the radio to collect results..."
        } else {
            "No networks to show. Press [S] to scan."
        };
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["SSID", "Signal", "Security"])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app.snapshot.networks.iter().map(network_row).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Length(20),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn network_row(network: &NetworkRecord) -> Row<'static> {
    let tier = network.signal_tier();
    let bars = usize::from(tier.bars());
    let signal = Line::from(vec![
        Span::raw(format!("{:>8} ", network.signal_display())),
        Span::styled("█".repeat(bars), Style::default().fg(tier_color(tier))),
        Span::styled("░".repeat(5 - bars), Style::default().fg(Color::DarkGray)),
    ]);

    let security = if network.is_open_warning() {
        Cell::from(format!("{} ⭐", network.security())).style(Style::default().fg(WARNING))
    } else {
        Cell::from(network.security().to_string())
    };

    let background = if network.is_even_row() { ROW_EVEN } else { BG_DARK };

    Row::new(vec![
        Cell::from(network.ssid().to_string()),
        Cell::from(signal),
        security,
    ])
    .style(Style::default().fg(Color::White).bg(background))
}

fn tier_color(tier: SignalTier) -> Color {
    match tier {
        SignalTier::Excellent | SignalTier::Good => SUCCESS,
        SignalTier::Fair => WARNING,
        SignalTier::Poor => ERROR,
        SignalTier::Unusable => Color::DarkGray,
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.notice {
        Some(notice) => Line::from(vec![
            Span::styled(
                format!("{}: ", notice.title),
                Style::default()
                    .fg(if notice.is_error { ERROR } else { SUCCESS })
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(notice.message.clone(), Style::default().fg(Color::White)),
        ]),
        None => Line::from(Span::styled(
            format!("Found {} networks.", app.snapshot.network_count),
            Style::default().fg(Color::White),
        )),
    };

    let help = Line::from(Span::styled(
        "[S] Scan   [R] Refresh   [E] Export CSV   [C] Clear   [↑/↓] Select   [Q] Quit",
        Style::default().fg(Color::DarkGray),
    ));

    let bar = Paragraph::new(vec![line, help]).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(PRIMARY)),
    );

    f.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::build_session;
    use crate::controller::test_support::fixture_config;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_draws_empty_then_populated_table() {
        let config = fixture_config(PathBuf::from("unused.csv"));
        let session = Arc::new(build_session(&config));
        let (mut app, _notices) = App::new(session, config);

        let screen = render(&app);
        assert!(screen.contains("Last scanned: Never"));
        assert!(screen.contains("No networks to show"));
        assert!(screen.contains("Found 0 networks."));

        app.session.scan().await.unwrap();
        app.apply_snapshot(app.session.snapshot());

        let screen = render(&app);
        assert!(screen.contains("Connected to: CU_WiFi"));
        assert!(screen.contains("NETWORKS (6)"));
        assert!(screen.contains("<Hidden>"));
        assert!(screen.contains("dBm"));
        assert!(screen.contains("[ READY ]"));
    }
}
