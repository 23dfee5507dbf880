//! Ratatui TUI for scanning nearby networks

mod ui;

use crate::controller::{
    build_session, export::write_csv_file, ScanSession, ScannerConfig, SessionError,
    SessionSnapshot,
};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One-line message shown in the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    title: String,
    message: String,
    is_error: bool,
}

impl Notice {
    fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            is_error: false,
        }
    }

    fn error(error: &SessionError) -> Self {
        Self {
            title: error.title().to_string(),
            message: error.to_string(),
            is_error: true,
        }
    }
}

/// TUI application state
pub struct App {
    session: Arc<ScanSession>,
    config: ScannerConfig,
    snapshot: SessionSnapshot,
    selected: usize,
    notice: Option<Notice>,
    should_quit: bool,
    notice_tx: mpsc::UnboundedSender<Notice>,
    scan_task: Option<JoinHandle<()>>,
}

impl App {
    fn new(
        session: Arc<ScanSession>,
        config: ScannerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let snapshot = session.snapshot();
        let app = Self {
            session,
            config,
            snapshot,
            selected: 0,
            notice: None,
            should_quit: false,
            notice_tx,
            scan_task: None,
        };
        (app, notice_rx)
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('s') => self.start_scan(false),
            KeyCode::Char('r') => self.start_scan(true),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('c') => self.clear(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.snapshot.networks.len() {
                    self.selected += 1;
                }
            }
            _ => {}
        }
    }

    /// Run the scan on its own task so the UI keeps drawing while the radio settles
    fn start_scan(&mut self, refresh: bool) {
        if self.scan_task.as_ref().is_some_and(|task| !task.is_finished()) {
            self.notice = Some(Notice::error(&SessionError::ScanInProgress));
            return;
        }

        let session = self.session.clone();
        let notice_tx = self.notice_tx.clone();

        let handle = tokio::spawn(async move {
            let result = if refresh {
                session.refresh().await
            } else {
                session.scan().await
            };
            let notice = match result {
                Ok(summary) => Notice::info(
                    if refresh { "Refreshed" } else { "Scan Complete" },
                    format!(
                        "Found {} networks ({} open).",
                        summary.network_count, summary.open_count
                    ),
                ),
                Err(e) => Notice::error(&e),
            };
            let _ = notice_tx.send(notice);
        });

        self.scan_task = Some(handle);
    }

    fn export(&mut self) {
        let path = &self.config.export_path;
        let result = self
            .session
            .export_csv(&self.config.csv)
            .and_then(|export| write_csv_file(path, &export.bytes).map(|()| export.rows));

        self.notice = Some(match result {
            Ok(rows) => Notice::info(
                "Exported",
                format!("Saved {} networks to {}", rows, path.display()),
            ),
            Err(e) => Notice::error(&e),
        });
    }

    fn clear(&mut self) {
        self.notice = Some(match self.session.clear() {
            Ok(()) => Notice::info("Cleared", "Wi-Fi data cleared. You can scan again."),
            Err(e) => Notice::error(&e),
        });
    }

    fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        self.snapshot = snapshot;
        self.selected = self
            .selected
            .min(self.snapshot.networks.len().saturating_sub(1));
    }

    fn abort_scan(&mut self) {
        if let Some(handle) = self.scan_task.take() {
            handle.abort();
        }
    }
}

/// Run the TUI around an in-process scan session
pub async fn run_tui(config: ScannerConfig) -> Result<()> {
    let session = Arc::new(build_session(&config));
    let (mut app, notices) = App::new(session, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app, notices).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut notices: mpsc::UnboundedReceiver<Notice>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut updates = app.session.subscribe();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            break;
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key.code);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    app.abort_scan();
                    return Err(e.into());
                }
                None => break,
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                app.apply_snapshot(snapshot);
            }
            Some(notice) = notices.recv() => {
                tracing::debug!(title = %notice.title, "Status notice");
                app.notice = Some(notice);
            }
        }
    }

    app.abort_scan();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::fixture::{FixtureProbe, FixtureProvider};
    use crate::controller::test_support::fixture_config;
    use crate::controller::SessionState;
    use std::time::Duration;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn fixture_app(export_path: PathBuf) -> (App, mpsc::UnboundedReceiver<Notice>) {
        let config = fixture_config(export_path);
        let session = Arc::new(build_session(&config));
        App::new(session, config)
    }

    #[tokio::test]
    async fn test_scan_key_runs_in_background() {
        let (mut app, mut notices) = fixture_app(PathBuf::from("unused.csv"));
        let mut updates = app.session.subscribe();

        app.handle_key(KeyCode::Char('s'));
        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.title, "Scan Complete");
        assert!(!notice.is_error);

        app.apply_snapshot(updates.borrow_and_update().clone());
        assert_eq!(app.snapshot.state, SessionState::Ready);
        assert_eq!(app.snapshot.network_count, 6);
    }

    #[tokio::test]
    async fn test_refresh_before_scan_reports_error() {
        let (mut app, mut notices) = fixture_app(PathBuf::from("unused.csv"));

        app.handle_key(KeyCode::Char('r'));
        let notice = notices.recv().await.unwrap();
        assert!(notice.is_error);
        assert_eq!(notice.title, "Refresh Unavailable");
    }

    #[tokio::test]
    async fn test_export_and_clear_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("networks.csv");
        let (mut app, _notices) = fixture_app(path.clone());

        app.handle_key(KeyCode::Char('e'));
        assert_eq!(app.notice.as_ref().map(|n| n.title.as_str()), Some("No Data"));
        assert!(!path.exists());

        app.session.scan().await.unwrap();
        app.apply_snapshot(app.session.snapshot());
        app.handle_key(KeyCode::Char('e'));
        assert_eq!(app.notice.as_ref().map(|n| n.is_error), Some(false));
        assert!(app.notice.as_ref().unwrap().message.starts_with("Saved 6 networks"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 7);

        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.session.state(), SessionState::Idle);
        assert_eq!(app.notice.as_ref().map(|n| n.title.as_str()), Some("Cleared"));
    }

    #[tokio::test]
    async fn test_second_scan_key_keeps_in_flight_handle() {
        let config = fixture_config(PathBuf::from("unused.csv"));
        let slow = FixtureProvider::new(Vec::new(), Duration::from_secs(60));
        let session = Arc::new(ScanSession::new(
            Arc::new(slow),
            Arc::new(FixtureProbe::new(None)),
        ));
        let (mut app, _notices) = App::new(session, config);
        let mut updates = app.session.subscribe();

        app.handle_key(KeyCode::Char('s'));
        app.handle_key(KeyCode::Char('s'));
        assert_eq!(
            app.notice.as_ref().map(|n| n.title.as_str()),
            Some("Scan In Progress")
        );

        updates
            .wait_for(|s| s.state == SessionState::Scanning)
            .await
            .unwrap();

        let task = app.scan_task.take().unwrap();
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(app.session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_selection_stays_in_bounds() {
        let (mut app, _notices) = fixture_app(PathBuf::from("unused.csv"));
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected, 0);

        app.session.scan().await.unwrap();
        app.apply_snapshot(app.session.snapshot());
        for _ in 0..10 {
            app.handle_key(KeyCode::Char('j'));
        }
        assert_eq!(app.selected, 5);

        app.session.clear().unwrap();
        app.apply_snapshot(app.session.snapshot());
        assert_eq!(app.selected, 0);

        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
