//! Application core: event loop, action dispatch, status bar and overlays.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hearthdash_core::{ConnectionState, Controller, Dashboard, DashboardModel, Mode};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::DashboardScreen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::palette::centered;

/// How long a toast stays in the status area.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Top-level application state and event loop.
pub struct App {
    controller: Controller,
    /// Where layout edits are persisted.
    layout_path: PathBuf,
    screen: DashboardScreen,
    running: bool,
    help_visible: bool,
    connection: ConnectionState,
    device_count: usize,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(controller: Controller, model: DashboardModel, layout_path: PathBuf) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            layout_path,
            screen: DashboardScreen::new(model),
            running: true,
            help_visible: false,
            connection: ConnectionState::Disconnected,
            device_count: 0,
            notification: None,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.screen.init(self.action_tx.clone())?;

        let (w, h) = tui.size().unwrap_or((80, 24));
        self.action_tx.send(Action::Resize(w, h))?;

        let bridge: JoinHandle<()> = tokio::spawn(crate::data_bridge::spawn_data_bridge(
            self.controller.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        drop(events);
        self.data_cancel.cancel();
        if let Err(e) = bridge.await {
            warn!(error = %e, "data bridge task failed");
        }

        if let Some(dashboard) = self.screen.take_unsaved() {
            self.save_layout(&dashboard);
        }

        drop(tui);
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then the screen. A screen with an open popup
    /// gets every key except Ctrl+C.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                KeyCode::Char('q') => Ok(Some(Action::Quit)),
                _ => Ok(None),
            };
        }

        if !self.screen.captures_input() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                _ => {}
            }
        }

        self.screen.handle_key_event(key)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::DevicesUpdated(snapshot) => self.device_count = snapshot.len(),

            Action::ConnectionChanged(state) => {
                debug!(?state, "connection state changed");
                match state {
                    ConnectionState::Degraded { failures }
                        if !matches!(self.connection, ConnectionState::Degraded { .. }) =>
                    {
                        self.action_tx.send(Action::Notify(Notification::warning(format!(
                            "device refresh failing ({failures}x), showing stale data"
                        ))))?;
                    }
                    _ => {}
                }
                self.connection = state.clone();
            }

            Action::Command(command) => {
                if !self.controller.dispatcher().dispatch(command.clone()) {
                    self.action_tx.send(Action::Notify(Notification::warning(format!(
                        "command for {} dropped",
                        command.device_id()
                    ))))?;
                }
            }

            Action::SaveLayout(dashboard) => {
                let notification = self.save_layout(dashboard);
                self.action_tx.send(Action::Notify(notification))?;
            }

            Action::Resize(..) | Action::Render => {}
        }

        // Propagate to the screen; it may emit a follow-up.
        if let Some(follow_up) = self.screen.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn save_layout(&self, dashboard: &Dashboard) -> Notification {
        match hearthdash_config::save_layout(&self.layout_path, dashboard) {
            Ok(()) => {
                info!(path = %self.layout_path.display(), "layout saved");
                Notification::success("Layout saved")
            }
            Err(e) => {
                warn!(error = %e, path = %self.layout_path.display(), "layout save failed");
                Notification::error(format!("Layout not saved: {e}"))
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [body, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        self.screen.render(frame, body);
        self.render_status_bar(frame, status);

        if let Some((notification, _)) = &self.notification {
            render_notification(frame, body, notification);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection = match &self.connection {
            ConnectionState::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionState::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
            ConnectionState::Degraded { failures } => Span::styled(
                format!("◐ degraded ({failures})"),
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            ConnectionState::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
        };

        let age = self
            .controller
            .registry()
            .data_age()
            .and_then(|age| age.to_std().ok())
            .map_or_else(
                || "never refreshed".to_owned(),
                |age| {
                    let secs = Duration::from_secs(age.as_secs());
                    format!("updated {} ago", humantime::format_duration(secs))
                },
            );

        let hints = match self.screen.mode() {
            Mode::View => " │ e edit  ? help  q quit",
            Mode::Edit => " │ e done  ? help  q quit",
        };

        let line = Line::from(vec![
            Span::raw(" "),
            connection,
            Span::styled(
                format!(" │ {} devices │ {age}", self.device_count),
                theme::key_hint(),
            ),
            Span::styled(hints, theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    const SECTIONS: [(&str, &[(&str, &str)]); 3] = [
        (
            "View",
            &[
                ("←/→", "Previous / next page"),
                ("Tab j/k", "Focus next / previous widget"),
                ("Enter", "Toggle switch, open color picker"),
                ("+/-", "Step dimmer level"),
                ("e", "Edit layout"),
            ],
        ),
        (
            "Edit",
            &[
                ("hjkl", "Move widget"),
                ("HJKL", "Resize widget"),
                ("a / x", "Add / remove widget"),
                ("n / d", "Add / remove page"),
                ("e Esc", "Done (saves layout)"),
            ],
        ),
        (
            "Global",
            &[("?", "Toggle this help"), ("q Ctrl+C", "Quit")],
        ),
    ];

    let mut lines = Vec::new();
    for (title, keys) in SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::NEON_CYAN),
        )));
        for (key, label) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(*label, theme::key_hint()),
            ]));
        }
    }

    let height = u16::try_from(lines.len() + 3).unwrap_or(u16::MAX);
    let help_area = centered(area, 52, height);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16.min(area.height);

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 1);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
