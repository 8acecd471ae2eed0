//! Toast stack shown above the status bar.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{
    domain::notification::{Notification, Severity},
    tui::Frame,
};

use super::Component;

const MAX_VISIBLE: usize = 3;

struct Toast {
    notification: Notification,
    expires_at: Instant,
}

pub struct NotificationCenter {
    toasts: Vec<Toast>,
    default_dismiss: Duration,
}

impl NotificationCenter {
    pub fn new(default_dismiss: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            default_dismiss,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.push_at(notification, Instant::now());
    }

    fn push_at(&mut self, notification: Notification, now: Instant) {
        let lifetime = notification.auto_dismiss.unwrap_or(self.default_dismiss);
        self.toasts.push(Toast {
            notification,
            expires_at: now + lifetime,
        });
    }

    /// Drop expired toasts.
    pub fn tick(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    pub fn dismiss_all(&mut self) {
        self.toasts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Messages of the visible toasts, newest last.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        let skip = self.toasts.len().saturating_sub(MAX_VISIBLE);
        self.toasts.iter().skip(skip).map(|t| &t.notification)
    }

    /// Height of the visible stack.
    pub fn height(&self) -> u16 {
        self.toasts.len().min(MAX_VISIBLE) as u16 * 3
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Warning => Color::Yellow,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    }
}

impl Component for NotificationCenter {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            self.dismiss_all();
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let visible: Vec<&Notification> = self.visible().collect();
        let chunks = Layout::vertical(vec![Constraint::Length(3); visible.len()]).split(area);

        for (notification, chunk) in visible.into_iter().zip(chunks.iter()) {
            let color = severity_color(notification.severity);
            let mut spans = Vec::new();
            if let Some(icon) = &notification.icon {
                spans.push(Span::raw(format!("{} ", icon)));
            }
            spans.push(Span::styled(
                notification.message.clone(),
                Style::default().fg(color),
            ));
            let toast = Paragraph::new(Line::from(spans)).block(
                Block::default()
                    .title(notification.severity.to_string())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
            f.render_widget(Clear, *chunk);
            f.render_widget(toast, *chunk);
        }
    }
}
