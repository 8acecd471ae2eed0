//! Generic form view over a [`FormEngine`].

use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use crossterm::event::{KeyCode, KeyEvent};
use futures::FutureExt;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    action::Action,
    domain::{
        field::InputKind,
        form::{FormEngine, FormValues, SubmitOutcome},
        notification::Notification,
    },
    tui::Frame,
};

use super::Component;

/// Builds the action sent for a valid submit.
pub type OnSubmit = fn(FormValues) -> Action;

pub struct FormComponent {
    action_tx: UnboundedSender<Action>,
    pub engine: FormEngine,
    pub title: String,
    pub submit_label: String,
    on_submit: OnSubmit,
    /// Index of the focused field; `engine.len()` is the submit button.
    pub focus: usize,
    pub is_editing: bool,
    /// Whether submitting needs a connected wallet.
    pub requires_wallet: bool,
    pub connected: bool,
    pub busy: bool,
    error_dismiss: Duration,
}

impl FormComponent {
    pub fn new(
        action_tx: UnboundedSender<Action>,
        engine: FormEngine,
        title: impl Into<String>,
        submit_label: impl Into<String>,
        on_submit: OnSubmit,
    ) -> Self {
        Self {
            action_tx,
            engine,
            title: title.into(),
            submit_label: submit_label.into(),
            on_submit,
            focus: 0,
            is_editing: false,
            requires_wallet: true,
            connected: false,
            busy: false,
            error_dismiss: Duration::from_millis(3000),
        }
    }

    /// Submit without a connected wallet, e.g. the connect form itself.
    pub fn without_wallet(mut self) -> Self {
        self.requires_wallet = false;
        self
    }

    pub fn error_dismiss(mut self, dismiss: Duration) -> Self {
        self.error_dismiss = dismiss;
        self
    }

    pub fn set_state(&mut self, connected: bool, busy: bool) {
        self.connected = connected;
        self.busy = busy;
    }

    fn focused_name(&self) -> Option<String> {
        self.engine.spec_at(self.focus).map(|s| s.name.clone())
    }

    fn on_submit_button(&self) -> bool {
        self.focus >= self.engine.len()
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % (self.engine.len() + 1);
    }

    fn prev_field(&mut self) {
        self.focus = self
            .focus
            .checked_sub(1)
            .unwrap_or(self.engine.len());
    }

    fn start_editing(&mut self) -> Result<()> {
        if let Some(name) = self.focused_name() {
            if self.engine.spec_at(self.focus).is_some_and(|s| s.disabled) {
                return Ok(());
            }
            // A stale error goes away once the field is focused again.
            self.engine.clear_error(&name)?;
            self.is_editing = true;
        }
        Ok(())
    }

    fn edit(&mut self, change: impl FnOnce(&mut String)) -> Result<()> {
        if let Some(name) = self.focused_name() {
            let mut text = self.engine.value(&name).unwrap_or_default().to_string();
            change(&mut text);
            self.engine.set_value(&name, text)?;
        }
        Ok(())
    }

    pub fn paste(&mut self, text: &str) {
        if self.is_editing {
            let text = text.trim().to_string();
            let _ = self.edit(|value| value.push_str(&text));
        }
    }

    /// Validate and emit the submit action, or the first error as a warning.
    ///
    /// The handler only queues the action, so the submit future is ready on
    /// its first poll.
    pub fn submit(&mut self) -> Result<()> {
        if self.busy {
            return Ok(());
        }
        let connected = !self.requires_wallet || self.connected;
        let action_tx = self.action_tx.clone();
        let on_submit = self.on_submit;
        let outcome = self
            .engine
            .handle_submit(connected, |values| async move { action_tx.send(on_submit(values)) })
            .now_or_never()
            .ok_or_else(|| eyre!("form submit did not complete"))?;

        match outcome {
            SubmitOutcome::NotConnected => self.action_tx.send(Action::ShowConnect)?,
            SubmitOutcome::Invalid(error) => {
                let notification =
                    Notification::from(&error).dismiss_after(self.error_dismiss);
                self.action_tx.send(Action::Notify(notification))?;
            }
            SubmitOutcome::Submitted(sent) => {
                self.is_editing = false;
                sent?;
            }
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.focus = 0;
        self.is_editing = false;
    }

    fn submit_text(&self) -> String {
        if self.requires_wallet && !self.connected {
            "Connect wallet".to_string()
        } else if self.busy {
            "Action in progress…".to_string()
        } else {
            self.submit_label.clone()
        }
    }

    /// Height needed to draw every field and the submit button.
    pub fn height(&self) -> u16 {
        (self.engine.len() as u16 + 1) * 3 + 3
    }
}

impl Component for FormComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.is_editing {
            match key.code {
                KeyCode::Esc => self.is_editing = false,
                KeyCode::Enter => self.submit()?,
                KeyCode::Tab | KeyCode::Down => {
                    self.is_editing = false;
                    self.next_field();
                }
                KeyCode::BackTab | KeyCode::Up => {
                    self.is_editing = false;
                    self.prev_field();
                }
                KeyCode::Backspace => self.edit(|value| {
                    value.pop();
                })?,
                KeyCode::Char(c) => self.edit(|value| value.push(c))?,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => self.next_field(),
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => self.prev_field(),
            KeyCode::Enter if self.on_submit_button() => self.submit()?,
            KeyCode::Enter | KeyCode::Char('e') => self.start_editing()?,
            KeyCode::Char('x') => {
                if let Some(name) = self.focused_name() {
                    self.engine.apply_example(&name)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(3); self.engine.len() + 1];
        constraints.push(Constraint::Min(0));
        let chunks = Layout::vertical(constraints).split(area);

        for (index, spec) in self.engine.specs().enumerate() {
            let focused = index == self.focus;
            let editing = focused && self.is_editing;
            let value = self.engine.value(&spec.name).unwrap_or_default();
            let error = self.engine.error(&spec.name);

            let value_style = if spec.disabled {
                Style::default().fg(Color::DarkGray)
            } else if editing {
                Style::default().fg(Color::Yellow)
            } else if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = if value.is_empty() && !editing {
                vec![Span::styled(
                    spec.description.clone(),
                    Style::default().fg(Color::DarkGray),
                )]
            } else {
                vec![Span::styled(value.to_string(), value_style)]
            };
            if editing {
                spans.push(Span::styled("│", value_style));
            }
            if focused && !editing && self.engine.has_example(&spec.name) {
                spans.push(Span::styled(
                    format!("  [x] example: {}", spec.default_value),
                    Style::default().fg(Color::DarkGray),
                ));
            }

            let marker = if focused { "> " } else { "  " };
            let suffix = match spec.kind {
                InputKind::Numeric => " (number)",
                InputKind::Text => "",
            };
            let mut block = Block::default()
                .title(format!("{}{}{}", marker, spec.label, suffix))
                .borders(Borders::ALL)
                .border_style(match (error.is_some(), focused) {
                    (true, _) => Style::default().fg(Color::Red),
                    (false, true) => Style::default().fg(Color::Cyan),
                    (false, false) => Style::default().fg(Color::DarkGray),
                });
            if let Some(error) = error {
                block = block.title_bottom(Line::from(Span::styled(
                    format!(" {} ", error.message),
                    Style::default().fg(Color::Red),
                )));
            }
            f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[index]);
        }

        let focused = self.on_submit_button();
        let button_style = match (focused, self.busy) {
            (_, true) => Style::default().fg(Color::DarkGray),
            (true, false) => Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            (false, false) => Style::default().fg(Color::Green),
        };
        let button = Paragraph::new(Line::from(Span::styled(
            format!("  [ {} ]  ", self.submit_text()),
            button_style,
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                }),
        );
        f.render_widget(button, chunks[self.engine.len()]);

        let help = if self.is_editing {
            "[Esc] Stop editing  [Enter] Submit  [Tab/↓] Next field"
        } else {
            "[Enter/e] Edit field  [x] Use example  [Tab/↓] Next field  [Enter on button] Submit"
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                help,
                Style::default().fg(Color::DarkGray),
            ))),
            chunks[self.engine.len() + 1],
        );
    }
}
