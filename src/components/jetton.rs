//! Jetton details panel with the burn popup.

use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    action::Action,
    domain::{
        field::{FieldSpec, numeric_chars},
        flow::{AMOUNT_FIELD, ActionRequest},
        form::FormEngine,
        jetton::{JettonDetails, JettonOp},
    },
    tui::Frame,
};

use super::{Component, form::FormComponent};

const MASTER_FIELD: &str = "master";

pub struct JettonComponent {
    action_tx: UnboundedSender<Action>,
    pub master_address: Option<String>,
    pub details: Option<JettonDetails>,
    pub address: Option<String>,
    pub busy: bool,
    pub burn_form: Option<FormComponent>,
    pub open_form: Option<FormComponent>,
    error_dismiss: Duration,
}

impl JettonComponent {
    pub fn new(action_tx: UnboundedSender<Action>, error_dismiss: Duration) -> Self {
        Self {
            action_tx,
            master_address: None,
            details: None,
            address: None,
            busy: false,
            burn_form: None,
            open_form: None,
            error_dismiss,
        }
    }

    pub fn set_state(&mut self, address: Option<String>, busy: bool) {
        let connected = address.is_some();
        self.address = address;
        self.busy = busy;
        for form in [&mut self.burn_form, &mut self.open_form].into_iter().flatten() {
            form.set_state(connected, busy);
        }
    }

    pub fn set_jetton(&mut self, master_address: Option<String>, details: Option<JettonDetails>) {
        if self.master_address != master_address {
            self.burn_form = None;
        }
        self.master_address = master_address;
        self.details = details;
        if !self.can_burn() {
            self.burn_form = None;
        }
    }

    /// Burn is offered only to a wallet holding this jetton.
    pub fn can_burn(&self) -> bool {
        self.details
            .as_ref()
            .is_some_and(|d| d.allows(JettonOp::Burn, self.address.as_deref()))
    }

    /// Whether the burn popup is on screen. It hides while an action runs.
    pub fn burn_visible(&self) -> bool {
        self.burn_form.is_some() && !self.busy
    }

    pub fn popup_open(&self) -> bool {
        self.burn_visible() || self.open_form.is_some()
    }

    pub fn is_editing(&self) -> bool {
        self.active_popup().is_some_and(|form| form.is_editing)
    }

    fn active_popup(&self) -> Option<&FormComponent> {
        if let Some(form) = &self.open_form {
            return Some(form);
        }
        self.burn_form.as_ref().filter(|_| !self.busy)
    }

    pub fn open_burn(&mut self) -> Result<()> {
        let Some(details) = self.details.as_ref().filter(|_| self.can_burn() && !self.busy) else {
            return Ok(());
        };
        let engine = FormEngine::register(vec![
            FieldSpec::numeric(AMOUNT_FIELD, format!("Amount ({})", details.symbol))
                .validate(numeric_chars)
                .description(format!(
                    "Up to {} {}",
                    details.formatted_balance().unwrap_or_else(|| "0".to_string()),
                    details.symbol
                )),
        ])?
        .without_examples();
        let mut form = FormComponent::new(
            self.action_tx.clone(),
            engine,
            format!("Burn {}", details.symbol),
            "Burn",
            |values| Action::Submit(ActionRequest::burn(values.get(AMOUNT_FIELD).map(str::to_string))),
        )
        .error_dismiss(self.error_dismiss);
        form.set_state(self.address.is_some(), self.busy);
        form.is_editing = true;
        self.burn_form = Some(form);
        Ok(())
    }

    pub fn close_burn(&mut self) {
        self.burn_form = None;
    }

    pub fn open_jetton_form(&mut self) -> Result<()> {
        let engine = FormEngine::register(vec![
            FieldSpec::text(MASTER_FIELD, "Jetton master address")
                .required("Jetton address is required")
                .description("Address of the jetton minter contract"),
        ])?
        .with_defaults([(MASTER_FIELD, self.master_address.clone().unwrap_or_default())])?;
        let mut form = FormComponent::new(
            self.action_tx.clone(),
            engine,
            "Open jetton",
            "Open",
            |values| Action::OpenJetton(values.get(MASTER_FIELD).unwrap_or_default().to_string()),
        )
        .without_wallet()
        .error_dismiss(self.error_dismiss);
        form.is_editing = true;
        self.open_form = Some(form);
        Ok(())
    }

    pub fn close_open_form(&mut self) {
        self.open_form = None;
    }

    pub fn paste(&mut self, text: &str) {
        if let Some(form) = self.open_form.as_mut() {
            form.paste(text);
        } else if let Some(form) = self.burn_form.as_mut().filter(|_| !self.busy) {
            form.paste(text);
        }
    }

    fn detail_lines(&self) -> Vec<Line<'static>> {
        let label = |text: &str| Span::styled(format!("{:<16}", text), Style::default().fg(Color::DarkGray));
        let Some(master) = &self.master_address else {
            return vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No jetton selected. Press [o] to open one.",
                    Style::default().fg(Color::Yellow),
                )),
            ];
        };
        let Some(details) = &self.details else {
            return vec![
                Line::from(""),
                Line::from(vec![label("Master"), Span::raw(master.clone())]),
                Line::from(Span::styled("Loading…", Style::default().fg(Color::DarkGray))),
            ];
        };

        let balance = match details.formatted_balance() {
            Some(balance) => Span::styled(
                format!("{} {}", balance, details.symbol),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled("—", Style::default().fg(Color::DarkGray)),
        };
        let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "—".to_string());

        vec![
            Line::from(""),
            Line::from(vec![
                label("Name"),
                Span::styled(
                    details.name.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![label("Symbol"), Span::raw(details.symbol.clone())]),
            Line::from(vec![label("Decimals"), Span::raw(details.decimals.to_string())]),
            Line::from(vec![label("Total supply"), Span::raw(details.formatted_supply())]),
            Line::from(vec![label("Master"), Span::raw(details.master_address.clone())]),
            Line::from(vec![label("Admin"), Span::raw(optional(&details.admin_address))]),
            Line::from(""),
            Line::from(vec![label("Jetton wallet"), Span::raw(optional(&details.jetton_wallet))]),
            Line::from(vec![label("Balance"), balance]),
            Line::from(vec![
                label("Your wallet"),
                Span::raw(if details.is_my_wallet { "yes" } else { "no" }),
            ]),
        ]
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Draw `form` in a bordered popup centered on `area`.
pub fn draw_popup(f: &mut Frame, area: Rect, form: &mut FormComponent) {
    let popup = popup_area(area, area.width.min(72), form.height() + 2);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(form.title.clone())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    f.render_widget(block, popup);
    form.draw(f, inner);
}

impl Component for JettonComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(form) = self.open_form.as_mut() {
            if key.code == KeyCode::Esc && !form.is_editing {
                self.open_form = None;
            } else {
                form.handle_key_event(key)?;
            }
            return Ok(());
        }

        if self.burn_visible() {
            if let Some(form) = self.burn_form.as_mut() {
                if key.code == KeyCode::Esc && !form.is_editing {
                    self.burn_form = None;
                } else {
                    form.handle_key_event(key)?;
                }
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('b') => self.open_burn()?,
            KeyCode::Char('o') => self.open_jetton_form()?,
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).split(area);

        let title = self
            .details
            .as_ref()
            .map(|d| format!("Jetton · {}", d.symbol))
            .unwrap_or_else(|| "Jetton".to_string());
        let panel = Paragraph::new(self.detail_lines()).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(panel, chunks[0]);

        let mut help = vec![];
        if self.can_burn() && !self.busy {
            help.push(Span::styled("[b] Burn  ", Style::default().fg(Color::Yellow)));
        } else if self.busy {
            help.push(Span::styled("Action in progress…  ", Style::default().fg(Color::Magenta)));
        }
        help.push(Span::styled(
            "[o] Open jetton  [r] Refresh",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(
            Paragraph::new(Line::from(help)).block(
                Block::default()
                    .title("Help")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            chunks[1],
        );

        if let Some(form) = self.open_form.as_mut() {
            draw_popup(f, area, form);
        } else if !self.busy {
            if let Some(form) = self.burn_form.as_mut() {
                draw_popup(f, area, form);
            }
        }
    }
}
