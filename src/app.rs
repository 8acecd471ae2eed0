use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::{
    action::{Action, ActionNotifier},
    cli::Args,
    components::{
        Component,
        form::FormComponent,
        jetton::{JettonComponent, draw_popup},
        notifications::NotificationCenter,
    },
    config::Config,
    domain::{
        flow::{ActionFlow, ActionRequest, FlowOutcome, mint_fields, transfer_fields},
        form::FormEngine,
        guard::ActionGuard,
        jetton::{JettonDetails, JettonOp, JettonStore, fetch_details, is_valid_address},
        notification::{Notification, Notifier},
        services::{JettonChain, WalletConnection},
    },
    infra::{
        devnet::{DEV_JETTON, DEV_WALLET, DevLedger},
        rpc::RpcClient,
        store::{Session, Store},
        wallet::{ADDRESS_FIELD, WalletSession, connect_fields},
    },
    tui::{Event, Frame, Tui},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Jetton,
    Transfer,
    Mint,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Jetton, Tab::Transfer, Tab::Mint];

    pub fn title(&self) -> Line<'static> {
        let (key, name) = match self {
            Tab::Jetton => ("1", " Jetton"),
            Tab::Transfer => ("2", " Transfer"),
            Tab::Mint => ("3", " Mint"),
        };
        Line::from(vec![
            Span::styled(key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(name),
        ])
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Jetton => 0,
            Tab::Transfer => 1,
            Tab::Mint => 2,
        }
    }

    pub fn from_index(index: usize) -> Tab {
        Tab::ALL[index % Tab::ALL.len()]
    }

    fn op(&self) -> Option<JettonOp> {
        match self {
            Tab::Jetton => None,
            Tab::Transfer => Some(JettonOp::Transfer),
            Tab::Mint => Some(JettonOp::Mint),
        }
    }
}

/// Identity of the jetton the transfer and mint forms were built for.
type FormKey = (String, u8, String, Option<String>);

/// Flows spawned from this screen whose outcome has not been handled yet.
///
/// A flow task drops its permit before `ActionFinished` reaches the loop, so
/// the controls stay busy until the outcome has closed or reset them.
#[derive(Debug, Default)]
struct PendingActions(usize);

impl PendingActions {
    fn begin(&mut self) {
        self.0 += 1;
    }

    fn end(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    fn busy(&self, guard: &ActionGuard) -> bool {
        self.0 > 0 || guard.in_progress()
    }
}

pub struct App {
    pub should_quit: bool,
    pub should_suspend: bool,
    pub config: Config,
    pub active_tab: Tab,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
    pub tui: Tui,
    pub store: Store,
    pub wallet: WalletSession,
    pub jettons: JettonStore,
    pub chain: Arc<dyn JettonChain>,
    pub flow: ActionFlow,
    pub jetton_component: JettonComponent,
    pub transfer_form: Option<FormComponent>,
    pub mint_form: Option<FormComponent>,
    pub connect_form: Option<FormComponent>,
    pub notifications: NotificationCenter,
    pub status_message: String,
    form_key: Option<FormKey>,
    pending: PendingActions,
}

impl App {
    pub fn new(args: &Args) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let config = Config::new(&args.network, args.rpc_url.as_deref()).with_ui_overrides()?;
        let store = Store::new(&config.network.name)?;
        let session = store.load_session()?;
        let dev_mode = config.is_devnet();

        let chain: Arc<dyn JettonChain> = if dev_mode {
            info!("Using the in-memory dev ledger");
            Arc::new(
                DevLedger::new().with_latency(Duration::from_millis(config.ui.dev_latency_ms)),
            )
        } else {
            info!("Using wallet bridge at {}", config.network.rpc_url);
            Arc::new(RpcClient::new(&config))
        };

        let mut wallet = WalletSession::new();
        let wallet_address = args
            .wallet
            .clone()
            .or(session.wallet_address)
            .or_else(|| dev_mode.then(|| DEV_WALLET.to_string()));
        if let Some(address) = wallet_address {
            if let Err(e) = wallet.connect(&address) {
                warn!("Not reconnecting wallet: {}", e);
            }
        }

        let master = args
            .jetton
            .clone()
            .or(session.jetton_master)
            .or_else(|| dev_mode.then(|| DEV_JETTON.to_string()))
            .filter(|master| {
                let valid = is_valid_address(master);
                if !valid {
                    warn!("Ignoring invalid jetton address {}", master);
                }
                valid
            });
        let jettons = JettonStore::new(master);

        let notifier: Arc<dyn Notifier> = Arc::new(ActionNotifier(action_tx.clone()));
        let flow = ActionFlow::new(chain.clone(), notifier, ActionGuard::new());

        let tui = Tui::new()?
            .tick_rate(args.tick_rate)
            .frame_rate(args.frame_rate)
            .paste(true);

        let jetton_component = JettonComponent::new(
            action_tx.clone(),
            Duration::from_millis(config.ui.form_error_ms),
        );
        let notifications =
            NotificationCenter::new(Duration::from_millis(config.ui.notification_ms));

        let mut app = Self {
            should_quit: false,
            should_suspend: false,
            config,
            active_tab: Tab::Jetton,
            action_tx,
            action_rx,
            tui,
            store,
            wallet,
            jettons,
            chain,
            flow,
            jetton_component,
            transfer_form: None,
            mint_form: None,
            connect_form: None,
            notifications,
            status_message: "Ready".to_string(),
            form_key: None,
            pending: PendingActions::default(),
        };
        app.sync_jetton();
        Ok(app)
    }

    pub async fn run(&mut self) -> Result<()> {
        self.tui.enter()?;
        self.action_tx.send(Action::RefreshDetails)?;

        loop {
            // Handle events
            if let Some(event) = self.tui.next().await {
                self.handle_event(event)?;
            }

            // Handle actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.handle_action(action)?;
            }

            if self.should_suspend {
                self.tui.suspend()?;
                self.should_suspend = false;
                self.tui.resume()?;
            }

            if self.should_quit {
                break;
            }
        }

        self.tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Tick => {
                self.action_tx.send(Action::Tick)?;
            }
            Event::Render => {
                self.draw_ui()?;
            }
            Event::Key(key_event) => {
                self.handle_key_event(key_event)?;
            }
            Event::Resize(w, h) => {
                self.action_tx.send(Action::Resize(w, h))?;
            }
            Event::Init => {
                info!("Application initialized");
            }
            Event::Paste(text) => {
                self.handle_paste(&text);
            }
            Event::Error => {
                warn!("Terminal event stream error");
            }
            Event::FocusGained | Event::FocusLost => {}
        }
        Ok(())
    }

    /// Push wallet and guard state into the components.
    fn sync_state(&mut self) {
        let busy = self.pending.busy(self.flow.guard());
        let address = self.wallet.address().map(str::to_string);
        let connected = address.is_some();
        self.jetton_component.set_state(address, busy);
        for form in [
            &mut self.transfer_form,
            &mut self.mint_form,
            &mut self.connect_form,
        ]
        .into_iter()
        .flatten()
        {
            form.set_state(connected, busy);
        }
    }

    /// Push the current jetton into the components and rebuild its forms.
    fn sync_jetton(&mut self) {
        self.sync_state();
        self.jetton_component.set_jetton(
            self.jettons.master_address().map(str::to_string),
            self.jettons.details().cloned(),
        );
        if let Err(e) = self.rebuild_forms() {
            warn!("Failed to build jetton forms: {}", e);
        }
        self.sync_state();
    }

    fn rebuild_forms(&mut self) -> Result<()> {
        let Some(details) = self.jettons.details() else {
            self.transfer_form = None;
            self.mint_form = None;
            self.form_key = None;
            return Ok(());
        };
        let key = (
            details.master_address.clone(),
            details.decimals,
            details.symbol.clone(),
            details.admin_address.clone(),
        );
        if self.form_key.as_ref() == Some(&key) {
            return Ok(());
        }

        let dismiss = Duration::from_millis(self.config.ui.form_error_ms);
        self.transfer_form = Some(
            FormComponent::new(
                self.action_tx.clone(),
                FormEngine::register(transfer_fields(details))?,
                format!("Transfer {}", details.symbol),
                "Transfer",
                |values| Action::Submit(ActionRequest::from_form(JettonOp::Transfer, &values)),
            )
            .error_dismiss(dismiss),
        );
        self.mint_form = Some(
            FormComponent::new(
                self.action_tx.clone(),
                FormEngine::register(mint_fields(details))?,
                format!("Mint {}", details.symbol),
                "Mint",
                |values| Action::Submit(ActionRequest::from_form(JettonOp::Mint, &values)),
            )
            .error_dismiss(dismiss),
        );
        debug!("Built forms for {}", details.symbol);
        self.form_key = Some(key);
        Ok(())
    }

    /// Whether the tab's form takes input: hidden when the connected wallet
    /// may not perform the operation.
    fn offered(&self, op: JettonOp) -> bool {
        match (self.jettons.details(), self.wallet.address()) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(details), address) => details.allows(op, address),
        }
    }

    fn active_form(&mut self) -> Option<&mut FormComponent> {
        let op = self.active_tab.op()?;
        if !self.offered(op) {
            return None;
        }
        match op {
            JettonOp::Transfer => self.transfer_form.as_mut(),
            JettonOp::Mint => self.mint_form.as_mut(),
            JettonOp::Burn => None,
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        self.sync_state();

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.action_tx.send(Action::Quit)?;
            return Ok(());
        }

        if let Some(form) = self.connect_form.as_mut() {
            if key.code == KeyCode::Esc && !form.is_editing {
                self.connect_form = None;
            } else {
                form.handle_key_event(key)?;
            }
            return Ok(());
        }

        let captured = match self.active_tab {
            Tab::Jetton => self.jetton_component.popup_open(),
            Tab::Transfer | Tab::Mint => self.active_form().is_some_and(|f| f.is_editing),
        };
        if captured {
            return self.route_key(key);
        }

        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => {
                self.action_tx.send(Action::Quit)?;
            }
            KeyCode::Char('z') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.action_tx.send(Action::Suspend)?;
            }
            KeyCode::Char('1') => self.active_tab = Tab::Jetton,
            KeyCode::Char('2') => self.active_tab = Tab::Transfer,
            KeyCode::Char('3') => self.active_tab = Tab::Mint,
            KeyCode::Tab => {
                self.active_tab = Tab::from_index(self.active_tab.index() + 1);
            }
            KeyCode::BackTab => {
                self.active_tab = Tab::from_index(self.active_tab.index() + Tab::ALL.len() - 1);
            }
            KeyCode::Char('r') if key.modifiers.is_empty() => {
                self.action_tx.send(Action::RefreshDetails)?;
            }
            KeyCode::Char('c') if key.modifiers.is_empty() => {
                self.action_tx.send(Action::ShowConnect)?;
            }
            KeyCode::Char('D') => {
                self.action_tx.send(Action::DisconnectWallet)?;
            }
            KeyCode::Esc if !self.notifications.is_empty() => {
                self.action_tx.send(Action::DismissNotifications)?;
            }
            _ => self.route_key(key)?,
        }
        Ok(())
    }

    fn route_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.active_tab {
            Tab::Jetton => self.jetton_component.handle_key_event(key)?,
            Tab::Transfer | Tab::Mint => {
                if let Some(form) = self.active_form() {
                    form.handle_key_event(key)?;
                }
            }
        }
        Ok(())
    }

    fn handle_paste(&mut self, text: &str) {
        if let Some(form) = self.connect_form.as_mut() {
            form.paste(text);
            return;
        }
        match self.active_tab {
            Tab::Jetton => self.jetton_component.paste(text),
            Tab::Transfer | Tab::Mint => {
                if let Some(form) = self.active_form() {
                    form.paste(text);
                }
            }
        }
    }

    fn handle_action(&mut self, action: Action) -> Result<()> {
        if action != Action::Tick {
            debug!("Handling action: {:?}", action);
        }
        match action {
            Action::Tick => {
                self.notifications.tick(Instant::now());
            }
            Action::Resize(w, h) => {
                self.tui.resize(Rect::new(0, 0, w, h))?;
                self.draw_ui()?;
            }
            Action::Suspend => {
                self.should_suspend = true;
            }
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ShowConnect => {
                self.open_connect_form()?;
            }
            Action::ConnectWallet(address) => match self.wallet.connect(&address) {
                Ok(()) => {
                    self.connect_form = None;
                    self.status_message = "Wallet connected".to_string();
                    self.notifications
                        .push(Notification::success("Wallet connected").with_icon("🔗"));
                    self.save_session();
                    self.sync_jetton();
                    self.refresh_details();
                }
                Err(e) => {
                    self.notifications.push(Notification::warning(e.to_string()));
                }
            },
            Action::DisconnectWallet => {
                if self.wallet.is_connected() {
                    self.wallet.disconnect();
                    self.status_message = "Wallet disconnected".to_string();
                    self.save_session();
                    self.sync_jetton();
                    self.refresh_details();
                }
            }
            Action::OpenJetton(master) => {
                let master = master.trim().to_string();
                if !is_valid_address(&master) {
                    self.notifications
                        .push(Notification::warning("Invalid jetton address"));
                    return Ok(());
                }
                self.jetton_component.close_open_form();
                self.jettons.set_master_address(Some(master));
                self.save_session();
                self.sync_jetton();
                self.refresh_details();
            }
            Action::RefreshDetails => {
                self.refresh_details();
            }
            Action::DetailsLoaded(details) => {
                let symbol = details.symbol.clone();
                if self.jettons.apply(details) {
                    self.status_message = format!("Loaded {}", symbol);
                    self.sync_jetton();
                }
            }
            Action::Submit(request) => {
                self.submit(request);
            }
            Action::ActionFinished(op, outcome) => {
                self.finish(op, outcome);
            }
            Action::Notify(notification) => {
                self.notifications.push(notification);
            }
            Action::DismissNotifications => {
                self.notifications.dismiss_all();
            }
        }
        Ok(())
    }

    fn open_connect_form(&mut self) -> Result<()> {
        let engine = FormEngine::register(connect_fields())?.with_defaults([(
            ADDRESS_FIELD,
            self.wallet.address().unwrap_or_default().to_string(),
        )])?;
        let mut form = FormComponent::new(
            self.action_tx.clone(),
            engine,
            "Connect wallet",
            "Connect",
            |values| Action::ConnectWallet(values.get(ADDRESS_FIELD).unwrap_or_default().to_string()),
        )
        .without_wallet()
        .error_dismiss(Duration::from_millis(self.config.ui.form_error_ms));
        form.is_editing = true;
        self.connect_form = Some(form);
        Ok(())
    }

    fn save_session(&self) {
        let session = Session {
            wallet_address: self.wallet.address().map(str::to_string),
            jetton_master: self.jettons.master_address().map(str::to_string),
        };
        if let Err(e) = self.store.save_session(&session) {
            warn!("Failed to save session: {}", e);
        }
    }

    fn refresh_details(&mut self) {
        let Some(master) = self.jettons.master_address().map(str::to_string) else {
            return;
        };
        let connection = self.wallet.connection();
        let chain = self.chain.clone();
        let tx = self.action_tx.clone();
        self.status_message = "Loading jetton…".to_string();

        tokio::spawn(async move {
            let action = match fetch_details(chain.as_ref(), &master, connection.as_ref()).await {
                Ok(details) => Action::DetailsLoaded(details),
                Err(e) => {
                    warn!("Failed to load jetton {}: {}", master, e);
                    Action::Notify(Notification::error(format!("Failed to load jetton: {}", e)))
                }
            };
            let _ = tx.send(action);
        });
    }

    /// Run the action flow off the UI task; the outcome comes back as an action.
    fn submit(&mut self, request: ActionRequest) {
        let Some(details) = self.jettons.details().cloned() else {
            self.notifications
                .push(Notification::warning("Jetton details are not loaded yet"));
            return;
        };
        let connection = self.wallet.connection();
        let flow = self.flow.clone();
        let tx = self.action_tx.clone();
        let op = request.op;
        self.pending.begin();
        self.status_message = format!("Checking {}…", op.verb());

        tokio::spawn(async move {
            let run =
                tokio::spawn(async move { flow.run(&details, connection.as_ref(), request).await });
            // The loop must hear back even if the flow panicked.
            let outcome = match run.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("{} task failed: {}", op, e);
                    FlowOutcome::Failed
                }
            };
            let _ = tx.send(Action::ActionFinished(op, outcome));
        });
    }

    fn finish(&mut self, op: JettonOp, outcome: FlowOutcome) {
        self.pending.end();
        self.status_message = match &outcome {
            FlowOutcome::Completed { .. } => format!("{} completed", op),
            FlowOutcome::Failed => format!("{} failed", op),
            FlowOutcome::Rejected => format!("{} rejected", op),
            FlowOutcome::Denied => "Another action is in progress".to_string(),
            FlowOutcome::Unavailable => format!("{} is not available for this wallet", op),
        };

        if outcome.closes_dialog() {
            match op {
                JettonOp::Burn => self.jetton_component.close_burn(),
                JettonOp::Transfer => self.transfer_form.iter_mut().for_each(|f| f.reset()),
                JettonOp::Mint => self.mint_form.iter_mut().for_each(|f| f.reset()),
            }
        }
        if let FlowOutcome::Completed {
            refreshed: Some(details),
        } = outcome
        {
            self.jettons.apply(details);
        }
        self.sync_jetton();
    }

    fn draw_ui(&mut self) -> Result<()> {
        self.sync_state();
        let busy = self.pending.busy(self.flow.guard());
        let Self {
            tui,
            config,
            active_tab,
            wallet,
            jettons,
            jetton_component,
            transfer_form,
            mint_form,
            connect_form,
            notifications,
            status_message,
            ..
        } = self;
        let active_tab = *active_tab;
        let address = wallet.address();

        tui.draw(|f| {
            let chunks = Layout::vertical([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Tabs
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Status
            ])
            .split(f.area());

            draw_header(f, chunks[0], config, address);

            let titles: Vec<Line> = Tab::ALL.iter().map(|t| t.title()).collect();
            let tabs = Tabs::new(titles)
                .block(Block::default().borders(Borders::ALL))
                .select(active_tab.index())
                .style(Style::default().fg(Color::White))
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                );
            f.render_widget(tabs, chunks[1]);

            match active_tab {
                Tab::Jetton => jetton_component.draw(f, chunks[2]),
                Tab::Transfer => draw_action_form(
                    f,
                    chunks[2],
                    JettonOp::Transfer,
                    jettons.details(),
                    address,
                    transfer_form.as_mut(),
                ),
                Tab::Mint => draw_action_form(
                    f,
                    chunks[2],
                    JettonOp::Mint,
                    jettons.details(),
                    address,
                    mint_form.as_mut(),
                ),
            }

            let toast_height = notifications.height().min(chunks[2].height);
            if toast_height > 0 {
                let toasts = Rect {
                    y: chunks[3].y - toast_height,
                    height: toast_height,
                    ..chunks[2]
                };
                notifications.draw(f, toasts);
            }

            if let Some(form) = connect_form.as_mut() {
                let area = f.area();
                draw_popup(f, area, form);
            }

            draw_status(f, chunks[3], status_message.as_str(), busy);
        })?;
        Ok(())
    }
}

fn draw_header(f: &mut Frame, area: Rect, config: &Config, address: Option<&str>) {
    let mut spans = vec![
        Span::styled(
            "Jetton Console",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", config.network.name),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if config.is_devnet() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "[DEV]",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw("  "));
    spans.push(match address {
        Some(address) => Span::styled(
            format!("Wallet: {}", address),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("No wallet connected", Style::default().fg(Color::DarkGray)),
    });
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, area);
}

fn draw_action_form(
    f: &mut Frame,
    area: Rect,
    op: JettonOp,
    details: Option<&JettonDetails>,
    address: Option<&str>,
    form: Option<&mut FormComponent>,
) {
    let title = match details {
        Some(details) => format!("{} {}", capitalize(op.verb()), details.symbol),
        None => capitalize(op.verb()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let message = match (details, address) {
        (None, _) => Some("Open a jetton first: [1] then [o]".to_string()),
        (Some(details), Some(_)) if !details.allows(op, address) => Some(match op {
            JettonOp::Mint => "Only the jetton admin can mint".to_string(),
            _ => format!("Your wallet holds no {}", details.symbol),
        }),
        _ => None,
    };

    match (message, form) {
        (Some(message), _) => f.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(message, Style::default().fg(Color::Yellow))),
            ]),
            inner,
        ),
        (None, Some(form)) => form.draw(f, inner),
        (None, None) => {}
    }
}

fn draw_status(f: &mut Frame, area: Rect, status_message: &str, busy: bool) {
    let (text, color) = if busy {
        ("Action in progress…", Color::Magenta)
    } else {
        (status_message, Color::Green)
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(text, Style::default().fg(color)),
        Span::raw("  |  "),
        Span::styled(
            "[q] Quit  [1-3] Tabs  [c] Connect  [D] Disconnect  [r] Refresh  [Esc] Dismiss",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(status, area);
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
