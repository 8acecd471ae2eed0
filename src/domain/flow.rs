//! Validated, guarded execution of burn, mint and transfer.
//!
//! A run goes Idle -> Validating -> Submitting -> Idle, or back to Idle
//! straight from Validating when the input is rejected. Every attempt that
//! reaches validation raises exactly one notification, and the guard is only
//! taken once all checks have passed.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::amount::{self, Amount};
use super::field::{FieldSpec, decimal_input};
use super::form::FormValues;
use super::guard::ActionGuard;
use super::jetton::{JettonDetails, JettonOp, fetch_details, is_valid_address};
use super::notification::{Notification, Notifier};
use super::services::{Connection, JettonChain};

pub const AMOUNT_FIELD: &str = "amount";
pub const RECIPIENT_FIELD: &str = "recipient";

const MAX_AMOUNT_DISMISS: Duration = Duration::from_millis(3000);

/// What the user asked for, as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub op: JettonOp,
    pub amount: Option<String>,
    pub recipient: Option<String>,
}

impl ActionRequest {
    pub fn burn(amount: Option<String>) -> Self {
        Self {
            op: JettonOp::Burn,
            amount,
            recipient: None,
        }
    }

    /// Build a request from a submitted mint or transfer form.
    pub fn from_form(op: JettonOp, values: &FormValues) -> Self {
        Self {
            op,
            amount: values.get(AMOUNT_FIELD).map(str::to_string),
            recipient: values.get(RECIPIENT_FIELD).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowOutcome {
    /// The operation is not offered to this wallet; nothing was shown.
    Unavailable,
    /// Input failed validation or domain bounds; the user can correct it.
    Rejected,
    /// Another action holds the guard; nothing happened.
    Denied,
    /// The chain call succeeded. `refreshed` is `None` if the refresh failed.
    Completed { refreshed: Option<JettonDetails> },
    /// The chain call failed and its message was shown.
    Failed,
}

impl FlowOutcome {
    /// Whether the dialog that started the action should close.
    pub fn closes_dialog(&self) -> bool {
        matches!(self, FlowOutcome::Completed { .. } | FlowOutcome::Failed)
    }
}

enum Call<'a> {
    Burn { wallet: &'a str },
    Transfer { wallet: &'a str, to: &'a str },
    Mint { to: &'a str },
}

/// Runs jetton actions against the chain behind one screen's guard.
#[derive(Clone)]
pub struct ActionFlow {
    chain: Arc<dyn JettonChain>,
    notifier: Arc<dyn Notifier>,
    guard: ActionGuard,
}

impl ActionFlow {
    pub fn new(chain: Arc<dyn JettonChain>, notifier: Arc<dyn Notifier>, guard: ActionGuard) -> Self {
        Self {
            chain,
            notifier,
            guard,
        }
    }

    pub fn guard(&self) -> &ActionGuard {
        &self.guard
    }

    fn reject(&self, notification: Notification) -> FlowOutcome {
        warn!("Action rejected: {}", notification.message);
        self.notifier.notify(notification);
        FlowOutcome::Rejected
    }

    /// Validate `request` against `details` and, if it passes, send it.
    pub async fn run(
        &self,
        details: &JettonDetails,
        connection: Option<&Connection>,
        request: ActionRequest,
    ) -> FlowOutcome {
        let op = request.op;
        let Some(connection) = connection else {
            debug!("{} unavailable: no wallet connected", op);
            return FlowOutcome::Unavailable;
        };
        if !details.allows(op, Some(&connection.address)) {
            debug!("{} unavailable for {}", op, connection.address);
            return FlowOutcome::Unavailable;
        }

        let recipient = match op {
            JettonOp::Burn => None,
            JettonOp::Mint | JettonOp::Transfer => match request.recipient.as_deref().map(str::trim) {
                Some(r) if is_valid_address(r) => Some(r.to_string()),
                _ => {
                    return self.reject(Notification::warning("Invalid recipient address"));
                }
            },
        };

        let min_amount = || {
            Notification::warning(format!(
                "Minimum amount to {} is 1 {}",
                op.verb(),
                details.symbol
            ))
        };

        let Some(text) = request.amount.as_deref().filter(|a| !a.trim().is_empty()) else {
            return self.reject(min_amount());
        };

        let requested = match Amount::parse(text, details.decimals) {
            Ok(amount) if amount.is_zero() => return self.reject(min_amount()),
            Ok(amount) => amount,
            Err(e) => return self.reject(Notification::warning(e.to_string())),
        };

        if op.bounded_by_balance() {
            let available = match details.balance_base_units() {
                Some(Ok(units)) => units,
                Some(Err(e)) => {
                    return self.reject(Notification::error(format!("Invalid balance: {}", e)));
                }
                None => 0,
            };
            if amount::compare(requested.base_units(), available) == Ordering::Greater {
                let formatted = amount::from_base_units(available, details.decimals)
                    .map(|b| amount::group_thousands(&b))
                    .unwrap_or_else(|_| available.to_string());
                return self.reject(
                    Notification::warning(format!(
                        "Maximum amount to {} is {}",
                        op.verb(),
                        formatted
                    ))
                    .dismiss_after(MAX_AMOUNT_DISMISS),
                );
            }
        }

        let call = match (op, details.jetton_wallet.as_deref(), recipient.as_deref()) {
            (JettonOp::Burn, Some(wallet), _) => Call::Burn { wallet },
            (JettonOp::Transfer, Some(wallet), Some(to)) => Call::Transfer { wallet, to },
            (JettonOp::Mint, _, Some(to)) => Call::Mint { to },
            _ => {
                debug!("{} unavailable: no target address", op);
                return FlowOutcome::Unavailable;
            }
        };

        let Some(permit) = self.guard.start() else {
            debug!("{} denied: another action is in progress", op);
            return FlowOutcome::Denied;
        };

        info!(
            "Submitting {} of {} {} ({} base units)",
            op,
            requested,
            details.symbol,
            requested.base_units()
        );
        let units = requested.base_units();
        let result = match call {
            Call::Burn { wallet } => self.chain.burn(connection, units, wallet).await,
            Call::Transfer { wallet, to } => self.chain.transfer(connection, units, wallet, to).await,
            Call::Mint { to } => {
                self.chain
                    .mint(connection, units, &details.master_address, to)
                    .await
            }
        };

        let outcome = match result {
            Ok(()) => {
                info!("{} of {} {} succeeded", op, requested, details.symbol);
                self.notifier.notify(Notification::success(format!(
                    "Successfully {} {} {}",
                    op.past_tense(),
                    requested.display_grouped(),
                    details.symbol
                )));
                let refreshed = match fetch_details(
                    self.chain.as_ref(),
                    &details.master_address,
                    Some(connection),
                )
                .await
                {
                    Ok(fresh) => Some(fresh),
                    Err(e) => {
                        warn!("Failed to refresh jetton details: {}", e);
                        None
                    }
                };
                FlowOutcome::Completed { refreshed }
            }
            Err(e) => {
                error!("{} failed: {}", op, e);
                self.notifier.notify(Notification::error(e.to_string()));
                FlowOutcome::Failed
            }
        };

        permit.finish();
        outcome
    }
}

/// Fields of the transfer form.
pub fn transfer_fields(details: &JettonDetails) -> Vec<FieldSpec> {
    vec![
        FieldSpec::text(RECIPIENT_FIELD, "Recipient address")
            .required("Recipient address is required")
            .default_value("EQBvW8Z5huBkMJYdnfAEM5JqTNkuWX3diqYENkWsIL0XggGG")
            .description("Wallet address that receives the jettons"),
        amount_field(details, "Amount of {symbol} to send"),
    ]
}

/// Fields of the mint form.
pub fn mint_fields(details: &JettonDetails) -> Vec<FieldSpec> {
    vec![
        amount_field(details, "Amount of {symbol} to mint"),
        FieldSpec::text(RECIPIENT_FIELD, "Recipient address")
            .required("Recipient address is required")
            .default_value(details.admin_address.clone().unwrap_or_default())
            .description("Wallet address that receives the new jettons"),
    ]
}

fn amount_field(details: &JettonDetails, description: &str) -> FieldSpec {
    FieldSpec::numeric(AMOUNT_FIELD, format!("Amount ({})", details.symbol))
        .required("Amount is required")
        .default_value("10")
        .validate(decimal_input(details.decimals))
        .description(description.replace("{symbol}", &details.symbol))
}
