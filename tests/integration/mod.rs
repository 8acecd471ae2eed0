//! Integration test module for jetton-console.
//!
//! Provides a test environment that manages:
//! - An in-memory dev ledger seeded with the demo jetton
//! - A notifier recording everything shown to the user
//! - The action flow wired to both, behind one guard

pub mod e2e_burn_flow;
pub mod e2e_form_flow;
pub mod e2e_mint_transfer;
pub mod e2e_session;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use jetton_console::{
    domain::{
        flow::ActionFlow,
        guard::ActionGuard,
        jetton::JettonDetails,
        notification::{Notification, Notifier},
        services::{Connection, JettonChain},
    },
    infra::devnet::{DEV_JETTON, DEV_WALLET, DevLedger},
};

/// Second wallet with no admin rights and no balance.
pub const OTHER_WALLET: &str =
    "0:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

/// Test environment for integration tests.
pub struct TestEnv {
    pub ledger: Arc<DevLedger>,
    pub notifier: Arc<RecordingNotifier>,
    pub flow: ActionFlow,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_ledger(DevLedger::new())
    }

    /// Every chain call takes `latency`, so concurrent runs overlap.
    pub fn with_latency(latency: Duration) -> Self {
        Self::with_ledger(DevLedger::new().with_latency(latency))
    }

    fn with_ledger(ledger: DevLedger) -> Self {
        let ledger = Arc::new(ledger);
        let notifier = Arc::new(RecordingNotifier::default());
        let flow = ActionFlow::new(ledger.clone(), notifier.clone(), ActionGuard::new());
        Self {
            ledger,
            notifier,
            flow,
        }
    }

    /// Demo jetton details as seen by `owner`.
    pub async fn details(&self, owner: &str) -> JettonDetails {
        self.ledger
            .jetton_details(DEV_JETTON, Some(owner))
            .await
            .expect("demo jetton exists")
    }

    pub fn dev_connection() -> Connection {
        Connection::new(DEV_WALLET)
    }

    /// Dev wallet balance in base units.
    pub fn dev_balance(&self) -> u128 {
        self.ledger
            .balance_of(DEV_JETTON, DEV_WALLET)
            .expect("demo jetton exists")
    }

    /// Messages shown since the last call.
    pub fn messages(&self) -> Vec<String> {
        self.notifier
            .take()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}
