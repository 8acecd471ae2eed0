//! Boundaries to the wallet and the chain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::jetton::JettonDetails;

/// The connected wallet an action is sent from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub address: String,
}

impl Connection {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Failures reported by a chain adapter. `Display` is the message shown to
/// the user verbatim.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The wallet or node rejected the request with this message.
    #[error("{0}")]
    Rejected(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Read access to the wallet connection.
pub trait WalletConnection: Send + Sync {
    fn address(&self) -> Option<&str>;

    fn connection(&self) -> Option<Connection> {
        self.address().map(Connection::new)
    }

    fn is_connected(&self) -> bool {
        self.address().is_some()
    }
}

/// Chain calls behind the jetton screens.
///
/// Amounts are base units. Each mutating call resolves once the wallet has
/// sent the message, or fails with a message for the user.
#[async_trait]
pub trait JettonChain: Send + Sync {
    async fn jetton_details(
        &self,
        master_address: &str,
        owner: Option<&str>,
    ) -> Result<JettonDetails, ChainError>;

    async fn burn(
        &self,
        connection: &Connection,
        amount: u128,
        jetton_wallet: &str,
    ) -> Result<(), ChainError>;

    async fn mint(
        &self,
        connection: &Connection,
        amount: u128,
        master_address: &str,
        recipient: &str,
    ) -> Result<(), ChainError>;

    async fn transfer(
        &self,
        connection: &Connection,
        amount: u128,
        jetton_wallet: &str,
        recipient: &str,
    ) -> Result<(), ChainError>;
}
