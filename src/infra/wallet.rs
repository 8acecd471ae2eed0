//! The wallet connection as seen by this client.
//!
//! The handshake with the wallet app happens outside; this session only
//! tracks which address is connected.

use color_eyre::eyre::{Result, eyre};
use tracing::info;

use crate::domain::{
    field::FieldSpec,
    jetton::is_valid_address,
    services::WalletConnection,
};

pub const ADDRESS_FIELD: &str = "address";

#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    address: Option<String>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `address`, replacing any current connection.
    pub fn connect(&mut self, address: &str) -> Result<()> {
        let address = address.trim();
        if !is_valid_address(address) {
            return Err(eyre!("Invalid wallet address: {}", address));
        }
        info!("Wallet connected: {}", address);
        self.address = Some(address.to_string());
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(address) = self.address.take() {
            info!("Wallet disconnected: {}", address);
        }
    }
}

impl WalletConnection for WalletSession {
    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// Fields of the connect prompt.
pub fn connect_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text(ADDRESS_FIELD, "Wallet address")
            .required("Wallet address is required")
            .description("Raw (0:…) or user-friendly address of your wallet"),
    ]
}
