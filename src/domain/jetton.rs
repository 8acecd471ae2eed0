//! Jetton details as exposed to the action screens.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::info;

use super::amount::{self, AmountError};
use super::services::{ChainError, Connection, JettonChain};

/// Chain-mutating operations offered on a jetton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum JettonOp {
    Burn,
    Mint,
    Transfer,
}

impl JettonOp {
    pub fn verb(&self) -> &'static str {
        match self {
            JettonOp::Burn => "burn",
            JettonOp::Mint => "mint",
            JettonOp::Transfer => "transfer",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            JettonOp::Burn => "burned",
            JettonOp::Mint => "minted",
            JettonOp::Transfer => "transferred",
        }
    }

    /// Whether the requested amount is capped by the wallet balance.
    pub fn bounded_by_balance(&self) -> bool {
        matches!(self, JettonOp::Burn | JettonOp::Transfer)
    }
}

/// Snapshot of a jetton from the connected wallet's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JettonDetails {
    pub master_address: String,
    pub name: String,
    pub symbol: String,
    /// Token precision from on-chain metadata. Never defaulted.
    pub decimals: u8,
    /// Total supply in base units.
    pub total_supply: u128,
    pub admin_address: Option<String>,
    /// The connected wallet's jetton wallet, if it has one.
    pub jetton_wallet: Option<String>,
    /// Wallet balance as a human decimal string.
    pub balance: Option<String>,
    pub is_my_wallet: bool,
}

impl JettonDetails {
    /// Balance formatted for display, e.g. `1,234.5`.
    pub fn formatted_balance(&self) -> Option<String> {
        self.balance
            .as_deref()
            .map(|b| amount::to_base_units(b, self.decimals))
            .and_then(Result::ok)
            .and_then(|units| amount::from_base_units(units, self.decimals).ok())
            .map(|b| amount::group_thousands(&b))
    }

    pub fn formatted_supply(&self) -> String {
        amount::from_base_units(self.total_supply, self.decimals)
            .map(|s| amount::group_thousands(&s))
            .unwrap_or_else(|_| self.total_supply.to_string())
    }

    /// Balance in base units.
    pub fn balance_base_units(&self) -> Option<Result<u128, AmountError>> {
        self.balance
            .as_deref()
            .map(|b| amount::to_base_units(b, self.decimals))
    }

    fn has_balance(&self) -> bool {
        matches!(self.balance_base_units(), Some(Ok(units)) if units > 0)
    }

    pub fn is_admin(&self, address: Option<&str>) -> bool {
        match (address, self.admin_address.as_deref()) {
            (Some(address), Some(admin)) => address == admin,
            _ => false,
        }
    }

    /// Whether `op` may be offered to the wallet at `address`.
    pub fn allows(&self, op: JettonOp, address: Option<&str>) -> bool {
        match op {
            JettonOp::Burn | JettonOp::Transfer => {
                address.is_some()
                    && self.is_my_wallet
                    && self.jetton_wallet.is_some()
                    && self.has_balance()
            }
            JettonOp::Mint => self.is_admin(address),
        }
    }
}

/// Holds the jetton under management and its latest details.
#[derive(Debug, Clone, Default)]
pub struct JettonStore {
    master_address: Option<String>,
    details: Option<JettonDetails>,
}

impl JettonStore {
    pub fn new(master_address: Option<String>) -> Self {
        Self {
            master_address,
            details: None,
        }
    }

    pub fn master_address(&self) -> Option<&str> {
        self.master_address.as_deref()
    }

    pub fn set_master_address(&mut self, master_address: Option<String>) {
        if self.master_address != master_address {
            self.details = None;
        }
        self.master_address = master_address;
    }

    pub fn details(&self) -> Option<&JettonDetails> {
        self.details.as_ref()
    }

    /// Accept details fetched elsewhere, ignoring ones for another jetton.
    pub fn apply(&mut self, details: JettonDetails) -> bool {
        if self.master_address.as_deref() != Some(details.master_address.as_str()) {
            return false;
        }
        self.details = Some(details);
        true
    }
}

/// Fetch details for `master`; the wallet fields are filled for `connection`.
pub async fn fetch_details(
    chain: &dyn JettonChain,
    master: &str,
    connection: Option<&Connection>,
) -> Result<JettonDetails, ChainError> {
    let owner = connection.map(|c| c.address.as_str());
    let details = chain.jetton_details(master, owner).await?;
    info!(
        "Loaded jetton {} ({}) balance {:?}",
        details.symbol, master, details.balance
    );
    Ok(details)
}

/// Check a raw (`wc:hex64`) or user-friendly (48-char base64url) address.
pub fn is_valid_address(address: &str) -> bool {
    let address = address.trim();
    if let Some((workchain, account)) = address.split_once(':') {
        return workchain.parse::<i32>().is_ok()
            && account.len() == 64
            && hex::decode(account).is_ok();
    }
    address.len() == 48
        && address
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'+' | b'/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(balance: Option<&str>, decimals: u8) -> JettonDetails {
        JettonDetails {
            master_address: "0:".to_string() + &"11".repeat(32),
            name: "Symbol".to_string(),
            symbol: "SYM".to_string(),
            decimals,
            total_supply: 1_000_000,
            admin_address: Some("0:".to_string() + &"aa".repeat(32)),
            jetton_wallet: Some("0:".to_string() + &"bb".repeat(32)),
            balance: balance.map(str::to_string),
            is_my_wallet: true,
        }
    }

    #[test]
    fn test_op_wording() {
        assert_eq!(JettonOp::Burn.verb(), "burn");
        assert_eq!(JettonOp::Transfer.past_tense(), "transferred");
        assert!(!JettonOp::Mint.bounded_by_balance());
        assert_eq!(JettonOp::Mint.to_string(), "mint");
    }

    #[test]
    fn test_formatted_balance() {
        assert_eq!(details(Some("100.00"), 2).formatted_balance().as_deref(), Some("100"));
        assert_eq!(
            details(Some("1234567.5"), 9).formatted_balance().as_deref(),
            Some("1,234,567.5")
        );
        assert_eq!(details(None, 2).formatted_balance(), None);
        assert_eq!(details(None, 2).formatted_supply(), "10,000");
    }

    #[test]
    fn test_allows() {
        let me = "0:".to_string() + &"cc".repeat(32);
        let admin = "0:".to_string() + &"aa".repeat(32);
        let d = details(Some("5"), 0);
        assert!(d.allows(JettonOp::Burn, Some(&me)));
        assert!(!d.allows(JettonOp::Burn, None));
        assert!(!d.allows(JettonOp::Mint, Some(&me)));
        assert!(d.allows(JettonOp::Mint, Some(&admin)));

        assert!(!details(Some("0"), 0).allows(JettonOp::Transfer, Some(&me)));
        let mut foreign = details(Some("5"), 0);
        foreign.is_my_wallet = false;
        assert!(!foreign.allows(JettonOp::Burn, Some(&me)));
    }

    #[test]
    fn test_store_ignores_details_for_other_jetton() {
        let d = details(Some("5"), 0);
        let mut store = JettonStore::new(Some(d.master_address.clone()));
        assert!(store.apply(d.clone()));
        assert!(store.details().is_some());

        store.set_master_address(Some("0:".to_string() + &"22".repeat(32)));
        assert!(store.details().is_none());
        assert!(!store.apply(d));
    }

    #[test]
    fn test_is_valid_address() {
        assert!(is_valid_address(&("0:".to_string() + &"ab".repeat(32))));
        assert!(is_valid_address(&("-1:".to_string() + &"AB".repeat(32))));
        assert!(is_valid_address("EQBvW8Z5huBkMJYdnfAEM5JqTNkuWX3diqYENkWsIL0XggGG"));
        assert!(!is_valid_address("0:abc"));
        assert!(!is_valid_address(&("x:".to_string() + &"ab".repeat(32))));
        assert!(!is_valid_address("not an address"));
    }
}
