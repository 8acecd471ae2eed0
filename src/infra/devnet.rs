//! In-memory ledger for development mode.
//!
//! Holds one demo jetton whose admin is the dev wallet. Burns, mints and
//! transfers are checked against balances and the admin the way the chain
//! would, so every screen can be exercised without a wallet bridge.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::{
    amount,
    jetton::{JettonDetails, is_valid_address},
    services::{ChainError, Connection, JettonChain},
};

/// Master address of the demo jetton.
pub const DEV_JETTON: &str = "EQD3vJ3tt0nMa5terD3vNetJ3tt0nMa5terD3vNetJ3tt0nM";

/// Dev wallet: admin of the demo jetton, seeded with a balance.
pub const DEV_WALLET: &str = "0:de7e10c0ffee0000de7e10c0ffee0000de7e10c0ffee0000de7e10c0ffee0001";

pub const DEV_DECIMALS: u8 = 9;

/// Initial dev wallet balance, in whole tokens.
const DEV_BALANCE: u128 = 1_000;

#[derive(Debug)]
struct Minter {
    name: String,
    symbol: String,
    decimals: u8,
    admin: Option<String>,
    total_supply: u128,
    /// Base-unit balances by owner address.
    balances: HashMap<String, u128>,
}

impl Minter {
    fn balance_of(&self, owner: &str) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    minters: HashMap<String, Minter>,
}

/// Local jetton ledger implementing [`JettonChain`].
#[derive(Debug)]
pub struct DevLedger {
    state: Mutex<LedgerState>,
    latency: Duration,
}

impl Default for DevLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl DevLedger {
    /// Create a ledger seeded with the demo jetton.
    pub fn new() -> Self {
        let ledger = Self::empty();
        // Seeding a fresh ledger cannot overflow.
        let _ = ledger.deploy(DEV_JETTON, "Dev Jetton", "DEV", DEV_DECIMALS, Some(DEV_WALLET));
        if let Ok(units) = amount::to_base_units(&DEV_BALANCE.to_string(), DEV_DECIMALS) {
            let _ = ledger.credit(DEV_JETTON, DEV_WALLET, units);
        }
        ledger
    }

    /// Create a ledger without any jetton.
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency`, to observe in-progress states.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register a jetton minter.
    pub fn deploy(
        &self,
        master_address: &str,
        name: &str,
        symbol: &str,
        decimals: u8,
        admin: Option<&str>,
    ) -> Result<(), ChainError> {
        let mut state = self.lock()?;
        if state.minters.contains_key(master_address) {
            return Err(ChainError::Rejected(format!(
                "Jetton {} already exists",
                master_address
            )));
        }
        state.minters.insert(
            master_address.to_string(),
            Minter {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
                admin: admin.map(str::to_string),
                total_supply: 0,
                balances: HashMap::new(),
            },
        );
        info!("Deployed dev jetton {} ({})", symbol, master_address);
        Ok(())
    }

    /// Mint `units` to `owner` without an admin check.
    pub fn credit(&self, master_address: &str, owner: &str, units: u128) -> Result<(), ChainError> {
        let mut state = self.lock()?;
        let minter = minter_mut(&mut state, master_address)?;
        mint_into(minter, owner, units)
    }

    /// Base-unit balance of `owner`.
    pub fn balance_of(&self, master_address: &str, owner: &str) -> Result<u128, ChainError> {
        let mut state = self.lock()?;
        Ok(minter_mut(&mut state, master_address)?.balance_of(owner))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>, ChainError> {
        self.state
            .lock()
            .map_err(|_| ChainError::InvalidResponse("dev ledger is poisoned".to_string()))
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Resolve a jetton wallet address back to its minter and owner.
    fn resolve_wallet(
        state: &LedgerState,
        jetton_wallet: &str,
    ) -> Result<(String, String), ChainError> {
        state
            .minters
            .iter()
            .flat_map(|(master, minter)| {
                minter
                    .balances
                    .keys()
                    .map(move |owner| (master, owner))
            })
            .find(|(master, owner)| wallet_address(master, owner) == jetton_wallet)
            .map(|(master, owner)| (master.clone(), owner.clone()))
            .ok_or_else(|| ChainError::Rejected(format!("Unknown jetton wallet {}", jetton_wallet)))
    }

    fn debit_wallet(
        &self,
        connection: &Connection,
        jetton_wallet: &str,
        units: u128,
    ) -> Result<(String, String), ChainError> {
        let mut state = self.lock()?;
        let (master, owner) = Self::resolve_wallet(&state, jetton_wallet)?;
        if owner != connection.address {
            return Err(ChainError::Rejected(
                "Jetton wallet belongs to another owner".to_string(),
            ));
        }
        let minter = minter_mut(&mut state, &master)?;
        let balance = minter.balance_of(&owner);
        let remaining = balance
            .checked_sub(units)
            .ok_or_else(|| ChainError::Rejected("Insufficient jetton balance".to_string()))?;
        minter.balances.insert(owner.clone(), remaining);
        Ok((master, owner))
    }
}

fn minter_mut<'a>(
    state: &'a mut LedgerState,
    master_address: &str,
) -> Result<&'a mut Minter, ChainError> {
    state
        .minters
        .get_mut(master_address)
        .ok_or_else(|| ChainError::Rejected(format!("Jetton {} not found", master_address)))
}

fn mint_into(minter: &mut Minter, owner: &str, units: u128) -> Result<(), ChainError> {
    let overflow = || ChainError::Rejected("Total supply overflow".to_string());
    minter.total_supply = minter.total_supply.checked_add(units).ok_or_else(overflow)?;
    let balance = minter.balances.entry(owner.to_string()).or_insert(0);
    *balance = balance.checked_add(units).ok_or_else(overflow)?;
    Ok(())
}

/// Deterministic jetton wallet address for `owner` under `master_address`.
pub fn wallet_address(master_address: &str, owner: &str) -> String {
    // FNV-1a over both addresses, widened to 32 bytes.
    let mut bytes = [0u8; 32];
    for (lane, chunk) in bytes.chunks_mut(8).enumerate() {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325 ^ lane as u64;
        for b in master_address.bytes().chain([0]).chain(owner.bytes()) {
            hash ^= b as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        chunk.copy_from_slice(&hash.to_be_bytes());
    }
    format!("0:{}", hex::encode(bytes))
}

#[async_trait]
impl JettonChain for DevLedger {
    async fn jetton_details(
        &self,
        master_address: &str,
        owner: Option<&str>,
    ) -> Result<JettonDetails, ChainError> {
        self.delay().await;
        let mut state = self.lock()?;
        let minter = minter_mut(&mut state, master_address)?;

        let holding = owner.filter(|owner| minter.balances.contains_key(*owner));
        let balance = match holding {
            Some(owner) => Some(
                amount::from_base_units(minter.balance_of(owner), minter.decimals)
                    .map_err(|e| ChainError::InvalidResponse(e.to_string()))?,
            ),
            None => None,
        };

        Ok(JettonDetails {
            master_address: master_address.to_string(),
            name: minter.name.clone(),
            symbol: minter.symbol.clone(),
            decimals: minter.decimals,
            total_supply: minter.total_supply,
            admin_address: minter.admin.clone(),
            jetton_wallet: holding.map(|owner| wallet_address(master_address, owner)),
            balance,
            is_my_wallet: holding.is_some(),
        })
    }

    async fn burn(
        &self,
        connection: &Connection,
        amount: u128,
        jetton_wallet: &str,
    ) -> Result<(), ChainError> {
        self.delay().await;
        let (master, _) = self.debit_wallet(connection, jetton_wallet, amount)?;
        let mut state = self.lock()?;
        let minter = minter_mut(&mut state, &master)?;
        minter.total_supply = minter.total_supply.saturating_sub(amount);
        debug!("Burned {} units of {}", amount, master);
        Ok(())
    }

    async fn mint(
        &self,
        connection: &Connection,
        amount: u128,
        master_address: &str,
        recipient: &str,
    ) -> Result<(), ChainError> {
        self.delay().await;
        if !is_valid_address(recipient) {
            return Err(ChainError::Rejected(format!(
                "Invalid recipient address {}",
                recipient
            )));
        }
        let mut state = self.lock()?;
        let minter = minter_mut(&mut state, master_address)?;
        if minter.admin.as_deref() != Some(connection.address.as_str()) {
            return Err(ChainError::Rejected(
                "Only the jetton admin can mint".to_string(),
            ));
        }
        mint_into(minter, recipient, amount)?;
        debug!("Minted {} units of {} to {}", amount, master_address, recipient);
        Ok(())
    }

    async fn transfer(
        &self,
        connection: &Connection,
        amount: u128,
        jetton_wallet: &str,
        recipient: &str,
    ) -> Result<(), ChainError> {
        self.delay().await;
        if !is_valid_address(recipient) {
            return Err(ChainError::Rejected(format!(
                "Invalid recipient address {}",
                recipient
            )));
        }
        let (master, _) = self.debit_wallet(connection, jetton_wallet, amount)?;
        let mut state = self.lock()?;
        let minter = minter_mut(&mut state, &master)?;
        let balance = minter.balances.entry(recipient.to_string()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| ChainError::Rejected("Balance overflow".to_string()))?;
        debug!("Transferred {} units of {} to {}", amount, master, recipient);
        Ok(())
    }
}
