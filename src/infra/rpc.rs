//! JSON-RPC client for the wallet bridge.
//!
//! The bridge owns the wallet session and the node connection; this client
//! only asks it to read jetton state or to send burn/mint/transfer messages.
//! Amounts travel as decimal strings since base units exceed JSON numbers.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{
    Deserialize, Serialize,
    de::{DeserializeOwned, IgnoredAny},
};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    config::Config,
    domain::{
        amount,
        jetton::JettonDetails,
        services::{ChainError, Connection, JettonChain},
    },
};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Reply envelope. Void methods answer `"result": null`, so `result` is
/// kept raw and only decoded once `error` is known to be absent.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

impl RpcResponse {
    fn into_result<T: DeserializeOwned>(self, method: &str) -> Result<T, ChainError> {
        match self.error {
            Some(error) if error.code == 0 => Err(ChainError::Rejected(error.message)),
            Some(error) => Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            }),
            None => serde_json::from_value(self.result).map_err(|e| {
                ChainError::InvalidResponse(format!("{} returned an unexpected result: {}", method, e))
            }),
        }
    }
}

/// Jetton state as returned by `getJettonDetails`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJettonDetails {
    pub name: String,
    pub symbol: String,
    pub decimals: Option<u8>,
    pub total_supply: String,
    pub admin_address: Option<String>,
    pub jetton_wallet: Option<String>,
    /// Wallet balance in base units.
    pub balance: Option<String>,
}

impl RawJettonDetails {
    /// Convert to domain details. Missing `decimals` is an error: the
    /// precision is never guessed.
    pub fn into_details(
        self,
        master_address: &str,
        owner: Option<&str>,
    ) -> Result<JettonDetails, ChainError> {
        let decimals = self.decimals.ok_or_else(|| {
            ChainError::InvalidResponse(format!("jetton {} has no decimals", master_address))
        })?;
        let parse_units = |field: &str, value: &str| {
            value.parse::<u128>().map_err(|_| {
                ChainError::InvalidResponse(format!("{} is not an integer: {}", field, value))
            })
        };

        let total_supply = parse_units("totalSupply", &self.total_supply)?;
        let balance = match self.balance.as_deref() {
            Some(raw) => {
                let units = parse_units("balance", raw)?;
                Some(
                    amount::from_base_units(units, decimals)
                        .map_err(|e| ChainError::InvalidResponse(e.to_string()))?,
                )
            }
            None => None,
        };

        Ok(JettonDetails {
            master_address: master_address.to_string(),
            name: self.name,
            symbol: self.symbol,
            decimals,
            total_supply,
            admin_address: self.admin_address,
            is_my_wallet: owner.is_some() && self.jetton_wallet.is_some(),
            jetton_wallet: self.jetton_wallet,
            balance,
        })
    }
}

/// Wallet bridge RPC client.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.network.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("RPC {} -> {}", method, self.url);

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_result(method)
    }

    /// Call a method whose result carries nothing, whatever its shape.
    async fn send(&self, method: &str, params: Value) -> Result<(), ChainError> {
        let _: IgnoredAny = self.call(method, params).await?;
        Ok(())
    }
}

#[async_trait]
impl JettonChain for RpcClient {
    async fn jetton_details(
        &self,
        master_address: &str,
        owner: Option<&str>,
    ) -> Result<JettonDetails, ChainError> {
        let raw: RawJettonDetails = self
            .call(
                "getJettonDetails",
                json!({ "master": master_address, "owner": owner }),
            )
            .await?;
        raw.into_details(master_address, owner)
    }

    async fn burn(
        &self,
        connection: &Connection,
        amount: u128,
        jetton_wallet: &str,
    ) -> Result<(), ChainError> {
        self.send(
            "burnJettons",
            json!({
                "owner": connection.address,
                "jettonWallet": jetton_wallet,
                "amount": amount.to_string(),
            }),
        )
        .await
    }

    async fn mint(
        &self,
        connection: &Connection,
        amount: u128,
        master_address: &str,
        recipient: &str,
    ) -> Result<(), ChainError> {
        self.send(
            "mintJettons",
            json!({
                "admin": connection.address,
                "master": master_address,
                "recipient": recipient,
                "amount": amount.to_string(),
            }),
        )
        .await
    }

    async fn transfer(
        &self,
        connection: &Connection,
        amount: u128,
        jetton_wallet: &str,
        recipient: &str,
    ) -> Result<(), ChainError> {
        self.send(
            "transferJettons",
            json!({
                "owner": connection.address,
                "jettonWallet": jetton_wallet,
                "recipient": recipient,
                "amount": amount.to_string(),
            }),
        )
        .await
    }
}
