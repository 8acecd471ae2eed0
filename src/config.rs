use std::path::PathBuf;

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Get the data directory for the application.
pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = std::env::var("JETTON_CONSOLE_DATA") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "jetton-console", "jetton-console") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Get the config directory for the application.
pub fn get_config_dir() -> PathBuf {
    if let Ok(s) = std::env::var("JETTON_CONSOLE_CONFIG") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "jetton-console", "jetton-console") {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
}

/// Timings of the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Default lifetime of a notification without its own dismiss delay.
    pub notification_ms: u64,
    /// Lifetime of form validation warnings.
    pub form_error_ms: u64,
    /// Artificial latency of the devnet ledger.
    pub dev_latency_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ms: 5000,
            form_error_ms: 3000,
            dev_latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::testnet()
    }
}

impl Config {
    /// Create config from CLI args.
    pub fn new(network: &str, rpc_url: Option<&str>) -> Self {
        let mut config = Self::from_network(network);
        if let Some(url) = rpc_url {
            config.network.rpc_url = url.to_string();
        }
        config
    }

    pub fn testnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "testnet".to_string(),
                rpc_url: "http://127.0.0.1:8787/testnet".to_string(),
            },
            ui: UiConfig::default(),
        }
    }

    pub fn mainnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "mainnet".to_string(),
                rpc_url: "http://127.0.0.1:8787/mainnet".to_string(),
            },
            ui: UiConfig::default(),
        }
    }

    pub fn devnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "devnet".to_string(),
                rpc_url: "memory://devnet".to_string(),
            },
            ui: UiConfig {
                dev_latency_ms: 800,
                ..UiConfig::default()
            },
        }
    }

    pub fn from_network(network: &str) -> Self {
        match network {
            "mainnet" => Self::mainnet(),
            "devnet" => Self::devnet(),
            _ => Self::testnet(),
        }
    }

    /// Whether chain calls go to the in-memory ledger.
    pub fn is_devnet(&self) -> bool {
        self.network.name == "devnet"
    }

    /// Override UI timings from `ui.json` in the config directory, if present.
    pub fn with_ui_overrides(mut self) -> Result<Self> {
        let path = get_config_dir().join("ui.json");
        if path.exists() {
            debug!("Loading UI config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            self.ui = serde_json::from_str(&content)?;
        }
        Ok(self)
    }
}
