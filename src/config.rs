// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variables are read once at startup into [`AppConfig`]. A
//! `.env` file in the working directory is loaded first when present.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `VITE_APP_IS_MAINNET` | `true` selects Polygon, anything else Polygon Amoy | `false` |
//! | `VITE_API_URL` | Backend REST base URL | Required |
//! | `VITE_API_WS_HOST` | Backend websocket host, passed through to the UI | Optional |
//! | `VITE_APP_RPC_URL` | Chain JSON-RPC endpoint | Required |
//! | `VITE_APP_BUNDLER_URL` | ERC-4337 bundler endpoint | Required |
//! | `VITE_APP_PAYMASTER_URL` | Paymaster endpoint | Required |
//! | `VITE_APP_CLIENT_ID` | Login provider client ID | Required |
//! | `VITE_APP_ALLOWANCE_AMOUNT` | Token allowance granted to the trading contract | Required |
//! | `VITE_APP_TOKEN_ADDRESS` | ERC-20 token used for bets | Required |
//! | `VITE_APP_CONTRACT_ADDRESS` | Trading contract | Required |
//! | `VITE_APP_TOKEN_DECIMALS` | Token decimals | Required |
//! | `VITE_APP_BET_AMOUNTS` | Comma-separated bet amounts offered to the user | Required |
//! | `VITE_APP_DEFAULT_BET_AMOUNT` | Initially selected bet amount | Required |
//! | `VITE_APP_POOL_ID` | Trading pool ID | Required |
//! | `HOST` | Control API bind address | `127.0.0.1` |
//! | `PORT` | Control API bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `APP_<PROVIDER>_PRIVATE_KEY[_PATH]` | Local login keys, see [`crate::auth::LocalKeyProvider`] | Optional |

use std::{net::IpAddr, str::FromStr};

use alloy::primitives::Address;
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::{parse_units, ChainConfig};

pub const IS_MAINNET_ENV: &str = "VITE_APP_IS_MAINNET";
pub const API_URL_ENV: &str = "VITE_API_URL";
pub const API_WS_HOST_ENV: &str = "VITE_API_WS_HOST";
pub const RPC_URL_ENV: &str = "VITE_APP_RPC_URL";
pub const BUNDLER_URL_ENV: &str = "VITE_APP_BUNDLER_URL";
pub const PAYMASTER_URL_ENV: &str = "VITE_APP_PAYMASTER_URL";
pub const CLIENT_ID_ENV: &str = "VITE_APP_CLIENT_ID";
pub const ALLOWANCE_AMOUNT_ENV: &str = "VITE_APP_ALLOWANCE_AMOUNT";
pub const TOKEN_ADDRESS_ENV: &str = "VITE_APP_TOKEN_ADDRESS";
pub const CONTRACT_ADDRESS_ENV: &str = "VITE_APP_CONTRACT_ADDRESS";
pub const TOKEN_DECIMALS_ENV: &str = "VITE_APP_TOKEN_DECIMALS";
pub const BET_AMOUNTS_ENV: &str = "VITE_APP_BET_AMOUNTS";
pub const DEFAULT_BET_AMOUNT_ENV: &str = "VITE_APP_DEFAULT_BET_AMOUNT";
pub const POOL_ID_ENV: &str = "VITE_APP_POOL_ID";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Login provider network, tied to the chain selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthNetwork {
    SapphireMainnet,
    SapphireDevnet,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason: format!("expected `json` or `pretty`, got `{other}`"),
            }),
        }
    }
}

/// Typed application configuration. Immutable after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub is_mainnet: bool,
    pub api_url: url::Url,
    pub ws_host: Option<String>,
    pub chain: ChainConfig,
    pub client_id: String,
    pub auth_network: AuthNetwork,
    /// Human-readable allowance granted to the trading contract
    pub allowance_amount: String,
    pub token_address: Address,
    pub contract_address: Address,
    pub token_decimals: u8,
    pub bet_amounts: Vec<String>,
    pub default_bet_amount: String,
    pub pool_id: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| -> Option<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let is_mainnet = get(IS_MAINNET_ENV).as_deref() == Some("true");

        let api_url = parse_url(API_URL_ENV, &required(API_URL_ENV)?)?;
        let chain = ChainConfig::select(
            is_mainnet,
            parse_url(RPC_URL_ENV, &required(RPC_URL_ENV)?)?,
            parse_url(BUNDLER_URL_ENV, &required(BUNDLER_URL_ENV)?)?,
            parse_url(PAYMASTER_URL_ENV, &required(PAYMASTER_URL_ENV)?)?,
        );

        let token_decimals = required(TOKEN_DECIMALS_ENV)?
            .parse::<u8>()
            .map_err(|e| invalid(TOKEN_DECIMALS_ENV, e))?;
        if token_decimals > 77 {
            return Err(invalid(TOKEN_DECIMALS_ENV, "at most 77 decimals fit in uint256"));
        }

        let allowance_amount = required(ALLOWANCE_AMOUNT_ENV)?;
        check_amount(ALLOWANCE_AMOUNT_ENV, &allowance_amount, token_decimals)?;

        let bet_amounts: Vec<String> = required(BET_AMOUNTS_ENV)?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if bet_amounts.is_empty() {
            return Err(invalid(BET_AMOUNTS_ENV, "no bet amounts listed"));
        }
        for amount in &bet_amounts {
            check_amount(BET_AMOUNTS_ENV, amount, token_decimals)?;
        }

        let default_bet_amount = required(DEFAULT_BET_AMOUNT_ENV)?;
        check_amount(DEFAULT_BET_AMOUNT_ENV, &default_bet_amount, token_decimals)?;

        let host = get(HOST_ENV)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .map_err(|e| invalid(HOST_ENV, e))?;
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| invalid(PORT_ENV, e))?,
            None => DEFAULT_PORT,
        };
        let log_format = get(LOG_FORMAT_ENV)
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            is_mainnet,
            api_url,
            ws_host: get(API_WS_HOST_ENV),
            chain,
            client_id: required(CLIENT_ID_ENV)?,
            auth_network: if is_mainnet {
                AuthNetwork::SapphireMainnet
            } else {
                AuthNetwork::SapphireDevnet
            },
            allowance_amount,
            token_address: parse_address(TOKEN_ADDRESS_ENV, &required(TOKEN_ADDRESS_ENV)?)?,
            contract_address: parse_address(
                CONTRACT_ADDRESS_ENV,
                &required(CONTRACT_ADDRESS_ENV)?,
            )?,
            token_decimals,
            bet_amounts,
            default_bet_amount,
            pool_id: required(POOL_ID_ENV)?,
            host,
            port,
            log_format,
        })
    }
}

fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|e: url::ParseError| invalid(name, e))
}

fn parse_address(name: &'static str, raw: &str) -> Result<Address, ConfigError> {
    Address::from_str(raw).map_err(|e| invalid(name, e))
}

fn check_amount(name: &'static str, raw: &str, decimals: u8) -> Result<(), ConfigError> {
    parse_units(raw, decimals).map(|_| ()).map_err(|e| invalid(name, e))
}
