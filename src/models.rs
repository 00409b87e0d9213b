// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the local control API. All types derive
//! `ToSchema` for the OpenAPI document served at `/docs`.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype carries Ethereum-style addresses (0x-prefixed,
//! 40 hex characters) as received from the UI, and is parsed into a typed
//! address only where one is needed.
//!
//! ## Model Categories
//!
//! - **Session**: login, viewport and snapshot
//! - **Wallet**: allowance, balance, bet amount, trade, transfer, signing
//! - **Clock**: server time offset
//! - **Config**: public runtime configuration for the UI

use std::str::FromStr;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{SocialProvider, UxMode};
use crate::blockchain::Direction;
use crate::config::AuthNetwork;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Parse into a typed address. Mixed-case input must carry a valid
    /// checksum.
    pub fn parse(&self) -> Result<Address, String> {
        Address::from_str(self.0.trim()).map_err(|e| format!("invalid address {}: {e}", self.0))
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<Address> for WalletAddress {
    fn from(value: Address) -> Self {
        WalletAddress(value.to_checksum(None))
    }
}

// =============================================================================
// Session Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginRequest {
    pub provider: SocialProvider,
}

/// Viewport width reported by the UI on resize.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ViewportRequest {
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ViewportResponse {
    pub ux_mode: UxMode,
}

// =============================================================================
// Wallet Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AllowanceResponse {
    /// Allowance granted to the trading contract, in token base units
    pub allowance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BalanceResponse {
    /// Token balance of the smart wallet, in whole tokens
    pub balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BetAmountRequest {
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BetAmountResponse {
    pub selected: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TradeRequest {
    pub direction: Direction,
}

/// Token transfer from the smart wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TransferRequest {
    /// Amount in whole tokens, e.g. `"2.5"`
    pub amount: String,
    pub to: WalletAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SignRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SignResponse {
    pub address: WalletAddress,
    /// 65-byte signature, 0x-prefixed hex
    pub signature: String,
}

// =============================================================================
// Clock Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ClockResponse {
    /// `local_now - server_time` in milliseconds
    pub offset_ms: i64,
    /// Current server time estimated from the offset
    pub server_now: DateTime<Utc>,
}

// =============================================================================
// Config Models
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: u64,
    /// `0x`-prefixed hex chain id
    pub chain_id_hex: String,
    pub display_name: String,
    pub native_currency_symbol: String,
    pub native_currency_name: String,
    pub explorer_url: String,
}

/// Runtime configuration the UI needs. Holds no secrets.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct PublicConfig {
    pub is_mainnet: bool,
    pub chain: ChainInfo,
    pub client_id: String,
    pub auth_network: AuthNetwork,
    pub ws_host: Option<String>,
    pub token_address: WalletAddress,
    pub contract_address: WalletAddress,
    pub token_decimals: u8,
    pub bet_amounts: Vec<String>,
    pub default_bet_amount: String,
    pub pool_id: String,
    pub login_providers: Vec<SocialProvider>,
}
