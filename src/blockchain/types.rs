// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Static description of a supported EVM network.
#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// Native currency ticker
    pub native_symbol: &'static str,
    /// Native currency name
    pub native_name: &'static str,
}

/// Polygon PoS mainnet.
pub const POLYGON_MAINNET: NetworkConfig = NetworkConfig {
    name: "Polygon",
    chain_id: 137,
    explorer_url: "https://polygonscan.com",
    native_symbol: "POL",
    native_name: "POL",
};

/// Polygon Amoy testnet.
pub const POLYGON_AMOY: NetworkConfig = NetworkConfig {
    name: "Polygon Amoy",
    chain_id: 80002,
    explorer_url: "https://amoy.polygonscan.com",
    native_symbol: "POL",
    native_name: "POL",
};

/// Chain selection resolved once at startup. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub rpc_url: url::Url,
    pub bundler_url: url::Url,
    pub paymaster_url: url::Url,
    pub display_name: String,
    pub native_currency_symbol: String,
    pub native_currency_name: String,
    pub explorer_url: String,
}

impl ChainConfig {
    /// Build the chain config for the mainnet/testnet flag and endpoint URLs.
    pub fn select(
        is_mainnet: bool,
        rpc_url: url::Url,
        bundler_url: url::Url,
        paymaster_url: url::Url,
    ) -> Self {
        let network = if is_mainnet {
            POLYGON_MAINNET
        } else {
            POLYGON_AMOY
        };

        Self {
            chain_id: network.chain_id,
            rpc_url,
            bundler_url,
            paymaster_url,
            display_name: network.name.to_string(),
            native_currency_symbol: network.native_symbol.to_string(),
            native_currency_name: network.native_name.to_string(),
            explorer_url: network.explorer_url.to_string(),
        }
    }

    /// Chain ID as a `0x`-prefixed hex quantity, as login providers expect it.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

/// ERC-4337 EntryPoint v0.6 (same address on every chain).
pub const ENTRY_POINT_V06: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

/// SimpleAccountFactory deployed against EntryPoint v0.6.
pub const SIMPLE_ACCOUNT_FACTORY_V06: Address =
    address!("9406Cc6185a346906296840746125a0E44976454");

/// Trade direction for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }
}

impl From<bool> for Direction {
    fn from(is_up: bool) -> Self {
        if is_up {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}
