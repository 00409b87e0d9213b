// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for Polygon (EVM) and ERC-4337 v0.6.
//!
//! This module provides functionality for:
//! - Read clients for the chain RPC and the bundler RPC
//! - Signer derivation from login-provider key material
//! - ERC-20 and trading contract calldata
//! - SimpleAccount user operations with paymaster sponsorship

pub mod bundler;
pub mod client;
pub mod erc20;
pub mod signing;
pub mod smart_account;
pub mod trade;
pub mod types;
pub mod units;
pub mod user_op;

pub use client::{ChainClients, ChainError};
pub use erc20::{Erc20Contract, TokenReader};
pub use signing::SignerAccount;
pub use smart_account::{Call, SimpleAccount, SmartAccountConfig, SmartAccountOps};
pub use trade::TradeOrder;
pub use types::*;
pub use units::{format_units, parse_units};
pub use user_op::{UserOpHandle, UserOperation, UserOperationReceipt};
