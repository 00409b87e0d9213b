// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Updown Wallet - Smart Wallet Provisioning Service
//!
//! Provisions an ERC-4337 smart account for a socially logged-in user on
//! Polygon, and submits gas-sponsored approve, transfer and trade operations
//! through a bundler and paymaster.
//!
//! ## Modules
//!
//! - `api` - Local control API handlers (Axum)
//! - `auth` - Social login provider adapter
//! - `backend` - Trading backend REST client and server clock
//! - `blockchain` - Polygon clients, signer and ERC-4337 user operations
//! - `wallet` - Wallet session state machine and balance poller

pub mod api;
pub mod auth;
pub mod backend;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod wallet;

#[cfg(test)]
mod test_support;
