// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read clients for the primary chain RPC and the bundler RPC.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};

use super::types::ChainConfig;

/// The two read-capable clients every later stage depends on.
///
/// Both go through multicall call batching; neither retries.
#[derive(Clone)]
pub struct ChainClients {
    /// General chain RPC (balances, allowances, nonces, fees)
    pub public: DynProvider,
    /// Bundler RPC (user operation receipts)
    pub bundler: DynProvider,
}

impl ChainClients {
    /// Construct both clients from the chain configuration.
    ///
    /// Building an HTTP provider does not touch the network, so this only
    /// fails on endpoint URLs alloy cannot use.
    pub fn new(chain: &ChainConfig) -> Result<Self, ChainError> {
        let public = Self::batching_client(&chain.rpc_url)?;
        let bundler = Self::batching_client(&chain.bundler_url)?;

        tracing::debug!(
            chain_id = chain.chain_id,
            rpc = %chain.rpc_url,
            bundler = %chain.bundler_url,
            "Chain clients constructed"
        );

        Ok(Self { public, bundler })
    }

    fn batching_client(url: &url::Url) -> Result<DynProvider, ChainError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ChainError::InvalidRpcUrl(format!(
                "unsupported scheme `{}` in {url}",
                url.scheme()
            )));
        }

        let provider = ProviderBuilder::new()
            .with_call_batching()
            .connect_http(url.clone());

        Ok(provider.erased())
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Paymaster error: {0}")]
    PaymasterError(String),

    #[error("Bundler error: {0}")]
    BundlerError(String),

    #[error("User operation {0} reverted")]
    OperationReverted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(rpc: &str, bundler: &str) -> ChainConfig {
        ChainConfig::select(
            false,
            rpc.parse().unwrap(),
            bundler.parse().unwrap(),
            "https://paymaster.example".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn builds_both_clients_without_network() {
        let clients = ChainClients::new(&chain("http://127.0.0.1:1", "http://127.0.0.1:2"));
        assert!(clients.is_ok());
    }

    #[tokio::test]
    async fn rejects_non_http_endpoints() {
        let result = ChainClients::new(&chain("http://127.0.0.1:1", "ws://127.0.0.1:2"));
        assert!(matches!(result, Err(ChainError::InvalidRpcUrl(_))));
    }
}
