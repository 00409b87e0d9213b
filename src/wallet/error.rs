// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet session errors.

use std::fmt;

use crate::auth::AuthProviderError;
use crate::backend::BackendError;
use crate::blockchain::ChainError;

/// Initialization stage an operation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Auth,
    Clients,
    Signer,
    SmartAccount,
    SenderAddress,
    TokenContract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Auth => "login session",
            Stage::Clients => "chain clients",
            Stage::Signer => "signer",
            Stage::SmartAccount => "smart account",
            Stage::SenderAddress => "sender address",
            Stage::TokenContract => "token contract",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// A precondition stage has not completed; nothing was changed or sent
    #[error("{0} is not initialized")]
    NotInitialized(Stage),

    #[error(transparent)]
    Auth(#[from] AuthProviderError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A value the operation needs is absent
    #[error("{0}")]
    Absent(String),

    #[error("{0}")]
    Invalid(String),
}

impl WalletError {
    /// Stable error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            WalletError::NotInitialized(_) => "not_initialized",
            WalletError::Auth(e) => e.error_code(),
            WalletError::Chain(ChainError::OperationReverted(_)) => "operation_reverted",
            WalletError::Chain(_) => "chain_error",
            WalletError::Backend(BackendError::MissingToken) => "missing_token",
            WalletError::Backend(_) => "backend_error",
            WalletError::Absent(_) => "absent",
            WalletError::Invalid(_) => "invalid_request",
        }
    }

    /// True for failures of an outside service rather than of local state.
    pub fn is_external(&self) -> bool {
        match self {
            WalletError::Chain(
                ChainError::InvalidAmount(_)
                | ChainError::InvalidPrivateKey(_)
                | ChainError::InvalidRpcUrl(_),
            ) => false,
            WalletError::Chain(_) => true,
            WalletError::Backend(BackendError::MissingToken) => false,
            WalletError::Backend(_) => true,
            WalletError::Auth(
                AuthProviderError::NotConnected | AuthProviderError::ProviderUnavailable(_),
            ) => false,
            WalletError::Auth(_) => true,
            _ => false,
        }
    }
}
