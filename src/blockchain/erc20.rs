// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::DynProvider,
    sol,
    sol_types::SolCall,
};
use async_trait::async_trait;

use super::client::ChainError;

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Read side of a token binding, as the wallet session consumes it.
#[async_trait]
pub trait TokenReader: Send + Sync {
    /// Token contract address.
    fn address(&self) -> Address;

    /// Allowance `owner` has granted `spender`, in base units.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError>;

    /// Token balance of `owner`, in base units.
    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError>;
}

/// ERC-20 contract bound to a read client.
#[derive(Clone)]
pub struct Erc20Contract {
    contract: IERC20::IERC20Instance<DynProvider>,
    address: Address,
}

impl Erc20Contract {
    /// Bind the token at `address` to the given read client.
    pub fn new(provider: &DynProvider, address: Address) -> Self {
        let contract = IERC20::new(address, provider.clone());
        Self { contract, address }
    }
}

#[async_trait]
impl TokenReader for Erc20Contract {
    fn address(&self) -> Address {
        self.address
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError> {
        self.contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }
}

/// Calldata for `approve(spender, amount)`.
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

/// Calldata for `transfer(to, amount)`.
pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}
