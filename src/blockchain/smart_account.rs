// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SimpleAccount (EntryPoint v0.6) smart account.
//!
//! Every call is wrapped in `execute(dest, value, func)`, sponsored by the
//! paymaster, signed by the owner and handed to the bundler. Waiting for
//! inclusion is a separate step so callers can observe submit and wait
//! failures independently.

use alloy::{
    primitives::{aliases::U192, Address, Bytes, U256},
    providers::{DynProvider, Provider},
    sol,
    sol_types::SolCall,
};
use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::bundler::{BundlerClient, Paymaster, PaymasterPolicy, WaitPolicy};
use super::client::{ChainClients, ChainError};
use super::signing::SignerAccount;
use super::types::{ENTRY_POINT_V06, SIMPLE_ACCOUNT_FACTORY_V06};
use super::user_op::{UserOpHandle, UserOperation, UserOperationReceipt, DUMMY_SIGNATURE};

sol! {
    #[sol(rpc)]
    interface ISimpleAccountFactory {
        function createAccount(address owner, uint256 salt) external returns (address ret);
        function getAddress(address owner, uint256 salt) external view returns (address);
    }

    interface ISimpleAccount {
        function execute(address dest, uint256 value, bytes func) external;
    }

    #[sol(rpc)]
    interface IEntryPoint {
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
    }
}

/// A contract call to run from the smart account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
}

impl Call {
    /// Zero-value call to `target`.
    pub fn new(target: Address, data: Bytes) -> Self {
        Self {
            target,
            value: U256::ZERO,
            data,
        }
    }
}

/// Operations the wallet session needs from a smart account.
#[async_trait]
pub trait SmartAccountOps: Send + Sync {
    /// Deterministic counterfactual sender address.
    async fn sender_address(&self) -> Result<Address, ChainError>;

    /// Build, sponsor, sign and submit a user operation running `call`.
    async fn submit(&self, call: Call) -> Result<UserOpHandle, ChainError>;

    /// Wait for inclusion of a submitted operation. `None` when the wait
    /// ended before the bundler reported a receipt.
    async fn wait(&self, handle: &UserOpHandle)
        -> Result<Option<UserOperationReceipt>, ChainError>;
}

/// Static shape of the smart account.
#[derive(Debug, Clone)]
pub struct SmartAccountConfig {
    pub entry_point: Address,
    pub factory: Address,
    pub salt: U256,
    pub chain_id: u64,
    pub paymaster: PaymasterPolicy,
    pub wait: WaitPolicy,
}

impl SmartAccountConfig {
    /// Default v0.6 SimpleAccount deployment with salt 0.
    pub fn simple_account(chain_id: u64, paymaster: PaymasterPolicy) -> Self {
        Self {
            entry_point: ENTRY_POINT_V06,
            factory: SIMPLE_ACCOUNT_FACTORY_V06,
            salt: U256::ZERO,
            chain_id,
            paymaster,
            wait: WaitPolicy::default(),
        }
    }
}

/// SimpleAccount owned by a local signer.
pub struct SimpleAccount {
    owner: SignerAccount,
    public: DynProvider,
    bundler: BundlerClient,
    paymaster: Paymaster,
    config: SmartAccountConfig,
    sender: OnceCell<Address>,
}

impl SimpleAccount {
    /// Compose the account from the chain clients, the owner signer and the
    /// paymaster policy. Does not touch the network.
    pub fn new(clients: &ChainClients, owner: SignerAccount, config: SmartAccountConfig) -> Self {
        let bundler = BundlerClient::new(
            clients.bundler.clone(),
            owner.wallet_client().clone(),
            config.entry_point,
        );
        let paymaster = Paymaster::new(config.paymaster.clone());

        Self {
            owner,
            public: clients.public.clone(),
            bundler,
            paymaster,
            config,
            sender: OnceCell::new(),
        }
    }

    async fn build_user_operation(&self, call: &Call) -> Result<UserOperation, ChainError> {
        let sender = self.sender_address().await?;

        let code = self
            .public
            .get_code_at(sender)
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;
        let init_code = if code.is_empty() {
            init_code(self.config.factory, self.owner.address(), self.config.salt)
        } else {
            Bytes::new()
        };

        let nonce: U256 = IEntryPoint::new(self.config.entry_point, self.public.clone())
            .getNonce(sender, U192::ZERO)
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))?;

        let fees = self
            .public
            .estimate_eip1559_fees()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        let mut op = UserOperation {
            sender,
            nonce,
            init_code,
            call_data: encode_execute(call),
            max_fee_per_gas: U256::from(fees.max_fee_per_gas),
            max_priority_fee_per_gas: U256::from(fees.max_priority_fee_per_gas),
            signature: DUMMY_SIGNATURE,
            ..Default::default()
        };

        self.paymaster
            .sponsor(&op, self.config.entry_point)
            .await?
            .apply(&mut op);

        let hash = op.hash(self.config.entry_point, self.config.chain_id);
        let signature = self.owner.sign_message(hash.as_slice()).await?;
        op.signature = Bytes::from(signature.as_bytes().to_vec());

        Ok(op)
    }
}

#[async_trait]
impl SmartAccountOps for SimpleAccount {
    async fn sender_address(&self) -> Result<Address, ChainError> {
        let sender = self
            .sender
            .get_or_try_init(|| async {
                ISimpleAccountFactory::new(self.config.factory, self.public.clone())
                    .getAddress(self.owner.address(), self.config.salt)
                    .call()
                    .await
                    .map_err(|e| ChainError::ContractError(e.to_string()))
            })
            .await?;
        Ok(*sender)
    }

    async fn submit(&self, call: Call) -> Result<UserOpHandle, ChainError> {
        let op = self.build_user_operation(&call).await?;
        let user_op_hash = self.bundler.send_user_operation(&op).await?;

        tracing::info!(
            user_op_hash = %user_op_hash,
            sender = %op.sender,
            target = %call.target,
            "User operation sent"
        );

        Ok(UserOpHandle { user_op_hash })
    }

    async fn wait(
        &self,
        handle: &UserOpHandle,
    ) -> Result<Option<UserOperationReceipt>, ChainError> {
        let Some(receipt) = self
            .bundler
            .wait_for_receipt(handle.user_op_hash, self.config.wait)
            .await?
        else {
            tracing::info!(
                user_op_hash = %handle.user_op_hash,
                "User operation still pending after receipt wait"
            );
            return Ok(None);
        };

        tracing::info!(
            user_op_hash = %receipt.user_op_hash,
            success = receipt.success,
            tx_hash = ?receipt.transaction_hash(),
            "User operation receipt"
        );

        if !receipt.success {
            return Err(ChainError::OperationReverted(receipt.user_op_hash.to_string()));
        }
        Ok(Some(receipt))
    }
}

/// `execute(dest, value, func)` calldata for the account.
pub fn encode_execute(call: &Call) -> Bytes {
    ISimpleAccount::executeCall {
        dest: call.target,
        value: call.value,
        func: call.data.clone(),
    }
    .abi_encode()
    .into()
}

/// Factory address followed by `createAccount(owner, salt)` calldata.
pub fn init_code(factory: Address, owner: Address, salt: U256) -> Bytes {
    let mut code = factory.to_vec();
    code.extend(ISimpleAccountFactory::createAccountCall { owner, salt }.abi_encode());
    code.into()
}
