// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-4337 v0.6 user operation types.

use alloy::{
    primitives::{bytes, keccak256, Address, Bytes, B256, U256, U64},
    sol_types::SolValue,
};
use serde::{Deserialize, Serialize};

/// Placeholder signature used while the operation is still being priced and
/// sponsored. Shaped like a real 65-byte ECDSA signature so SimpleAccount's
/// validation path costs the same gas.
pub const DUMMY_SIGNATURE: Bytes = bytes!(
    "fffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c"
);

/// EntryPoint v0.6 user operation, in the JSON shape bundlers accept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

impl UserOperation {
    /// Hash the EntryPoint and the owner sign over. The signature field is
    /// not part of it.
    pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        let packed = (
            self.sender,
            self.nonce,
            keccak256(&self.init_code),
            keccak256(&self.call_data),
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            keccak256(&self.paymaster_and_data),
        )
            .abi_encode_params();

        keccak256((keccak256(packed), entry_point, U256::from(chain_id)).abi_encode_params())
    }
}

/// Sponsorship result of `pm_sponsorUserOperation`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorResult {
    pub paymaster_and_data: Bytes,
    pub pre_verification_gas: U256,
    pub verification_gas_limit: U256,
    pub call_gas_limit: U256,
}

impl SponsorResult {
    pub fn apply(self, op: &mut UserOperation) {
        op.paymaster_and_data = self.paymaster_and_data;
        op.pre_verification_gas = self.pre_verification_gas;
        op.verification_gas_limit = self.verification_gas_limit;
        op.call_gas_limit = self.call_gas_limit;
    }
}

/// Handle for a submitted user operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOpHandle {
    pub user_op_hash: B256,
}

/// Inclusion receipt returned by `eth_getUserOperationReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    pub user_op_hash: B256,
    #[serde(default)]
    pub sender: Address,
    pub success: bool,
    #[serde(default)]
    pub actual_gas_cost: U256,
    #[serde(default)]
    pub actual_gas_used: U256,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub receipt: Option<InclusionReceipt>,
}

/// Transaction that carried the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
}

impl UserOperationReceipt {
    pub fn transaction_hash(&self) -> Option<B256> {
        self.receipt.as_ref().map(|r| r.transaction_hash)
    }
}
