// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bundler and paymaster JSON-RPC.
//!
//! Both services are opaque: operations go in through
//! `eth_sendUserOperation`, sponsorship through `pm_sponsorUserOperation`,
//! and inclusion is observed with `eth_getUserOperationReceipt`.

use std::time::{Duration, Instant};

use alloy::{
    primitives::{Address, B256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use serde::Serialize;

use super::client::ChainError;
use super::user_op::{SponsorResult, UserOperation, UserOperationReceipt};

/// Receipt wait bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Stop probing once this much time has passed since the first probe.
    pub timeout: Duration,
    /// Delay between receipt probes.
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(300),
            interval: Duration::from_secs(3),
        }
    }
}

/// Bundler endpoint: reads on the bundler read client, writes through the
/// signer's wallet client.
#[derive(Clone)]
pub struct BundlerClient {
    read: DynProvider,
    write: DynProvider,
    entry_point: Address,
}

impl BundlerClient {
    pub fn new(read: DynProvider, write: DynProvider, entry_point: Address) -> Self {
        Self {
            read,
            write,
            entry_point,
        }
    }

    /// Submit a signed operation; returns its user-op hash.
    pub async fn send_user_operation(&self, op: &UserOperation) -> Result<B256, ChainError> {
        self.write
            .raw_request("eth_sendUserOperation".into(), (op.clone(), self.entry_point))
            .await
            .map_err(|e| ChainError::BundlerError(e.to_string()))
    }

    /// Receipt for `user_op_hash`, or `None` while it is still pending.
    pub async fn get_user_operation_receipt(
        &self,
        user_op_hash: B256,
    ) -> Result<Option<UserOperationReceipt>, ChainError> {
        self.read
            .raw_request("eth_getUserOperationReceipt".into(), (user_op_hash,))
            .await
            .map_err(|e| ChainError::BundlerError(e.to_string()))
    }

    /// Poll for the receipt. Probes at least once, then every
    /// `policy.interval` until `policy.timeout` has elapsed. `None` means the
    /// operation was accepted but is still pending when the wait ends.
    pub async fn wait_for_receipt(
        &self,
        user_op_hash: B256,
        policy: WaitPolicy,
    ) -> Result<Option<UserOperationReceipt>, ChainError> {
        let started = Instant::now();

        loop {
            if let Some(receipt) = self.get_user_operation_receipt(user_op_hash).await? {
                return Ok(Some(receipt));
            }

            let elapsed = started.elapsed();
            if elapsed >= policy.timeout {
                return Ok(None);
            }

            tokio::time::sleep(policy.interval.min(policy.timeout - elapsed)).await;
        }
    }
}

/// Paymaster RPC flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymasterVariant {
    /// `pm_sponsorUserOperation(op, entryPoint, {type})`
    StackupV1,
}

/// Sponsorship billing type sent in the paymaster context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorshipKind {
    /// Pay-as-you-go
    Payg,
}

#[derive(Debug, Clone, Serialize)]
struct PaymasterContext {
    #[serde(rename = "type")]
    kind: SponsorshipKind,
}

/// Gas sponsorship policy for every user operation the account sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymasterPolicy {
    pub rpc_url: url::Url,
    pub variant: PaymasterVariant,
    pub kind: SponsorshipKind,
}

impl PaymasterPolicy {
    /// Pay-as-you-go sponsorship on a stackup-style paymaster.
    pub fn payg(rpc_url: url::Url) -> Self {
        Self {
            rpc_url,
            variant: PaymasterVariant::StackupV1,
            kind: SponsorshipKind::Payg,
        }
    }
}

/// Paymaster client for a [`PaymasterPolicy`].
#[derive(Clone)]
pub struct Paymaster {
    policy: PaymasterPolicy,
    client: DynProvider,
}

impl Paymaster {
    pub fn new(policy: PaymasterPolicy) -> Self {
        let client = ProviderBuilder::new()
            .connect_http(policy.rpc_url.clone())
            .erased();
        Self { policy, client }
    }

    /// Ask the paymaster to sponsor `op`; the result carries paymaster data
    /// and the gas limits the paymaster priced it with.
    pub async fn sponsor(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> Result<SponsorResult, ChainError> {
        match self.policy.variant {
            PaymasterVariant::StackupV1 => {
                let context = PaymasterContext {
                    kind: self.policy.kind,
                };
                self.client
                    .raw_request(
                        "pm_sponsorUserOperation".into(),
                        (op.clone(), entry_point, context),
                    )
                    .await
                    .map_err(|e| ChainError::PaymasterError(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::ENTRY_POINT_V06;
    use crate::test_support::{spawn_json_rpc, RpcCall};
    use serde_json::{json, Value};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn client(url: &url::Url) -> DynProvider {
        ProviderBuilder::new().connect_http(url.clone()).erased()
    }

    #[test]
    fn paymaster_context_is_payg() {
        let value = serde_json::to_value(PaymasterContext {
            kind: SponsorshipKind::Payg,
        })
        .unwrap();
        assert_eq!(value, json!({ "type": "payg" }));
    }

    #[tokio::test]
    async fn sponsor_sends_op_entry_point_and_context() {
        let url = spawn_json_rpc(|call: RpcCall| {
            assert_eq!(call.method, "pm_sponsorUserOperation");
            assert_eq!(call.params[2], json!({ "type": "payg" }));
            assert_eq!(
                call.params[1].as_str().unwrap().to_lowercase(),
                format!("{:?}", ENTRY_POINT_V06).to_lowercase()
            );
            Ok(json!({
                "paymasterAndData": "0xbeef",
                "preVerificationGas": "0x1",
                "verificationGasLimit": "0x2",
                "callGasLimit": "0x3"
            }))
        })
        .await;

        let paymaster = Paymaster::new(PaymasterPolicy::payg(url));
        let result = paymaster
            .sponsor(&UserOperation::default(), ENTRY_POINT_V06)
            .await
            .unwrap();
        assert_eq!(result.paymaster_and_data.as_ref(), &[0xbe, 0xef]);
    }

    #[tokio::test]
    async fn paymaster_rejection_is_paymaster_error() {
        let url = spawn_json_rpc(|_call: RpcCall| Err("policy rejected".to_string())).await;

        let paymaster = Paymaster::new(PaymasterPolicy::payg(url));
        let result = paymaster
            .sponsor(&UserOperation::default(), ENTRY_POINT_V06)
            .await;
        assert!(matches!(result, Err(ChainError::PaymasterError(_))));
    }

    #[tokio::test]
    async fn wait_returns_receipt_once_available() {
        let probes = Arc::new(AtomicUsize::new(0));
        let seen = probes.clone();
        let url = spawn_json_rpc(move |call: RpcCall| {
            assert_eq!(call.method, "eth_getUserOperationReceipt");
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(Value::Null);
            }
            Ok(json!({
                "userOpHash": call.params[0],
                "success": true,
            }))
        })
        .await;

        let bundler = BundlerClient::new(client(&url), client(&url), ENTRY_POINT_V06);
        let receipt = bundler
            .wait_for_receipt(
                B256::repeat_byte(1),
                WaitPolicy {
                    timeout: Duration::from_secs(5),
                    interval: Duration::from_millis(10),
                },
            )
            .await
            .unwrap()
            .expect("receipt available");

        assert!(receipt.success);
        assert_eq!(receipt.user_op_hash, B256::repeat_byte(1));
        assert_eq!(probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn wait_ends_pending_after_bounded_probes() {
        let probes = Arc::new(AtomicUsize::new(0));
        let seen = probes.clone();
        let url = spawn_json_rpc(move |_call: RpcCall| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        })
        .await;

        let bundler = BundlerClient::new(client(&url), client(&url), ENTRY_POINT_V06);
        let result = bundler
            .wait_for_receipt(
                B256::repeat_byte(2),
                WaitPolicy {
                    timeout: Duration::from_millis(50),
                    interval: Duration::from_millis(10),
                },
            )
            .await;

        assert!(matches!(result, Ok(None)));
        assert!(probes.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn send_returns_user_op_hash() {
        let url = spawn_json_rpc(|call: RpcCall| {
            assert_eq!(call.method, "eth_sendUserOperation");
            assert!(call.params[0].get("callData").is_some());
            Ok(json!(format!("0x{}", "11".repeat(32))))
        })
        .await;

        let bundler = BundlerClient::new(client(&url), client(&url), ENTRY_POINT_V06);
        let hash = bundler
            .send_user_operation(&UserOperation::default())
            .await
            .unwrap();
        assert_eq!(hash, B256::repeat_byte(0x11));
    }
}
