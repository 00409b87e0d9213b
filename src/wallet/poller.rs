// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Poller
//!
//! Background task that refreshes the smart wallet's token balance every
//! `interval` (default 5 s) into a shared [`BalanceCell`].
//!
//! At most one poll task runs per session. Starting a poll cancels the
//! previous one first, and the session stops it on logout and whenever the
//! sender address changes. A cancelled task never writes the cell again,
//! even when a read was in flight at the time of cancellation.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, the same way the server's
//! shutdown path stops other background tasks.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::{format_units, TokenReader};

/// Default interval between balance reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Latest formatted balance, `None` until the first successful read.
pub type BalanceCell = Arc<RwLock<Option<String>>>;

struct ActivePoll {
    owner: Address,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of the single balance poll task.
#[derive(Default)]
pub struct BalancePoller {
    active: Option<ActivePoll>,
    starts: u64,
}

impl BalancePoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any running poll, then spawn a new one reading `owner`'s
    /// balance from `token`. The first read happens immediately.
    pub fn start(
        &mut self,
        token: Arc<dyn TokenReader>,
        owner: Address,
        decimals: u8,
        balance: BalanceCell,
        interval: Duration,
    ) {
        self.stop();

        let shutdown = CancellationToken::new();
        let task = PollTask {
            token,
            owner,
            decimals,
            balance,
            interval,
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(task.run());

        self.starts += 1;
        self.active = Some(ActivePoll {
            owner,
            shutdown,
            handle,
        });
    }

    /// Stop the running poll, if any. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.shutdown.cancel();
                debug!(owner = %active.owner, "Balance poll cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Number of polls started over the poller's lifetime.
    pub fn starts(&self) -> u64 {
        self.starts
    }

    #[cfg(test)]
    pub(super) fn shutdown_token(&self) -> Option<CancellationToken> {
        self.active.as_ref().map(|active| active.shutdown.clone())
    }
}

impl Drop for BalancePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

struct PollTask {
    token: Arc<dyn TokenReader>,
    owner: Address,
    decimals: u8,
    balance: BalanceCell,
    interval: Duration,
    shutdown: CancellationToken,
}

impl PollTask {
    async fn run(self) {
        info!(
            owner = %self.owner,
            interval_secs = self.interval.as_secs(),
            "Balance poll starting"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = self.poll_step() => {}
            }

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!(owner = %self.owner, "Balance poll stopped");
    }

    async fn poll_step(&self) {
        match self.token.balance_of(self.owner).await {
            Ok(raw) => {
                let formatted = format_units(raw, self.decimals);
                let mut cell = self.balance.write().await;
                // stop() may have landed while the read was in flight
                if self.shutdown.is_cancelled() {
                    return;
                }
                debug!(owner = %self.owner, balance = %formatted, "Balance refreshed");
                *cell = Some(formatted);
            }
            Err(e) => {
                warn!(owner = %self.owner, error = %e, "Balance read failed");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::blockchain::ChainError;
    use alloy::primitives::{address, U256};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Token double with fixed balance and allowance that counts reads.
    pub(crate) struct FixedToken {
        pub(crate) address: Address,
        pub(crate) balance: U256,
        pub(crate) allowance: U256,
        pub(crate) balance_reads: AtomicUsize,
        pub(crate) allowance_reads: AtomicUsize,
    }

    impl FixedToken {
        pub(crate) fn new(address: Address, balance: U256, allowance: U256) -> Self {
            Self {
                address,
                balance,
                allowance,
                balance_reads: AtomicUsize::new(0),
                allowance_reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenReader for FixedToken {
        fn address(&self) -> Address {
            self.address
        }

        async fn allowance(&self, _owner: Address, _spender: Address) -> Result<U256, ChainError> {
            self.allowance_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.allowance)
        }

        async fn balance_of(&self, _owner: Address) -> Result<U256, ChainError> {
            self.balance_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.balance)
        }
    }

    /// Token double whose balance read takes `delay`.
    pub(crate) struct SlowToken {
        pub(crate) balance: U256,
        pub(crate) delay: Duration,
        pub(crate) reads: AtomicUsize,
    }

    impl SlowToken {
        pub(crate) fn new(balance: U256, delay: Duration) -> Self {
            Self {
                balance,
                delay,
                reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenReader for SlowToken {
        fn address(&self) -> Address {
            address!("0x00000000000000000000000000000000000000aa")
        }

        async fn allowance(&self, _owner: Address, _spender: Address) -> Result<U256, ChainError> {
            Ok(U256::from(1u64))
        }

        async fn balance_of(&self, _owner: Address) -> Result<U256, ChainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.balance)
        }
    }

    const OWNER: Address = address!("0x00000000000000000000000000000000000000cc");

    fn token() -> Arc<FixedToken> {
        Arc::new(FixedToken::new(
            address!("0x00000000000000000000000000000000000000aa"),
            U256::from(12_500_000u64),
            U256::ZERO,
        ))
    }

    #[tokio::test]
    async fn first_read_is_immediate_and_formatted() {
        let token = token();
        let balance: BalanceCell = Arc::default();
        let mut poller = BalancePoller::new();

        poller.start(token.clone(), OWNER, 6, balance.clone(), Duration::from_secs(60));

        for _ in 0..50 {
            if balance.read().await.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(balance.read().await.as_deref(), Some("12.5"));
        assert_eq!(token.balance_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_start_cancels_first() {
        let token = token();
        let balance: BalanceCell = Arc::default();
        let mut poller = BalancePoller::new();

        poller.start(token.clone(), OWNER, 6, balance.clone(), Duration::from_secs(60));
        let first = poller.shutdown_token().unwrap();

        poller.start(token.clone(), OWNER, 6, balance.clone(), Duration::from_secs(60));
        let second = poller.shutdown_token().unwrap();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(poller.is_running());
        assert_eq!(poller.starts(), 2);
    }

    #[tokio::test]
    async fn stop_ends_polling() {
        let token = token();
        let mut poller = BalancePoller::new();
        assert!(!poller.stop());

        poller.start(token, OWNER, 6, Arc::default(), Duration::from_millis(10));
        let shutdown = poller.shutdown_token().unwrap();

        assert!(poller.stop());
        assert!(shutdown.is_cancelled());
        assert!(!poller.is_running());
        assert!(poller.shutdown_token().is_none());
    }

    #[tokio::test]
    async fn stop_discards_read_in_flight() {
        let token = Arc::new(SlowToken::new(U256::from(7u64), Duration::from_millis(200)));
        let balance: BalanceCell = Arc::default();
        let mut poller = BalancePoller::new();

        poller.start(token.clone(), OWNER, 0, balance.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(token.reads.load(Ordering::SeqCst), 1);

        assert!(poller.stop());
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(*balance.read().await, None);
        assert_eq!(token.reads.load(Ordering::SeqCst), 1);
    }
}
