// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Session
//!
//! The owned context for one logged-in user: login session, chain clients,
//! signer, smart account, resolved sender address and the balance poller.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──init_smart_account──▶ AccountReady ──resolve_sender_address──▶ AddressResolved
//!       ▲                                                                              │
//!       └────────────────────────────── logout / dispose ◀─────────────────────────────┘
//! ```
//!
//! - `init_smart_account` needs the signer and both chain clients
//! - trade, transfer, allowance and balance operations need the sender address
//! - a failed stage leaves earlier state untouched
//!
//! Every failure is logged once, at the point where it is decided, and
//! returned as a [`WalletError`].

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Signature, B256, U256};
use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use super::error::{Stage, WalletError};
use super::poller::{BalanceCell, BalancePoller, DEFAULT_POLL_INTERVAL};
use crate::auth::{AuthAdapter, SocialProvider, UserInfo, UxMode};
use crate::backend::{BackendClient, BackendError};
use crate::blockchain::bundler::PaymasterPolicy;
use crate::blockchain::erc20::{encode_approve, encode_transfer};
use crate::blockchain::{
    parse_units, Call, ChainClients, Direction, Erc20Contract, SignerAccount,
    SimpleAccount, SmartAccountConfig, SmartAccountOps, TokenReader, TradeOrder,
    UserOperationReceipt,
};
use crate::config::AppConfig;

/// Where the session is in its initialization sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    AccountReady,
    AddressResolved,
}

/// Result of a submitted user operation.
///
/// `pending` is set when the bundler accepted the operation but had not
/// reported a receipt by the end of the wait; the operation may still land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OperationOutcome {
    #[schema(value_type = String)]
    pub user_op_hash: B256,
    #[schema(value_type = Option<String>)]
    pub transaction_hash: Option<B256>,
    pub pending: bool,
}

impl OperationOutcome {
    pub fn pending(user_op_hash: B256) -> Self {
        Self {
            user_op_hash,
            transaction_hash: None,
            pending: true,
        }
    }
}

impl From<UserOperationReceipt> for OperationOutcome {
    fn from(receipt: UserOperationReceipt) -> Self {
        Self {
            user_op_hash: receipt.user_op_hash,
            transaction_hash: receipt.transaction_hash(),
            pending: false,
        }
    }
}

/// What `ensure_allowance` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AllowanceCheck {
    /// Allowance was zero and an approval was sent
    Approved { operation: OperationOutcome },
    /// Allowance already set; nothing sent
    Existing { allowance: String },
    /// The check or the approval failed; provisioning carried on
    Failed { error: String },
}

/// Summary of a `provision` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProvisionReport {
    #[schema(value_type = String)]
    pub sender_address: Address,
    /// Whether the backend profile was updated with the sender address
    pub address_persisted: bool,
    pub allowance: AllowanceCheck,
}

/// Point-in-time view of the session for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub connected: bool,
    pub provider: Option<SocialProvider>,
    pub ux_mode: UxMode,
    #[schema(value_type = Option<String>)]
    pub signer_address: Option<Address>,
    #[schema(value_type = Option<String>)]
    pub sender_address: Option<Address>,
    pub balance: Option<String>,
    pub selected_bet_amount: String,
    pub polling: bool,
}

pub struct WalletSession {
    config: Arc<AppConfig>,
    auth: AuthAdapter,
    backend: BackendClient,
    clients: Option<ChainClients>,
    signer: Option<SignerAccount>,
    account: Option<Arc<dyn SmartAccountOps>>,
    token: Option<Arc<dyn TokenReader>>,
    sender: Option<Address>,
    selected_bet_amount: String,
    balance: BalanceCell,
    poller: BalancePoller,
    poll_interval: Duration,
}

fn not_initialized(operation: &'static str, stage: Stage) -> WalletError {
    error!(operation, stage = %stage, "Operation attempted before initialization");
    WalletError::NotInitialized(stage)
}

fn invalid(operation: &'static str, reason: impl Into<String>) -> WalletError {
    let reason = reason.into();
    warn!(operation, reason = %reason, "Rejected invalid input");
    WalletError::Invalid(reason)
}

impl WalletSession {
    pub fn new(config: Arc<AppConfig>, auth: AuthAdapter, backend: BackendClient) -> Self {
        let selected_bet_amount = config.default_bet_amount.clone();
        Self {
            config,
            auth,
            backend,
            clients: None,
            signer: None,
            account: None,
            token: None,
            sender: None,
            selected_bet_amount,
            balance: BalanceCell::default(),
            poller: BalancePoller::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthAdapter {
        &self.auth
    }

    pub fn state(&self) -> SessionState {
        match (&self.account, self.sender) {
            (Some(_), Some(_)) => SessionState::AddressResolved,
            (Some(_), None) => SessionState::AccountReady,
            _ => SessionState::Uninitialized,
        }
    }

    pub fn sender_address(&self) -> Option<Address> {
        self.sender
    }

    pub fn selected_bet_amount(&self) -> &str {
        &self.selected_bet_amount
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Number of balance polls started by this session.
    pub fn polls_started(&self) -> u64 {
        self.poller.starts()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Initialize the login provider. Idempotent.
    pub async fn init(&mut self) -> Result<(), WalletError> {
        Ok(self.auth.init().await?)
    }

    pub async fn login(&mut self, provider: SocialProvider) -> Result<(), WalletError> {
        if self.auth.is_connected() {
            self.dispose();
            self.auth.logout().await?;
        }
        Ok(self.auth.login(provider).await?)
    }

    /// Stop polling, drop wallet state, then end the login session.
    pub async fn logout(&mut self) -> Result<(), WalletError> {
        self.dispose();
        Ok(self.auth.logout().await?)
    }

    pub async fn user_info(&self) -> Result<UserInfo, WalletError> {
        self.auth.user_info().await.map_err(|e| {
            warn!(error = %e, "User info unavailable");
            WalletError::from(e)
        })
    }

    pub fn on_viewport_resize(&mut self, width: u32) -> UxMode {
        self.auth.on_viewport_resize(width)
    }

    /// Stop the poller and drop signer, account and sender address. The chain
    /// clients are kept since they do not depend on the user.
    pub fn dispose(&mut self) {
        if self.stop_polling() {
            info!("Balance poll stopped on dispose");
        }
        self.signer = None;
        self.account = None;
        self.token = None;
        self.sender = None;
        self.selected_bet_amount = self.config.default_bet_amount.clone();
    }

    /// Stop the balance poll and start over with an empty balance cell. The
    /// stopped task keeps only the old cell, so nothing it reads can show up
    /// in the session afterwards.
    fn stop_polling(&mut self) -> bool {
        let stopped = self.poller.stop();
        self.balance = BalanceCell::default();
        stopped
    }

    // =========================================================================
    // Clients and signer
    // =========================================================================

    /// Build the primary RPC and bundler RPC read clients. On failure both
    /// stay unset.
    pub fn init_clients(&mut self) -> Result<(), WalletError> {
        match ChainClients::new(&self.config.chain) {
            Ok(clients) => {
                info!(chain_id = self.config.chain.chain_id, "Chain clients ready");
                self.clients = Some(clients);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Chain client construction failed");
                self.clients = None;
                Err(e.into())
            }
        }
    }

    /// Fetch key material from the login session and derive the signer and
    /// its bundler-bound wallet client. Either both are set or neither.
    pub async fn init_signer(&mut self) -> Result<Address, WalletError> {
        if !self.auth.is_connected() {
            return Err(not_initialized("init_signer", Stage::Auth));
        }

        let key = self.auth.private_key().await.map_err(|e| {
            error!(error = %e, "Key material request failed");
            WalletError::from(e)
        })?;

        let signer = SignerAccount::derive(&key, &self.config.chain.bundler_url).map_err(|e| {
            error!(error = %e, "Signer derivation failed");
            WalletError::from(e)
        })?;
        drop(key);

        let address = signer.address();
        if self.signer.as_ref().map(SignerAccount::address) != Some(address) {
            // a different owner invalidates everything built on the old one
            self.stop_polling();
            self.account = None;
            self.token = None;
            self.sender = None;
        }
        self.signer = Some(signer);

        info!(signer = %address, "Signer ready");
        Ok(address)
    }

    pub fn signer_address(&self) -> Result<Address, WalletError> {
        self.signer
            .as_ref()
            .map(SignerAccount::address)
            .ok_or_else(|| not_initialized("signer_address", Stage::Signer))
    }

    /// EIP-191 signature over `message` with the owner key.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| not_initialized("sign_message", Stage::Signer))?;

        signer.sign_message(message).await.map_err(|e| {
            error!(error = %e, "Message signing failed");
            WalletError::from(e)
        })
    }

    // =========================================================================
    // Smart account
    // =========================================================================

    fn require_account_inputs(&self, operation: &'static str) -> Result<(), WalletError> {
        if self.signer.is_none() {
            return Err(not_initialized(operation, Stage::Signer));
        }
        if self.clients.is_none() {
            return Err(not_initialized(operation, Stage::Clients));
        }
        Ok(())
    }

    /// Compose the SimpleAccount and the token binding. Requires the signer
    /// and both chain clients.
    pub fn init_smart_account(&mut self) -> Result<(), WalletError> {
        let (Some(clients), Some(signer)) = (self.clients.as_ref(), self.signer.as_ref()) else {
            return self.require_account_inputs("init_smart_account");
        };

        let paymaster = PaymasterPolicy::payg(self.config.chain.paymaster_url.clone());
        let account = SimpleAccount::new(
            clients,
            signer.clone(),
            SmartAccountConfig::simple_account(self.config.chain.chain_id, paymaster),
        );
        let token = Erc20Contract::new(&clients.public, self.config.token_address);

        self.attach_account(Arc::new(account), Arc::new(token))
    }

    /// Install a smart account and token binding. Same preconditions as
    /// [`Self::init_smart_account`]; clears any previously resolved address.
    pub fn attach_account(
        &mut self,
        account: Arc<dyn SmartAccountOps>,
        token: Arc<dyn TokenReader>,
    ) -> Result<(), WalletError> {
        self.require_account_inputs("attach_account")?;

        self.stop_polling();
        self.sender = None;
        self.account = Some(account);
        self.token = Some(token);

        info!(token = %self.config.token_address, "Smart account ready");
        Ok(())
    }

    /// Query and cache the counterfactual sender address. A changed address
    /// stops the balance poll for the old one.
    pub async fn resolve_sender_address(&mut self) -> Result<Address, WalletError> {
        let account = self
            .account
            .as_ref()
            .ok_or_else(|| not_initialized("resolve_sender_address", Stage::SmartAccount))?;

        let address = account.sender_address().await.map_err(|e| {
            error!(error = %e, "Sender address lookup failed");
            WalletError::from(e)
        })?;

        if self.sender.is_some_and(|previous| previous != address) && self.stop_polling() {
            info!(sender = %address, "Sender address changed; balance poll stopped");
        }
        self.sender = Some(address);

        info!(sender = %address, "Sender address resolved");
        Ok(address)
    }

    fn operational(
        &self,
        operation: &'static str,
    ) -> Result<(Arc<dyn SmartAccountOps>, Arc<dyn TokenReader>, Address), WalletError> {
        let account = self
            .account
            .clone()
            .ok_or_else(|| not_initialized(operation, Stage::SmartAccount))?;
        let token = self
            .token
            .clone()
            .ok_or_else(|| not_initialized(operation, Stage::TokenContract))?;
        let sender = self
            .sender
            .ok_or_else(|| not_initialized(operation, Stage::SenderAddress))?;
        Ok((account, token, sender))
    }

    async fn submit_and_wait(
        &self,
        operation: &'static str,
        account: &dyn SmartAccountOps,
        call: Call,
    ) -> Result<OperationOutcome, WalletError> {
        let target = call.target;
        let handle = account.submit(call).await.map_err(|e| {
            error!(operation, target = %target, error = %e, "User operation submission failed");
            WalletError::from(e)
        })?;

        let receipt = account.wait(&handle).await.map_err(|e| {
            error!(
                operation,
                user_op_hash = %handle.user_op_hash,
                error = %e,
                "User operation wait failed"
            );
            WalletError::from(e)
        })?;

        match receipt {
            Some(receipt) => Ok(receipt.into()),
            None => {
                warn!(
                    operation,
                    user_op_hash = %handle.user_op_hash,
                    "No receipt before the wait ended; operation pending"
                );
                Ok(OperationOutcome::pending(handle.user_op_hash))
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Allowance granted by the sender to the trading contract, in token
    /// base units.
    pub async fn get_allowance(&self) -> Result<String, WalletError> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| not_initialized("get_allowance", Stage::TokenContract))?;
        let sender = self
            .sender
            .ok_or_else(|| not_initialized("get_allowance", Stage::SenderAddress))?;

        let raw: U256 = token
            .allowance(sender, self.config.contract_address)
            .await
            .map_err(|e| {
                error!(owner = %sender, error = %e, "Allowance read failed");
                WalletError::from(e)
            })?;

        Ok(raw.to_string())
    }

    /// Approve the trading contract for the configured allowance amount.
    pub async fn set_allowance(&self) -> Result<OperationOutcome, WalletError> {
        let (account, token, _) = self.operational("set_allowance")?;

        let amount = parse_units(&self.config.allowance_amount, self.config.token_decimals)?;
        let call = Call::new(
            token.address(),
            encode_approve(self.config.contract_address, amount),
        );

        let outcome = self.submit_and_wait("set_allowance", account.as_ref(), call).await?;
        info!(
            spender = %self.config.contract_address,
            amount = %self.config.allowance_amount,
            user_op_hash = %outcome.user_op_hash,
            "Allowance approved"
        );
        Ok(outcome)
    }

    /// Approve only when the current allowance is exactly zero.
    pub async fn ensure_allowance(&self) -> Result<AllowanceCheck, WalletError> {
        let allowance = self.get_allowance().await?;
        if allowance != "0" {
            return Ok(AllowanceCheck::Existing { allowance });
        }

        let operation = self.set_allowance().await?;
        Ok(AllowanceCheck::Approved { operation })
    }

    /// Write the sender address to the backend profile.
    pub async fn persist_address(&self, token: &str) -> Result<(), WalletError> {
        let sender = self
            .sender
            .ok_or_else(|| not_initialized("persist_address", Stage::SenderAddress))?;
        if token.is_empty() {
            error!("No backend token to persist the sender address with");
            return Err(BackendError::MissingToken.into());
        }

        self.backend
            .store_smart_wallet_address(token, &sender.to_string())
            .await
            .map_err(|e| {
                error!(sender = %sender, error = %e, "Persisting sender address failed");
                WalletError::from(e)
            })?;

        info!(sender = %sender, "Sender address stored in profile");
        Ok(())
    }

    /// Start (or restart) the balance poll for the sender address.
    pub fn poll_balance(&mut self) -> Result<(), WalletError> {
        let token = self
            .token
            .clone()
            .ok_or_else(|| not_initialized("poll_balance", Stage::TokenContract))?;
        let sender = self
            .sender
            .ok_or_else(|| not_initialized("poll_balance", Stage::SenderAddress))?;

        self.poller.start(
            token,
            sender,
            self.config.token_decimals,
            self.balance.clone(),
            self.poll_interval,
        );
        Ok(())
    }

    pub async fn balance(&self) -> Option<String> {
        self.balance.read().await.clone()
    }

    /// Last polled balance; `Absent` until the first read has landed.
    pub async fn current_balance(&self) -> Result<String, WalletError> {
        self.balance().await.ok_or_else(|| {
            warn!(sender = ?self.sender, "Balance requested before the first read");
            WalletError::Absent("balance has not been read yet".to_string())
        })
    }

    /// Place a trade with the selected bet amount, then refresh the balance
    /// once. A pending outcome refreshes it too.
    pub async fn make_trade(&mut self, direction: Direction) -> Result<OperationOutcome, WalletError> {
        let (account, _, _) = self.operational("make_trade")?;

        let order = TradeOrder {
            pool_id: self.config.pool_id.clone(),
            direction,
            bet_amount: self.selected_bet_amount.clone(),
        };
        let data = order.encode(self.config.token_decimals)?;
        let call = Call::new(self.config.contract_address, data);

        let outcome = self.submit_and_wait("make_trade", account.as_ref(), call).await?;
        info!(
            pool_id = %order.pool_id,
            direction = ?direction,
            bet = %order.bet_amount,
            user_op_hash = %outcome.user_op_hash,
            "Trade placed"
        );

        self.poll_balance()?;
        Ok(outcome)
    }

    /// Send `amount` tokens from the smart account to `to`.
    pub async fn transfer(&self, amount: &str, to: Address) -> Result<OperationOutcome, WalletError> {
        let (account, token, _) = self.operational("transfer")?;

        let value = parse_units(amount, self.config.token_decimals)
            .map_err(|e| invalid("transfer", e.to_string()))?;
        if value.is_zero() {
            return Err(invalid("transfer", "transfer amount must be positive"));
        }
        if to.is_zero() {
            return Err(invalid("transfer", "recipient must not be the zero address"));
        }

        let call = Call::new(token.address(), encode_transfer(to, value));
        let outcome = self.submit_and_wait("transfer", account.as_ref(), call).await?;
        info!(to = %to, amount = %amount, user_op_hash = %outcome.user_op_hash, "Transfer sent");
        Ok(outcome)
    }

    /// Select one of the configured bet amounts.
    pub fn set_bet_amount(&mut self, amount: &str) -> Result<(), WalletError> {
        let decimals = self.config.token_decimals;
        let requested =
            parse_units(amount, decimals).map_err(|e| invalid("set_bet_amount", e.to_string()))?;
        if requested.is_zero() {
            return Err(invalid("set_bet_amount", "bet amount must be positive"));
        }

        let listed = self
            .config
            .bet_amounts
            .iter()
            .find(|candidate| parse_units(candidate, decimals).ok() == Some(requested))
            .cloned()
            .ok_or_else(|| invalid("set_bet_amount", format!("bet amount {amount} is not offered")))?;

        self.selected_bet_amount = listed;
        Ok(())
    }

    /// Run the whole sequence: clients, signer, smart account, sender
    /// address, profile update, allowance, balance poll. Stages already done
    /// are skipped. A failed profile update or allowance step is reported
    /// but does not stop the sequence.
    pub async fn provision(&mut self, backend_token: Option<&str>) -> Result<ProvisionReport, WalletError> {
        if self.clients.is_none() {
            self.init_clients()?;
        }
        if self.signer.is_none() {
            self.init_signer().await?;
        }
        if self.account.is_none() {
            self.init_smart_account()?;
        }
        let sender_address = self.resolve_sender_address().await?;

        let address_persisted = match backend_token {
            Some(token) => self.persist_address(token).await.is_ok(),
            None => {
                warn!(sender = %sender_address, "No backend token; profile not updated");
                false
            }
        };

        let allowance = match self.ensure_allowance().await {
            Ok(check) => check,
            Err(e) => {
                warn!(sender = %sender_address, error = %e, "Allowance step failed; continuing");
                AllowanceCheck::Failed {
                    error: e.to_string(),
                }
            }
        };
        self.poll_balance()?;

        Ok(ProvisionReport {
            sender_address,
            address_persisted,
            allowance,
        })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            connected: self.auth.is_connected(),
            provider: self.auth.session().map(|s| s.handle.provider),
            ux_mode: self.auth.ux_mode(),
            signer_address: self.signer.as_ref().map(SignerAccount::address),
            sender_address: self.sender,
            balance: self.balance().await,
            selected_bet_amount: self.selected_bet_amount.clone(),
            polling: self.poller.is_running(),
        }
    }
}
