// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Smart wallet session: provisioning sequence and operations.

pub mod error;
pub mod poller;
pub mod session;

pub use error::{Stage, WalletError};
pub use poller::{BalancePoller, DEFAULT_POLL_INTERVAL};
pub use session::{
    AllowanceCheck, OperationOutcome, ProvisionReport, SessionSnapshot, SessionState, WalletSession,
};
