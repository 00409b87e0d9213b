// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Social login that yields signing key material for the smart-account
//! owner.
//!
//! ## Auth Flow
//!
//! 1. UI asks for a login with `google` or `facebook`
//! 2. The login provider runs its flow (popup or redirect, chosen from the
//!    viewport width) and returns an opaque session handle
//! 3. The signer stage requests the private key for that handle once, derives
//!    the owner account from it and drops the raw key
//!
//! ## Security
//!
//! - Key material is wrapped in [`KeyMaterial`], whose `Debug` is redacted
//! - Keys are never written to logs or disk by this crate

pub mod adapter;
pub mod error;
pub mod provider;

pub use adapter::{AuthAdapter, AuthSession};
pub use error::AuthProviderError;
pub use provider::{
    AuthProvider, KeyMaterial, KeySource, LocalKeyProvider, ProviderHandle, SocialProvider,
    UserInfo, UxMode,
};
