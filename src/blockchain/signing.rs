// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signer derivation from login-provider key material.
//!
//! Key material is turned into a local signer and a write client bound to
//! the bundler transport. Raw key bytes never outlive the derivation call.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Signature},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::{local::PrivateKeySigner, Signer},
};
use k256::SecretKey;

use super::client::ChainError;
use crate::auth::KeyMaterial;

/// Parse a private key from PEM format to hex string.
///
/// Accepts SEC1 (`EC PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) encodings.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(ChainError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, ChainError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key, with or without `0x` prefix.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
    let trimmed = private_key_hex.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    let key_bytes = alloy::hex::decode(trimmed)
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))
}

/// The signing account plus a write-capable client on the bundler transport.
///
/// Built in one step so a half-initialized signer cannot exist.
#[derive(Clone)]
pub struct SignerAccount {
    signer: PrivateKeySigner,
    wallet_client: DynProvider,
}

impl SignerAccount {
    /// Derive the signer from key material and bind a wallet client to
    /// `bundler_url`.
    pub fn derive(key: &KeyMaterial, bundler_url: &url::Url) -> Result<Self, ChainError> {
        let signer = signer_from_hex(key.expose())?;

        let wallet_client = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(bundler_url.clone())
            .erased();

        Ok(Self {
            signer,
            wallet_client,
        })
    }

    /// First (and only) address controlled by this signer.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Write client on the bundler transport.
    pub fn wallet_client(&self) -> &DynProvider {
        &self.wallet_client
    }

    /// EIP-191 personal-message signature over `message`.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, ChainError> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| ChainError::SigningFailed(e.to_string()))
    }
}

impl std::fmt::Debug for SignerAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerAccount")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // Well-known test key (hardhat account #0)
    pub(crate) const TEST_KEY_HEX: &str =
        "ac0974bec39a17e36ba4a4b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    pub(crate) const TEST_KEY_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn signer_from_hex_accepts_prefix() {
        let plain = signer_from_hex(TEST_KEY_HEX).unwrap();
        let prefixed = signer_from_hex(&format!("0x{TEST_KEY_HEX}")).unwrap();
        assert_eq!(plain.address(), prefixed.address());
        assert_eq!(plain.address().to_checksum(None), TEST_KEY_ADDRESS);
    }

    #[test]
    fn signer_from_hex_rejects_bad_keys() {
        assert!(signer_from_hex("zz").is_err());
        assert!(signer_from_hex("00").is_err());
    }

    #[test]
    fn pem_roundtrips_to_same_key() {
        use k256::pkcs8::{EncodePrivateKey, LineEnding};

        let key_bytes = alloy::hex::decode(TEST_KEY_HEX).unwrap();
        let secret = SecretKey::from_slice(&key_bytes).unwrap();
        let pem = secret.to_pkcs8_pem(LineEnding::LF).unwrap();

        let hex = pem_to_hex(pem.as_bytes()).unwrap();
        assert_eq!(hex, TEST_KEY_HEX);
    }

    #[test]
    fn pem_to_hex_rejects_garbage() {
        assert!(pem_to_hex(b"not a pem").is_err());
    }

    #[tokio::test]
    async fn derive_binds_signer_and_signs() {
        let key = KeyMaterial::new(TEST_KEY_HEX.to_string());
        let account =
            SignerAccount::derive(&key, &"http://127.0.0.1:1".parse().unwrap()).unwrap();

        assert_eq!(account.address().to_checksum(None), TEST_KEY_ADDRESS);

        let signature = account.sign_message(b"nonce-123").await.unwrap();
        let recovered = signature.recover_address_from_msg(b"nonce-123").unwrap();
        assert_eq!(recovered, account.address());
    }
}
