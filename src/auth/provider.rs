// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login providers that hand out signing key material.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::PathBuf,
    str::FromStr,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::AuthProviderError;
use crate::blockchain::signing::pem_to_hex;

/// Social login flavours the UI offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub const ALL: [SocialProvider; 2] = [SocialProvider::Google, SocialProvider::Facebook];

    pub fn as_str(self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Facebook => "facebook",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialProvider {
    type Err = AuthProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(SocialProvider::Google),
            "facebook" => Ok(SocialProvider::Facebook),
            other => Err(AuthProviderError::ProviderUnavailable(other.to_string())),
        }
    }
}

/// How the login flow is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UxMode {
    Popup,
    Redirect,
}

/// Viewports narrower than this use the redirect flow.
pub const MOBILE_VIEWPORT_WIDTH: u32 = 600;

impl UxMode {
    pub fn for_viewport_width(width: u32) -> Self {
        if width < MOBILE_VIEWPORT_WIDTH {
            UxMode::Redirect
        } else {
            UxMode::Popup
        }
    }
}

/// Opaque handle to a connected login session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderHandle {
    pub id: Uuid,
    pub provider: SocialProvider,
}

/// Raw signing key material. Never logged, never persisted.
#[derive(Clone)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    pub fn new(hex: String) -> Self {
        Self(hex)
    }

    /// Hex-encoded private key.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// Profile fields the provider knows about the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub login_provider: SocialProvider,
    /// Provider-side identifier of the user
    pub verifier_id: String,
}

/// Login provider seam. SDK-backed providers implement this.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Prepare the provider. Returns a restored session if one exists.
    async fn init(&self) -> Result<Option<ProviderHandle>, AuthProviderError>;

    /// Run the login flow for `provider`.
    async fn connect(
        &self,
        provider: SocialProvider,
        ux_mode: UxMode,
    ) -> Result<ProviderHandle, AuthProviderError>;

    /// Tear the session down.
    async fn disconnect(&self, handle: &ProviderHandle) -> Result<(), AuthProviderError>;

    /// Signing key for the session.
    async fn private_key(&self, handle: &ProviderHandle) -> Result<KeyMaterial, AuthProviderError>;

    async fn user_info(&self, handle: &ProviderHandle) -> Result<UserInfo, AuthProviderError>;
}

/// Where a local key comes from.
#[derive(Clone)]
pub enum KeySource {
    /// Hex private key held in memory
    Hex(KeyMaterial),
    /// PEM key file read at every key request
    PemFile(PathBuf),
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
            KeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
        }
    }
}

/// Environment variable holding the hex key for a provider.
pub fn key_env_var(provider: SocialProvider) -> String {
    format!("APP_{}_PRIVATE_KEY", provider.as_str().to_ascii_uppercase())
}

/// Environment variable holding the PEM key path for a provider.
pub fn key_path_env_var(provider: SocialProvider) -> String {
    format!("APP_{}_PRIVATE_KEY_PATH", provider.as_str().to_ascii_uppercase())
}

/// Login provider that serves keys configured on this host, one per social
/// provider.
#[derive(Debug, Default)]
pub struct LocalKeyProvider {
    sources: HashMap<SocialProvider, KeySource>,
    sessions: RwLock<HashSet<ProviderHandle>>,
}

impl LocalKeyProvider {
    pub fn new(sources: HashMap<SocialProvider, KeySource>) -> Self {
        Self {
            sources,
            sessions: RwLock::new(HashSet::new()),
        }
    }

    /// Collect key sources from `APP_<PROVIDER>_PRIVATE_KEY` and
    /// `APP_<PROVIDER>_PRIVATE_KEY_PATH`. The inline key wins when both are set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = HashMap::new();
        for provider in SocialProvider::ALL {
            if let Some(hex) = lookup(&key_env_var(provider)).filter(|v| !v.trim().is_empty()) {
                sources.insert(provider, KeySource::Hex(KeyMaterial::new(hex.trim().to_string())));
            } else if let Some(path) =
                lookup(&key_path_env_var(provider)).filter(|v| !v.trim().is_empty())
            {
                sources.insert(provider, KeySource::PemFile(PathBuf::from(path.trim())));
            }
        }
        Self::new(sources)
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn configured_providers(&self) -> Vec<SocialProvider> {
        SocialProvider::ALL
            .into_iter()
            .filter(|p| self.sources.contains_key(p))
            .collect()
    }

    async fn ensure_session(&self, handle: &ProviderHandle) -> Result<(), AuthProviderError> {
        if self.sessions.read().await.contains(handle) {
            Ok(())
        } else {
            Err(AuthProviderError::UnknownSession)
        }
    }
}

#[async_trait]
impl AuthProvider for LocalKeyProvider {
    async fn init(&self) -> Result<Option<ProviderHandle>, AuthProviderError> {
        Ok(None)
    }

    async fn connect(
        &self,
        provider: SocialProvider,
        ux_mode: UxMode,
    ) -> Result<ProviderHandle, AuthProviderError> {
        if !self.sources.contains_key(&provider) {
            return Err(AuthProviderError::ProviderUnavailable(provider.to_string()));
        }

        let handle = ProviderHandle {
            id: Uuid::new_v4(),
            provider,
        };
        self.sessions.write().await.insert(handle);

        tracing::debug!(provider = %provider, ux_mode = ?ux_mode, "Local key session opened");
        Ok(handle)
    }

    async fn disconnect(&self, handle: &ProviderHandle) -> Result<(), AuthProviderError> {
        self.sessions.write().await.remove(handle);
        Ok(())
    }

    async fn private_key(&self, handle: &ProviderHandle) -> Result<KeyMaterial, AuthProviderError> {
        self.ensure_session(handle).await?;

        let source = self
            .sources
            .get(&handle.provider)
            .ok_or_else(|| AuthProviderError::ProviderUnavailable(handle.provider.to_string()))?;

        match source {
            KeySource::Hex(key) => Ok(key.clone()),
            KeySource::PemFile(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    AuthProviderError::KeyUnavailable(format!("{}: {e}", path.display()))
                })?;
                pem_to_hex(&bytes)
                    .map(KeyMaterial::new)
                    .map_err(|e| AuthProviderError::KeyUnavailable(e.to_string()))
            }
        }
    }

    async fn user_info(&self, handle: &ProviderHandle) -> Result<UserInfo, AuthProviderError> {
        self.ensure_session(handle).await?;
        Ok(UserInfo {
            login_provider: handle.provider,
            verifier_id: format!("local:{}", handle.provider),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::signing::tests::TEST_KEY_HEX;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn ux_mode_follows_viewport_width() {
        assert_eq!(UxMode::for_viewport_width(320), UxMode::Redirect);
        assert_eq!(UxMode::for_viewport_width(599), UxMode::Redirect);
        assert_eq!(UxMode::for_viewport_width(600), UxMode::Popup);
        assert_eq!(UxMode::for_viewport_width(1440), UxMode::Popup);
    }

    #[test]
    fn social_provider_parses_case_insensitively() {
        assert_eq!("Google".parse::<SocialProvider>().unwrap(), SocialProvider::Google);
        assert_eq!("facebook".parse::<SocialProvider>().unwrap(), SocialProvider::Facebook);
        assert!("twitter".parse::<SocialProvider>().is_err());
    }

    #[test]
    fn key_material_debug_is_redacted() {
        let key = KeyMaterial::new(TEST_KEY_HEX.to_string());
        assert!(!format!("{key:?}").contains(TEST_KEY_HEX));
        let source = KeySource::Hex(key);
        assert!(!format!("{source:?}").contains(TEST_KEY_HEX));
    }

    #[test]
    fn from_lookup_prefers_inline_key() {
        let provider = LocalKeyProvider::from_lookup(lookup_from(&[
            ("APP_GOOGLE_PRIVATE_KEY", TEST_KEY_HEX),
            ("APP_GOOGLE_PRIVATE_KEY_PATH", "/nonexistent.pem"),
        ]));
        assert_eq!(provider.configured_providers(), vec![SocialProvider::Google]);
        assert!(matches!(
            provider.sources.get(&SocialProvider::Google),
            Some(KeySource::Hex(_))
        ));
    }

    #[tokio::test]
    async fn connect_requires_configured_provider() {
        let provider = LocalKeyProvider::from_lookup(lookup_from(&[(
            "APP_GOOGLE_PRIVATE_KEY",
            TEST_KEY_HEX,
        )]));

        let result = provider.connect(SocialProvider::Facebook, UxMode::Popup).await;
        assert!(matches!(result, Err(AuthProviderError::ProviderUnavailable(_))));

        let handle = provider
            .connect(SocialProvider::Google, UxMode::Popup)
            .await
            .unwrap();
        let key = provider.private_key(&handle).await.unwrap();
        assert_eq!(key.expose(), TEST_KEY_HEX);
    }

    #[tokio::test]
    async fn disconnected_handle_cannot_fetch_key() {
        let provider = LocalKeyProvider::from_lookup(lookup_from(&[(
            "APP_GOOGLE_PRIVATE_KEY",
            TEST_KEY_HEX,
        )]));
        let handle = provider
            .connect(SocialProvider::Google, UxMode::Redirect)
            .await
            .unwrap();

        provider.disconnect(&handle).await.unwrap();
        assert_eq!(
            provider.private_key(&handle).await.unwrap_err(),
            AuthProviderError::UnknownSession
        );
    }

    #[tokio::test]
    async fn pem_file_source_is_read_on_demand() {
        use k256::pkcs8::{EncodePrivateKey, LineEnding};
        use std::io::Write;

        let secret = k256::SecretKey::from_slice(&alloy::hex::decode(TEST_KEY_HEX).unwrap()).unwrap();
        let pem = secret.to_pkcs8_pem(LineEnding::LF).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(pem.as_bytes()).unwrap();

        let path = file.path().to_string_lossy().to_string();
        let provider = LocalKeyProvider::from_lookup(lookup_from(&[(
            "APP_FACEBOOK_PRIVATE_KEY_PATH",
            path.as_str(),
        )]));

        let handle = provider
            .connect(SocialProvider::Facebook, UxMode::Popup)
            .await
            .unwrap();
        let key = provider.private_key(&handle).await.unwrap();
        assert_eq!(key.expose(), TEST_KEY_HEX);

        let info = provider.user_info(&handle).await.unwrap();
        assert_eq!(info.login_provider, SocialProvider::Facebook);
    }
}
