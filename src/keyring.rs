//! Trusted verification keys, fetched once at startup.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::pkcs8::DecodePublicKey;
use ed25519_dalek::VerifyingKey;
use tracing::info;

/// Well-known path of the key distribution endpoint, relative to the
/// configured base URL.
pub const KEYS_PATH: &str = "/.well-known/keys.json";

/// The set of trusted Ed25519 public keys.
///
/// Populated exactly once at process startup and read-only afterwards, so
/// it needs no synchronization. Non-empty by construction.
///
/// The decision algorithm trusts only [`KeyRing::primary`] (index 0). This
/// is a single-key deployment assumption: key rotation would require trying
/// every key in the ring or selecting by a key identifier embedded in the
/// credential, neither of which is done today.
#[derive(Debug, Clone)]
pub struct KeyRing {
    keys: Vec<VerifyingKey>,
}

impl KeyRing {
    /// Fetch the trusted key set from `{base_url}/.well-known/keys.json`.
    ///
    /// The endpoint returns a JSON array of base64-encoded DER (SPKI)
    /// public keys. Called once, before the service accepts traffic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeySource`] if the endpoint is unreachable, returns
    /// a non-success status, or yields no usable keys. Fatal to startup.
    pub async fn fetch(base_url: &str) -> Result<Self> {
        let url = format!("{}{KEYS_PATH}", base_url.trim_end_matches('/'));
        let response = reqwest::get(&url)
            .await
            .map_err(|e| Error::KeySource(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::KeySource(format!(
                "Key source returned status {} for {url}",
                response.status()
            )));
        }

        let encoded: Vec<String> = response
            .json()
            .await
            .map_err(|e| Error::KeySource(format!("Invalid key list from {url}: {e}")))?;

        let mut keys = Vec::with_capacity(encoded.len());
        for entry in &encoded {
            let der = BASE64
                .decode(entry)
                .map_err(|e| Error::KeySource(format!("Invalid base64 key entry: {e}")))?;
            let key = VerifyingKey::from_public_key_der(&der)
                .map_err(|e| Error::KeySource(format!("Invalid DER public key: {e}")))?;
            keys.push(key);
        }

        let ring = Self::from_keys(keys)?;
        info!("Key ring initialized with {} key(s) from {url}", ring.len());
        Ok(ring)
    }

    /// Build a key ring from already-decoded keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeySource`] if the list is empty; the service
    /// cannot verify anything without keys.
    pub fn from_keys(keys: Vec<VerifyingKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::KeySource("Key ring must not be empty".to_string()));
        }
        Ok(Self { keys })
    }

    /// The key credentials are verified against.
    ///
    /// Always index 0 of the ring; see the type-level note on rotation.
    #[must_use]
    pub fn primary(&self) -> &VerifyingKey {
        // Non-empty is a construction invariant.
        &self.keys[0]
    }

    /// Number of keys in the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; the ring is non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
