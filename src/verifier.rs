//! Core credential verification - the accept/reject decision algorithm.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::keyring::KeyRing;
use crate::ledger::ReplayLedger;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature, Verifier as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Identity reported when the signature does not verify and no payload
/// field can be trusted.
pub const INVALID_SIG_ID: &str = "invalid sig";

/// The signed credential payload.
///
/// Opaque to the transport; only ever parsed after its signature has been
/// verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Identity string, stable per principal.
    pub id: String,
    /// Maximum throughput in bytes/sec the principal is entitled to.
    pub rx: u64,
    /// Absolute expiry, epoch seconds.
    pub exp: u64,
    /// Activation instant ("time to schedule"), strictly increasing per
    /// legitimate credential reuse for a given identity. Anti-rollback
    /// marker.
    pub tts: f64,
}

/// Outcome of a verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the connection may proceed.
    pub ok: bool,
    /// Identity label. On rejection this carries the identity extracted
    /// from the verified payload, or [`INVALID_SIG_ID`] when the signature
    /// itself failed.
    pub id: String,
}

impl Decision {
    /// An accepting decision for `id`.
    #[must_use]
    pub fn accept(id: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: id.into(),
        }
    }

    /// A rejecting decision for `id`.
    #[must_use]
    pub fn reject(id: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: id.into(),
        }
    }
}

/// Pure decision function over a presented credential.
///
/// Consults the [`KeyRing`] for signature verification and mutates the
/// [`ReplayLedger`] on acceptance. The decision path performs no I/O.
pub struct TokenVerifier {
    keys: Arc<KeyRing>,
    ledger: Arc<ReplayLedger>,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Create a verifier over the given key ring, ledger, and clock.
    #[must_use]
    pub fn new(keys: Arc<KeyRing>, ledger: Arc<ReplayLedger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            ledger,
            clock,
        }
    }

    /// Decide whether the connection presenting `auth` may proceed.
    ///
    /// Checks run in order and short-circuit on first failure: wire
    /// decoding, signature, expiry, throughput (`tx` against the entitled
    /// `rx`, boundary inclusive), replay marker. Only the replay check has
    /// a side effect (advancing the ledger on acceptance).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedCredential`] if `auth` cannot be decoded
    /// at all, and [`Error::PayloadParse`] if a correctly signed payload
    /// fails to parse. All ordinary rejections are `Ok` decisions.
    pub fn decide(&self, addr: &str, auth: &str, tx: u64) -> Result<Decision> {
        let (msg_raw, sig_raw) = decode_auth(auth)?;

        // The signature must prove authenticity of the message bytes before
        // any payload field is allowed to influence control flow.
        let Ok(signature) = Signature::from_slice(&sig_raw) else {
            info!("[{addr}] - invalid signature");
            return Ok(Decision::reject(INVALID_SIG_ID));
        };
        if self.keys.primary().verify(&msg_raw, &signature).is_err() {
            info!("[{addr}] - invalid signature");
            return Ok(Decision::reject(INVALID_SIG_ID));
        }

        let payload: TokenPayload = serde_json::from_slice(&msg_raw)
            .map_err(|e| Error::PayloadParse(e.to_string()))?;

        if self.clock.unix_seconds() > payload.exp {
            info!("[{addr}] exp: {} ({})", payload.id, payload.exp);
            return Ok(Decision::reject(payload.id));
        }

        if tx > payload.rx {
            info!("[{addr}] rx: {} ({})", payload.id, payload.rx);
            return Ok(Decision::reject(payload.id));
        }

        if !self.ledger.check_and_advance(&payload.id, payload.tts) {
            info!("[{addr}] tts: {} ({})", payload.id, payload.tts);
            return Ok(Decision::reject(payload.id));
        }

        Ok(Decision::accept(payload.id))
    }
}

/// Split the wire encoding `b64(message) ":" b64(signature)` into raw bytes.
fn decode_auth(auth: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let (msg, sig) = auth
        .split_once(':')
        .ok_or_else(|| Error::MalformedCredential("Missing ':' delimiter".to_string()))?;

    let msg_raw = BASE64
        .decode(msg)
        .map_err(|e| Error::MalformedCredential(format!("Bad message encoding: {e}")))?;
    let sig_raw = BASE64
        .decode(sig)
        .map_err(|e| Error::MalformedCredential(format!("Bad signature encoding: {e}")))?;

    Ok((msg_raw, sig_raw))
}
