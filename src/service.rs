//! Verification service - the cache composed over the verifier.

use crate::cache::DecisionCache;
use crate::clock::Clock;
use crate::error::Result;
use crate::keyring::KeyRing;
use crate::ledger::ReplayLedger;
use crate::verifier::{Decision, TokenVerifier};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The external-facing verification operation.
///
/// Composes [`DecisionCache`] over [`TokenVerifier`]: an inbound request
/// first hits the cache, and only on a miss runs the full decision
/// algorithm against the key ring and replay ledger.
pub struct VerificationService {
    cache: DecisionCache,
    verifier: TokenVerifier,
}

impl VerificationService {
    /// Assemble the service from its explicitly constructed parts.
    ///
    /// The key ring must already be populated and the ledger loaded;
    /// composition order is owned by the caller (the binary's startup
    /// sequence).
    #[must_use]
    pub fn new(
        keys: Arc<KeyRing>,
        ledger: Arc<ReplayLedger>,
        clock: Arc<dyn Clock>,
        cache_capacity: usize,
        cache_ttl: Duration,
    ) -> Self {
        info!(
            "Verification service ready (keys={}, ledger_identities={}, cache_capacity={cache_capacity}, cache_ttl={cache_ttl:?})",
            keys.len(),
            ledger.len()
        );
        Self {
            cache: DecisionCache::new(cache_capacity, cache_ttl, Arc::clone(&clock)),
            verifier: TokenVerifier::new(keys, ledger, clock),
        }
    }

    /// Verify a presented credential, memoizing the outcome.
    ///
    /// Identical `(addr, auth, tx)` requests within the cache window return
    /// the previously computed decision and mutate the ledger at most once.
    /// Decoding and payload errors are never cached.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::Error::MalformedCredential`] and
    /// [`crate::Error::PayloadParse`] from the verifier.
    pub fn verify(&self, addr: &str, auth: &str, tx: u64) -> Result<Decision> {
        if let Some(decision) = self.cache.get(addr, auth, tx) {
            return Ok(decision);
        }

        let decision = self.verifier.decide(addr, auth, tx)?;
        self.cache.insert(addr, auth, tx, decision.clone());
        Ok(decision)
    }

    /// Number of decisions currently memoized.
    #[must_use]
    pub fn cached_decisions(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::clock::ManualClock;
    use crate::verifier::TokenPayload;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use ed25519_dalek::{Signer as _, SigningKey};

    const NOW: u64 = 1_700_000_000;

    struct Fixture {
        signing_key: SigningKey,
        service: VerificationService,
        clock: Arc<ManualClock>,
        ledger: Arc<ReplayLedger>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let keys = Arc::new(KeyRing::from_keys(vec![signing_key.verifying_key()]).unwrap());
        let ledger = Arc::new(ReplayLedger::load(dir.path().join("ledger.mp")).unwrap());
        let clock = Arc::new(ManualClock::at_unix_seconds(NOW));
        let service = VerificationService::new(
            keys,
            Arc::clone(&ledger),
            clock.clone(),
            1024,
            DEFAULT_TTL,
        );
        Fixture {
            signing_key,
            service,
            clock,
            ledger,
            _dir: dir,
        }
    }

    fn token(key: &SigningKey, id: &str, tts: f64) -> String {
        let payload = TokenPayload {
            id: id.to_string(),
            rx: 1000,
            exp: NOW + 10,
            tts,
        };
        let msg_raw = serde_json::to_vec(&payload).unwrap();
        let sig_raw = key.sign(&msg_raw);
        format!(
            "{}:{}",
            BASE64.encode(&msg_raw),
            BASE64.encode(sig_raw.to_bytes())
        )
    }

    #[test]
    fn duplicate_call_within_window_is_idempotent() {
        let fx = fixture();
        let auth = token(&fx.signing_key, "alice", 1.0);

        let first = fx.service.verify("fake.addr", &auth, 1000).unwrap();
        let second = fx.service.verify("fake.addr", &auth, 1000).unwrap();

        // Identical decisions; without the cache the second call would be
        // an exact-reuse rejection.
        assert_eq!(first, second);
        assert!(first.ok);
        assert_eq!(fx.ledger.get("alice"), Some(1.0));
    }

    #[test]
    fn replay_surfaces_once_window_expires() {
        let fx = fixture();
        let auth = token(&fx.signing_key, "alice", 1.0);

        assert!(fx.service.verify("fake.addr", &auth, 1000).unwrap().ok);

        // Past the cache window the same credential hits the ledger again
        // and is rejected as an exact reuse.
        fx.clock.advance(Duration::from_secs(11));
        let decision = fx.service.verify("fake.addr", &auth, 1000).unwrap();
        assert!(!decision.ok);
        assert_eq!(decision.id, "alice");
    }

    #[test]
    fn different_tx_bypasses_cache() {
        let fx = fixture();
        let auth = token(&fx.signing_key, "alice", 1.0);

        assert!(fx.service.verify("fake.addr", &auth, 1000).unwrap().ok);
        // Different triple: full decision path, which now sees exact reuse.
        assert!(!fx.service.verify("fake.addr", &auth, 999).unwrap().ok);
    }

    #[test]
    fn malformed_credentials_are_not_cached() {
        let fx = fixture();

        assert!(fx.service.verify("fake.addr", "garbage", 100).is_err());
        assert_eq!(fx.service.cached_decisions(), 0);
    }
}
