//! gateguard - credential verification oracle for proxy front-ends.
//!
//! Given a signed, time-bounded, bandwidth-scoped credential presented by a
//! client connection, gateguard decides whether the connection may proceed
//! and returns an identity label.
//!
//! # Architecture
//!
//! ```text
//! POST /auth/verify
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │ DecisionCache       │  (addr, auth, tx) → memoized decision
//! └─────────┬───────────┘
//!           │ miss
//!           ▼
//! ┌─────────────────────┐      ┌────────────┐
//! │ TokenVerifier       │─────▶│ KeyRing    │  signature (key 0)
//! │  decode → verify →  │      └────────────┘
//! │  expiry → rx → tts  │      ┌────────────┐
//! └─────────────────────┘─────▶│ ReplayLedger│  monotonic tts marker
//!                              └────────────┘
//! ```
//!
//! The key ring is fetched once at startup; the ledger is loaded at startup
//! and flushed wholesale at orderly shutdown. The per-request path is pure
//! CPU work.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod keyring;
pub mod ledger;
pub mod service;
pub mod verifier;

pub use cache::DecisionCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use keyring::KeyRing;
pub use ledger::ReplayLedger;
pub use service::VerificationService;
pub use verifier::{Decision, TokenPayload, TokenVerifier};
