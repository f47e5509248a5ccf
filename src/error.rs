//! Error types for gateguard.

/// Errors produced by gateguard.
///
/// Authorization rejections (bad signature, expiry, throughput, replay) are
/// NOT errors; they are [`crate::Decision`] values. Only fatal startup
/// failures and per-call exceptional conditions surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The trusted key source was unreachable or returned unusable data.
    /// Fatal to startup.
    #[error("Key source error: {0}")]
    KeySource(String),

    /// The replay ledger blob exists but could not be deserialized.
    /// Fatal to startup.
    #[error("Ledger load error: {0}")]
    LedgerLoad(String),

    /// The presented credential could not be split or base64-decoded.
    /// No identity can be extracted; the transport maps this to a
    /// generic failure.
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    /// Signature verification succeeded but the payload did not parse.
    /// A trusted signer produced unparseable bytes, which indicates a
    /// key or protocol mismatch rather than an ordinary rejection.
    #[error("Unparseable payload from trusted signer: {0}")]
    PayloadParse(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for gateguard operations.
pub type Result<T> = std::result::Result<T, Error>;
