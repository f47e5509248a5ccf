//! Replay ledger - highest accepted activation marker per identity.
//!
//! The ledger is loaded from a single MessagePack blob at startup, mutated
//! in memory for the process lifetime, and written back wholesale at orderly
//! shutdown. There is no write-ahead log or incremental checkpoint: an
//! abrupt termination loses every update since the last [`ReplayLedger::flush`],
//! so rollback protection can be defeated by crashing the process. Known gap.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Durable mapping from identity to the highest `tts` value ever accepted
/// for that identity.
///
/// All mutation happens under one mutex so the check-then-set in the replay
/// check is a single atomic critical section: two concurrent requests for
/// the same identity cannot both observe the stale marker and both win.
pub struct ReplayLedger {
    path: PathBuf,
    entries: Mutex<HashMap<String, f64>>,
}

impl ReplayLedger {
    /// Load the ledger from `path`.
    ///
    /// A missing file initializes an empty ledger and creates the file so
    /// the first flush has somewhere to land.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerLoad`] if the file exists but does not
    /// deserialize. Fatal to startup.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            let empty = rmp_serde::to_vec(&HashMap::<String, f64>::new())
                .map_err(|e| Error::LedgerLoad(e.to_string()))?;
            fs::write(&path, empty)?;
            info!("Created empty replay ledger at {}", path.display());
            return Ok(Self {
                path,
                entries: Mutex::new(HashMap::new()),
            });
        }

        let blob = fs::read(&path)?;
        let entries: HashMap<String, f64> = rmp_serde::from_slice(&blob).map_err(|e| {
            Error::LedgerLoad(format!("Corrupt ledger at {}: {e}", path.display()))
        })?;

        info!(
            "Loaded replay ledger from {} ({} identities)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Highest accepted marker for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<f64> {
        self.entries.lock().get(id).copied()
    }

    /// Record `value` as the highest accepted marker for `id`. In-memory only.
    pub fn set(&self, id: &str, value: f64) {
        self.entries.lock().insert(id.to_owned(), value);
    }

    /// Atomically check `tts` against the stored marker and advance it.
    ///
    /// Returns `true` (and records `tts`) only if `tts` is strictly greater
    /// than the stored marker (absent entries count as 0). Equal markers are
    /// rejected: exact reuse is not a fresh activation.
    pub fn check_and_advance(&self, id: &str, tts: f64) -> bool {
        let mut entries = self.entries.lock();
        let recorded = entries.get(id).copied().unwrap_or(0.0);
        if recorded < tts {
            entries.insert(id.to_owned(), tts);
            true
        } else {
            false
        }
    }

    /// Write the full mapping back to the ledger file.
    ///
    /// Intended to be called exactly once, at orderly shutdown, after
    /// in-flight requests have drained.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn flush(&self) -> Result<()> {
        let entries = self.entries.lock();
        let blob =
            rmp_serde::to_vec(&*entries).map_err(|e| Error::LedgerLoad(e.to_string()))?;
        fs::write(&self.path, blob)?;
        info!(
            "Flushed replay ledger to {} ({} identities)",
            self.path.display(),
            entries.len()
        );
        Ok(())
    }

    /// Number of identities tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the ledger tracks no identities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
