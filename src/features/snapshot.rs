//! Persisted transformer state: JSON document carrying the fitted state and its
//! SHA-256 fingerprint.

use super::pipeline::{FeatureTransformer, FittedState};
use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerSnapshot {
    pub format_version: u32,
    /// Hex SHA-256 of the compact JSON encoding of `state`
    pub fingerprint: String,
    pub state: FittedState,
}

fn fingerprint(state: &FittedState) -> Result<String> {
    let bytes = serde_json::to_vec(state)?;
    let mut h = Sha256::new();
    h.update(&bytes);
    Ok(format!("{:x}", h.finalize()))
}

impl TransformerSnapshot {
    pub fn capture(state: &FittedState) -> Result<Self> {
        Ok(Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            fingerprint: fingerprint(state)?,
            state: state.clone(),
        })
    }

    /// Check version, fingerprint and structure.
    pub fn verify(&self) -> Result<()> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(ChurnError::IncompatibleSnapshot(format!(
                "format version {} (expected {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        let actual = fingerprint(&self.state)?;
        if actual != self.fingerprint {
            return Err(ChurnError::SnapshotIntegrity {
                expected: self.fingerprint.clone(),
                actual,
            });
        }
        self.state.validate()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(
            path = %path.display(),
            fingerprint = %self.fingerprint,
            "transformer snapshot saved"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let snapshot: TransformerSnapshot = serde_json::from_str(&data)?;
        snapshot.verify()?;
        Ok(snapshot)
    }
}

impl FeatureTransformer {
    pub fn snapshot(&self) -> Result<TransformerSnapshot> {
        let state = self.state().ok_or(ChurnError::NotFitted)?;
        TransformerSnapshot::capture(state)
    }

    pub fn from_snapshot(snapshot: TransformerSnapshot) -> Result<Self> {
        snapshot.verify()?;
        FeatureTransformer::from_state(snapshot.state)
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        self.snapshot()?.save(path)
    }

    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let snapshot = TransformerSnapshot::load(path)?;
        info!(
            path = %path.display(),
            fingerprint = %snapshot.fingerprint,
            "transformer snapshot loaded"
        );
        FeatureTransformer::from_state(snapshot.state)
    }
}
