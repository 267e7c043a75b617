//! Configuration
//!
//! Defaults reproduce the shipped program. A JSON file can override any
//! field, and a few environment variables override the file:
//!
//! - `CIPHERLOCK_WORKERS`       seed search threads (default: CPU count)
//! - `CIPHERLOCK_STOP_AT_FIRST` stop at the lowest match (default: false)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::checksum::PASSWORD_CHECKSUM_BASE;
use crate::constraints::ConstraintSet;
use crate::fingerprint::Fingerprint;
use crate::payload::{ENCODED_PAYLOAD, EXPECTED_PAYLOAD_CHECKSUM, PAYLOAD_LEN};
use crate::unlock::{UnlockOrchestrator, UnlockProtocol};
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherlockConfig {
    /// Seed search threads
    pub workers: usize,
    /// Stop the seed search at the lowest match instead of enumerating all
    pub stop_at_first: bool,
    /// Base added to the weighted checksum of a secret
    pub secret_base: u32,
    /// Weighted checksum the decoded payload must have
    pub expected_payload_checksum: u32,
    /// Residue filter for secret checksums
    pub constraints: ConstraintSet,
    /// Known generator outputs
    pub fingerprint: Fingerprint,
    /// Hex-encoded payload; `None` uses the built-in one
    pub payload_hex: Option<String>,
    /// Framing length the payload must have
    pub payload_len: usize,
}

impl Default for CipherlockConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            stop_at_first: false,
            secret_base: PASSWORD_CHECKSUM_BASE,
            expected_payload_checksum: EXPECTED_PAYLOAD_CHECKSUM,
            constraints: ConstraintSet::reference(),
            fingerprint: Fingerprint::reference(),
            payload_hex: None,
            payload_len: PAYLOAD_LEN,
        }
    }
}

/// `None` for anything that is not a recognised boolean
fn env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl CipherlockConfig {
    /// Read a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.as_ref().display(), e)))
    }

    /// Write this config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply `CIPHERLOCK_*` overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workers) = lookup("CIPHERLOCK_WORKERS").and_then(|s| s.parse().ok()) {
            self.workers = workers;
        }
        if let Some(flag) = lookup("CIPHERLOCK_STOP_AT_FIRST") {
            match env_flag(&flag) {
                Some(stop) => self.stop_at_first = stop,
                None => tracing::warn!(value = %flag, "ignoring unrecognised CIPHERLOCK_STOP_AT_FIRST"),
            }
        }
        self
    }

    /// Defaults, then `path` if given, then the environment
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    /// Encoded payload bytes, decoded from `payload_hex` when set
    pub fn encoded_payload(&self) -> Result<Vec<u8>> {
        match &self.payload_hex {
            Some(h) => hex::decode(h.trim())
                .map_err(|e| Error::Config(format!("payload_hex: {}", e))),
            None => Ok(ENCODED_PAYLOAD.to_vec()),
        }
    }

    pub fn protocol(&self) -> Result<UnlockProtocol> {
        UnlockProtocol::new(
            self.encoded_payload()?,
            self.payload_len,
            self.constraints.clone(),
            self.expected_payload_checksum,
            self.secret_base,
        )
    }

    pub fn orchestrator(&self) -> Result<UnlockOrchestrator> {
        Ok(UnlockOrchestrator::new(
            self.protocol()?,
            self.fingerprint.clone(),
            self.workers,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference() {
        let config = CipherlockConfig::default();
        assert!(config.workers >= 1);
        assert!(!config.stop_at_first);
        assert_eq!(config.secret_base, 0x7FFF_FFFF);
        assert_eq!(config.expected_payload_checksum, 0x0020_1b0f);

        let protocol = config.protocol().unwrap();
        assert!(protocol.unlock(b"hello_world_42").is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "workers": 3, "stop_at_first": true }}"#).unwrap();

        let config = CipherlockConfig::load(file.path()).unwrap();
        assert_eq!(config.workers, 3);
        assert!(config.stop_at_first);
        assert_eq!(config.constraints, ConstraintSet::reference());
        assert_eq!(config.fingerprint, Fingerprint::reference());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cipherlock.json");

        let mut config = CipherlockConfig::default();
        config.workers = 5;
        config.payload_hex = Some(hex::encode(ENCODED_PAYLOAD));
        config.save(&path).unwrap();

        let back = CipherlockConfig::load(&path).unwrap();
        assert_eq!(back.workers, 5);
        assert_eq!(back.encoded_payload().unwrap(), ENCODED_PAYLOAD.to_vec());
        assert!(back.protocol().unwrap().unlock(b"hello_world_42").is_ok());
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "constraints": [{{ "modulus": 4, "residue": 9 }}] }}"#).unwrap();
        assert!(matches!(
            CipherlockConfig::load(file.path()),
            Err(Error::Config(_))
        ));

        assert!(matches!(
            CipherlockConfig::load("/nonexistent/cipherlock.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_bad_hex() {
        let config = CipherlockConfig {
            payload_hex: Some("zz".into()),
            ..Default::default()
        };
        assert!(matches!(config.protocol(), Err(Error::Config(_))));
    }

    #[test]
    fn test_payload_framing() {
        let config = CipherlockConfig {
            payload_hex: Some(hex::encode(&ENCODED_PAYLOAD[..196])),
            ..Default::default()
        };
        let err = config.protocol().unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 197, got: 196 }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CIPHERLOCK_WORKERS", "7"),
            ("CIPHERLOCK_STOP_AT_FIRST", "1"),
        ]
        .into_iter()
        .collect();

        let config = CipherlockConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.workers, 7);
        assert!(config.stop_at_first);

        let config = CipherlockConfig::default().with_overrides(|k| {
            (k == "CIPHERLOCK_WORKERS").then(|| "lots".to_string())
        });
        assert_eq!(config.workers, num_cpus::get());
    }

    #[test]
    fn test_stop_at_first_flag_values() {
        let with = |value: &'static str, start: bool| {
            let base = CipherlockConfig {
                stop_at_first: start,
                ..Default::default()
            };
            base.with_overrides(|k| (k == "CIPHERLOCK_STOP_AT_FIRST").then(|| value.to_string()))
                .stop_at_first
        };

        for value in ["1", "true", "TRUE", "Yes", "on"] {
            assert!(with(value, false), "{value:?} should enable");
        }
        for value in ["0", "false", "FALSE", "no", "Off"] {
            assert!(!with(value, true), "{value:?} should disable");
        }
        // Unrecognised values leave the setting alone
        for value in ["", "maybe", "2"] {
            assert!(!with(value, false));
            assert!(with(value, true));
        }
    }
}
