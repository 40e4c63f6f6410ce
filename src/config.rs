use crate::sample::Profile;
use anyhow::{Context, Result};
use std::{env, path::PathBuf};

/// Uploads above this size are refused before reading.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the storage slot files.
    pub data_dir: PathBuf,
    pub max_file_bytes: u64,
    /// Dataset shown when nothing has been uploaded yet.
    pub default_profile: Profile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            default_profile: Profile::Retail,
        }
    }
}

impl Config {
    /// Read `CSVDASH_DATA_DIR`, `CSVDASH_MAX_FILE_BYTES` and
    /// `CSVDASH_DEFAULT_PROFILE`, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Config::default();
        if let Some(dir) = lookup("CSVDASH_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(max) = lookup("CSVDASH_MAX_FILE_BYTES") {
            cfg.max_file_bytes = max
                .trim()
                .parse()
                .with_context(|| format!("CSVDASH_MAX_FILE_BYTES `{}` is not a byte count", max))?;
        }
        if let Some(profile) = lookup("CSVDASH_DEFAULT_PROFILE") {
            cfg.default_profile = profile.parse().context("CSVDASH_DEFAULT_PROFILE")?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.max_file_bytes, 10_485_760);
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("CSVDASH_DATA_DIR", "/tmp/dash"),
            ("CSVDASH_MAX_FILE_BYTES", "2048"),
            ("CSVDASH_DEFAULT_PROFILE", "marketing"),
        ]))
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/dash"));
        assert_eq!(cfg.max_file_bytes, 2048);
        assert_eq!(cfg.default_profile, Profile::Marketing);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("CSVDASH_MAX_FILE_BYTES", "ten")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CSVDASH_DEFAULT_PROFILE", "crm")])).is_err());
    }
}
