// src/storage/mod.rs
use crate::process::{process_rows, DashboardData};
use crate::sample::{self, Profile};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::Rng;
use std::{
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
    sync::Mutex,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Name of the slot holding the most recently processed dataset.
pub const DASHBOARD_SLOT: &str = "dashboardData";

/// A string key/value store. Writes replace the whole value.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Process-local storage, mostly for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating storage directory {:?}", &dir))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading slot {:?}", &path)),
        }
    }

    /// Write to a temp file beside the target, then rename over it, so a
    /// reader sees either the old value or the new one.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("creating temp file in {:?}", &self.dir))?;
        tmp.write_all(value.as_bytes())
            .context("writing slot contents")?;
        tmp.persist(&path)
            .with_context(|| format!("replacing slot {:?}", &path))?;
        debug!(key, bytes = value.len(), "slot written");
        Ok(())
    }
}

/// The single named slot that hands a processed dataset from the upload
/// flow to the dashboard view.
pub struct DashboardSlot<S> {
    store: S,
    key: String,
}

impl<S: Storage> DashboardSlot<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DASHBOARD_SLOT)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Replace the stored dataset.
    pub fn save(&self, data: &DashboardData) -> Result<()> {
        let json = serde_json::to_string(data).context("serializing dashboard data")?;
        self.store.set(&self.key, &json)?;
        info!(key = %self.key, rows = data.raw_data.len(), "saved dashboard data");
        Ok(())
    }

    /// `Ok(None)` when nothing has been saved yet. Unparsable contents are an error.
    pub fn load(&self) -> Result<Option<DashboardData>> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let data = serde_json::from_str(&json)
            .with_context(|| format!("parsing stored slot `{}`", self.key))?;
        Ok(Some(data))
    }

    /// Stored dataset, or a freshly generated `fallback` sample when the slot
    /// is empty, unreadable or corrupt.
    pub fn load_or_sample<R: Rng + ?Sized>(
        &self,
        fallback: Profile,
        today: NaiveDate,
        rng: &mut R,
    ) -> DashboardData {
        match self.load() {
            Ok(Some(data)) => data,
            Ok(None) => {
                info!(profile = %fallback, "no stored dashboard data; using sample");
                process_rows(&sample::generate(fallback, today, rng))
            }
            Err(e) => {
                warn!(
                    error = %format!("{:#}", e),
                    profile = %fallback,
                    "stored dashboard data unusable; using sample"
                );
                process_rows(&sample::generate(fallback, today, rng))
            }
        }
    }
}
