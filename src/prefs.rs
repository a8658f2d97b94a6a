//! Durable per-key preferences (page sizes, theme) kept in a small JSON file.
//!
//! Every failure here is swallowed: a missing, unreadable or read-only file
//! only means the defaults are used.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Theme, THEME_KEY};

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference storage is unavailable")]
    Unavailable,
    #[error("preference file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace preference file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Clone, Debug)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreferenceStore { path: Some(path.into()) }
    }

    /// A store with no backing file; reads fall back and writes are dropped.
    pub fn unavailable() -> Self {
        PreferenceStore { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        let path = self.path.as_ref().ok_or(PrefsError::Unavailable)?;
        match std::fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let path = self.path.as_ref().ok_or(PrefsError::Unavailable)?;
        // A corrupt file is overwritten rather than blocking every later write.
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(&entries)?.as_bytes())?;
        tmp.persist(path)?;
        Ok(())
    }

    /// Stored page size for `key`, or `fallback` when absent or not a positive number.
    pub fn load_size(&self, key: &str, fallback: usize) -> usize {
        match self.get(key) {
            Ok(Some(raw)) => parse_size(&raw).unwrap_or(fallback),
            Ok(None) => fallback,
            Err(e) => {
                tracing::debug!(key, error = %e, "page size preference unreadable");
                fallback
            }
        }
    }

    pub fn save_size(&self, key: &str, size: usize) {
        if let Err(e) = self.set(key, &size.to_string()) {
            tracing::debug!(key, size, error = %e, "page size preference not saved");
        }
    }

    pub fn load_theme(&self) -> Option<Theme> {
        match self.get(THEME_KEY) {
            Ok(raw) => raw.as_deref().and_then(Theme::parse),
            Err(e) => {
                tracing::debug!(error = %e, "theme preference unreadable");
                None
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) {
        if let Err(e) = self.set(THEME_KEY, theme.as_str()) {
            tracing::debug!(theme = theme.as_str(), error = %e, "theme preference not saved");
        }
    }
}

fn parse_size(raw: &str) -> Option<usize> {
    let n: f64 = raw.trim().parse().ok()?;
    if !n.is_finite() || n < 1.0 {
        return None;
    }
    Some(n.trunc() as usize)
}
