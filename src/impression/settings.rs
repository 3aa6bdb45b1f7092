//! Persistent AI settings.

use super::Provider;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Settings key holding the provider name.
pub const PROVIDER_KEY: &str = "ai_provider";

/// Settings key holding the API key.
pub const API_KEY_KEY: &str = "ai_api_key";

/// String key/value store for user settings. Values never expire.
pub trait SettingsStore {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Settings kept in memory for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Settings stored as a flat JSON object in a file.
///
/// The file is read once on open and rewritten on every change; a missing
/// file is an empty store.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettingsStore {
    /// Open (or start) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json).map_err(|e| {
                Error::Settings(format!("invalid settings file {}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// Location of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // Writes `values` to disk; the caller commits them on success.
    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(values).map_err(|e| Error::Settings(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        log::debug!("saved settings to {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.clone();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)?;
        self.values = values;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut values = self.values.clone();
        if values.remove(key).is_some() {
            self.save(&values)?;
            self.values = values;
        }
        Ok(())
    }
}

/// Provider selection and credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub provider: Provider,
    pub api_key: Option<String>,
}

impl AiSettings {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: Some(api_key.into()),
        }
    }

    /// Read settings; the provider defaults to Gemini.
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        let provider = match store.get(PROVIDER_KEY)? {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };
        let api_key = store.get(API_KEY_KEY)?.filter(|k| !k.trim().is_empty());
        Ok(Self { provider, api_key })
    }

    /// Write settings back.
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<()> {
        store.set(PROVIDER_KEY, self.provider.as_str())?;
        match self.api_key {
            Some(ref key) => store.set(API_KEY_KEY, key),
            None => store.remove(API_KEY_KEY),
        }
    }

    /// API key with surrounding whitespace removed, if one is set.
    pub fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingCredential)
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
        }
    }
}
