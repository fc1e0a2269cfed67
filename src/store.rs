use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const FORM_KEY: &str = "fiesta.form";

/// Minimal key-value capability for persisted client state.
pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Store that remembers nothing; used when persistence is unavailable or disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl KvStore for NullStore {
    fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// All keys in one JSON object file, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(anyhow!(e))
                    .with_context(|| format!("failed to read store: {}", self.path.display()))
            }
        };
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse store: {}", self.path.display()))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut all = self.load()?;
        all.insert(key.to_string(), value.to_string());

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create store directory: {}", dir.display()))?;

        let tmp = tmp_path(&self.path);
        let bytes = serde_json::to_vec_pretty(&all).context("failed to serialize store")?;
        std::fs::write(&tmp, bytes)
            .with_context(|| format!("failed to write temp store: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to move store into place: {}", self.path.display()))?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "store.json".to_string());
    p.set_file_name(format!("{file}.tmp"));
    p
}

/// Last-used form values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormState {
    pub auth_token: String,
    pub model: String,
    pub chat_title: String,
    pub prompt: String,
}

impl FormState {
    /// Read once at startup. Unreadable state yields the default.
    pub fn load(store: &dyn KvStore) -> Self {
        match store.get(FORM_KEY) {
            Ok(Some(s)) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable form state");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "form state unavailable");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KvStore) -> anyhow::Result<()> {
        let s = serde_json::to_string(self).context("failed to serialize form state")?;
        store.set(FORM_KEY, &s)
    }

    /// Apply field updates; returns whether anything changed.
    pub fn update(&mut self, update: FormUpdate) -> bool {
        let before = self.clone();
        if let Some(v) = update.auth_token {
            self.auth_token = v;
        }
        if let Some(v) = update.model {
            self.model = v;
        }
        if let Some(v) = update.chat_title {
            self.chat_title = v;
        }
        if let Some(v) = update.prompt {
            self.prompt = v;
        }
        *self != before
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormUpdate {
    pub auth_token: Option<String>,
    pub model: Option<String>,
    pub chat_title: Option<String>,
    pub prompt: Option<String>,
}
