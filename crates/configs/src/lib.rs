use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default = "default_storage_key")]
    pub key: String,
    /// Byte quota for the memory backend; `None` means unlimited.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: default_storage_path(),
            key: default_storage_key(),
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_alert_dismiss_ms")]
    pub alert_dismiss_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { alert_dismiss_ms: default_alert_dismiss_ms() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_storage_path() -> String { "data/users.json".into() }
fn default_storage_key() -> String { "users".into() }
fn default_alert_dismiss_ms() -> u64 { 3000 }

/// One day.
pub const MAX_ALERT_DISMISS_MS: u64 = 86_400_000;

pub fn load_default() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when
    /// the file is missing, then normalize.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.ui.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(path) = std::env::var("USERS_STORAGE_PATH") {
            if !path.trim().is_empty() {
                self.path = path;
            }
        }
        if self.path.trim().is_empty() {
            self.path = default_storage_path();
        }
        if self.key.trim().is_empty() {
            self.key = default_storage_key();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.quota_bytes == Some(0) {
            return Err(anyhow!("storage.quota_bytes must be >= 1 when set"));
        }
        if self.backend == StorageBackend::File && self.quota_bytes.is_some() {
            return Err(anyhow!("storage.quota_bytes only applies to the memory backend"));
        }
        Ok(())
    }
}

impl UiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.alert_dismiss_ms == 0 {
            return Err(anyhow!("ui.alert_dismiss_ms must be a positive number of milliseconds"));
        }
        if self.alert_dismiss_ms > MAX_ALERT_DISMISS_MS {
            return Err(anyhow!("ui.alert_dismiss_ms must be <= {MAX_ALERT_DISMISS_MS}"));
        }
        Ok(())
    }
}
