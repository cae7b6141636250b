//! Wiring from configuration to a running controller.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use configs::{AppConfig, LogFormat, StorageBackend, StorageConfig};
use service::storage::{JsonFileKvStore, KvStore, KvUserRepository, MemoryKvStore};
use service::{Clock, SystemClock, UserService};

use crate::{controller::UserController, view::View};

/// Repository over whichever store the configuration selected.
pub type ConfiguredRepository = KvUserRepository<dyn KvStore>;

pub fn init_logging(cfg: &AppConfig) {
    match cfg.logging.format {
        LogFormat::Compact => common::utils::logging::init_logging_default(),
        LogFormat::Json => common::utils::logging::init_logging_json(),
    }
}

pub fn build_store(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match cfg.backend {
        StorageBackend::Memory => match cfg.quota_bytes {
            Some(quota) => Arc::new(MemoryKvStore::with_quota(quota)),
            None => Arc::new(MemoryKvStore::new()),
        },
        StorageBackend::File => Arc::new(
            JsonFileKvStore::open(&cfg.path)
                .map_err(|e| anyhow::anyhow!("cannot open {}: {e}", cfg.path))?,
        ),
    };
    Ok(store)
}

/// Build the controller with the system clock and render the initial state.
pub fn setup<V: View>(cfg: &AppConfig, view: V) -> anyhow::Result<UserController<ConfiguredRepository, V>> {
    setup_with_clock(cfg, view, Arc::new(SystemClock))
}

pub fn setup_with_clock<V: View>(
    cfg: &AppConfig,
    view: V,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<UserController<ConfiguredRepository, V>> {
    init_logging(cfg);
    let store = build_store(&cfg.storage)?;
    let repo = Arc::new(KvUserRepository::with_key(store, cfg.storage.key.clone()));
    let service = UserService::new(repo, clock);
    let ttl = Duration::milliseconds(
        i64::try_from(cfg.ui.alert_dismiss_ms.min(configs::MAX_ALERT_DISMISS_MS)).unwrap_or(i64::MAX),
    );
    let mut controller = UserController::new(service, view, ttl);
    controller.start();
    info!(backend = ?cfg.storage.backend, key = %cfg.storage.key, "user registry initialized");
    Ok(controller)
}
