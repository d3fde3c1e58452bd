//! Configuration of a mock Firestore instance.

use crate::errors::{raise, ErrorKind, FirestoreResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";
pub const DEFAULT_AUTO_ID_PREFIX: &str = "__id";

/// When live query listeners are notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Every write to a watched collection re-delivers the query result,
    /// whether or not the result changed.
    #[default]
    EveryChange,
    /// A re-evaluated result equal to the previously delivered one is not
    /// delivered again.
    OnResultChange,
}

/// Runtime settings accepted by [Firestore::settings].
///
/// Nothing here alters in-memory behavior; the values are recorded so code
/// that configures the client can be exercised.
///
/// [Firestore::settings]: crate::firestore::Firestore::settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub host: Option<String>,
    pub ssl: Option<bool>,
    pub cache_size_bytes: Option<i64>,
    pub ignore_undefined_properties: bool,
}

/// Configuration shared by a store and every handle created from it.
///
/// Values can be changed until the store is opened; afterwards the
/// configuration is frozen.
#[derive(Clone)]
pub struct FirestoreConfig {
    inner: Arc<FirestoreConfigInner>,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FirestoreConfig {
    pub fn new() -> Self {
        FirestoreConfig {
            inner: Arc::new(FirestoreConfigInner::new()),
        }
    }

    pub fn app_name(&self) -> String {
        self.inner.app_name.read().clone()
    }

    pub fn set_app_name(&self, app_name: &str) -> FirestoreResult<()> {
        self.inner.ensure_not_configured("App name")?;
        if app_name.trim().is_empty() {
            return Err(raise("App name cannot be empty", ErrorKind::InvalidArgument));
        }
        *self.inner.app_name.write() = app_name.to_string();
        Ok(())
    }

    pub fn auto_id_prefix(&self) -> String {
        self.inner.auto_id_prefix.read().clone()
    }

    pub fn set_auto_id_prefix(&self, prefix: &str) -> FirestoreResult<()> {
        self.inner.ensure_not_configured("Auto id prefix")?;
        if prefix.contains('/') {
            return Err(raise(
                &format!("Auto id prefix '{}' must not contain '/'", prefix),
                ErrorKind::InvalidArgument,
            ));
        }
        *self.inner.auto_id_prefix.write() = prefix.to_string();
        Ok(())
    }

    pub fn notify_policy(&self) -> NotifyPolicy {
        *self.inner.notify_policy.read()
    }

    pub fn set_notify_policy(&self, policy: NotifyPolicy) -> FirestoreResult<()> {
        self.inner.ensure_not_configured("Notify policy")?;
        *self.inner.notify_policy.write() = policy;
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Acquire)
    }

    pub(crate) fn initialize(&self) {
        self.inner.configured.store(true, Ordering::Release);
    }
}

struct FirestoreConfigInner {
    configured: AtomicBool,
    app_name: RwLock<String>,
    auto_id_prefix: RwLock<String>,
    notify_policy: RwLock<NotifyPolicy>,
}

impl FirestoreConfigInner {
    fn new() -> Self {
        FirestoreConfigInner {
            configured: AtomicBool::new(false),
            app_name: RwLock::new(DEFAULT_APP_NAME.to_string()),
            auto_id_prefix: RwLock::new(DEFAULT_AUTO_ID_PREFIX.to_string()),
            notify_policy: RwLock::new(NotifyPolicy::default()),
        }
    }

    fn ensure_not_configured(&self, what: &str) -> FirestoreResult<()> {
        if self.configured.load(Ordering::Acquire) {
            return Err(raise(
                &format!("{} cannot be changed after initialization", what),
                ErrorKind::FailedPrecondition,
            ));
        }
        Ok(())
    }
}
