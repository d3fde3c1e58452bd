use crate::errors::{FirestoreError, FirestoreResult};
use crate::firestore::Firestore;
use crate::firestore_config::{FirestoreConfig, NotifyPolicy};

/// Fluent builder for [Firestore].
///
/// The first invalid setting is remembered and reported by [open].
///
/// [open]: FirestoreBuilder::open
#[derive(Default)]
pub struct FirestoreBuilder {
    error: Option<FirestoreError>,
    config: FirestoreConfig,
}

impl FirestoreBuilder {
    pub fn new() -> Self {
        FirestoreBuilder {
            error: None,
            config: FirestoreConfig::new(),
        }
    }

    pub fn app_name(mut self, app_name: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_app_name(app_name) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn auto_id_prefix(mut self, prefix: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_auto_id_prefix(prefix) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn notify_policy(mut self, policy: NotifyPolicy) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_notify_policy(policy) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn open(self) -> FirestoreResult<Firestore> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.initialize();
        log::debug!("Opening mock Firestore for app {}", self.config.app_name());
        Ok(Firestore::with_config(self.config))
    }
}
