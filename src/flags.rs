//! Feature-flag handle.
//!
//! The core only defines the contract: a current value plus change
//! notification. Whatever fetches remote config calls [`FeatureFlags::publish`];
//! the UI layer observes. Repositories never read flags.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Remote-config toggles consumed by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFlags {
    /// Whether category assignment is offered at all.
    pub ff_categories: bool,
}

impl Default for AppFlags {
    fn default() -> Self {
        // Matches the remote default so the app behaves the same before the
        // first fetch completes.
        Self { ff_categories: true }
    }
}

#[derive(Clone, Debug)]
pub struct FeatureFlags {
    flags: Arc<watch::Sender<AppFlags>>,
}

impl FeatureFlags {
    pub fn new(initial: AppFlags) -> Self {
        let (flags, _) = watch::channel(initial);
        Self {
            flags: Arc::new(flags),
        }
    }

    pub fn current(&self) -> AppFlags {
        *self.flags.borrow()
    }

    /// Subscribes to flag changes; the receiver starts with the current value.
    pub fn watch(&self) -> watch::Receiver<AppFlags> {
        self.flags.subscribe()
    }

    /// Replaces the current flags and wakes all watchers.
    pub fn publish(&self, flags: AppFlags) {
        self.flags.send_replace(flags);
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::new(AppFlags::default())
    }
}
