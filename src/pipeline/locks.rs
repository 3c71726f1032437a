//! Per-fixture mutual exclusion

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

/// One async mutex per fixture ID.
///
/// Holding the guard serializes read-generate-write for that fixture only;
/// other fixtures are never blocked.
#[derive(Debug, Default)]
pub struct FixtureLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

impl FixtureLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `fixture_id`.
    pub async fn lock(&self, fixture_id: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop slots nobody holds or waits on.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(fixture_id.to_string()).or_default().clone()
        };

        slot.lock_owned().await
    }

    /// Number of fixtures currently tracked
    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
