//! Persisted notification state

use dk_core::{KvStore, KvStoreExt, MessageId};

/// Store owner for update state
pub const OWNER: &str = "UpdateNotifier";

const KEY_NOTIFIED: &str = "notified";
const KEY_IGNORED: &str = "ignore_permanent";
const KEY_MESSAGE: &str = "upd_msg";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateState {
    /// Remote commit id the owner was last notified about
    pub notified: Option<String>,
    /// Remote commit id the owner asked not to hear about again
    pub ignored: Option<String>,
    /// Last notification message, deleted before the next one is sent
    pub message: Option<MessageId>,
}

impl UpdateState {
    pub fn load(store: &dyn KvStore) -> Self {
        Self {
            notified: store.get_as(OWNER, KEY_NOTIFIED),
            ignored: store.get_as(OWNER, KEY_IGNORED),
            message: store.get_as(OWNER, KEY_MESSAGE),
        }
    }

    pub fn save(&self, store: &dyn KvStore) -> dk_core::Result<()> {
        store.set_as(OWNER, KEY_NOTIFIED, &self.notified)?;
        store.set_as(OWNER, KEY_IGNORED, &self.ignored)?;
        store.set_as(OWNER, KEY_MESSAGE, &self.message)?;
        Ok(())
    }

    /// Persist only the suppression target
    pub fn save_ignored(store: &dyn KvStore, commit: &str) -> dk_core::Result<()> {
        store.set_as(OWNER, KEY_IGNORED, &commit)
    }

    pub fn is_ignored(&self, commit: &str) -> bool {
        self.ignored.as_deref() == Some(commit)
    }

    pub fn is_notified(&self, commit: &str) -> bool {
        self.notified.as_deref() == Some(commit)
    }
}
