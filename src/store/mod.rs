pub mod memory;
pub mod prefs;
pub mod sqlite;

use crate::app::Result;

pub use memory::MemoryStore;
pub use prefs::Preferences;
pub use sqlite::SqliteStore;

/// String key-value storage.
///
/// Two lifetimes are used: a persistent store that survives restarts
/// ([`SqliteStore`]) and a session store that lives as long as the process
/// ([`MemoryStore`]). Writes are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
