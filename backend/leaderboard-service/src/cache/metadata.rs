/// Display metadata for cached leaderboard entries.
///
/// Pure key-value semantics with a positionally aligned batched read; the
/// rank index owns ordering. DashMap shard locks make each individual
/// operation atomic under concurrent request handling.
use dashmap::DashMap;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMeta {
    pub username: String,
    pub image_url: String,
}

impl From<&User> for UserMeta {
    fn from(user: &User) -> Self {
        UserMeta {
            username: user.username.clone(),
            image_url: user.image_url.clone(),
        }
    }
}

#[derive(Default)]
pub struct MetadataTable {
    entries: DashMap<i64, UserMeta>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: i64, meta: UserMeta) {
        self.entries.insert(id, meta);
    }

    pub fn get(&self, id: i64) -> Option<UserMeta> {
        self.entries.get(&id).map(|e| e.value().clone())
    }

    /// Batched lookup, aligned positionally with the input ids.
    pub fn multi_get(&self, ids: &[i64]) -> Vec<Option<UserMeta>> {
        ids.iter().map(|id| self.get(*id)).collect()
    }

    pub fn remove(&self, id: i64) {
        self.entries.remove(&id);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
