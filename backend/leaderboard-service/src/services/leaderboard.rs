/// Leaderboard coordinator.
///
/// Writes go store-first (authoritative, transactional), then best-effort
/// into the cache structures with the bound re-enforced. Reads are
/// cache-first with a transparent store fallback on cache miss; the rank
/// index is a possibly-stale top-K projection and never the source of truth.
use std::sync::Arc;

use validator::Validate;

use crate::cache::{MetadataTable, RankIndex, UserMeta};
use crate::db::LeaderboardStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{CreateUserRequest, RankContext, RankedUser, User};
use crate::validators;

/// Neighbors returned on each side of a rank-context query.
pub const CONTEXT_WINDOW: usize = 5;

/// Display name substituted when a cached id has lost its metadata entry.
const PLACEHOLDER_USERNAME: &str = "Unknown";

pub struct LeaderboardService {
    store: Arc<dyn LeaderboardStore>,
    rank_index: RankIndex,
    metadata: MetadataTable,
    capacity: usize,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn LeaderboardStore>, capacity: usize) -> Self {
        LeaderboardService {
            store,
            rank_index: RankIndex::new(),
            metadata: MetadataTable::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cached_entries(&self) -> usize {
        self.rank_index.len()
    }

    /// Creates a user. Validation happens before any store access; the cache
    /// is only touched after the insert has committed.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        request.validate()?;
        if !validators::validate_username(&request.username) {
            return Err(AppError::Validation(
                "username must not be blank".to_string(),
            ));
        }
        if !validators::validate_score(request.score) {
            return Err(AppError::Validation(
                "score must be a non-negative integer".to_string(),
            ));
        }
        if !validators::validate_image_url(&request.image_url) {
            return Err(AppError::Validation(
                "image_url must be empty or a valid URI".to_string(),
            ));
        }

        let username = request.username.trim();
        let user = self
            .store
            .insert_user(username, request.score, &request.image_url)
            .await?;

        self.metadata.set(user.id, UserMeta::from(&user));
        self.apply_cache_write(user.id, user.score);

        tracing::info!(user_id = user.id, score = user.score, "user created");
        Ok(user)
    }

    /// Updates a user's score. A zero-row update means the user does not
    /// exist; the cache is left untouched in that case.
    pub async fn update_score(&self, id: i64, score: i64) -> Result<()> {
        if !validators::validate_user_id(id) {
            return Err(AppError::Validation(
                "user id must be a positive integer".to_string(),
            ));
        }
        if !validators::validate_score(score) {
            return Err(AppError::Validation(
                "score must be a non-negative integer".to_string(),
            ));
        }

        let rows = self.store.update_score(id, score).await?;
        if rows == 0 {
            return Err(AppError::NotFound(format!("user {} does not exist", id)));
        }

        // Metadata is unchanged by a score update; a re-entering id that lost
        // its metadata is covered by the hydration placeholder until the next
        // create or resync.
        self.apply_cache_write(id, score);

        tracing::debug!(user_id = id, score, "score updated");
        Ok(())
    }

    /// Top `limit` users. Requests the cache cannot satisfy by construction
    /// (`limit` above the cache bound) are answered from the store with the
    /// same tie-break order.
    pub async fn top_n(&self, limit: i64) -> Result<Vec<RankedUser>> {
        if limit < 1 {
            return Err(AppError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }

        if limit as usize > self.capacity {
            tracing::debug!(limit, capacity = self.capacity, "top-n store bypass");
            return self.store.top_n(limit).await;
        }

        let ids = self.rank_index.range_by_rank(0, limit as usize - 1);
        Ok(self.hydrate(&ids, 0))
    }

    /// A user's position with up to `CONTEXT_WINDOW` neighbors on each side.
    /// A cache miss delegates the whole query to the store, which computes
    /// true neighbors under the same ordering.
    pub async fn rank_and_context(&self, id: i64) -> Result<RankContext> {
        if !validators::validate_user_id(id) {
            return Err(AppError::Validation(
                "user id must be a positive integer".to_string(),
            ));
        }

        let Some(rank) = self.rank_index.rank(id) else {
            metrics::record_cache_miss();
            return match self
                .store
                .rank_and_context(id, CONTEXT_WINDOW as i64)
                .await?
            {
                Some(context) => Ok(context),
                None => Err(AppError::NotFound(format!("user {} does not exist", id))),
            };
        };
        metrics::record_cache_hit();

        let size = self.rank_index.len();
        let above_ids = if rank == 0 {
            Vec::new()
        } else {
            self.rank_index
                .range_by_rank(rank.saturating_sub(CONTEXT_WINDOW), rank - 1)
        };
        let below_ids = if rank + 1 >= size {
            Vec::new()
        } else {
            self.rank_index
                .range_by_rank(rank + 1, (rank + CONTEXT_WINDOW).min(size - 1))
        };

        let above = self.hydrate(&above_ids, rank - above_ids.len());
        let below = self.hydrate(&below_ids, rank + 1);
        let user = self
            .hydrate(&[id], rank)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("cached entry vanished mid-read".to_string()))?;

        Ok(RankContext { user, above, below })
    }

    /// Rebuilds both cache structures from the store's top K as one logical
    /// batch. Safe to run concurrently with reads.
    pub async fn resync(&self) -> Result<usize> {
        let rows = self.store.top_n(self.capacity as i64).await?;
        let count = rows.len();

        self.metadata.clear();
        for row in &rows {
            self.metadata.set(
                row.id,
                UserMeta {
                    username: row.username.clone(),
                    image_url: row.image_url.clone(),
                },
            );
        }
        self.rank_index
            .replace_all(rows.iter().map(|r| (r.id, r.score)));

        metrics::RESYNCS_TOTAL.inc();
        metrics::RANK_INDEX_SIZE.set(count as f64);
        tracing::info!(entries = count, "rank cache rebuilt from store");
        Ok(count)
    }

    /// Best-effort cache update after a committed store write: upsert the
    /// rank entry, enforce the bound, drop metadata for evicted ids.
    fn apply_cache_write(&self, id: i64, score: i64) {
        self.rank_index.insert_or_update(id, score);
        let evicted = self.rank_index.evict_beyond(self.capacity);
        for evicted_id in &evicted {
            self.metadata.remove(*evicted_id);
        }
        if !evicted.is_empty() {
            metrics::CACHE_EVICTIONS_TOTAL.inc_by(evicted.len() as u64);
            tracing::debug!(evicted = evicted.len(), "cache bound enforced");
        }
        metrics::RANK_INDEX_SIZE.set(self.rank_index.len() as f64);
    }

    /// Builds ranked rows for cached ids starting at 0-based `start_rank`.
    /// Missing metadata degrades to a placeholder name and empty image,
    /// missing score to 0; one bad entry never fails the whole response.
    fn hydrate(&self, ids: &[i64], start_rank: usize) -> Vec<RankedUser> {
        let metas = self.metadata.multi_get(ids);
        ids.iter()
            .zip(metas)
            .enumerate()
            .map(|(offset, (id, meta))| {
                let meta = meta.unwrap_or_else(|| {
                    tracing::warn!(user_id = id, "cached entry missing metadata");
                    UserMeta {
                        username: PLACEHOLDER_USERNAME.to_string(),
                        image_url: String::new(),
                    }
                });
                RankedUser {
                    rank: (start_rank + offset + 1) as i64,
                    id: *id,
                    username: meta.username,
                    image_url: meta.image_url,
                    score: self.rank_index.score_of(*id).unwrap_or(0),
                }
            })
            .collect()
    }
}
