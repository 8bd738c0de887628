/// Shared test fixtures: an in-process durable store with the same
/// observable contract as the Postgres repository, including the canonical
/// `(score DESC, id ASC)` ordering in its window queries.
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use leaderboard_service::db::LeaderboardStore;
use leaderboard_service::error::Result;
use leaderboard_service::models::{RankContext, RankedUser, User};

#[derive(Debug, Clone)]
struct StoredRow {
    id: i64,
    username: String,
    image_url: String,
    score: i64,
}

#[derive(Default)]
pub struct FakeStore {
    rows: Mutex<Vec<StoredRow>>,
    next_id: AtomicI64,
}

impl FakeStore {
    pub fn new() -> Self {
        FakeStore {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seeds a row with an explicit id, bypassing the insert path.
    pub fn seed(&self, id: i64, username: &str, score: i64) {
        let mut rows = self.rows.lock().unwrap();
        rows.push(StoredRow {
            id,
            username: username.to_string(),
            image_url: String::new(),
            score,
        });
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn ranked(&self) -> Vec<RankedUser> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        rows.into_iter()
            .enumerate()
            .map(|(i, r)| RankedUser {
                rank: (i + 1) as i64,
                id: r.id,
                username: r.username,
                image_url: r.image_url,
                score: r.score,
            })
            .collect()
    }
}

#[async_trait]
impl LeaderboardStore for FakeStore {
    async fn insert_user(&self, username: &str, score: i64, image_url: &str) -> Result<User> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        rows.push(StoredRow {
            id,
            username: username.to_string(),
            image_url: image_url.to_string(),
            score,
        });
        let now = Utc::now();
        Ok(User {
            id,
            username: username.to_string(),
            image_url: image_url.to_string(),
            score,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_score(&self, id: i64, score: i64) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.score = score;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn top_n(&self, limit: i64) -> Result<Vec<RankedUser>> {
        let mut ranked = self.ranked();
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }

    async fn rank_and_context(&self, id: i64, window: i64) -> Result<Option<RankContext>> {
        let ranked = self.ranked();
        let Some(user) = ranked.iter().find(|r| r.id == id).cloned() else {
            return Ok(None);
        };
        let above = ranked
            .iter()
            .filter(|r| r.rank < user.rank && r.rank >= user.rank - window)
            .cloned()
            .collect();
        let below = ranked
            .iter()
            .filter(|r| r.rank > user.rank && r.rank <= user.rank + window)
            .cloned()
            .collect();
        Ok(Some(RankContext { user, above, below }))
    }
}
