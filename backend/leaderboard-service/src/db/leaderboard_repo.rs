/// Durable store access for the leaderboard.
///
/// All ranked reads use `ROW_NUMBER() OVER (ORDER BY score DESC, id ASC)` so
/// the store and the in-memory rank index agree on tie-breaking. Writes run
/// inside a scoped transaction; the transaction is rolled back on drop when
/// an error propagates, leaving the table unchanged.
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::{RankContext, RankedUser, User};

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Inserts a new user and returns the stored row with its assigned id.
    async fn insert_user(&self, username: &str, score: i64, image_url: &str) -> Result<User>;

    /// Updates a user's score; returns the number of rows affected (0 when
    /// the id does not exist).
    async fn update_score(&self, id: i64, score: i64) -> Result<u64>;

    /// Top `limit` users with 1-based positions in canonical order.
    async fn top_n(&self, limit: i64) -> Result<Vec<RankedUser>>;

    /// A user's position plus up to `window` true neighbors on each side,
    /// computed in one window query. `None` when the id does not exist.
    async fn rank_and_context(&self, id: i64, window: i64) -> Result<Option<RankContext>>;
}

pub struct PgLeaderboardStore {
    pool: PgPool,
}

impl PgLeaderboardStore {
    pub fn new(pool: PgPool) -> Self {
        PgLeaderboardStore { pool }
    }
}

#[async_trait]
impl LeaderboardStore for PgLeaderboardStore {
    async fn insert_user(&self, username: &str, score: i64, image_url: &str) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO leaderboard_users (username, image_url, score)
            VALUES ($1, $2, $3)
            RETURNING id, username, image_url, score, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(image_url)
        .bind(score)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn update_score(&self, id: i64, score: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE leaderboard_users
            SET score = $1, updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(score)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn top_n(&self, limit: i64) -> Result<Vec<RankedUser>> {
        let rows = sqlx::query_as::<_, RankedUser>(
            r#"
            SELECT id, username, image_url, score,
                   ROW_NUMBER() OVER (ORDER BY score DESC, id ASC) AS rank
            FROM leaderboard_users
            ORDER BY score DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn rank_and_context(&self, id: i64, window: i64) -> Result<Option<RankContext>> {
        let rows = sqlx::query_as::<_, RankedUser>(
            r#"
            WITH ranked AS (
                SELECT id, username, image_url, score,
                       ROW_NUMBER() OVER (ORDER BY score DESC, id ASC) AS rank
                FROM leaderboard_users
            ),
            target AS (
                SELECT rank FROM ranked WHERE id = $1
            )
            SELECT r.id, r.username, r.image_url, r.score, r.rank
            FROM ranked r, target t
            WHERE r.rank BETWEEN t.rank - $2 AND t.rank + $2
            ORDER BY r.rank
            "#,
        )
        .bind(id)
        .bind(window)
        .fetch_all(&self.pool)
        .await?;

        // Empty result set means the target id does not exist; the window
        // always contains the target row otherwise.
        let Some(user) = rows.iter().find(|r| r.id == id).cloned() else {
            return Ok(None);
        };

        let above = rows.iter().filter(|r| r.rank < user.rank).cloned().collect();
        let below = rows.iter().filter(|r| r.rank > user.rank).cloned().collect();

        Ok(Some(RankContext { user, above, below }))
    }
}
