use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A scored user as stored in Postgres. The durable row is the single source
/// of truth; everything the cache holds is a disposable copy of this.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub image_url: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One leaderboard row as returned to callers: 1-based position under the
/// canonical `(score DESC, id ASC)` order. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RankedUser {
    pub rank: i64,
    pub id: i64,
    pub username: String,
    pub image_url: String,
    pub score: i64,
}

/// A user's position plus up to 5 neighbors immediately above and below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankContext {
    pub user: RankedUser,
    pub above: Vec<RankedUser>,
    pub below: Vec<RankedUser>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    pub score: i64,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateScoreRequest {
    pub score: i64,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<i64>,
}
