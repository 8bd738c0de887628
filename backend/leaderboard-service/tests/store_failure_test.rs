/// Store failure injection: a persistence error must surface unchanged and
/// must never leave a cache mutation behind, because the cache is only
/// updated after a confirmed store commit.
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::*;

use leaderboard_service::db::LeaderboardStore;
use leaderboard_service::error::{AppError, Result};
use leaderboard_service::models::{CreateUserRequest, RankContext, RankedUser, User};
use leaderboard_service::services::LeaderboardService;

mock! {
    pub Store {}

    #[async_trait]
    impl LeaderboardStore for Store {
        async fn insert_user(&self, username: &str, score: i64, image_url: &str) -> Result<User>;
        async fn update_score(&self, id: i64, score: i64) -> Result<u64>;
        async fn top_n(&self, limit: i64) -> Result<Vec<RankedUser>>;
        async fn rank_and_context(&self, id: i64, window: i64) -> Result<Option<RankContext>>;
    }
}

fn db_error() -> AppError {
    AppError::Database(sqlx::Error::PoolClosed)
}

#[tokio::test]
async fn failed_insert_leaves_cache_empty() {
    let mut store = MockStore::new();
    store
        .expect_insert_user()
        .times(1)
        .returning(|_, _, _| Err(db_error()));

    let svc = LeaderboardService::new(Arc::new(store), 10);
    let request = CreateUserRequest {
        username: "alice".to_string(),
        score: 10,
        image_url: String::new(),
    };

    assert!(matches!(
        svc.create_user(&request).await,
        Err(AppError::Database(_))
    ));
    assert_eq!(svc.cached_entries(), 0);
}

#[tokio::test]
async fn failed_update_leaves_cache_untouched() {
    let mut store = MockStore::new();
    store
        .expect_update_score()
        .with(eq(7), eq(99))
        .times(1)
        .returning(|_, _| Err(db_error()));

    let svc = LeaderboardService::new(Arc::new(store), 10);
    assert!(matches!(
        svc.update_score(7, 99).await,
        Err(AppError::Database(_))
    ));
    assert_eq!(svc.cached_entries(), 0);
}

#[tokio::test]
async fn failed_resync_reports_error() {
    let mut store = MockStore::new();
    store
        .expect_top_n()
        .times(1)
        .returning(|_| Err(db_error()));

    let svc = LeaderboardService::new(Arc::new(store), 10);
    assert!(matches!(svc.resync().await, Err(AppError::Database(_))));
}

#[tokio::test]
async fn cache_miss_fallback_propagates_store_error() {
    let mut store = MockStore::new();
    store
        .expect_rank_and_context()
        .with(eq(3), eq(5))
        .times(1)
        .returning(|_, _| Err(db_error()));

    let svc = LeaderboardService::new(Arc::new(store), 10);
    assert!(matches!(
        svc.rank_and_context(3).await,
        Err(AppError::Database(_))
    ));
}
