/// HTTP adaptation of the four leaderboard operations plus the admin resync.
/// Serialization is a boundary concern only; the coordinator owns all
/// semantics.
use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{CreateUserRequest, TopQuery, UpdateScoreRequest};
use crate::services::LeaderboardService;

const DEFAULT_TOP_LIMIT: i64 = 10;

/// POST /api/v1/leaderboard/users
pub async fn create_user(
    service: web::Data<Arc<LeaderboardService>>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let user = service.create_user(&body).await?;
    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/v1/leaderboard/users/{id}/score
pub async fn update_score(
    service: web::Data<Arc<LeaderboardService>>,
    path: web::Path<i64>,
    body: web::Json<UpdateScoreRequest>,
) -> Result<HttpResponse> {
    service.update_score(path.into_inner(), body.score).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/leaderboard/top?limit=N
pub async fn get_top(
    service: web::Data<Arc<LeaderboardService>>,
    query: web::Query<TopQuery>,
) -> Result<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    let entries = service.top_n(limit).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// GET /api/v1/leaderboard/users/{id}/rank
pub async fn get_rank(
    service: web::Data<Arc<LeaderboardService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let context = service.rank_and_context(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(context))
}

/// POST /api/v1/admin/resync
pub async fn resync(service: web::Data<Arc<LeaderboardService>>) -> Result<HttpResponse> {
    let entries = service.resync().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "reloaded": entries })))
}
