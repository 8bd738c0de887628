pub mod health;
pub mod leaderboard;

pub use health::{health_check, liveness_check};
pub use leaderboard::{create_user, get_rank, get_top, resync, update_score};
