pub mod leaderboard;
pub mod resync;

pub use leaderboard::LeaderboardService;
