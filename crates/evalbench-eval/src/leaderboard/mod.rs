//! Leaderboard aggregation
//!
//! Folds every recorded run under a runs directory into per-(model, suite)
//! statistics and renders them as CSV and Markdown.

mod aggregator;
mod report;

pub use aggregator::{Leaderboard, LeaderboardEntry, row_score};
