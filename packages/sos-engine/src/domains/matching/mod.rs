pub mod actions;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use actions::select_candidates;
pub use models::{BloodRequest, Candidate, LocalityMatch, SosRequest, Urgency};
pub use utils::{FanOutPolicy, RankingWeights};
