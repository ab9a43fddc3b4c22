// Pure matching rules (no I/O)

pub mod compatibility;
pub mod eligibility;
pub mod fan_out;
pub mod ranking;

pub use compatibility::{can_serve, can_serve_labels, donor_types_for, recipients_of};
pub use eligibility::{days_since_eligible, is_eligible, ELIGIBILITY_WINDOW_DAYS};
pub use fan_out::FanOutPolicy;
pub use ranking::{rank, RankingWeights};
