pub mod select_candidates;

pub use select_candidates::select_candidates;
