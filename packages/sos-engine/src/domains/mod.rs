// Business domains
pub mod alerts;
pub mod donor;
pub mod matching;
