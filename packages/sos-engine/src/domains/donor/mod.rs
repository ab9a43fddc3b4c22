pub mod models;
pub mod registry;

pub use models::{BloodType, Contact, Donor, ResponseHistory};
pub use registry::{DonorFilter, InMemoryDonorRegistry};
