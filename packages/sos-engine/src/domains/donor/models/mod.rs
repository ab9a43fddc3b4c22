pub mod blood_type;
pub mod donor;

pub use blood_type::{BloodType, UnknownBloodType};
pub use donor::{Contact, Donor, DonorValidationError, ResponseHistory};
