pub mod profile;

pub use profile::{BloodGroup, Gender, ProfileError, ProfileInput, UserProfile};
