/// A single applicant's form data after validation.
///
/// Only ever built by `validation::validate_application`, so every value
/// satisfies the field rules. Lives for one submission round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub full_name: String,
    pub phone: String,
    pub age: u8,
    pub experience_years: u8,
    pub address: String,
    /// Empty when the applicant did not mention a camera.
    pub camera: String,
    /// Empty when the applicant did not mention a laptop.
    pub laptop: String,
    pub skills: String,
    pub advantages: String,
}

// JSON keys of the inbound body, also used as keys of the error map.
pub const FULL_NAME: &str = "fullName";
pub const PHONE: &str = "phone";
pub const AGE: &str = "age";
pub const EXPERIENCE_YEARS: &str = "experienceYears";
pub const ADDRESS: &str = "address";
pub const CAMERA: &str = "camera";
pub const LAPTOP: &str = "laptop";
pub const SKILLS: &str = "skills";
pub const ADVANTAGES: &str = "advantages";
