pub mod otp;
pub mod profile;

pub use otp::{NewOtpRecord, OtpPurpose};
pub use profile::Profile;
