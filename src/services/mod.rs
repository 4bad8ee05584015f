pub mod otp;
pub mod provision;
