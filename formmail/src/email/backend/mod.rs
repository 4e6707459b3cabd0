//! Email backend implementations
//!
//! - **SMTP**: authenticated submission to an SMTP server (production)
//! - **Console**: log messages instead of sending them (development)

pub mod console;
pub mod smtp;
