//! Core types for the BlackLake contact intake.
//!
//! This module provides type-safe wrappers for the contact form domain.

pub mod email;
pub mod field;
pub mod status;
pub mod submission;

pub use email::{Email, EmailError};
pub use field::{Field, clamp};
pub use status::SubmissionStatus;
pub use submission::{ContactRequest, ContactResponse, ContactSubmission};
