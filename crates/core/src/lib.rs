//! BlackLake Core - Contact intake types and rules.
//!
//! This crate provides the pieces of the contact pipeline that need no I/O:
//! - `site` - the HTTP service that screens submissions and sends email
//! - `cli` - a terminal client that drives the contact form
//!
//! # Modules
//!
//! - [`types`] - `Email`, form fields, wire request/response, submission status
//! - [`intake`] - anti-spam gate, validator/sanitizer, and the tagged intake outcome
//! - [`form`] - client-side form controller and `mailto:` fallback

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod form;
pub mod intake;
pub mod types;

pub use form::{ContactForm, FormError, SubmitResult};
pub use intake::{IntakeOutcome, Rejection, SpamPolicy, SpamVerdict, screen};
pub use types::*;
