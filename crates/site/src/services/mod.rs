//! Outbound services for the site.
//!
//! # Services
//!
//! - `email` - Transactional email transport (Resend API, log-only fallback)
//! - `notify` - Owner notification and auto-reply for accepted submissions

pub mod email;
pub mod notify;

pub use email::{
    EmailError, EmailMessage, EmailSender, LogEmailSender, ResendEmailSender, sender_from_config,
};
pub use notify::{Notifier, NotifyError, RequestMeta};
