//! Application state shared across handlers.

use std::sync::Arc;

use blacklake_core::SpamPolicy;

use crate::config::SiteConfig;
use crate::services::{EmailError, EmailSender, Notifier, sender_from_config};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything inside is
/// read-only after startup; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    spam_policy: SpamPolicy,
    notifier: Notifier,
}

impl AppState {
    /// Create application state with an explicit email transport.
    #[must_use]
    pub fn new(config: SiteConfig, sender: Arc<dyn EmailSender>) -> Self {
        Self::with_policy(config, sender, SpamPolicy::default())
    }

    /// Create application state with a custom anti-spam policy.
    #[must_use]
    pub fn with_policy(
        config: SiteConfig,
        sender: Arc<dyn EmailSender>,
        spam_policy: SpamPolicy,
    ) -> Self {
        let notifier = Notifier::from_config(&config.environment, sender);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                spam_policy,
                notifier,
            }),
        }
    }

    /// Create application state, choosing the email transport from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the email transport cannot be built.
    pub fn from_config(config: SiteConfig) -> Result<Self, EmailError> {
        let sender = sender_from_config(&config.environment)?;
        Ok(Self::new(config, sender))
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the anti-spam policy.
    #[must_use]
    pub fn spam_policy(&self) -> &SpamPolicy {
        &self.inner.spam_policy
    }

    /// Get a reference to the notification dispatcher.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}
