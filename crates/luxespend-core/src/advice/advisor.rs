//! Advice policy: when to ask, and what to show when asking goes wrong

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::AdviceConfig;
use crate::error::Error;
use crate::models::Transaction;

use super::prompt::{EMPTY_LIST_TIP, EMPTY_REPLY_TIP, FALLBACK_TIP};
use super::{AdviceBackend, AdviceClient};

/// Request advice only when the count reaches a multiple of `every`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestonePolicy {
    every: usize,
}

impl MilestonePolicy {
    /// `every` is clamped to at least 1
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }

    pub fn every(&self) -> usize {
        self.every
    }

    pub fn is_milestone(&self, count: usize) -> bool {
        count > 0 && count % self.every == 0
    }
}

impl Default for MilestonePolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Wraps an optional backend and always resolves to a tip
#[derive(Clone)]
pub struct Advisor {
    client: Option<AdviceClient>,
    timeout: Duration,
}

impl Advisor {
    pub fn new(client: Option<AdviceClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(config: &AdviceConfig) -> Self {
        Self::new(AdviceClient::from_config(config), config.timeout())
    }

    /// Advisor without a provider: every request yields the fallback tip
    pub fn offline() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    pub fn client(&self) -> Option<&AdviceClient> {
        self.client.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Tip for `transactions`; never fails
    ///
    /// - empty list: onboarding text, no request is made
    /// - provider error or timeout: `FALLBACK_TIP`
    /// - blank reply: `EMPTY_REPLY_TIP`
    pub async fn advise(&self, transactions: &[Transaction]) -> String {
        if transactions.is_empty() {
            return EMPTY_LIST_TIP.to_string();
        }

        let Some(ref client) = self.client else {
            debug!("No advice backend configured, using fallback tip");
            return FALLBACK_TIP.to_string();
        };

        debug!(
            backend = client.name(),
            model = client.model(),
            count = transactions.len(),
            "Requesting advice"
        );

        match tokio::time::timeout(self.timeout, client.request_advice(transactions)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => EMPTY_REPLY_TIP.to_string(),
            Ok(Err(e)) => {
                warn!(backend = client.name(), error = %e, "Advice request failed");
                FALLBACK_TIP.to_string()
            }
            Err(_) => {
                let e = Error::Timeout(self.timeout.as_secs());
                warn!(backend = client.name(), error = %e, "Advice request failed");
                FALLBACK_TIP.to_string()
            }
        }
    }
}
