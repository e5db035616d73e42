//! Dual-tier throttle controller

use super::quota::QuotaReport;
use super::store::ThrottleStore;
use crate::config::ThrottleConfig;
use crate::error::Result;
use crate::types::{ApiFamily, JsonValue, ThrottleTier};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Freshness window of a written flag
pub const FLAG_TTL: Duration = Duration::from_secs(60);

/// Flags written by one update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThrottleFlags {
    /// Normal callers should delay
    pub normal: bool,
    /// Priority callers should delay
    pub priority: bool,
}

impl ThrottleFlags {
    /// Flag for one tier
    pub fn for_tier(&self, tier: ThrottleTier) -> bool {
        match tier {
            ThrottleTier::Normal => self.normal,
            ThrottleTier::Priority => self.priority,
        }
    }
}

/// Couples request pacing to server-reported quota usage
#[derive(Debug, Clone)]
pub struct ThrottleController {
    tenant: String,
    config: ThrottleConfig,
    store: Arc<dyn ThrottleStore>,
}

impl ThrottleController {
    /// Create a controller for one tenant
    pub fn new(
        tenant: impl Into<String>,
        config: ThrottleConfig,
        store: Arc<dyn ThrottleStore>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            config,
            store,
        }
    }

    /// Throttle settings in use
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Store key of the flag for a family and tier
    pub fn flag_key(&self, family: ApiFamily, tier: ThrottleTier) -> String {
        match tier {
            ThrottleTier::Normal => format!("{}:{}:should_delay", self.tenant, family),
            ThrottleTier::Priority => {
                format!("{}:{}:should_delay:priority", self.tenant, family)
            }
        }
    }

    /// Whether a tier should delay at the given availability.
    ///
    /// `threshold` is the share of the quota (percent) that may be consumed
    /// before the tier starts delaying.
    pub fn should_delay(percent_available: f64, threshold: f64) -> bool {
        100.0 - percent_available > threshold
    }

    /// Compute both tier flags for a quota report
    pub fn flags_for(&self, quota: &QuotaReport) -> ThrottleFlags {
        let percent = quota.percent_available();
        ThrottleFlags {
            normal: Self::should_delay(percent, self.config.normal_threshold),
            priority: Self::should_delay(percent, self.config.priority_threshold),
        }
    }

    /// Persist both tier flags from the quota reported by a response.
    ///
    /// Without a report nothing is written and `None` is returned.
    pub async fn update(
        &self,
        family: ApiFamily,
        quota: Option<QuotaReport>,
    ) -> Result<Option<ThrottleFlags>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let Some(quota) = quota else {
            return Ok(None);
        };

        let flags = self.flags_for(&quota);
        for tier in [ThrottleTier::Normal, ThrottleTier::Priority] {
            self.store
                .put(
                    &self.flag_key(family, tier),
                    JsonValue::Bool(flags.for_tier(tier)),
                    FLAG_TTL,
                )
                .await?;
        }

        debug!(
            tenant = %self.tenant,
            family = %family,
            available = quota.available,
            maximum = quota.maximum,
            normal = flags.normal,
            priority = flags.priority,
            "Updated throttle flags"
        );
        Ok(Some(flags))
    }

    /// Whether the flag of a tier is currently set
    pub async fn is_delayed(&self, family: ApiFamily, tier: ThrottleTier) -> Result<bool> {
        let value = self.store.get(&self.flag_key(family, tier)).await?;
        Ok(value.as_ref().is_some_and(is_truthy))
    }

    /// Sleep before a call if the caller's tier is flagged.
    ///
    /// Returns the time slept. The sleep cannot be cancelled by the core.
    pub async fn gate(&self, family: ApiFamily, tier: ThrottleTier) -> Result<Duration> {
        if !self.config.enabled || !self.is_delayed(family, tier).await? {
            return Ok(Duration::ZERO);
        }

        let delay = self.config.delay(tier);
        warn!(
            tenant = %self.tenant,
            family = %family,
            tier = %tier,
            delay_ms = delay.as_millis() as u64,
            "Quota usage high, delaying call"
        );
        tokio::time::sleep(delay).await;
        Ok(delay)
    }
}

/// Stores shared with other runtimes may hold flags as numbers or strings
fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}
