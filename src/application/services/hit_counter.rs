//! Hit counting for successful resolutions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::repositories::{BoundedIncrement, MappingStore, StoreResult};

/// What a resolve does once a mapping has gone past its `max_hit_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HitLimitPolicy {
    /// Keep resolving and counting. The ceiling is informational only.
    #[default]
    Ignore,
    /// Answer resolves at the ceiling with `LimitReached`. Refused resolves are
    /// not counted.
    Reject,
}

impl FromStr for HitLimitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown hit limit policy '{}' (expected 'ignore' or 'reject')",
                other
            )),
        }
    }
}

impl fmt::Display for HitLimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("ignore"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Counter values after a hit was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub hit_count: i64,
    pub max_hit_count: i64,
    /// False when the hit was refused at the ceiling and nothing was written.
    pub counted: bool,
}

impl HitOutcome {
    /// True on the hit that lands exactly on the ceiling.
    pub fn boundary_reached(&self) -> bool {
        self.counted && self.max_hit_count > 0 && self.hit_count == self.max_hit_count
    }

    /// True when the resolve must be refused.
    pub fn refused(&self) -> bool {
        !self.counted
    }
}

/// Records successful resolutions against the store.
///
/// The increment is a single atomic store operation; the counter itself keeps
/// no state. Under [`HitLimitPolicy::Reject`] the ceiling check is part of that
/// same operation.
pub struct HitCounter {
    store: Arc<dyn MappingStore>,
    policy: HitLimitPolicy,
}

impl HitCounter {
    pub fn new(store: Arc<dyn MappingStore>, policy: HitLimitPolicy) -> Self {
        Self { store, policy }
    }

    /// Adds one hit to `token`, unless the policy refuses it at the ceiling.
    ///
    /// Returns `Ok(None)` if the record no longer exists.
    pub async fn record_hit(&self, token: &str) -> StoreResult<Option<HitOutcome>> {
        let (record, counted) = match self.policy {
            HitLimitPolicy::Ignore => match self.store.increment_hit_count(token).await? {
                Some(record) => (record, true),
                None => return Ok(None),
            },
            HitLimitPolicy::Reject => {
                match self.store.increment_hit_count_within_limit(token).await? {
                    Some(BoundedIncrement::Counted(record)) => (record, true),
                    Some(BoundedIncrement::AtLimit(record)) => (record, false),
                    None => return Ok(None),
                }
            }
        };

        let outcome = HitOutcome {
            hit_count: record.hit_count,
            max_hit_count: record.max_hit_count,
            counted,
        };

        if !counted {
            debug!(token, hit_count = outcome.hit_count, "Hit refused at limit");
            return Ok(Some(outcome));
        }

        metrics::counter!("mapping_hits_total").increment(1);

        if outcome.boundary_reached() {
            info!(
                token,
                hit_count = outcome.hit_count,
                "Mapping reached its hit limit"
            );
        }

        Ok(Some(outcome))
    }
}
