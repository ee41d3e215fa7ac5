// Refund policy store
//
// Holds the single process-wide refund policy. Updates merge a partial
// patch and are validated before they are committed, so a rejected update
// leaves the stored policy exactly as it was.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::bookings::error::BookingError;
use crate::bookings::models::UpdateRefundPolicyRequest;

/// Day-threshold and percentage configuration governing refunds
///
/// Invariant: `full_refund_before_days > partial_refund_before_days >
/// no_refund_before_days >= 0`, and the percentage is strictly between
/// 0 and 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundPolicy {
    pub full_refund_before_days: u32,
    pub partial_refund_before_days: u32,
    pub no_refund_before_days: u32,
    pub partial_refund_percentage: u32,
}

impl Default for RefundPolicy {
    /// Policy seeded at process start: full refund 7+ days out, 50% refund
    /// 3-6 days out, free cancellation 1-2 days out, locked after that
    fn default() -> Self {
        Self {
            full_refund_before_days: 7,
            partial_refund_before_days: 3,
            no_refund_before_days: 1,
            partial_refund_percentage: 50,
        }
    }
}

impl RefundPolicy {
    /// Check the ordering and percentage invariants
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.full_refund_before_days <= self.partial_refund_before_days {
            return Err(BookingError::InvalidPolicy(
                "full_refund_before_days must be greater than partial_refund_before_days"
                    .to_string(),
            ));
        }
        if self.partial_refund_before_days <= self.no_refund_before_days {
            return Err(BookingError::InvalidPolicy(
                "partial_refund_before_days must be greater than no_refund_before_days"
                    .to_string(),
            ));
        }
        if self.partial_refund_percentage == 0 || self.partial_refund_percentage >= 100 {
            return Err(BookingError::InvalidPolicy(
                "partial_refund_percentage must be between 1 and 99".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge a partial update into a copy of this policy
    fn merged(&self, patch: &UpdateRefundPolicyRequest) -> Self {
        Self {
            full_refund_before_days: patch
                .full_refund_before_days
                .unwrap_or(self.full_refund_before_days),
            partial_refund_before_days: patch
                .partial_refund_before_days
                .unwrap_or(self.partial_refund_before_days),
            no_refund_before_days: patch
                .no_refund_before_days
                .unwrap_or(self.no_refund_before_days),
            partial_refund_percentage: patch
                .partial_refund_percentage
                .unwrap_or(self.partial_refund_percentage),
        }
    }
}

/// In-memory singleton store for the active refund policy
#[derive(Clone)]
pub struct RefundPolicyStore {
    policy: Arc<RwLock<RefundPolicy>>,
}

impl RefundPolicyStore {
    /// Create a store seeded with the default policy
    pub fn new() -> Self {
        Self {
            policy: Arc::new(RwLock::new(RefundPolicy::default())),
        }
    }

    /// Create a store holding a specific policy
    pub fn with_policy(policy: RefundPolicy) -> Self {
        Self {
            policy: Arc::new(RwLock::new(policy)),
        }
    }

    /// Current policy
    pub async fn get(&self) -> RefundPolicy {
        self.policy.read().await.clone()
    }

    /// Merge the patch into the current policy and commit if the result is
    /// valid
    ///
    /// The write lock is held across merge, validation, and commit, so
    /// concurrent updates cannot interleave fields from two patches.
    pub async fn update(
        &self,
        patch: UpdateRefundPolicyRequest,
    ) -> Result<RefundPolicy, BookingError> {
        let mut current = self.policy.write().await;
        let candidate = current.merged(&patch);
        candidate.validate()?;
        *current = candidate.clone();
        tracing::info!(
            "Refund policy updated: full={} partial={} none={} percentage={}",
            candidate.full_refund_before_days,
            candidate.partial_refund_before_days,
            candidate.no_refund_before_days,
            candidate.partial_refund_percentage
        );
        Ok(candidate)
    }
}

impl Default for RefundPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Any committed policy satisfies the ordering invariant, and rejected
    /// updates never change the stored policy
    #[test]
    fn prop_store_only_holds_valid_policies() {
        proptest!(|(
            full in prop::option::of(0u32..30),
            partial in prop::option::of(0u32..30),
            none in prop::option::of(0u32..30),
            percentage in prop::option::of(0u32..150),
        )| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let store = RefundPolicyStore::new();
                let before = store.get().await;
                let patch = UpdateRefundPolicyRequest {
                    full_refund_before_days: full,
                    partial_refund_before_days: partial,
                    no_refund_before_days: none,
                    partial_refund_percentage: percentage,
                };

                match store.update(patch).await {
                    Ok(committed) => {
                        assert!(committed.validate().is_ok());
                        assert_eq!(store.get().await, committed);
                    }
                    Err(_) => {
                        assert_eq!(store.get().await, before);
                    }
                }
            });
        });
    }
}
