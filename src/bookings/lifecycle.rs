use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::bookings::error::BookingError;
use crate::bookings::models::{Booking, BookingStatus, PaymentStatus};
use crate::bookings::policy_store::RefundPolicy;

/// Why a booking is not eligible for a refund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    /// Booking is not in a pending or confirmed state
    WrongStatus,
    /// Too close to the journey date for any refund, cancellation still allowed
    NoRefundWindow,
    /// Too close to the journey date to cancel at all
    CancellationLocked,
}

/// Result of evaluating a booking against the active refund policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundEligibility {
    Eligible { full_refund: bool, amount: Decimal },
    NotEligible {
        reason: IneligibilityReason,
        cancellable: bool,
    },
}

/// Wire shape of an eligibility evaluation
#[derive(Debug, Serialize)]
pub struct RefundEligibilityResponse {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_refund: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibilityReason>,
    pub cancellable: bool,
}

impl From<RefundEligibility> for RefundEligibilityResponse {
    fn from(result: RefundEligibility) -> Self {
        match result {
            RefundEligibility::Eligible { full_refund, amount } => Self {
                eligible: true,
                full_refund: Some(full_refund),
                amount: Some(amount),
                reason: None,
                cancellable: true,
            },
            RefundEligibility::NotEligible { reason, cancellable } => Self {
                eligible: false,
                full_refund: None,
                amount: None,
                reason: Some(reason),
                cancellable,
            },
        }
    }
}

impl RefundEligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, RefundEligibility::Eligible { .. })
    }

    /// Whether the booking may still be cancelled (without refund when
    /// not eligible)
    pub fn is_cancellable(&self) -> bool {
        match self {
            RefundEligibility::Eligible { .. } => true,
            RefundEligibility::NotEligible { cancellable, .. } => *cancellable,
        }
    }
}

/// Pure booking lifecycle engine
///
/// Every refund/cancellation decision in the system goes through these
/// functions; callers supply the booking, the active policy, and the clock,
/// so results are deterministic and testable.
pub struct LifecycleEngine;

impl LifecycleEngine {
    /// Whole days remaining until the journey date, measured from `now` to
    /// midnight UTC of the journey date. Fractional days truncate toward
    /// zero, so 23.9 hours counts as 0 days remaining.
    pub fn days_until_journey(journey_date: NaiveDate, now: DateTime<Utc>) -> i64 {
        let journey_start = journey_date.and_time(NaiveTime::MIN).and_utc();
        (journey_start - now).num_days()
    }

    /// Partial refund amount: total price scaled by the policy percentage
    pub fn partial_refund_amount(total_price_lkr: Decimal, percentage: u32) -> Decimal {
        total_price_lkr * Decimal::from(percentage) / Decimal::from(100)
    }

    /// Evaluate refund eligibility for a booking
    ///
    /// # Arguments
    /// * `booking` - The booking under evaluation
    /// * `policy` - The active refund policy
    /// * `now` - The evaluation instant
    ///
    /// # Returns
    /// - `Eligible { full_refund: true }` when the journey is at least
    ///   `full_refund_before_days` away
    /// - `Eligible { full_refund: false }` with the percentage-scaled amount
    ///   when at least `partial_refund_before_days` away
    /// - `NotEligible` with `cancellable: true` when at least
    ///   `no_refund_before_days` away
    /// - `NotEligible` with `cancellable: false` otherwise, or whenever the
    ///   booking is not pending/confirmed
    pub fn evaluate_refund_eligibility(
        booking: &Booking,
        policy: &RefundPolicy,
        now: DateTime<Utc>,
    ) -> RefundEligibility {
        if !Self::can_cancel(booking.status) {
            return RefundEligibility::NotEligible {
                reason: IneligibilityReason::WrongStatus,
                cancellable: false,
            };
        }

        let days_remaining = Self::days_until_journey(booking.journey_date, now);

        if days_remaining >= i64::from(policy.full_refund_before_days) {
            RefundEligibility::Eligible {
                full_refund: true,
                amount: booking.total_price_lkr,
            }
        } else if days_remaining >= i64::from(policy.partial_refund_before_days) {
            RefundEligibility::Eligible {
                full_refund: false,
                amount: Self::partial_refund_amount(
                    booking.total_price_lkr,
                    policy.partial_refund_percentage,
                ),
            }
        } else if days_remaining >= i64::from(policy.no_refund_before_days) {
            RefundEligibility::NotEligible {
                reason: IneligibilityReason::NoRefundWindow,
                cancellable: true,
            }
        } else {
            RefundEligibility::NotEligible {
                reason: IneligibilityReason::CancellationLocked,
                cancellable: false,
            }
        }
    }

    /// Whether the guarded transitions (cancel, refund) are legal from
    /// the given status
    pub fn can_cancel(status: BookingStatus) -> bool {
        matches!(status, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Rewrite a booking as refunded
    ///
    /// Sets the status, refund fields, and every payment's status in one
    /// pass; the caller commits the returned record to the store as a single
    /// write so the mutation is atomic from the outside.
    pub fn apply_refund(
        mut booking: Booking,
        amount: Decimal,
        reason: String,
        refund_date: NaiveDate,
    ) -> Booking {
        booking.status = BookingStatus::Refunded;
        booking.refunded_amount = Some(amount);
        booking.refund_date = Some(refund_date);
        booking.refund_reason = Some(reason);
        for payment in &mut booking.payments {
            payment.status = PaymentStatus::Refunded;
        }
        booking
    }

    /// Rewrite a booking as cancelled
    ///
    /// Cancellation never touches payments or computes a refund amount;
    /// refunds are a separate operation.
    pub fn apply_cancellation(mut booking: Booking, reason: String) -> Booking {
        booking.status = BookingStatus::Cancelled;
        booking.refund_reason = Some(reason);
        booking
    }

    /// Guarded cancellation check
    ///
    /// # Returns
    /// `Ok(())` when the booking may be cancelled, `Err(IllegalTransition)`
    /// otherwise
    pub fn check_cancellable(booking: &Booking) -> Result<(), BookingError> {
        if Self::can_cancel(booking.status) {
            Ok(())
        } else {
            Err(BookingError::IllegalTransition(format!(
                "Cannot cancel a booking with status: {}",
                booking.status
            )))
        }
    }
}
