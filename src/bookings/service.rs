use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::bookings::access_token::mint_unique_token;
use crate::bookings::error::BookingError;
use crate::bookings::lifecycle::{LifecycleEngine, RefundEligibility};
use crate::bookings::models::{
    Booking, BookingStatus, CancelBookingRequest, CreateBookingRequest, Currency, Payment,
    PaymentMethod, PaymentStatus, ProcessRefundRequest, TokenAccessResponse,
    UpdateBookingRequest, UpdateRefundPolicyRequest,
};
use crate::bookings::policy_store::{RefundPolicy, RefundPolicyStore};
use crate::bookings::repository::BookingsRepository;
use crate::catalog::PackagesRepository;

/// Display-only conversion rate, 1 LKR = 0.00333 USD. The LKR price is the
/// source of truth.
fn lkr_to_usd(amount_lkr: Decimal) -> Decimal {
    (amount_lkr * Decimal::new(333, 5))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Service for booking business logic
///
/// Admin operations surface typed errors; the token-based public operations
/// collapse every failure into a `TokenAccessResponse` so an anonymous
/// caller cannot tell resolution failure from business-rule rejection.
#[derive(Clone)]
pub struct BookingService {
    bookings_repo: BookingsRepository,
    packages_repo: PackagesRepository,
    policy_store: RefundPolicyStore,
}

impl BookingService {
    /// Create a new BookingService
    pub fn new(
        bookings_repo: BookingsRepository,
        packages_repo: PackagesRepository,
        policy_store: RefundPolicyStore,
    ) -> Self {
        Self {
            bookings_repo,
            packages_repo,
            policy_store,
        }
    }

    // ===== Admin operations =====

    /// Create a new booking
    ///
    /// # Validation
    /// - The referenced package must exist; its price drives the total
    /// - Total price is package price x guest count, with a display-only
    ///   USD conversion
    /// - A unique access token is minted for link-based access
    /// - The booking starts as pending with a single pending payment for
    ///   the full amount
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        let package = self
            .packages_repo
            .find_by_id(request.package_id)
            .await
            .ok_or(BookingError::PackageNotFound(request.package_id))?;

        let total_price_lkr = package.price_lkr * Decimal::from(request.guest_count);
        let access_token = mint_unique_token(&self.bookings_repo).await?;
        let now = Utc::now();

        let booking = Booking {
            id: Uuid::new_v4(),
            access_token,
            journey_id: request.journey_id,
            package_id: request.package_id,
            booking_date: now.date_naive(),
            journey_date: request.journey_date,
            status: BookingStatus::Pending,
            guest_count: request.guest_count,
            total_price_lkr,
            total_price_usd: lkr_to_usd(total_price_lkr),
            special_requests: request.special_requests,
            payments: vec![Payment {
                id: Uuid::new_v4(),
                amount: total_price_lkr,
                currency: Currency::Lkr,
                method: PaymentMethod::Card,
                status: PaymentStatus::Pending,
                transaction_id: None,
                timestamp: now,
            }],
            refunded_amount: None,
            refund_date: None,
            refund_reason: None,
            contact_info: request.contact_info.into(),
        };

        let created = self.bookings_repo.insert(booking).await?;
        tracing::info!("Created booking {} for package {}", created.id, package.id);
        Ok(created)
    }

    /// All bookings in insertion order
    pub async fn get_all(&self) -> Vec<Booking> {
        self.bookings_repo.list_all().await
    }

    /// Get a booking by id
    pub async fn get_by_id(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.bookings_repo
            .find_by_id(id)
            .await
            .ok_or(BookingError::NotFound)
    }

    /// Update a booking
    ///
    /// Journey date and guest count are frozen once the booking leaves the
    /// pending/confirmed states; contact info and special requests stay
    /// mutable.
    pub async fn update_booking(
        &self,
        id: Uuid,
        patch: UpdateBookingRequest,
    ) -> Result<Booking, BookingError> {
        self.bookings_repo
            .modify(id, |booking| Self::apply_update(booking, patch))
            .await
    }

    /// Unguarded admin status override
    ///
    /// Any status may be forced onto any booking. This is a deliberate
    /// escape hatch for admin correction, not part of the guarded state
    /// machine; in normal operation it only moves pending -> confirmed and
    /// confirmed -> completed.
    pub async fn change_status(
        &self,
        id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let updated = self
            .bookings_repo
            .modify(id, |booking| {
                let mut rewritten = booking.clone();
                rewritten.status = new_status;
                Ok(rewritten)
            })
            .await?;
        tracing::info!("Booking {} status overridden to {}", id, new_status);
        Ok(updated)
    }

    /// Cancel a booking (guarded transition)
    ///
    /// Legal only from pending or confirmed. Cancellation records the
    /// reason but never touches payments or refund amounts; refunds are a
    /// separate operation.
    pub async fn cancel_booking(
        &self,
        id: Uuid,
        request: CancelBookingRequest,
    ) -> Result<Booking, BookingError> {
        let cancelled = self
            .bookings_repo
            .modify(id, |booking| {
                LifecycleEngine::check_cancellable(booking)?;
                Ok(LifecycleEngine::apply_cancellation(
                    booking.clone(),
                    request.reason,
                ))
            })
            .await?;
        tracing::info!("Booking {} cancelled", id);
        Ok(cancelled)
    }

    /// Process a refund (guarded transition)
    ///
    /// With an explicit `full_refund` override the eligibility evaluation
    /// is skipped and that refund type is forced; otherwise the active
    /// policy decides. The status, refund fields, and every payment's
    /// status are committed as one store write.
    pub async fn process_refund(
        &self,
        id: Uuid,
        request: ProcessRefundRequest,
    ) -> Result<Booking, BookingError> {
        let policy = self.policy_store.get().await;
        let now = Utc::now();

        let refunded = self
            .bookings_repo
            .modify(id, |booking| {
                let amount = Self::resolve_refund_amount(booking, &policy, &request, now)?;
                Ok(LifecycleEngine::apply_refund(
                    booking.clone(),
                    amount,
                    request.reason,
                    now.date_naive(),
                ))
            })
            .await?;
        tracing::info!(
            "Booking {} refunded: {} LKR",
            id,
            refunded.refunded_amount.unwrap_or_default()
        );
        Ok(refunded)
    }

    /// Evaluate refund eligibility without mutating anything
    pub async fn refund_eligibility(&self, id: Uuid) -> Result<RefundEligibility, BookingError> {
        let booking = self.get_by_id(id).await?;
        let policy = self.policy_store.get().await;
        Ok(LifecycleEngine::evaluate_refund_eligibility(
            &booking,
            &policy,
            Utc::now(),
        ))
    }

    /// Permanently delete a booking
    pub async fn delete_booking(&self, id: Uuid) -> Result<(), BookingError> {
        self.bookings_repo.remove(id).await?;
        tracing::info!("Booking {} deleted", id);
        Ok(())
    }

    /// Current refund policy
    pub async fn get_refund_policy(&self) -> RefundPolicy {
        self.policy_store.get().await
    }

    /// Update the refund policy (validated before commit)
    pub async fn update_refund_policy(
        &self,
        patch: UpdateRefundPolicyRequest,
    ) -> Result<RefundPolicy, BookingError> {
        self.policy_store.update(patch).await
    }

    // ===== Token-based public operations =====

    /// Resolve an access token to its booking
    pub async fn get_by_token(&self, token: &str) -> TokenAccessResponse {
        match self.bookings_repo.find_by_token(token).await {
            Some(booking) => TokenAccessResponse::valid(booking),
            None => TokenAccessResponse::invalid(),
        }
    }

    /// Update a booking through its access token
    ///
    /// Guard violations return the booking unchanged as a valid response;
    /// only an unresolvable token yields `is_valid: false`.
    pub async fn update_by_token(
        &self,
        token: &str,
        patch: UpdateBookingRequest,
    ) -> TokenAccessResponse {
        let result = self
            .bookings_repo
            .modify_by_token(token, |booking| Self::apply_update(booking, patch))
            .await;
        self.collapse_token_result(token, result).await
    }

    /// Cancel a booking through its access token
    pub async fn cancel_by_token(
        &self,
        token: &str,
        request: CancelBookingRequest,
    ) -> TokenAccessResponse {
        let result = self
            .bookings_repo
            .modify_by_token(token, |booking| {
                LifecycleEngine::check_cancellable(booking)?;
                Ok(LifecycleEngine::apply_cancellation(
                    booking.clone(),
                    request.reason,
                ))
            })
            .await;
        self.collapse_token_result(token, result).await
    }

    /// Process a refund through its access token
    pub async fn process_refund_by_token(
        &self,
        token: &str,
        request: ProcessRefundRequest,
    ) -> TokenAccessResponse {
        let policy = self.policy_store.get().await;
        let now = Utc::now();

        let result = self
            .bookings_repo
            .modify_by_token(token, |booking| {
                let amount = Self::resolve_refund_amount(booking, &policy, &request, now)?;
                Ok(LifecycleEngine::apply_refund(
                    booking.clone(),
                    amount,
                    request.reason,
                    now.date_naive(),
                ))
            })
            .await;
        self.collapse_token_result(token, result).await
    }

    /// Evaluate refund eligibility through an access token
    pub async fn refund_eligibility_by_token(
        &self,
        token: &str,
    ) -> Option<RefundEligibility> {
        let booking = self.bookings_repo.find_by_token(token).await?;
        let policy = self.policy_store.get().await;
        Some(LifecycleEngine::evaluate_refund_eligibility(
            &booking,
            &policy,
            Utc::now(),
        ))
    }

    // ===== Helpers =====

    /// Shared update closure for admin and token paths
    fn apply_update(
        booking: &Booking,
        patch: UpdateBookingRequest,
    ) -> Result<Booking, BookingError> {
        if patch.touches_guarded_fields() && !LifecycleEngine::can_cancel(booking.status) {
            return Err(BookingError::IllegalTransition(format!(
                "Cannot reschedule a booking with status: {}",
                booking.status
            )));
        }
        let mut rewritten = booking.clone();
        patch.merge_into(&mut rewritten);
        Ok(rewritten)
    }

    /// Resolve the refund amount from the override or the policy evaluation
    fn resolve_refund_amount(
        booking: &Booking,
        policy: &RefundPolicy,
        request: &ProcessRefundRequest,
        now: chrono::DateTime<Utc>,
    ) -> Result<Decimal, BookingError> {
        match request.full_refund {
            Some(true) => Ok(booking.total_price_lkr),
            Some(false) => Ok(LifecycleEngine::partial_refund_amount(
                booking.total_price_lkr,
                policy.partial_refund_percentage,
            )),
            None => match LifecycleEngine::evaluate_refund_eligibility(booking, policy, now) {
                RefundEligibility::Eligible { amount, .. } => Ok(amount),
                RefundEligibility::NotEligible { .. } => Err(BookingError::RefundNotEligible(
                    "Booking is not eligible for refund under the current refund policy"
                        .to_string(),
                )),
            },
        }
    }

    /// Collapse a token-path mutation result into the uniform public shape
    ///
    /// Business-rule rejections return the current booking unchanged as a
    /// valid response; only resolution failure reports an invalid token.
    async fn collapse_token_result(
        &self,
        token: &str,
        result: Result<Booking, BookingError>,
    ) -> TokenAccessResponse {
        match result {
            Ok(booking) => TokenAccessResponse::valid(booking),
            Err(BookingError::NotFound) => TokenAccessResponse::invalid(),
            Err(_) => match self.bookings_repo.find_by_token(token).await {
                Some(booking) => TokenAccessResponse::valid(booking),
                None => TokenAccessResponse::invalid(),
            },
        }
    }
}
