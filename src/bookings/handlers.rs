// HTTP handlers for booking endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AdminUser;
use crate::bookings::{
    Booking, BookingError, CancelBookingRequest, ChangeStatusRequest, CreateBookingRequest,
    ProcessRefundRequest, RefundEligibilityResponse, TokenAccessResponse, UpdateBookingRequest,
    UpdateRefundPolicyRequest,
};
use crate::bookings::policy_store::RefundPolicy;

// ===== Admin endpoints =====

/// Handler for POST /api/bookings
/// Creates a new booking (admin only)
pub async fn create_booking_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let booking = state.booking_service.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET /api/bookings
/// Lists all bookings (admin only)
pub async fn list_bookings_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
) -> Json<Vec<Booking>> {
    Json(state.booking_service.get_all().await)
}

/// Handler for GET /api/bookings/{id}
pub async fn get_booking_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.booking_service.get_by_id(id).await?;
    Ok(Json(booking))
}

/// Handler for PUT /api/bookings/{id}
pub async fn update_booking_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.booking_service.update_booking(id, request).await?;
    Ok(Json(booking))
}

/// Handler for DELETE /api/bookings/{id}
pub async fn delete_booking_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BookingError> {
    state.booking_service.delete_booking(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for PATCH /api/bookings/{id}/status
/// Unguarded status override (admin only)
pub async fn change_status_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state
        .booking_service
        .change_status(id, request.status)
        .await?;
    Ok(Json(booking))
}

/// Handler for POST /api/bookings/{id}/cancel
pub async fn cancel_booking_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<Booking>, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let booking = state.booking_service.cancel_booking(id, request).await?;
    Ok(Json(booking))
}

/// Handler for POST /api/bookings/{id}/refund
pub async fn process_refund_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ProcessRefundRequest>,
) -> Result<Json<Booking>, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let booking = state.booking_service.process_refund(id, request).await?;
    Ok(Json(booking))
}

/// Handler for GET /api/bookings/{id}/refund-eligibility
pub async fn refund_eligibility_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RefundEligibilityResponse>, BookingError> {
    let eligibility = state.booking_service.refund_eligibility(id).await?;
    Ok(Json(eligibility.into()))
}

/// Handler for GET /api/refund-policy
pub async fn get_refund_policy_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
) -> Json<RefundPolicy> {
    Json(state.booking_service.get_refund_policy().await)
}

/// Handler for PUT /api/refund-policy
/// Applies a partial policy update; invalid results are rejected whole
pub async fn update_refund_policy_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Json(request): Json<UpdateRefundPolicyRequest>,
) -> Result<Json<RefundPolicy>, BookingError> {
    let policy = state.booking_service.update_refund_policy(request).await?;
    Ok(Json(policy))
}

// ===== Token-based public endpoints =====

/// Handler for POST /api/public/bookings
/// Public booking creation; the response carries the access token
pub async fn public_create_booking_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let booking = state.booking_service.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET /api/public/bookings/{token}
pub async fn get_booking_by_token_handler(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
) -> Json<TokenAccessResponse> {
    Json(state.booking_service.get_by_token(&token).await)
}

/// Handler for PUT /api/public/bookings/{token}
pub async fn update_booking_by_token_handler(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
    Json(request): Json<UpdateBookingRequest>,
) -> Json<TokenAccessResponse> {
    Json(state.booking_service.update_by_token(&token, request).await)
}

/// Handler for POST /api/public/bookings/{token}/cancel
pub async fn cancel_booking_by_token_handler(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<TokenAccessResponse>, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    Ok(Json(state.booking_service.cancel_by_token(&token, request).await))
}

/// Handler for POST /api/public/bookings/{token}/refund
pub async fn process_refund_by_token_handler(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
    Json(request): Json<ProcessRefundRequest>,
) -> Result<Json<TokenAccessResponse>, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    Ok(Json(
        state
            .booking_service
            .process_refund_by_token(&token, request)
            .await,
    ))
}

/// Handler for GET /api/public/bookings/{token}/refund-eligibility
///
/// An unresolvable token yields 404 here; unlike the mutating token paths
/// there is no booking payload to fall back to.
pub async fn refund_eligibility_by_token_handler(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
) -> Result<Json<RefundEligibilityResponse>, BookingError> {
    let eligibility = state
        .booking_service
        .refund_eligibility_by_token(&token)
        .await
        .ok_or(BookingError::NotFound)?;
    Ok(Json(eligibility.into()))
}
