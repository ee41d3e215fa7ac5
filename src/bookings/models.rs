use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_phone;

/// Booking status enum representing the lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Refunded,
}

impl BookingStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Refunded => "refunded",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "refunded" => Ok(BookingStatus::Refunded),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status enum for individual payment records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
    Failed,
}

impl PaymentStatus {
    /// Convert payment status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Cash,
    Other,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Card
    }
}

/// Currency of a payment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Lkr,
    Usd,
}

/// A payment record owned by exactly one booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub amount: Decimal,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Contact details for the booking holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Domain model for a booking
///
/// `id` and `access_token` are assigned at creation and never change.
/// `total_price_usd` is a display-only conversion of the LKR price,
/// not a source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub access_token: String,
    pub journey_id: i32,
    pub package_id: i32,
    pub booking_date: NaiveDate,
    pub journey_date: NaiveDate,
    pub status: BookingStatus,
    pub guest_count: u32,
    pub total_price_lkr: Decimal,
    pub total_price_usd: Decimal,
    pub special_requests: Option<String>,
    pub payments: Vec<Payment>,
    pub refunded_amount: Option<Decimal>,
    pub refund_date: Option<NaiveDate>,
    pub refund_reason: Option<String>,
    pub contact_info: ContactInfo,
}

/// Request DTO for contact info on booking creation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactInfoRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
}

impl From<ContactInfoRequest> for ContactInfo {
    fn from(req: ContactInfoRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
        }
    }
}

/// Request DTO for creating a new booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub journey_id: i32,
    pub package_id: i32,
    pub journey_date: NaiveDate,
    #[validate(range(min = 1, message = "Guest count must be at least 1"))]
    pub guest_count: u32,
    pub special_requests: Option<String>,
    #[validate]
    pub contact_info: ContactInfoRequest,
}

/// Partial contact info for booking updates; fields left out stay unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInfoPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Request DTO for updating a booking
///
/// Fields left out are untouched. `journey_date` and `guest_count` may only
/// change while the booking is still pending or confirmed; contact info is
/// always mutable by the token holder or an admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookingRequest {
    pub journey_date: Option<NaiveDate>,
    pub guest_count: Option<u32>,
    pub special_requests: Option<String>,
    pub contact_info: Option<ContactInfoPatch>,
}

impl UpdateBookingRequest {
    /// Whether the patch touches fields that are frozen once the booking
    /// leaves the pending/confirmed states
    pub fn touches_guarded_fields(&self) -> bool {
        self.journey_date.is_some() || self.guest_count.is_some()
    }

    /// Merge the provided fields into a booking
    ///
    /// Absent fields stay unchanged; nested contact info is merged
    /// field-by-field, never replaced wholesale.
    pub fn merge_into(self, booking: &mut Booking) {
        if let Some(journey_date) = self.journey_date {
            booking.journey_date = journey_date;
        }
        if let Some(guest_count) = self.guest_count {
            booking.guest_count = guest_count;
        }
        if let Some(special_requests) = self.special_requests {
            booking.special_requests = Some(special_requests);
        }
        if let Some(contact) = self.contact_info {
            if let Some(name) = contact.name {
                booking.contact_info.name = name;
            }
            if let Some(email) = contact.email {
                booking.contact_info.email = email;
            }
            if let Some(phone) = contact.phone {
                booking.contact_info.phone = phone;
            }
        }
    }
}

/// Request DTO for the admin status override
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: BookingStatus,
}

/// Request DTO for cancelling a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CancelBookingRequest {
    #[validate(length(min = 1, message = "Cancellation reason must not be empty"))]
    pub reason: String,
}

/// Request DTO for processing a refund
///
/// When `full_refund` is provided the eligibility evaluation is skipped and
/// that refund type is forced (admin correction path).
#[derive(Debug, Deserialize, Validate)]
pub struct ProcessRefundRequest {
    #[validate(length(min = 1, message = "Refund reason must not be empty"))]
    pub reason: String,
    pub full_refund: Option<bool>,
}

/// Request DTO for updating the refund policy; fields left out stay unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRefundPolicyRequest {
    pub full_refund_before_days: Option<u32>,
    pub partial_refund_before_days: Option<u32>,
    pub no_refund_before_days: Option<u32>,
    pub partial_refund_percentage: Option<u32>,
}

/// Response envelope for all token-based public operations
///
/// Resolution failure and business-rule rejection both collapse into this
/// shape so an anonymous caller cannot distinguish the failure mode.
#[derive(Debug, Serialize)]
pub struct TokenAccessResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

impl TokenAccessResponse {
    /// Response for a token that did not resolve to any booking
    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            booking: None,
        }
    }

    /// Response carrying a booking for a valid token
    pub fn valid(booking: Booking) -> Self {
        Self {
            is_valid: true,
            booking: Some(booking),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Refunded,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_booking_status_from_str_rejects_unknown() {
        assert!(BookingStatus::from_str("on_hold").is_err());
        assert!(BookingStatus::from_str("").is_err());
    }

    #[test]
    fn test_booking_status_serde_uses_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let parsed: BookingStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(parsed, BookingStatus::Refunded);
    }

    #[test]
    fn test_currency_serde_uses_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Lkr).unwrap(), "\"LKR\"");
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
    }

    #[test]
    fn test_update_request_guarded_fields() {
        let patch = UpdateBookingRequest {
            journey_date: Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            ..Default::default()
        };
        assert!(patch.touches_guarded_fields());

        let contact_only = UpdateBookingRequest {
            contact_info: Some(ContactInfoPatch {
                phone: Some("+94 77 000 0000".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!contact_only.touches_guarded_fields());
    }

    #[test]
    fn test_create_booking_request_validation() {
        let request = CreateBookingRequest {
            journey_id: 1,
            package_id: 1,
            journey_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            guest_count: 0,
            special_requests: None,
            contact_info: ContactInfoRequest {
                name: "Test Guest".to_string(),
                email: "guest@example.com".to_string(),
                phone: "+94 77 123 4567".to_string(),
            },
        };
        assert!(request.validate().is_err(), "zero guests must be rejected");
    }

    #[test]
    fn test_contact_info_request_rejects_bad_email() {
        let contact = ContactInfoRequest {
            name: "Test Guest".to_string(),
            email: "not-an-email".to_string(),
            phone: "+94 77 123 4567".to_string(),
        };
        assert!(contact.validate().is_err());
    }
}
