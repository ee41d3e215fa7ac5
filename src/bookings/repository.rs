use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::bookings::error::BookingError;
use crate::bookings::models::{Booking, UpdateBookingRequest};

/// In-memory, identity-indexed booking store
///
/// Bookings are kept in insertion order. All mutating operations take the
/// write lock for their whole read-modify-write cycle, so concurrent admin
/// and token-holder actions against the same booking cannot race a stale
/// read.
#[derive(Clone)]
pub struct BookingsRepository {
    bookings: Arc<RwLock<Vec<Booking>>>,
}

impl BookingsRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            bookings: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Insert a new booking
    ///
    /// Fails with `DuplicateKey` if the id or access token collides with an
    /// existing record. Ids are random v4 uuids and tokens are checked at
    /// generation time, so a collision here is an internal invariant
    /// violation rather than an expected outcome.
    pub async fn insert(&self, booking: Booking) -> Result<Booking, BookingError> {
        let mut bookings = self.bookings.write().await;
        if bookings.iter().any(|b| b.id == booking.id) {
            return Err(BookingError::DuplicateKey(format!(
                "Booking id {} already exists",
                booking.id
            )));
        }
        if bookings.iter().any(|b| b.access_token == booking.access_token) {
            return Err(BookingError::DuplicateKey(
                "Access token already exists".to_string(),
            ));
        }
        bookings.push(booking.clone());
        Ok(booking)
    }

    /// Find a booking by id
    pub async fn find_by_id(&self, id: Uuid) -> Option<Booking> {
        let bookings = self.bookings.read().await;
        bookings.iter().find(|b| b.id == id).cloned()
    }

    /// Find a booking by access token
    pub async fn find_by_token(&self, token: &str) -> Option<Booking> {
        let bookings = self.bookings.read().await;
        bookings.iter().find(|b| b.access_token == token).cloned()
    }

    /// Whether any booking already holds the given access token
    pub async fn token_exists(&self, token: &str) -> bool {
        let bookings = self.bookings.read().await;
        bookings.iter().any(|b| b.access_token == token)
    }

    /// All bookings in insertion order
    pub async fn list_all(&self) -> Vec<Booking> {
        let bookings = self.bookings.read().await;
        bookings.clone()
    }

    /// Merge the provided fields into the booking with the given id
    ///
    /// Absent fields stay unchanged; nested contact info is merged
    /// field-by-field, never replaced wholesale.
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateBookingRequest,
    ) -> Result<Booking, BookingError> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BookingError::NotFound)?;
        patch.merge_into(booking);
        Ok(booking.clone())
    }

    /// Atomically replace the booking with the given id using `f`
    ///
    /// The write lock is held across the read, the rewrite, and the commit;
    /// a failed rewrite leaves the record untouched.
    pub async fn modify<F>(&self, id: Uuid, f: F) -> Result<Booking, BookingError>
    where
        F: FnOnce(&Booking) -> Result<Booking, BookingError>,
    {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BookingError::NotFound)?;
        let rewritten = f(booking)?;
        *booking = rewritten.clone();
        Ok(rewritten)
    }

    /// Atomically replace the booking with the given access token using `f`
    pub async fn modify_by_token<F>(&self, token: &str, f: F) -> Result<Booking, BookingError>
    where
        F: FnOnce(&Booking) -> Result<Booking, BookingError>,
    {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.access_token == token)
            .ok_or(BookingError::NotFound)?;
        let rewritten = f(booking)?;
        *booking = rewritten.clone();
        Ok(rewritten)
    }

    /// Permanently remove a booking
    pub async fn remove(&self, id: Uuid) -> Result<(), BookingError> {
        let mut bookings = self.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        if bookings.len() == before {
            return Err(BookingError::NotFound);
        }
        Ok(())
    }
}

impl Default for BookingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::models::{
        BookingStatus, ContactInfo, ContactInfoPatch, Currency, Payment, PaymentMethod,
        PaymentStatus,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn test_booking(token: &str) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            access_token: token.to_string(),
            journey_id: 1,
            package_id: 1,
            booking_date: NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
            journey_date: NaiveDate::from_ymd_opt(2026, 5, 25).unwrap(),
            status: BookingStatus::Pending,
            guest_count: 2,
            total_price_lkr: dec!(30000),
            total_price_usd: dec!(100),
            special_requests: None,
            payments: vec![Payment {
                id: Uuid::new_v4(),
                amount: dec!(30000),
                currency: Currency::Lkr,
                method: PaymentMethod::Card,
                status: PaymentStatus::Pending,
                transaction_id: None,
                timestamp: Utc.with_ymd_and_hms(2026, 4, 15, 14, 30, 0).unwrap(),
            }],
            refunded_amount: None,
            refund_date: None,
            refund_reason: None,
            contact_info: ContactInfo {
                name: "Test Guest".to_string(),
                email: "guest@example.com".to_string(),
                phone: "+94 77 123 4567".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let repo = BookingsRepository::new();
        let booking = test_booking("token-1");
        let id = booking.id;
        repo.insert(booking).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap();
        assert_eq!(found.id, id);
        assert!(repo.find_by_id(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let repo = BookingsRepository::new();
        repo.insert(test_booking("token-abc")).await.unwrap();

        assert!(repo.find_by_token("token-abc").await.is_some());
        assert!(repo.find_by_token("token-xyz").await.is_none());
        assert!(repo.token_exists("token-abc").await);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let repo = BookingsRepository::new();
        let booking = test_booking("token-1");
        repo.insert(booking.clone()).await.unwrap();

        let mut duplicate = booking;
        duplicate.access_token = "token-2".to_string();
        let result = repo.insert(duplicate).await;
        assert!(matches!(result, Err(BookingError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() {
        let repo = BookingsRepository::new();
        repo.insert(test_booking("token-1")).await.unwrap();

        let result = repo.insert(test_booking("token-1")).await;
        assert!(matches!(result, Err(BookingError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_list_all_preserves_insertion_order() {
        let repo = BookingsRepository::new();
        let first = test_booking("token-1");
        let second = test_booking("token-2");
        let third = test_booking("token-3");
        let ids = [first.id, second.id, third.id];
        for booking in [first, second, third] {
            repo.insert(booking).await.unwrap();
        }

        let listed: Vec<Uuid> = repo.list_all().await.iter().map(|b| b.id).collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_reads_do_not_mutate() {
        let repo = BookingsRepository::new();
        let booking = test_booking("token-1");
        let id = booking.id;
        repo.insert(booking).await.unwrap();

        let first = repo.find_by_id(id).await.unwrap();
        let second = repo.find_by_id(id).await.unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(first.guest_count, second.guest_count);
        assert_eq!(repo.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_contact_info_field_by_field() {
        let repo = BookingsRepository::new();
        let booking = test_booking("token-1");
        let id = booking.id;
        repo.insert(booking).await.unwrap();

        let updated = repo
            .update(
                id,
                UpdateBookingRequest {
                    contact_info: Some(ContactInfoPatch {
                        phone: Some("+94 71 999 8888".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Only the phone changed; the other contact fields survived the merge
        assert_eq!(updated.contact_info.phone, "+94 71 999 8888");
        assert_eq!(updated.contact_info.name, "Test Guest");
        assert_eq!(updated.contact_info.email, "guest@example.com");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = BookingsRepository::new();
        let result = repo
            .update(Uuid::new_v4(), UpdateBookingRequest::default())
            .await;
        assert!(matches!(result, Err(BookingError::NotFound)));
    }

    #[tokio::test]
    async fn test_modify_failure_leaves_record_untouched() {
        let repo = BookingsRepository::new();
        let booking = test_booking("token-1");
        let id = booking.id;
        repo.insert(booking).await.unwrap();

        let result = repo
            .modify(id, |_| {
                Err(BookingError::IllegalTransition("rejected".to_string()))
            })
            .await;
        assert!(result.is_err());

        let unchanged = repo.find_by_id(id).await.unwrap();
        assert_eq!(unchanged.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = BookingsRepository::new();
        let booking = test_booking("token-1");
        let id = booking.id;
        repo.insert(booking).await.unwrap();

        repo.remove(id).await.unwrap();
        assert!(repo.find_by_id(id).await.is_none());
        assert!(matches!(
            repo.remove(id).await,
            Err(BookingError::NotFound)
        ));
    }
}
