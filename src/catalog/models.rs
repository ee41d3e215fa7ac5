use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable experience offering tied to a journey
///
/// The catalog is an external collaborator of the booking core: bookings
/// reference packages by id and look them up at read time, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPackage {
    pub id: i32,
    pub journey_id: i32,
    pub name: String,
    pub price_lkr: Decimal,
}
