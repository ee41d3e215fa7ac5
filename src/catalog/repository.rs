use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::models::TravelPackage;

/// In-memory read-only package catalog
///
/// Seeded at startup; the booking core only needs per-id lookup to price a
/// booking at creation time.
#[derive(Clone)]
pub struct PackagesRepository {
    packages: Arc<RwLock<Vec<TravelPackage>>>,
}

impl PackagesRepository {
    /// Create a repository holding the given packages
    pub fn new(packages: Vec<TravelPackage>) -> Self {
        Self {
            packages: Arc::new(RwLock::new(packages)),
        }
    }

    /// Create a repository seeded with the demo catalog
    pub fn seeded() -> Self {
        Self::new(vec![
            TravelPackage {
                id: 1,
                journey_id: 1,
                name: "Temple Meditation Experience".to_string(),
                price_lkr: Decimal::from(15000),
            },
            TravelPackage {
                id: 2,
                journey_id: 1,
                name: "Hill Country Tea Trail".to_string(),
                price_lkr: Decimal::from(12500),
            },
            TravelPackage {
                id: 3,
                journey_id: 2,
                name: "Whale Watching Expedition".to_string(),
                price_lkr: Decimal::from(18000),
            },
        ])
    }

    /// Find a package by id
    pub async fn find_by_id(&self, id: i32) -> Option<TravelPackage> {
        let packages = self.packages.read().await;
        packages.iter().find(|p| p.id == id).cloned()
    }

    /// All packages
    pub async fn list_all(&self) -> Vec<TravelPackage> {
        let packages = self.packages.read().await;
        packages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_catalog_lookup() {
        let repo = PackagesRepository::seeded();
        let package = repo.find_by_id(1).await.unwrap();
        assert_eq!(package.name, "Temple Meditation Experience");
        assert_eq!(package.price_lkr, Decimal::from(15000));
        assert!(repo.find_by_id(999).await.is_none());
    }
}
