use serde::Serialize;
use std::collections::BTreeMap;

use crate::catalog_types::{DestinationMap, Package};
use crate::pipeline::is_home_country;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_packages: usize,
    pub active_packages: usize,
    pub draft_packages: usize,
    pub domestic_packages: usize,
    pub international_packages: usize,
    /// Active packages whose destination is unknown.
    pub unresolved_packages: usize,
    pub average_price: Option<f64>,
    pub average_rating: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub packages_by_category: BTreeMap<String, usize>,
    pub packages_by_country: BTreeMap<String, usize>,
    pub total_destinations: usize,
}

/// Aggregates for the admin dashboard. Scope, price and category figures
/// only count active packages.
pub fn catalog_stats(
    packages: &[Package],
    destinations: &DestinationMap,
    home_country: &str,
) -> CatalogStats {
    let active: Vec<&Package> = packages.iter().filter(|p| p.is_active()).collect();

    let mut domestic_packages = 0;
    let mut international_packages = 0;
    let mut unresolved_packages = 0;
    let mut packages_by_category = BTreeMap::new();
    let mut packages_by_country = BTreeMap::new();

    for package in &active {
        match destinations.get(&package.destination) {
            Some(destination) if !destination.country.trim().is_empty() => {
                if is_home_country(&destination.country, home_country) {
                    domestic_packages += 1;
                } else {
                    international_packages += 1;
                }
                *packages_by_country
                    .entry(destination.country.trim().to_string())
                    .or_insert(0) += 1;
            }
            _ => unresolved_packages += 1,
        }

        for category in &package.categories {
            *packages_by_category.entry(category.clone()).or_insert(0) += 1;
        }
    }

    let prices: Vec<f64> = active.iter().map(|p| p.price).collect();
    let ratings: Vec<f64> = active.iter().map(|p| p.rating).collect();

    CatalogStats {
        total_packages: packages.len(),
        active_packages: active.len(),
        draft_packages: packages.len() - active.len(),
        domestic_packages,
        international_packages,
        unresolved_packages,
        average_price: average(&prices),
        average_rating: average(&ratings),
        min_price: prices.iter().copied().reduce(f64::min),
        max_price: prices.iter().copied().reduce(f64::max),
        packages_by_category,
        packages_by_country,
        total_destinations: destinations.len(),
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_types::Destination;
    use serde_json::json;

    #[test]
    fn test_catalog_stats() {
        let packages: Vec<Package> = [
            json!({"status": "active", "destination": "goa", "price": 5000, "rating": 4, "tags": "beach"}),
            json!({"status": "active", "destination": "paris", "price": 15000, "rating": 5, "tags": "city,beach"}),
            json!({"status": "active", "destination": "unknown", "price": 1000, "rating": 3}),
            json!({"status": "draft", "destination": "goa", "price": 99999}),
        ]
        .iter()
        .map(Package::from_json)
        .collect();

        let destinations: DestinationMap = [
            json!({"_id": "goa", "place": "Goa", "country": "India"}),
            json!({"_id": "paris", "place": "Paris", "country": "France"}),
        ]
        .iter()
        .map(Destination::from_json)
        .map(|d| (d.id.clone(), d))
        .collect();

        let stats = catalog_stats(&packages, &destinations, "india");

        assert_eq!(stats.total_packages, 4);
        assert_eq!(stats.active_packages, 3);
        assert_eq!(stats.draft_packages, 1);
        assert_eq!(stats.domestic_packages, 1);
        assert_eq!(stats.international_packages, 1);
        assert_eq!(stats.unresolved_packages, 1);
        assert_eq!(stats.average_price, Some(7000.0));
        assert_eq!(stats.average_rating, Some(4.0));
        assert_eq!(stats.min_price, Some(1000.0));
        assert_eq!(stats.max_price, Some(15000.0));
        assert_eq!(stats.packages_by_category["beach"], 2);
        assert_eq!(stats.packages_by_country["France"], 1);
        assert_eq!(stats.total_destinations, 2);
    }

    #[test]
    fn test_empty_catalog_has_no_averages() {
        let stats = catalog_stats(&[], &DestinationMap::new(), "India");
        assert_eq!(stats.active_packages, 0);
        assert_eq!(stats.average_price, None);
        assert_eq!(stats.min_price, None);
    }
}
