use std::collections::BTreeMap;

use time::{Duration, OffsetDateTime};

use super::dto::{
    Analytics, BusinessMetrics, CityPerformance, CityRooms, ListingCounts, PriceStats,
    RecentListing, RoomStats,
};
use super::model::VerificationStatus;
use crate::listings::dto::decimal_to_f64;
use crate::listings::model::Listing;

const RECENT_WINDOW_DAYS: i64 = 30;
const RECENT_LISTING_LIMIT: usize = 5;

fn occupancy_percent(occupied: i64, total: i64) -> i64 {
    if total > 0 {
        ((occupied as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    }
}

struct CityAcc {
    city: String,
    listings: i64,
    total_rooms: i64,
    available_rooms: i64,
    revenue: f64,
}

/// Push into the per-city accumulator list, keeping first-seen city
/// order for the output arrays.
fn city_slot<'a>(cities: &'a mut Vec<CityAcc>, city: &str) -> &'a mut CityAcc {
    if let Some(pos) = cities.iter().position(|c| c.city == city) {
        &mut cities[pos]
    } else {
        cities.push(CityAcc {
            city: city.to_string(),
            listings: 0,
            total_rooms: 0,
            available_rooms: 0,
            revenue: 0.0,
        });
        cities.last_mut().expect("just pushed")
    }
}

/// Dashboard snapshot from the owner's full listing set, active and
/// inactive alike. One pass folds every accumulator; `listings` must
/// arrive sorted by created_at descending so the recent summaries
/// are the newest rows.
pub fn dashboard_analytics(
    listings: &[Listing],
    now: OffsetDateTime,
) -> (Analytics, Vec<RecentListing>) {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    let mut active = 0i64;
    let mut recently_added = 0i64;
    let mut total_rooms = 0i64;
    let mut available_rooms = 0i64;
    let mut price_sum = 0.0f64;
    let mut price_count = 0i64;
    let mut price_min = f64::MAX;
    let mut price_max = 0.0f64;
    let mut cities: Vec<CityAcc> = Vec::new();
    let mut gender_distribution: BTreeMap<String, i64> = BTreeMap::new();

    for listing in listings {
        if listing.is_active {
            active += 1;
        }
        if listing.created_at >= cutoff {
            recently_added += 1;
        }
        total_rooms += listing.total_rooms as i64;
        available_rooms += listing.available_rooms as i64;

        let price = decimal_to_f64(listing.price);
        if price > 0.0 {
            price_sum += price;
            price_count += 1;
            price_min = price_min.min(price);
            price_max = price_max.max(price);
        }

        let slot = city_slot(&mut cities, &listing.city);
        slot.listings += 1;
        slot.total_rooms += listing.total_rooms as i64;
        slot.available_rooms += listing.available_rooms as i64;

        *gender_distribution
            .entry(listing.gender.as_str().to_string())
            .or_insert(0) += 1;
    }

    let total = listings.len() as i64;
    let occupied = total_rooms - available_rooms;

    let analytics = Analytics {
        listings: ListingCounts {
            total,
            active,
            inactive: total - active,
            recently_added,
        },
        rooms: RoomStats {
            total: total_rooms,
            available: available_rooms,
            occupied,
            occupancy_rate: format!("{}%", occupancy_percent(occupied, total_rooms)),
        },
        pricing: PriceStats {
            average: if price_count > 0 {
                (price_sum / price_count as f64).round() as i64
            } else {
                0
            },
            minimum: if price_count > 0 { price_min } else { 0.0 },
            maximum: price_max,
        },
        locations: cities
            .into_iter()
            .map(|c| CityRooms {
                city: c.city,
                listings: c.listings,
                total_rooms: c.total_rooms,
                available_rooms: c.available_rooms,
            })
            .collect(),
        gender_distribution,
    };

    let recent = listings
        .iter()
        .take(RECENT_LISTING_LIMIT)
        .map(|l| RecentListing {
            id: l.id,
            name: l.name.clone(),
            city: l.city.clone(),
            price: decimal_to_f64(l.price),
            available_rooms: l.available_rooms,
            created_at: l.created_at,
        })
        .collect();

    (analytics, recent)
}

/// Revenue-oriented view over the same raw listing set: monthly
/// revenue potential is occupied rooms times price, summed.
pub fn business_metrics(
    listings: &[Listing],
    verification_status: VerificationStatus,
) -> BusinessMetrics {
    let mut monthly_revenue = 0.0f64;
    let mut cities: Vec<CityAcc> = Vec::new();

    for listing in listings {
        let occupied = listing.occupied_rooms() as i64;
        let revenue = occupied as f64 * decimal_to_f64(listing.price);
        monthly_revenue += revenue;

        let slot = city_slot(&mut cities, &listing.city);
        slot.listings += 1;
        slot.total_rooms += listing.total_rooms as i64;
        slot.available_rooms += listing.available_rooms as i64;
        slot.revenue += revenue;
    }

    BusinessMetrics {
        monthly_revenue: monthly_revenue.round() as i64,
        total_properties: listings.len() as i64,
        verification_status,
        city_performance: cities
            .into_iter()
            .map(|c| {
                let occupied = c.total_rooms - c.available_rooms;
                CityPerformance {
                    occupancy_rate: occupancy_percent(occupied, c.total_rooms),
                    city: c.city,
                    listings: c.listings,
                    total_rooms: c.total_rooms,
                    occupied_rooms: occupied,
                    revenue: c.revenue,
                }
            })
            .collect(),
    }
}
