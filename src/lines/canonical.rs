use std::collections::HashMap;

use super::trip_index::TripIndex;

/// The trip chosen to stand for a route's full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTrip {
    pub route_id: String,
    pub trip_id: String,
    pub stop_count: usize,
}

/// Pick, for each route, the trip with the most stop-time entries
///
/// Trips are visited in the order they first appear among the stop times and a later trip only
/// replaces the current pick when it has strictly more entries, so the first of several equally
/// long trips wins. Trips whose route is unknown are skipped.
///
/// # Returns
/// One pick per route, in the order each route's first trip appears among the stop times
pub fn select_canonical_trips(index: &TripIndex) -> Vec<CanonicalTrip> {
    let mut best: Vec<CanonicalTrip> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut orphans = 0usize;
    for trip in index.trips_with_stops() {
        let Some(route_id) = index.route_of(&trip.trip_id) else {
            orphans += 1;
            continue;
        };
        let stop_count = trip.visits.len();
        match positions.get(route_id).copied() {
            Some(pos) if stop_count <= best[pos].stop_count => {}
            Some(pos) => {
                best[pos].trip_id = trip.trip_id.clone();
                best[pos].stop_count = stop_count;
            }
            None => {
                positions.insert(route_id, best.len());
                best.push(CanonicalTrip {
                    route_id: route_id.to_owned(),
                    trip_id: trip.trip_id.clone(),
                    stop_count,
                });
            }
        }
    }
    if orphans > 0 {
        log::debug!("Skipped {} trips with stop times but no route", orphans);
    }
    best
}
