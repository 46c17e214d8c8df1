use std::collections::{BTreeMap, HashMap};

use crate::gtfs::structs::{Direction, StopTimeRow, TripRow};

/// One stop-time entry of a trip, before ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopVisit {
    /// Missing or unparsable sequence numbers read as 0
    pub sequence: i64,
    pub stop_id: String,
}

/// Every stop-time entry of one trip, in feed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripStops {
    pub trip_id: String,
    pub visits: Vec<StopVisit>,
}

/// Number of trips announcing a headsign for a route direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadsignTally {
    pub headsign: String,
    pub count: u32,
}

/// Headsign votes per route and direction. Tallies keep the order in which each headsign was first
/// seen.
#[derive(Debug, Default)]
pub struct HeadsignVotes {
    tallies: HashMap<String, BTreeMap<Direction, Vec<HeadsignTally>>>,
}

impl HeadsignVotes {
    pub fn add(&mut self, route_id: &str, direction: Direction, headsign: &str) {
        let tallies = self
            .tallies
            .entry(route_id.to_owned())
            .or_default()
            .entry(direction)
            .or_default();
        match tallies.iter_mut().find(|t| t.headsign == headsign) {
            Some(tally) => tally.count += 1,
            None => tallies.push(HeadsignTally {
                headsign: headsign.to_owned(),
                count: 1,
            }),
        }
    }

    /// Tallies of every route that received at least one vote
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<Direction, Vec<HeadsignTally>>)> {
        self.tallies
            .iter()
            .map(|(route_id, dirs)| (route_id.as_str(), dirs))
    }
}

/// Trips joined to their routes, their stop-time entries and the headsign votes they cast.
#[derive(Debug, Default)]
pub struct TripIndex {
    trip_routes: HashMap<String, String>,
    /// In the order each trip first appears among the stop times
    trip_stops: Vec<TripStops>,
    trip_positions: HashMap<String, usize>,
    pub votes: HeadsignVotes,
}

impl TripIndex {
    /// Run the trip pass and the stop-time pass
    pub fn build(trips: &[TripRow], stop_times: &[StopTimeRow]) -> TripIndex {
        let mut index = TripIndex::default();
        for row in trips {
            index.add_trip(row);
        }
        for row in stop_times {
            index.add_stop_time(row);
        }
        log::debug!(
            "Indexed {} trips, {} with stop times",
            index.trip_routes.len(),
            index.trip_stops.len()
        );
        index
    }

    /// Record the route of a trip and count its headsign vote
    pub fn add_trip(&mut self, row: &TripRow) {
        let (Some(trip_id), Some(route_id)) = (non_empty(&row.trip_id), non_empty(&row.route_id))
        else {
            return;
        };
        self.trip_routes
            .insert(trip_id.to_owned(), route_id.to_owned());

        let direction = row.direction_id.as_deref().and_then(Direction::from_code);
        if let Some(direction) = direction {
            let headsign = resolve_headsign(row);
            if !headsign.is_empty() {
                self.votes.add(route_id, direction, headsign);
            }
        }
    }

    /// Append a stop-time entry to its trip
    pub fn add_stop_time(&mut self, row: &StopTimeRow) {
        let (Some(trip_id), Some(stop_id)) = (non_empty(&row.trip_id), non_empty(&row.stop_id))
        else {
            return;
        };
        let visit = StopVisit {
            sequence: row.stop_sequence.unwrap_or(0),
            stop_id: stop_id.to_owned(),
        };
        match self.trip_positions.get(trip_id) {
            Some(&pos) => self.trip_stops[pos].visits.push(visit),
            None => {
                self.trip_positions
                    .insert(trip_id.to_owned(), self.trip_stops.len());
                self.trip_stops.push(TripStops {
                    trip_id: trip_id.to_owned(),
                    visits: vec![visit],
                });
            }
        }
    }

    pub fn route_of(&self, trip_id: &str) -> Option<&str> {
        self.trip_routes.get(trip_id).map(String::as_str)
    }

    pub fn stops_of(&self, trip_id: &str) -> Option<&TripStops> {
        self.trip_positions
            .get(trip_id)
            .map(|&pos| &self.trip_stops[pos])
    }

    /// Trips with at least one stop-time entry, in stop-time order
    pub fn trips_with_stops(&self) -> impl Iterator<Item = &TripStops> {
        self.trip_stops.iter()
    }
}

/// The trip headsign, else the trip short name, trimmed
///
/// Only an empty `trip_headsign` falls through to `trip_short_name`.
fn resolve_headsign(row: &TripRow) -> &str {
    non_empty(&row.trip_headsign)
        .or_else(|| non_empty(&row.trip_short_name))
        .unwrap_or_default()
        .trim()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
