use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use serde::Serialize;

use crate::gtfs::raw_gtfs::RawFeed;

use super::canonical::select_canonical_trips;
use super::labels::{resolve_direction_labels, DirectionLabels};
use super::normalize::{normalize_routes, normalize_stops, Route, Stop};
use super::shape::{build_line_shapes, LineShapes, LineStops, StopIndex};
use super::trip_index::TripIndex;

/// A stop as published, with the lines serving it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopEntry {
    pub name: String,
    pub coords: [f64; 2],
    /// Sorted route identifiers, omitted from the output when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
}

/// Stops, line shapes, route metadata and direction labels derived from one feed.
pub struct LineNetwork {
    /// Every stop with a usable position, whether or not a line serves it
    pub stops: BTreeMap<String, StopEntry>,
    /// Ordered stops of each route's canonical trip, routes in stop-time order
    pub line_shapes: LineStops,
    /// Metadata of the routes present in `line_shapes`, in the same order
    pub routes: Vec<Route>,
    pub direction_labels: DirectionLabels,
}

impl LineNetwork {
    pub fn print_stats(&self) {
        println!("Line network:");
        println!("  Stops: {}", self.stops.len());
        println!(
            "  Stops served: {}",
            self.stops.values().filter(|s| !s.lines.is_empty()).count()
        );
        println!("  Lines: {}", self.line_shapes.len());
        println!(
            "  Lines without known stops: {}",
            self.line_shapes
                .iter()
                .filter(|line| line.stops.is_empty())
                .count()
        );
        println!("  Routes: {}", self.routes.len());
        println!("  Labelled routes: {}", self.direction_labels.len());
    }

    /// Derive the line network from the raw feed tables
    ///
    /// # Parameters
    /// - `feed`: The raw stops, routes, trips and stop times
    ///
    /// # Returns
    /// The derived network
    ///
    /// For each route, keeps the trip with the most stop times as its canonical path, orders its
    /// stops by sequence and records which routes serve each stop. Direction labels are voted from
    /// trip headsigns.
    pub fn from_feed(feed: &RawFeed) -> LineNetwork {
        let start = Instant::now();
        let stops = normalize_stops(&feed.stops);
        let routes = normalize_routes(&feed.routes);

        let index = TripIndex::build(&feed.trips, &feed.stop_times);
        let canonical = select_canonical_trips(&index);
        let LineShapes { shapes, stop_lines } = build_line_shapes(&canonical, &index, &stops);
        let direction_labels = resolve_direction_labels(&index.votes);

        if shapes.is_empty() {
            log::warn!("No route has a trip with stop times");
        }
        let network = LineNetwork::assemble(stops, routes, shapes, stop_lines, direction_labels);
        log::debug!(
            "Line network derived in {}ms",
            start.elapsed().as_millis()
        );
        network
    }

    fn assemble(
        stops: BTreeMap<String, Stop>,
        mut routes: HashMap<String, Route>,
        line_shapes: LineStops,
        mut stop_lines: StopIndex,
        direction_labels: DirectionLabels,
    ) -> LineNetwork {
        let stops = stops
            .into_iter()
            .map(|(stop_id, stop)| {
                let lines = stop_lines
                    .remove(&stop_id)
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default();
                let entry = StopEntry {
                    coords: stop.coords(),
                    name: stop.name,
                    lines,
                };
                (stop_id, entry)
            })
            .collect();

        let routes: Vec<Route> = line_shapes
            .route_ids()
            .filter_map(|route_id| routes.remove(route_id))
            .collect();
        if routes.len() < line_shapes.len() {
            log::debug!(
                "{} lines have no route metadata",
                line_shapes.len() - routes.len()
            );
        }

        LineNetwork {
            stops,
            line_shapes,
            routes,
            direction_labels,
        }
    }
}
