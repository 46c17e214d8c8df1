use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::canonical::CanonicalTrip;
use super::normalize::Stop;
use super::trip_index::{StopVisit, TripIndex};

/// A stop along a line, in travel order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStop {
    pub stop_id: String,
    pub name: String,
    pub coords: [f64; 2],
}

/// The ordered stops of one route.
#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub route_id: String,
    pub stops: Vec<ShapeStop>,
}

/// Line shapes in the order their routes first appear among the stop times.
///
/// Serializes as an object keyed by route identifier, keeping that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineStops(Vec<LineShape>);

impl LineStops {
    pub fn get(&self, route_id: &str) -> Option<&[ShapeStop]> {
        self.0
            .iter()
            .find(|line| line.route_id == route_id)
            .map(|line| line.stops.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineShape> {
        self.0.iter()
    }

    pub fn route_ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|line| line.route_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LineStops {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for line in &self.0 {
            map.serialize_entry(&line.route_id, &line.stops)?;
        }
        map.end()
    }
}

/// Routes serving each stop, sorted by route identifier.
pub type StopIndex = BTreeMap<String, BTreeSet<String>>;

/// Ordered stops per route, together with the inverse stop to routes index.
#[derive(Debug, Default)]
pub struct LineShapes {
    pub shapes: LineStops,
    pub stop_lines: StopIndex,
}

/// Turn each route's canonical trip into an ordered list of known, distinct stops
///
/// Visits are stable-sorted by sequence. A stop already on the line, or missing from `stops`, is
/// skipped. Every route with a canonical trip gets an entry, even when nothing survives, and
/// entries keep the order of `canonical`.
pub fn build_line_shapes(
    canonical: &[CanonicalTrip],
    index: &TripIndex,
    stops: &BTreeMap<String, Stop>,
) -> LineShapes {
    let mut lines = LineShapes::default();
    for pick in canonical {
        let visits = index
            .stops_of(&pick.trip_id)
            .map(|t| t.visits.as_slice())
            .unwrap_or_default();
        let shape = build_shape(&pick.route_id, visits, stops, &mut lines.stop_lines);
        if shape.is_empty() {
            log::debug!(
                "Route {} has no known stops on trip {}",
                pick.route_id,
                pick.trip_id
            );
        }
        lines.shapes.0.push(LineShape {
            route_id: pick.route_id.clone(),
            stops: shape,
        });
    }
    lines
}

fn build_shape(
    route_id: &str,
    visits: &[StopVisit],
    stops: &BTreeMap<String, Stop>,
    stop_lines: &mut StopIndex,
) -> Vec<ShapeStop> {
    let mut ordered: Vec<&StopVisit> = visits.iter().collect();
    ordered.sort_by_key(|v| v.sequence);

    let mut seen = HashSet::new();
    let mut shape = Vec::new();
    for visit in ordered {
        if seen.contains(visit.stop_id.as_str()) {
            continue;
        }
        let Some(stop) = stops.get(&visit.stop_id) else {
            continue;
        };
        seen.insert(visit.stop_id.as_str());
        shape.push(ShapeStop {
            stop_id: stop.stop_id.clone(),
            name: stop.name.clone(),
            coords: stop.coords(),
        });
        stop_lines
            .entry(stop.stop_id.clone())
            .or_default()
            .insert(route_id.to_owned());
    }
    shape
}
