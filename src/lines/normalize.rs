use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::gtfs::structs::{RouteRow, StopRow};

/// A stop with a usable position.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub stop_id: String,
    /// Falls back to the identifier when the feed leaves it blank
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Stop {
    /// Rows without an identifier or without finite coordinates are rejected
    pub fn from_row(row: &StopRow) -> Option<Stop> {
        let stop_id = non_empty(&row.stop_id)?;
        let lat = row.stop_lat.filter(|v| v.is_finite())?;
        let lon = row.stop_lon.filter(|v| v.is_finite())?;
        let name = non_empty(&row.stop_name).unwrap_or(stop_id);
        Some(Stop {
            stop_id: stop_id.to_owned(),
            name: name.to_owned(),
            lat,
            lon,
        })
    }

    pub fn coords(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// Route metadata as published alongside the line shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub slug: String,
}

impl Route {
    /// Any row with an identifier yields a route, names and colors are optional
    pub fn from_row(row: &RouteRow) -> Option<Route> {
        let route_id = non_empty(&row.route_id)?;
        let short_name = non_empty(&row.route_short_name).unwrap_or_default();
        let long_name = non_empty(&row.route_long_name).unwrap_or_default();
        let label = [short_name, long_name]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(route_id);
        Some(Route {
            route_id: route_id.to_owned(),
            short_name: short_name.to_owned(),
            long_name: long_name.to_owned(),
            color: row.route_color.as_deref().and_then(normalize_hex),
            text_color: row.route_text_color.as_deref().and_then(normalize_hex),
            slug: slugify(label),
        })
    }
}

/// Normalize stop rows, later rows win on duplicate identifiers
pub fn normalize_stops(rows: &[StopRow]) -> BTreeMap<String, Stop> {
    let mut stops = BTreeMap::new();
    let mut rejected = 0usize;
    for row in rows {
        match Stop::from_row(row) {
            Some(stop) => {
                stops.insert(stop.stop_id.clone(), stop);
            }
            None => rejected += 1,
        }
    }
    log::debug!("Normalized {} stops ({} rows rejected)", stops.len(), rejected);
    stops
}

/// Normalize route rows, later rows win on duplicate identifiers
pub fn normalize_routes(rows: &[RouteRow]) -> HashMap<String, Route> {
    let mut routes = HashMap::new();
    for route in rows.iter().filter_map(Route::from_row) {
        routes.insert(route.route_id.clone(), route);
    }
    log::debug!("Normalized {} routes", routes.len());
    routes
}

/// Normalize a hex color (`#RGB`, `#RGBA` or `#RRGGBB`) to upper case
///
/// The leading `#` is optional. Blank input, non hex digits and any other length are treated as
/// absent.
pub fn normalize_hex(value: &str) -> Option<String> {
    let value = value.trim();
    let digits = value.strip_prefix('#').unwrap_or(value);
    if !matches!(digits.len(), 3 | 4 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", digits.to_ascii_uppercase()))
}

/// Lower case `value` and collapse every run of non alphanumeric characters into one `-`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut last_dash = false;
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_matches('-').to_owned()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
