use serde::{Deserialize, Serialize};

use crate::gtfs::raw_gtfs::deserialize_opt;

/// A feed table that can be read from a GTFS directory, zip archive or sqlite3 database.
pub trait Table: for<'de> Deserialize<'de> {
    /// Name of the file inside a directory or zip archive
    const FILE_NAME: &'static str;
    /// Name of the table inside a sqlite3 database
    const SQLITE_TABLE: &'static str;
}

/// A physical stop, station, or area, as found in the feed.
/// https://gtfs.org/documentation/schedule/reference/#stopstxt
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct StopRow {
    pub stop_id: Option<String>,
    pub stop_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub stop_lat: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub stop_lon: Option<f64>,
}

impl Table for StopRow {
    const FILE_NAME: &'static str = "stops.txt";
    const SQLITE_TABLE: &'static str = "gtfs_stops";
}

/// A transportation route, as found in the feed.
/// https://gtfs.org/documentation/schedule/reference/#routestxt
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct RouteRow {
    pub route_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_color: Option<String>,
    pub route_text_color: Option<String>,
}

impl Table for RouteRow {
    const FILE_NAME: &'static str = "routes.txt";
    const SQLITE_TABLE: &'static str = "gtfs_routes";
}

/// A scheduled trip for a route, as found in the feed.
/// https://gtfs.org/documentation/schedule/reference/#tripstxt
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct TripRow {
    pub trip_id: Option<String>,
    pub route_id: Option<String>,
    pub direction_id: Option<String>,
    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,
}

impl Table for TripRow {
    const FILE_NAME: &'static str = "trips.txt";
    const SQLITE_TABLE: &'static str = "gtfs_trips";
}

/// Scheduled stop time for a trip, as found in the feed.
/// https://gtfs.org/documentation/schedule/reference/#stop_timestxt
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct StopTimeRow {
    pub trip_id: Option<String>,
    pub stop_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub stop_sequence: Option<i64>,
}

impl Table for StopTimeRow {
    const FILE_NAME: &'static str = "stop_times.txt";
    const SQLITE_TABLE: &'static str = "gtfs_stop_times";
}

/// Direction of travel for a trip.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum Direction {
    #[serde(rename = "0")]
    Outbound,
    #[serde(rename = "1")]
    Inbound,
}

impl Direction {
    /// Only the exact codes `0` and `1` name a direction.
    pub fn from_code(code: &str) -> Option<Direction> {
        match code {
            "0" => Some(Direction::Outbound),
            "1" => Some(Direction::Inbound),
            _ => None,
        }
    }
}
