use std::fs::File;
use std::io::Write;
use std::path::Path;

use rail_lines::gtfs::error::Error as GtfsError;
use rail_lines::gtfs::raw_gtfs::RawFeed;
use rail_lines::gtfs::structs::Direction;
use rail_lines::lines::export::{write_network, ExportOptions};
use rail_lines::lines::network::LineNetwork;
use rusqlite::Connection;
use serde_json::{json, Value};
use zip::write::SimpleFileOptions;

const STOPS: &str = "\u{feff}stop_id,stop_name,stop_lat,stop_lon,location_type\n\
PJ,Port Jefferson,40.9346,-73.0524,0\n\
HUN,Huntington,40.8535,-73.4097,0\n\
SYO,Syosset,40.8249,-73.5003,0\n\
HIC,Hicksville,40.7673,-73.5285,0\n\
NYK,Penn Station,40.7506,-73.9935,0\n\
BAD,Broken,north,-73.0,0\n\
ENT,,40.7,-73.9,2\n";

const ROUTES: &str = "route_id,agency_id,route_short_name,route_long_name,route_type,route_color,route_text_color\n\
7,LI,,Port Jefferson Branch,2,006EC7,FFFFFF\n\
9,LI,,,2,,\n";

const TRIPS: &str = "route_id,service_id,trip_id,trip_headsign,trip_short_name,direction_id\n\
7,WKD,T_SHORT,Huntington,601,0\n\
7,WKD,T_FULL,Port Jefferson,603,0\n\
7,WKD,T_BACK,Penn Station,604,1\n\
7,WKD,T_BACK2,,605,1\n\
7,WKD,T_BACK3,Penn Station,606,1\n\
9,WKD,T_NINE,,,\n";

const STOP_TIMES: &str = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
T_SHORT,08:00:00,08:00:00,NYK,1\n\
T_SHORT,08:30:00,08:30:00,HIC,2\n\
T_SHORT,08:50:00,08:50:00,HUN,3\n\
T_FULL,09:50:00,09:50:00,PJ,5\n\
T_FULL,09:00:00,09:00:00,NYK,1\n\
T_FULL,09:30:00,09:30:00,HIC,2\n\
T_FULL,09:40:00,09:40:00,SYO,3\n\
T_FULL,09:45:00,09:45:00,HUN,4\n\
T_BACK,10:00:00,10:00:00,PJ,1\n\
T_BACK,11:00:00,11:00:00,NYK,2\n\
T_NINE,12:00:00,12:00:00,BAD,1\n";

const TABLES: [(&str, &str); 4] = [
    ("stops.txt", STOPS),
    ("routes.txt", ROUTES),
    ("trips.txt", TRIPS),
    ("stop_times.txt", STOP_TIMES),
];

fn write_dir(dir: &Path) {
    for (name, content) in TABLES {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

fn write_zip(path: &Path, tables: &[(&str, &str)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, content) in tables {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn write_sqlite(path: &Path, with_stop_times: bool) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE gtfs_stops (stop_id TEXT, stop_name TEXT, stop_lat REAL, stop_lon REAL);
         INSERT INTO gtfs_stops VALUES ('A', 'Alpha', 40.5, -73.5), ('B', NULL, 41.25, -72.75);
         CREATE TABLE gtfs_routes (route_id TEXT, route_short_name TEXT, route_long_name TEXT,
                                   route_color TEXT, route_text_color TEXT);
         INSERT INTO gtfs_routes VALUES ('R1', 'City Line', NULL, 'ff0000', NULL);
         CREATE TABLE gtfs_trips (trip_id TEXT, route_id TEXT, direction_id INTEGER,
                                  trip_headsign TEXT, trip_short_name TEXT);
         INSERT INTO gtfs_trips VALUES ('T1', 'R1', 0, 'Bravo', NULL);",
    )
    .unwrap();
    if with_stop_times {
        conn.execute_batch(
            "CREATE TABLE gtfs_stop_times (trip_id TEXT, stop_id TEXT, stop_sequence INTEGER);
             INSERT INTO gtfs_stop_times VALUES ('T1', 'B', 2), ('T1', 'A', 1);",
        )
        .unwrap();
    }
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn directory_feed_end_to_end() {
    let feed_dir = tempfile::tempdir().unwrap();
    write_dir(feed_dir.path());
    let out_dir = tempfile::tempdir().unwrap();

    let feed = RawFeed::from_path(feed_dir.path()).unwrap();
    let network = LineNetwork::from_feed(&feed);
    write_network(&network, out_dir.path(), &ExportOptions::default()).unwrap();

    let stops = read(&out_dir.path().join("lirr-stops.json"));
    assert_eq!(stops.as_object().unwrap().len(), 6);
    assert!(stops.get("BAD").is_none());
    assert_eq!(stops["ENT"], json!({"name": "ENT", "coords": [40.7, -73.9]}));
    assert_eq!(stops["HUN"]["lines"], json!(["7"]));

    let line_stops = read(&out_dir.path().join("lirr-line-stops.json"));
    let order: Vec<&str> = line_stops["7"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stopId"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["NYK", "HIC", "SYO", "HUN", "PJ"]);
    // Route 9 only visits a stop without coordinates
    assert_eq!(line_stops["9"], json!([]));

    assert_eq!(
        read(&out_dir.path().join("lirr-routes.json")),
        json!([
            {
                "routeId": "7",
                "shortName": "",
                "longName": "Port Jefferson Branch",
                "color": "#006EC7",
                "textColor": "#FFFFFF",
                "slug": "port-jefferson-branch"
            },
            {
                "routeId": "9",
                "shortName": "",
                "longName": "",
                "color": null,
                "textColor": null,
                "slug": "9"
            }
        ])
    );

    // Outbound is a tie won by the first headsign seen, T_BACK2 votes "605" inbound and loses
    assert_eq!(
        read(&out_dir.path().join("lirr-direction-labels.json")),
        json!({"7": {"0": "Huntington", "1": "Penn Station"}})
    );
}

#[test]
fn zip_and_directory_feeds_agree() {
    let feed_dir = tempfile::tempdir().unwrap();
    write_dir(feed_dir.path());
    let zip_path = feed_dir.path().join("gtfs.zip");
    write_zip(&zip_path, &TABLES);

    let from_dir = LineNetwork::from_feed(&RawFeed::from_path(feed_dir.path()).unwrap());
    let from_zip = LineNetwork::from_feed(&RawFeed::from_path(&zip_path).unwrap());
    assert_eq!(from_dir.stops, from_zip.stops);
    assert_eq!(from_dir.line_shapes, from_zip.line_shapes);
    assert_eq!(from_dir.routes, from_zip.routes);
    assert_eq!(from_dir.direction_labels, from_zip.direction_labels);
}

#[test]
fn zip_without_stop_times_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("gtfs.zip");
    write_zip(&zip_path, &TABLES[..3]);
    match RawFeed::from_path(&zip_path) {
        Err(GtfsError::MissingFile(name)) => assert_eq!(name, "stop_times.txt"),
        other => panic!("expected missing stop_times.txt, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn sqlite_feed_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gtfs.db");
    write_sqlite(&db_path, true);

    let network = LineNetwork::from_feed(&RawFeed::from_path(&db_path).unwrap());
    let order: Vec<&str> = network
        .line_shapes
        .get("R1")
        .unwrap()
        .iter()
        .map(|s| s.stop_id.as_str())
        .collect();
    assert_eq!(order, vec!["A", "B"]);
    assert_eq!(network.stops["B"].name, "B");
    assert_eq!(network.stops["B"].coords, [41.25, -72.75]);
    assert_eq!(network.routes[0].color.as_deref(), Some("#FF0000"));
    assert_eq!(network.routes[0].slug, "city-line");
    assert_eq!(
        network.direction_labels["R1"][&Direction::Outbound],
        "Bravo"
    );
}

#[test]
fn sqlite_without_stop_times_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gtfs.db");
    write_sqlite(&db_path, false);
    let err = RawFeed::from_path(&db_path).unwrap_err();
    assert_eq!(err.to_string(), "Could not find file gtfs_stop_times");
}
