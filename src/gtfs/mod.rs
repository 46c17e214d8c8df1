pub mod error;
pub mod fetch;
pub mod raw_gtfs;
pub mod structs;
