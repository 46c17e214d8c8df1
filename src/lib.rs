pub mod gtfs;
pub mod lines;
