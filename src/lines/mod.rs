pub mod canonical;
pub mod error;
pub mod export;
pub mod labels;
pub mod network;
pub mod normalize;
pub mod shape;
pub mod trip_index;
