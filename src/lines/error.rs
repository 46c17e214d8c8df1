use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot write '{path}'")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    GtfsError(#[from] crate::gtfs::error::Error),
}
