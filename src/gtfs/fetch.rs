use std::io::Cursor;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use awc::Client;
use url::Url;

use crate::gtfs::error::Error;
use crate::gtfs::raw_gtfs::RawFeed;

/// Largest feed archive accepted from the network.
const MAX_FEED_BYTES: usize = 512 * 1024 * 1024;

/// Where a GTFS feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// A directory, zip archive or sqlite3 database on disk
    Path(PathBuf),
    /// A zip archive served over HTTP(S)
    Url(String),
}

impl FeedSource {
    /// Read the raw tables from this source
    ///
    /// # Parameters
    /// - `timeout`: Upper bound for the whole download when the source is a URL
    pub fn load(&self, timeout: Duration) -> Result<RawFeed, Error> {
        match self {
            FeedSource::Path(path) => {
                log::info!("Reading GTFS from path: {}", path.display());
                RawFeed::from_path(path)
            }
            FeedSource::Url(url) => {
                log::info!("Downloading GTFS from url: {}", url);
                let body = download(url, timeout)?;
                RawFeed::from_zip(Cursor::new(body))
            }
        }
    }
}

/// Download the body behind `url` on a one-shot actix system
pub fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, Error> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_owned(),
        source: e,
    })?;
    let fetch_error = |message: String| Error::Fetch {
        url: url.to_owned(),
        message,
    };

    let start = Instant::now();
    let body = actix_rt::System::new().block_on(async {
        let client = Client::builder().timeout(timeout).finish();
        let mut res = client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        if !res.status().is_success() {
            return Err(fetch_error(format!("server returned {}", res.status())));
        }
        res.body()
            .limit(MAX_FEED_BYTES)
            .await
            .map_err(|e| fetch_error(e.to_string()))
    })?;
    log::debug!(
        "Downloaded {} bytes in {}ms",
        body.len(),
        start.elapsed().as_millis()
    );
    Ok(body.to_vec())
}
