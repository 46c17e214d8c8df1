use crate::gtfs::error::Error;
use crate::gtfs::structs::*;

use csv::StringRecord;
use rusqlite::{params, types::ValueRef, Connection};
use serde::{Deserialize, Deserializer};
use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
    str::FromStr,
};
use zip::{result::ZipError, ZipArchive};

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Helper function to deserialize optional fields that might fail to parse
pub fn deserialize_opt<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => match T::from_str(s.trim()) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Ok(None), // Instead of failing, just return None
        },
        None => Ok(None),
    }
}

/// The four tables of a GTFS feed needed to derive lines, read row by row.
/// https://gtfs.org/documentation/schedule/reference/#dataset-files
#[derive(Debug, Default)]
pub struct RawFeed {
    pub stops: Vec<StopRow>,
    pub routes: Vec<RouteRow>,
    pub trips: Vec<TripRow>,
    pub stop_times: Vec<StopTimeRow>,
}

impl RawFeed {
    /// Read a feed from a directory, a zip archive or a sqlite3 database
    pub fn from_path<P>(path: P) -> Result<RawFeed, Error>
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref();
        if p.is_dir() {
            RawFeed::read_from_dir(p)
        } else if p.is_file() {
            if is_sqlite3(p)? {
                RawFeed::read_from_sqlite3(p)
            } else {
                let file = File::open(p).map_err(|e| Error::NamedFileIO {
                    file_name: format!("{}", p.display()),
                    source: Box::new(e),
                })?;
                RawFeed::from_zip(file)
            }
        } else {
            Err(Error::NotFileNorDirectory(format!("{}", p.display())))
        }
    }

    /// Read a feed from a zip archive holding the tables at its root
    pub fn from_zip<R>(reader: R) -> Result<RawFeed, Error>
    where
        R: Read + Seek,
    {
        let mut archive = ZipArchive::new(reader)?;
        Ok(RawFeed {
            stops: RawFeed::read_obj_from_zip(&mut archive)?,
            routes: RawFeed::read_obj_from_zip(&mut archive)?,
            trips: RawFeed::read_obj_from_zip(&mut archive)?,
            stop_times: RawFeed::read_obj_from_zip(&mut archive)?,
        })
    }

    pub fn print_stats(&self) {
        println!("GTFS data:");
        println!("  Stops: {}", self.stops.len());
        println!("  Routes: {}", self.routes.len());
        println!("  Trips: {}", self.trips.len());
        println!("  Stop times: {}", self.stop_times.len());
    }

    fn read_from_dir(path: &Path) -> Result<RawFeed, Error> {
        Ok(RawFeed {
            stops: RawFeed::read_obj_from_path(path)?,
            routes: RawFeed::read_obj_from_path(path)?,
            trips: RawFeed::read_obj_from_path(path)?,
            stop_times: RawFeed::read_obj_from_path(path)?,
        })
    }

    fn read_from_sqlite3(path: &Path) -> Result<RawFeed, Error> {
        let conn = Connection::open(path)?;
        Ok(RawFeed {
            stops: RawFeed::read_obj_sqlite3(&conn)?,
            routes: RawFeed::read_obj_sqlite3(&conn)?,
            trips: RawFeed::read_obj_sqlite3(&conn)?,
            stop_times: RawFeed::read_obj_sqlite3(&conn)?,
        })
    }

    fn read_obj_from_path<O: Table>(path: &Path) -> Result<Vec<O>, Error> {
        let p = path.join(O::FILE_NAME);
        if p.exists() {
            File::open(p)
                .map_err(|e| Error::NamedFileIO {
                    file_name: O::FILE_NAME.to_owned(),
                    source: Box::new(e),
                })
                .and_then(|r| RawFeed::read_obj(r, O::FILE_NAME))
        } else {
            Err(Error::MissingFile(O::FILE_NAME.to_owned()))
        }
    }

    fn read_obj_from_zip<R, O>(archive: &mut ZipArchive<R>) -> Result<Vec<O>, Error>
    where
        R: Read + Seek,
        O: Table,
    {
        match archive.by_name(O::FILE_NAME) {
            Ok(file) => RawFeed::read_obj(file, O::FILE_NAME),
            Err(ZipError::FileNotFound) => Err(Error::MissingFile(O::FILE_NAME.to_owned())),
            Err(e) => Err(Error::Zip(e)),
        }
    }

    fn read_obj<T, O>(mut reader: T, file_name: &str) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
        T: Read,
    {
        // Up to 3 bytes, fewer only at end of input
        let mut bom = Vec::with_capacity(UTF8_BOM.len());
        reader
            .by_ref()
            .take(UTF8_BOM.len() as u64)
            .read_to_end(&mut bom)
            .map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?;

        let head: &[u8] = if bom == UTF8_BOM { &[] } else { &bom };
        let chained = head.chain(reader);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(chained);
        let headers = reader
            .headers()
            .map_err(|e| Error::CSVError {
                file_name: file_name.to_owned(),
                source: e,
            })?
            .clone()
            .into_iter()
            .map(|x| x.trim())
            .collect::<csv::StringRecord>();

        // Pre-allocate a StringRecord for performance reasons
        let mut rec = csv::StringRecord::new();
        let mut objs = Vec::new();
        let mut skipped = 0usize;

        while reader.read_record(&mut rec).map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
        })? {
            match rec.deserialize::<O>(Some(&headers)) {
                Ok(obj) => objs.push(obj),
                Err(e) => {
                    skipped += 1;
                    log::warn!(
                        "Skipping undecodable row in {}: {} (values: {:?})",
                        file_name,
                        e,
                        rec.iter().collect::<Vec<_>>()
                    );
                }
            }
        }
        log::debug!(
            "Read {} rows from {} ({} skipped)",
            objs.len(),
            file_name,
            skipped
        );
        Ok(objs)
    }

    fn read_obj_sqlite3<O: Table>(conn: &Connection) -> Result<Vec<O>, Error> {
        RawFeed::check_table_exists(conn, O::SQLITE_TABLE)?;
        let headers = RawFeed::get_column_names(conn, O::SQLITE_TABLE)?
            .into_iter()
            .collect::<StringRecord>();
        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", O::SQLITE_TABLE))?;
        let mut rows = stmt.query([])?;
        let mut objs = Vec::new();
        // Rusqlite does not natively support deserializing rows so we convert to StringRecord
        while let Some(row) = rows.next()? {
            let mut rec = StringRecord::with_capacity(64, headers.len());
            for i in 0..headers.len() {
                rec.push_field(&sqlite_value_to_string(row.get_ref(i)?));
            }
            match rec.deserialize::<O>(Some(&headers)) {
                Ok(obj) => objs.push(obj),
                Err(e) => log::warn!(
                    "Skipping undecodable row in {}: {}",
                    O::SQLITE_TABLE,
                    e
                ),
            }
        }
        log::debug!("Read {} rows from {}", objs.len(), O::SQLITE_TABLE);
        Ok(objs)
    }

    fn get_column_names(conn: &Connection, table_name: &str) -> Result<Vec<String>, Error> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table_name))?;
        let rows = stmt.query_map([], |row| row.get(1))?;

        let mut column_names: Vec<String> = Vec::new();
        for row in rows {
            column_names.push(row?);
        }

        Ok(column_names)
    }

    fn check_table_exists(conn: &Connection, table_name: &str) -> Result<(), Error> {
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?")?;
        let mut rows = stmt.query(params![table_name])?;
        if rows.next()?.is_none() {
            Err(Error::MissingFile(table_name.to_owned()))
        } else {
            Ok(())
        }
    }
}

fn is_sqlite3(path: &Path) -> Result<bool, Error> {
    let mut header = [0u8; 16];
    let mut file = File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) => Ok(&header == SQLITE_HEADER),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(Error::IO(e)),
    }
}

fn sqlite_value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
