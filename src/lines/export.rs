use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error::Error;
use super::network::LineNetwork;

/// How the derived tables are written to disk.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Prepended to every output file name
    pub prefix: String,
    /// Pretty-print the JSON instead of writing it compactly
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            prefix: "lirr".to_string(),
            pretty: false,
        }
    }
}

impl ExportOptions {
    pub fn stops_file(&self) -> String {
        format!("{}-stops.json", self.prefix)
    }

    pub fn line_stops_file(&self) -> String {
        format!("{}-line-stops.json", self.prefix)
    }

    pub fn routes_file(&self) -> String {
        format!("{}-routes.json", self.prefix)
    }

    pub fn direction_labels_file(&self) -> String {
        format!("{}-direction-labels.json", self.prefix)
    }
}

/// Write the four derived tables as JSON files into `out_dir`, creating it if needed
///
/// # Returns
/// The paths written, in the order stops, line stops, routes, direction labels
pub fn write_network(
    network: &LineNetwork,
    out_dir: &Path,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>, Error> {
    std::fs::create_dir_all(out_dir).map_err(|e| Error::Write {
        path: format!("{}", out_dir.display()),
        source: e,
    })?;

    let written = vec![
        write_json(&network.stops, &out_dir.join(options.stops_file()), options)?,
        write_json(
            &network.line_shapes,
            &out_dir.join(options.line_stops_file()),
            options,
        )?,
        write_json(&network.routes, &out_dir.join(options.routes_file()), options)?,
        write_json(
            &network.direction_labels,
            &out_dir.join(options.direction_labels_file()),
            options,
        )?,
    ];
    log::info!("Wrote {} files to {}", written.len(), out_dir.display());
    Ok(written)
}

fn write_json<T: Serialize>(
    value: &T,
    path: &Path,
    options: &ExportOptions,
) -> Result<PathBuf, Error> {
    let write_error = |e: std::io::Error| Error::Write {
        path: format!("{}", path.display()),
        source: e,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    if options.pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer.flush().map_err(write_error)?;
    log::debug!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}
