use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser};

use rail_lines::gtfs::fetch::FeedSource;
use rail_lines::lines::error::Error;
use rail_lines::lines::export::{write_network, ExportOptions};
use rail_lines::lines::network::LineNetwork;

/// Build rail stop, line and direction label data from a GTFS static feed.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["gtfs_path", "url"])))]
struct Args {
    /// GTFS zip archive, directory or sqlite3 database
    #[arg(long)]
    gtfs_path: Option<PathBuf>,

    /// URL of a GTFS zip archive
    #[arg(long)]
    url: Option<String>,

    /// Output directory for the JSON files
    #[arg(long, default_value = "src/lib/data")]
    out_dir: PathBuf,

    /// Prefix of the output file names
    #[arg(long, default_value = "lirr")]
    prefix: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Timeout for downloading the feed, in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Print feed and network statistics
    #[arg(long)]
    stats: bool,
}

impl Args {
    fn source(&self) -> FeedSource {
        match (&self.gtfs_path, &self.url) {
            (Some(path), _) => FeedSource::Path(path.clone()),
            (None, Some(url)) => FeedSource::Url(url.clone()),
            // clap requires one of the two
            (None, None) => unreachable!(),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let feed = args
        .source()
        .load(Duration::from_secs(args.timeout_secs))?;
    if args.stats {
        feed.print_stats();
    }

    log::info!("Building line network from GTFS");
    let network = LineNetwork::from_feed(&feed);
    if args.stats {
        network.print_stats();
    }

    let options = ExportOptions {
        prefix: args.prefix.clone(),
        pretty: args.pretty,
    };
    write_network(&network, &args.out_dir, &options)?;
    Ok(())
}
