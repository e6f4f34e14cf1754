//! Command implementations for the SHREAD CLI.
//!
//! Provides subcommands for building the meteorology plot, refreshing the
//! SNOTEL cache from AWDB, and inspecting cache coverage.

use clap::Subcommand;
use shread_utils::dates::parse_date;

pub mod cache;
pub mod info;
pub mod plot;
pub mod query;
pub mod settings;

#[derive(Subcommand)]
pub enum Command {
    /// Build the meteorology figure and write it as plotly JSON
    Plot(plot::PlotArgs),

    /// Fetch SNOTEL observations from AWDB into a cache CSV (only new days)
    SnotelQuery {
        /// Output path for long-form observations (.csv or .csv.gz; updated in place)
        #[arg(short = 'o', long)]
        output: String,

        /// SNOTEL site triplets, comma separated; all known sites when omitted
        #[arg(long, value_delimiter = ',')]
        sites: Vec<String>,

        /// First day to fetch for sites not yet in the file (YYYY-MM-DD)
        #[arg(short = 's', long)]
        start: Option<String>,

        /// Last day to fetch (YYYY-MM-DD); defaults to today
        #[arg(short = 'e', long)]
        end: Option<String>,

        /// TOML settings file
        #[arg(short = 'c', long)]
        config: Option<String>,
    },

    /// Report the date coverage of the configured cache files
    CacheInfo {
        /// TOML settings file
        #[arg(short = 'c', long)]
        config: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Plot(args) => plot::run_plot(&args),
        Command::SnotelQuery {
            output,
            sites,
            start,
            end,
            config,
        } => {
            let settings = settings::Settings::load(config.as_deref())?;
            let start = start.as_deref().map(parse_date).transpose()?;
            let end = end.as_deref().map(parse_date).transpose()?;
            query::run_snotel_query(&output, &sites, start, end, &settings)
        }
        Command::CacheInfo { config, json } => info::run_cache_info(config.as_deref(), json),
    }
}
