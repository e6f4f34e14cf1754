//! `plot` subcommand: build the meteorology figure and write it as JSON.

use crate::cache::open_cache;
use crate::settings::Settings;
use anyhow::{anyhow, bail};
use clap::Args;
use shread_core::awdb::AwdbClient;
use shread_core::date_index::Resolution;
use shread_core::grid::AttrRange;
use shread_core::site::SiteRegistry;
use shread_plot::{get_met_plot, ForecastVar, MetContext, MetPlotRequest, SourceMode};
use shread_utils::dates::parse_date;
use std::fs;

#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    /// Read the whole request from a JSON file instead of the flags below
    #[arg(long)]
    pub request: Option<String>,

    /// Basin name used by the spatial screen
    #[arg(short = 'b', long, default_value = "Animas")]
    pub basin: String,

    /// Elevation range in feet, as MIN,MAX
    #[arg(long, value_delimiter = ',', default_value = "0,15000")]
    pub elevation: Vec<f64>,

    /// Aspect range in degrees, as MIN,MAX
    #[arg(long, value_delimiter = ',', default_value = "0,360")]
    pub aspect: Vec<f64>,

    /// Slope range in degrees, as MIN,MAX
    #[arg(long, value_delimiter = ',', default_value = "0,90")]
    pub slope: Vec<f64>,

    /// First day of the window (YYYY-MM-DD)
    #[arg(short = 's', long)]
    pub start: Option<String>,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(short = 'e', long)]
    pub end: Option<String>,

    /// SNOTEL site triplets, comma separated
    #[arg(long, value_delimiter = ',')]
    pub snotel: Vec<String>,

    /// CSAS site codes, comma separated
    #[arg(long, value_delimiter = ',')]
    pub csas: Vec<String>,

    /// Plot 100% - albedo for CSAS sites that support it
    #[arg(long)]
    pub albedo: bool,

    /// Plot basin-average radiative forcing
    #[arg(long)]
    pub forcing: bool,

    /// Data resolution: dv (daily) or iv (hourly)
    #[arg(long, default_value = "dv")]
    pub dtype: String,

    /// NWS forecast overlays: temperature, precipitation
    #[arg(long, value_delimiter = ',')]
    pub forecast: Vec<String>,

    /// First forecast day (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub forecast_start: Option<String>,

    /// Fetch SNOTEL live from AWDB instead of the cache
    #[arg(long)]
    pub live: bool,

    /// Write the figure JSON here instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Pretty-print the JSON
    #[arg(long)]
    pub pretty: bool,

    /// TOML settings file
    #[arg(short = 'c', long)]
    pub config: Option<String>,
}

fn attr_range(name: &str, values: &[f64]) -> anyhow::Result<AttrRange> {
    match values {
        [min, max] => Ok(AttrRange::new(*min, *max)),
        _ => bail!("--{} expects MIN,MAX, got {} values", name, values.len()),
    }
}

fn forecast_var(name: &str) -> anyhow::Result<ForecastVar> {
    match name.trim().to_lowercase().as_str() {
        "temperature" | "temp" => Ok(ForecastVar::Temperature),
        "precipitation" | "precip" | "qpf" => Ok(ForecastVar::Precipitation),
        other => bail!("unknown forecast variable '{}'", other),
    }
}

impl PlotArgs {
    /// Build the request from a JSON file or from the flags.
    pub fn to_request(&self) -> anyhow::Result<MetPlotRequest> {
        if let Some(path) = &self.request {
            let mut req: MetPlotRequest = serde_json::from_str(&fs::read_to_string(path)?)?;
            if self.live {
                req.mode = SourceMode::Live;
            }
            return Ok(req);
        }

        let start = self
            .start
            .as_deref()
            .ok_or_else(|| anyhow!("--start is required without --request"))?;
        let end = self
            .end
            .as_deref()
            .ok_or_else(|| anyhow!("--end is required without --request"))?;
        let resolution = Resolution::from_code(&self.dtype)
            .ok_or_else(|| anyhow!("--dtype must be dv or iv, got '{}'", self.dtype))?;

        let mut req = MetPlotRequest::new(parse_date(start)?, parse_date(end)?);
        req.basin = self.basin.clone();
        req.elevation = attr_range("elevation", &self.elevation)?;
        req.aspect = attr_range("aspect", &self.aspect)?;
        req.slope = attr_range("slope", &self.slope)?;
        req.snotel_sel = self.snotel.clone();
        req.csas_sel = self.csas.clone();
        req.plot_albedo = self.albedo;
        req.plot_forcing = self.forcing;
        req.resolution = resolution;
        req.forecast_vars = self
            .forecast
            .iter()
            .map(|f| forecast_var(f))
            .collect::<anyhow::Result<_>>()?;
        req.forecast_start = self.forecast_start.as_deref().map(parse_date).transpose()?;
        if self.live {
            req.mode = SourceMode::Live;
        }
        Ok(req)
    }
}

pub fn run_plot(args: &PlotArgs) -> anyhow::Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let request = args.to_request()?;
    request.validate()?;

    let registry = SiteRegistry::load()?;
    let cache = open_cache(&settings.cache)?;
    let mut ctx = MetContext::new(registry, cache);
    if request.mode == SourceMode::Live {
        let client = AwdbClient::new(
            &settings.awdb.base_url,
            settings.awdb.timeout(),
            settings.awdb.max_tries,
        )?;
        ctx = ctx.with_live_source(Box::new(client));
    }

    let figure = get_met_plot(&ctx, &request)?;
    let json = if args.pretty {
        figure.to_json_pretty()?
    } else {
        figure.to_json()?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, &json)?;
            log::info!("[SHREAD] plot: Wrote {} traces to {}", figure.data.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
