//! The Plot Assembler: one request in, one figure out.

use crate::context::MetContext;
use crate::figure::{Figure, Layout, Legend, Margin, Title, Trace, XAxis, YAxis};
use crate::request::{ForecastVar, MetPlotRequest};
use crate::traces;
use chrono::{NaiveDateTime, Utc};
use shread_core::csas::{csas_met_profile, CsasMetProfile, PY_DOWN, PY_UP};
use shread_core::date_index::{DateIndex, Resolution};
use shread_core::grid::GridDataset;
use shread_core::site::{Site, SiteFamily};
use shread_data::axis::{AxisExtents, AxisRanges};
use shread_data::basin::{ba_stats, Aggregation, BasinAverage};
use shread_data::derived::{inverted_albedo_series, to_fahrenheit};
use shread_data::series::{frame_column, has_data};
use shread_utils::dates::{parse_datetime, start_of_day};
use std::collections::HashSet;

/// SNOTEL daily mean air temperature, degrees F.
pub const SNOTEL_TEMP: &str = "TAVG";
/// SNOTEL daily precipitation increment, inches.
pub const SNOTEL_PRECIP: &str = "PREC";

const TEMP_LABEL: &str = "Avg. Temp (F)";
const FORCING_SUFFIX: &str = " | Forcing [W/m^2]";
const ALBEDO_SUFFIX: &str = " | 100% - Albedo";
const PRECIP_LABEL: &str = "Inc. Precip (in)";

struct SnotelSeries<'a> {
    site: &'a Site,
    temp: Vec<Option<f64>>,
    precip: Vec<Option<f64>>,
}

struct CsasSeries<'a> {
    site: &'a Site,
    temp: Vec<Option<f64>>,
    albedo: Option<Vec<Option<f64>>>,
}

/// Build the meteorology figure for one request.
///
/// Missing data never fails the request: an empty screen simply leaves
/// its trace out and contributes nothing to the axis ranges. Only an
/// invalid request is an error.
///
/// ```
/// use chrono::NaiveDate;
/// use shread_core::site::SiteRegistry;
/// use shread_db::Database;
/// use shread_plot::{get_met_plot, MetContext, MetPlotRequest};
///
/// let ctx = MetContext::new(SiteRegistry::load().unwrap(), Database::new().unwrap());
/// let req = MetPlotRequest::new(
///     NaiveDate::from_ymd_opt(2021, 12, 3).unwrap(),
///     NaiveDate::from_ymd_opt(2021, 12, 14).unwrap(),
/// );
/// let fig = get_met_plot(&ctx, &req).unwrap();
/// assert_eq!(fig.data.len(), 2);
/// ```
pub fn get_met_plot(ctx: &MetContext, req: &MetPlotRequest) -> anyhow::Result<Figure> {
    req.validate()?;
    log::info!(
        "[SHREAD] assembler: Updating meteorology plot for {} {}..{} ({})",
        req.basin,
        req.start_date,
        req.end_date,
        req.resolution.code()
    );

    let index = DateIndex::new(req.start_date, req.end_date, req.resolution)?;
    let daily = index.daily();
    let mut extents = AxisExtents::default();
    let mut ylabel = TEMP_LABEL.to_string();

    // NWS forecast, stored in degrees C and inches
    let forecast_temp = forecast_series(ctx, req, ForecastVar::Temperature, &index)
        .map(|v| to_fahrenheit(&v));
    let forecast_precip = forecast_series(ctx, req, ForecastVar::Precipitation, &index);
    if let Some(t) = &forecast_temp {
        extents.add_temperature(t);
    }
    if let Some(p) = &forecast_precip {
        extents.add_precipitation(p);
    }

    let forcing = if req.plot_forcing {
        basin_average(ctx, req, GridDataset::Forcing, true)
    } else {
        None
    };
    let forcing_mean = forcing.as_ref().map(|ba| ba.mean_on(&index));
    let forcing_median = forcing.as_ref().and_then(|ba| ba.median_on(&index));
    if let Some(mean) = &forcing_mean {
        ylabel.push_str(FORCING_SUFFIX);
        extents.add_upper(mean);
    }
    if let Some(median) = &forcing_median {
        extents.add_upper(median);
    }

    let snotel = screen_snotel(ctx, req, &daily);
    for s in &snotel {
        extents.add_temperature(&s.temp);
        extents.add_precipitation(&s.precip);
    }

    let csas = screen_csas(ctx, req, &index);
    for c in &csas {
        extents.add_temperature(&c.temp);
        if let Some(a) = &c.albedo {
            extents.add_upper(a);
        }
    }
    if csas.iter().any(|c| c.albedo.is_some()) {
        ylabel.push_str(ALBEDO_SUFFIX);
    }

    let ranges = extents.ranges();
    log::debug!("[SHREAD] assembler: axis ranges {:?}", ranges);

    let mut data: Vec<Trace> = vec![traces::freeze_line(&daily)];
    if let Some(p) = forecast_precip {
        data.push(traces::forecast_precip_bar(&index, p));
    }
    for s in snotel {
        if has_data(&s.precip) {
            data.push(traces::site_precip_bar(s.site, &daily, s.precip));
        }
        if has_data(&s.temp) {
            data.push(traces::site_temp_line(s.site, &daily, s.temp));
        }
    }
    let mut albedo_traces = Vec::new();
    for c in csas {
        if has_data(&c.temp) {
            data.push(traces::csas_temp_line(c.site, &index, c.temp));
        }
        if let Some(a) = c.albedo {
            albedo_traces.push(traces::albedo_line(c.site, &index, a));
        }
    }
    data.extend(albedo_traces);
    if let Some(t) = forecast_temp {
        data.push(traces::forecast_temp_line(&index, t));
    }
    if let Some(mean) = forcing_mean {
        data.push(traces::forcing_mean_line(&index, mean));
    }
    if let Some(median) = forcing_median {
        data.push(traces::forcing_median_line(&index, median));
    }
    let forecast_start = start_of_day(&req.forecast_start.unwrap_or_else(|| Utc::now().date_naive()));
    data.push(traces::shade_forecast(
        &index,
        &forecast_start,
        ranges.primary[0],
        ranges.primary[1],
    ));

    log::info!("[SHREAD] assembler: Built figure with {} traces", data.len());
    Ok(Figure {
        data,
        layout: layout(&index, &ylabel, &ranges),
    })
}

/// Selection ids with repeats removed, first occurrence wins.
fn unique_in_order(selection: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    selection
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn screen_snotel<'a>(ctx: &'a MetContext, req: &MetPlotRequest, daily: &DateIndex) -> Vec<SnotelSeries<'a>> {
    let source = ctx.snotel_source(req.mode);
    let mut out = Vec::with_capacity(req.snotel_sel.len());
    for site_id in unique_in_order(&req.snotel_sel) {
        let Some(site) = ctx.registry.find_in(SiteFamily::Snotel, site_id) else {
            log::warn!("[SHREAD] assembler: unknown SNOTEL site {}, skipping", site_id);
            continue;
        };
        // SNOTEL is only published as daily values
        let frame = source.screen(
            site_id,
            &[SNOTEL_TEMP, SNOTEL_PRECIP],
            req.start_date,
            req.end_date,
            Resolution::Daily,
        );
        if frame.is_empty() {
            log::warn!("[SHREAD] assembler: no SNOTEL data for {} in range", site_id);
        }
        out.push(SnotelSeries {
            site,
            temp: frame_column(&frame, SNOTEL_TEMP, daily),
            precip: frame_column(&frame, SNOTEL_PRECIP, daily),
        });
    }
    out
}

fn screen_csas<'a>(ctx: &'a MetContext, req: &MetPlotRequest, index: &DateIndex) -> Vec<CsasSeries<'a>> {
    let source = ctx.csas_source();
    let mut out = Vec::new();
    for site_id in unique_in_order(&req.csas_sel) {
        let Some(profile) = csas_met_profile(site_id) else {
            log::info!("[SHREAD] assembler: {} has no meteorology, dropped from selection", site_id);
            continue;
        };
        let Some(site) = ctx.registry.find_in(SiteFamily::Csas, site_id) else {
            log::warn!("[SHREAD] assembler: unknown CSAS site {}, skipping", site_id);
            continue;
        };
        let frame = source.screen(
            site_id,
            &profile.variables(req.resolution),
            req.start_date,
            req.end_date,
            req.resolution,
        );
        if frame.is_empty() {
            log::warn!("[SHREAD] assembler: no CSAS data for {} in range", site_id);
        }
        let temp = to_fahrenheit(&frame_column(&frame, profile.temperature_var(req.resolution), index));
        out.push(CsasSeries {
            site,
            temp,
            albedo: albedo_for(profile, req, &frame, index),
        });
    }
    out
}

fn albedo_for(
    profile: &CsasMetProfile,
    req: &MetPlotRequest,
    frame: &shread_core::observation::SiteFrame,
    index: &DateIndex,
) -> Option<Vec<Option<f64>>> {
    if !req.plot_albedo || !profile.albedo {
        return None;
    }
    let series = inverted_albedo_series(
        &frame_column(frame, PY_DOWN, index),
        &frame_column(frame, PY_UP, index),
    );
    has_data(&series).then_some(series)
}

/// Screen a gridded dataset and reduce it to a basin average, or `None`
/// when nothing passed the screen.
fn basin_average(
    ctx: &MetContext,
    req: &MetPlotRequest,
    dataset: GridDataset,
    with_median: bool,
) -> Option<BasinAverage> {
    let filter = req.basin_filter();
    if !filter.is_satisfiable() {
        log::warn!(
            "[SHREAD] assembler: inverted attribute range, {} screen is empty",
            dataset.key()
        );
        return None;
    }
    let cells = match ctx
        .cache
        .screen_points(dataset, &filter, req.start_date, req.end_date)
    {
        Ok(cells) => cells,
        Err(e) => {
            log::warn!("[SHREAD] assembler: {} screen failed: {}", dataset.key(), e);
            return None;
        }
    };
    let values: Vec<(NaiveDateTime, f64)> = cells
        .iter()
        .filter_map(|c| parse_datetime(&c.datetime).ok().map(|dt| (dt, c.value)))
        .collect();
    // Spatial reduction on native steps first, then onto the index resolution
    let ba = ba_stats(&values, with_median)
        .resample(req.resolution, Aggregation::for_dataset(dataset));
    if ba.is_empty() {
        log::info!("[SHREAD] assembler: no {} cells for selection", dataset.key());
        None
    } else {
        Some(ba)
    }
}

fn forecast_series(
    ctx: &MetContext,
    req: &MetPlotRequest,
    var: ForecastVar,
    index: &DateIndex,
) -> Option<Vec<Option<f64>>> {
    if !req.wants_forecast(var) {
        return None;
    }
    basin_average(ctx, req, var.dataset(), false)
        .map(|ba| ba.mean_on(index))
        .filter(|v| has_data(v))
}

fn layout(index: &DateIndex, ylabel: &str, ranges: &AxisRanges) -> Layout {
    Layout {
        margin: Margin {
            l: 40,
            b: 40,
            t: 0,
            r: 40,
        },
        height: 400,
        legend: Legend {
            x: 0.0,
            y: 1.0,
            bgcolor: "rgba(255,255,255,0.8)".to_string(),
        },
        hovermode: "closest".to_string(),
        plot_bgcolor: "white".to_string(),
        xaxis: XAxis {
            range: index.first().into_iter().chain(index.last()).collect(),
            showline: true,
            linecolor: "black".to_string(),
            mirror: true,
        },
        yaxis: YAxis {
            title: Title {
                text: ylabel.to_string(),
            },
            range: ranges.primary,
            showline: Some(true),
            linecolor: Some("black".to_string()),
            mirror: Some(true),
            side: None,
            overlaying: None,
        },
        yaxis2: YAxis {
            title: Title {
                text: PRECIP_LABEL.to_string(),
            },
            range: ranges.secondary,
            showline: None,
            linecolor: None,
            mirror: None,
            side: Some("right".to_string()),
            overlaying: Some("y".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{TraceKind, TraceRole};
    use crate::request::SourceMode;
    use chrono::NaiveDate;
    use shread_core::observation::{ObservationSource, SiteFrame};
    use shread_core::site::SiteRegistry;
    use shread_db::Database;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 12, d).unwrap()
    }

    /// Cache with SASP, PTSP and one SNOTEL site over 2021-12-03..14, plus
    /// forcing and forecast grids in the Animas basin.
    fn sample_db() -> Database {
        let db = Database::new().unwrap();
        let mut sasp = String::from("date,UpAir_Avg_C,PyUp_Unfilt_W,PyDwn_Unfilt_W\n");
        let mut ptsp = String::from("date,Air_Avg_C,PyUp_Unfilt_W,PyDwn_Unfilt_W\n");
        let mut snotel = String::new();
        let mut grid = String::new();
        for d in 3..=14 {
            let t = -10.0 + d as f64; // -7 .. 4 C
            sasp.push_str(&format!("2021-12-{:02},{},200.0,{}\n", d, t, 150.0 + d as f64));
            ptsp.push_str(&format!("2021-12-{:02},{},200.0,180.0\n", d, t + 2.0));
            snotel.push_str(&format!("713:CO:SNTL,dv,2021-12-{:02},TAVG,{}\n", d, 20 + d));
            snotel.push_str(&format!("713:CO:SNTL,dv,2021-12-{:02},PREC,{}\n", d, 0.1 * (d % 3) as f64));
            grid.push_str(&format!("forcing,p001,2021-12-{:02},{}\n", d, 40.0 + d as f64));
            grid.push_str(&format!("forcing,p002,2021-12-{:02},{}\n", d, 60.0 + d as f64));
            grid.push_str(&format!("forcing,p003,2021-12-{:02},500.0\n", d));
        }
        grid.push_str("ndfd_temp,n001,2021-12-13 06:00,-2.0\n");
        grid.push_str("ndfd_temp,n001,2021-12-13 18:00,4.0\n");
        grid.push_str("ndfd_temp,n001,2021-12-14 06:00,0.0\n");
        grid.push_str("ndfd_qpf,n001,2021-12-13 06:00,0.6\n");
        grid.push_str("ndfd_qpf,n001,2021-12-14 06:00,0.2\n");
        db.load_csas_export("SASP", Resolution::Daily, &sasp).unwrap();
        db.load_csas_export("PTSP", Resolution::Daily, &ptsp).unwrap();
        db.load_observations(&snotel).unwrap();
        db.load_grid_points(
            "DATASET,POINT_ID,BASIN,ELEV_FT,ASPECT,SLOPE
forcing,p001,Animas,11200,135,18
forcing,p002,Animas,10400,180,12
forcing,p003,Uncompahgre,11000,90,10
ndfd_temp,n001,Animas,11000,180,10
ndfd_qpf,n001,Animas,11000,180,10
",
        )
        .unwrap();
        db.load_grid_values(&grid).unwrap();
        db
    }

    fn ctx() -> MetContext {
        MetContext::new(SiteRegistry::load().unwrap(), sample_db())
    }

    fn request() -> MetPlotRequest {
        let mut req = MetPlotRequest::new(ymd(3), ymd(14));
        req.forecast_start = Some(ymd(13));
        req
    }

    fn assert_x_within_index(fig: &Figure, index: &DateIndex) {
        for t in &fig.data {
            assert!(
                t.x.iter().all(|x| index.position(x).is_some()),
                "trace {} has x outside the index",
                t.name
            );
            if t.role != TraceRole::ForecastShade {
                assert_eq!(t.x.len(), t.y.len(), "trace {}", t.name);
            }
        }
    }

    #[test]
    fn test_empty_selection_gives_two_traces() {
        let fig = get_met_plot(&ctx(), &request()).unwrap();
        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.data[0].role, TraceRole::FreezeLine);
        assert_eq!(fig.data[1].role, TraceRole::ForecastShade);
        assert_eq!(fig.layout.yaxis.range, [0.0, 40.0]);
        assert_eq!(fig.layout.yaxis2.range, [1.0, 0.0]);
        assert_eq!(fig.layout.yaxis.title.text, "Avg. Temp (F)");
    }

    #[test]
    fn test_empty_cache_with_selections_still_builds() {
        let ctx = MetContext::new(SiteRegistry::load().unwrap(), Database::new().unwrap());
        let mut req = request();
        req.snotel_sel = vec!["713:CO:SNTL".to_string()];
        req.csas_sel = vec!["SASP".to_string()];
        req.plot_albedo = true;
        req.plot_forcing = true;
        req.forecast_vars = vec![ForecastVar::Temperature, ForecastVar::Precipitation];
        let fig = get_met_plot(&ctx, &req).unwrap();
        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.layout.yaxis.title.text, "Avg. Temp (F)");
    }

    #[test]
    fn test_sasp_daily_with_albedo() {
        let mut req = request();
        req.csas_sel = vec!["SASP".to_string()];
        req.plot_albedo = true;
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let index = DateIndex::new(ymd(3), ymd(14), Resolution::Daily).unwrap();
        assert_eq!(index.len(), 12);
        assert_x_within_index(&fig, &index);

        let temps: Vec<_> = fig.traces_with_role(TraceRole::CsasTemp).collect();
        assert_eq!(temps.len(), 1);
        assert_eq!(temps[0].name, "SASP Avg. Temp.");
        assert_eq!(temps[0].x.len(), 12);
        // -7 C on Dec 3
        assert!((temps[0].y[0].unwrap() - 19.4).abs() < 1e-9);

        let albedo: Vec<_> = fig.traces_with_role(TraceRole::Albedo).collect();
        assert_eq!(albedo.len(), 1);
        assert_eq!(albedo[0].name, "SASP 100% - Albedo");
        assert!(albedo[0].y.iter().flatten().all(|v| (0.0..=100.0).contains(v)));

        assert!(fig.layout.yaxis.range[1] >= 40.0);
        assert_eq!(fig.layout.yaxis.title.text, "Avg. Temp (F) | 100% - Albedo");
        assert_eq!(fig.data.last().unwrap().role, TraceRole::ForecastShade);
    }

    #[test]
    fn test_ptsp_has_no_albedo_trace() {
        let mut req = request();
        req.csas_sel = vec!["PTSP".to_string()];
        req.plot_albedo = true;
        let fig = get_met_plot(&ctx(), &req).unwrap();
        assert_eq!(fig.traces_with_role(TraceRole::CsasTemp).count(), 1);
        assert_eq!(fig.traces_with_role(TraceRole::Albedo).count(), 0);
        assert_eq!(fig.layout.yaxis.title.text, "Avg. Temp (F)");
    }

    #[test]
    fn test_sbsg_is_dropped_from_met_selection() {
        let mut req = request();
        req.csas_sel = vec!["SBSG".to_string(), "SASP".to_string()];
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let names: Vec<_> = fig.traces_with_role(TraceRole::CsasTemp).map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["SASP Avg. Temp."]);
    }

    #[test]
    fn test_trace_order_with_everything_selected() {
        let mut req = request();
        req.snotel_sel = vec!["713:CO:SNTL".to_string()];
        req.csas_sel = vec!["SASP".to_string(), "PTSP".to_string()];
        req.plot_albedo = true;
        req.plot_forcing = true;
        req.forecast_vars = vec![ForecastVar::Temperature, ForecastVar::Precipitation];
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let roles: Vec<_> = fig.data.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                TraceRole::FreezeLine,
                TraceRole::ForecastPrecip,
                TraceRole::SitePrecip,
                TraceRole::SiteTemp,
                TraceRole::CsasTemp,
                TraceRole::CsasTemp,
                TraceRole::Albedo,
                TraceRole::ForecastTemp,
                TraceRole::ForcingMean,
                TraceRole::ForcingMedian,
                TraceRole::ForecastShade,
            ]
        );
        assert_eq!(
            fig.layout.yaxis.title.text,
            "Avg. Temp (F) | Forcing [W/m^2] | 100% - Albedo"
        );
        let index = DateIndex::new(ymd(3), ymd(14), Resolution::Daily).unwrap();
        assert_x_within_index(&fig, &index);

        let precip = &fig.data[2];
        assert_eq!(precip.kind, TraceKind::Bar);
        assert_eq!(precip.yaxis, "y2");
        assert!(precip.name.ends_with("Daily Precip."));
        assert_eq!(precip.marker.as_ref().unwrap().color, "#aec7e8");
    }

    #[test]
    fn test_forcing_stays_inside_basin() {
        let mut req = request();
        req.plot_forcing = true;
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let mean = fig.traces_with_role(TraceRole::ForcingMean).next().unwrap();
        // p003 (500 W/m^2) is in another basin
        assert_eq!(mean.y[0], Some(53.0));
        // max forcing is 64 on Dec 14
        assert!((fig.layout.yaxis.range[1] - 64.0 * 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_is_averaged_per_day() {
        let mut req = request();
        req.forecast_vars = vec![ForecastVar::Temperature, ForecastVar::Precipitation];
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let temp = fig.traces_with_role(TraceRole::ForecastTemp).next().unwrap();
        // mean of -2 C and 4 C on Dec 13
        assert!((temp.y[10].unwrap() - 33.8).abs() < 1e-9);
        assert_eq!(temp.y[0], None);
        // 0.6 in tops the secondary axis
        assert!((fig.layout.yaxis2.range[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_precip_accumulates_per_day() {
        let db = Database::new().unwrap();
        db.load_grid_points(
            "DATASET,POINT_ID,BASIN,ELEV_FT,ASPECT,SLOPE
ndfd_qpf,q001,Animas,11000,180,10
",
        )
        .unwrap();
        db.load_grid_values(
            "ndfd_qpf,q001,2021-12-13 00:00,0.1
ndfd_qpf,q001,2021-12-13 06:00,0.2
ndfd_qpf,q001,2021-12-13 12:00,0.3
ndfd_qpf,q001,2021-12-13 18:00,0.4
",
        )
        .unwrap();
        let ctx = MetContext::new(SiteRegistry::load().unwrap(), db);
        let mut req = request();
        req.forecast_vars = vec![ForecastVar::Precipitation];
        let fig = get_met_plot(&ctx, &req).unwrap();
        let bar = fig.traces_with_role(TraceRole::ForecastPrecip).next().unwrap();
        assert!((bar.y[10].unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(bar.y[11], None);
        assert!((fig.layout.yaxis2.range[0] - 5.0).abs() < 1e-9);
        assert_eq!(fig.layout.yaxis2.range[1], 0.0);

        // hourly stamps keep the 6-hour totals
        req.resolution = Resolution::Instantaneous;
        let fig = get_met_plot(&ctx, &req).unwrap();
        let bar = fig.traces_with_role(TraceRole::ForecastPrecip).next().unwrap();
        let six_am = ymd(13).and_hms_opt(6, 0, 0).unwrap();
        let at = bar.x.iter().position(|x| *x == six_am).unwrap();
        assert!((bar.y[at].unwrap() - 0.2).abs() < 1e-9);
        assert!((fig.layout.yaxis2.range[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_range_only_empties_gridded_overlays() {
        let mut req = request();
        req.elevation = shread_core::grid::AttrRange::new(12000.0, 9000.0);
        req.csas_sel = vec!["SASP".to_string()];
        req.plot_forcing = true;
        req.forecast_vars = vec![ForecastVar::Temperature];
        let fig = get_met_plot(&ctx(), &req).unwrap();
        assert_eq!(fig.traces_with_role(TraceRole::CsasTemp).count(), 1);
        assert_eq!(fig.traces_with_role(TraceRole::ForcingMean).count(), 0);
        assert_eq!(fig.traces_with_role(TraceRole::ForecastTemp).count(), 0);
        assert_eq!(fig.layout.yaxis.title.text, "Avg. Temp (F)");
    }

    #[test]
    fn test_repeated_selections_draw_once() {
        let mut req = request();
        req.snotel_sel = vec!["713:CO:SNTL".to_string(), "713:CO:SNTL".to_string()];
        req.csas_sel = vec!["PTSP".to_string(), "SASP".to_string(), "PTSP".to_string()];
        let fig = get_met_plot(&ctx(), &req).unwrap();
        assert_eq!(fig.traces_with_role(TraceRole::SiteTemp).count(), 1);
        assert_eq!(fig.traces_with_role(TraceRole::SitePrecip).count(), 1);
        let names: Vec<_> = fig.traces_with_role(TraceRole::CsasTemp).map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["PTSP Avg. Temp.", "SASP Avg. Temp."]);
    }

    #[test]
    fn test_window_ending_on_last_representable_day() {
        let last = NaiveDate::MAX;
        let mut req = MetPlotRequest::new(last.pred_opt().unwrap(), last);
        req.forecast_start = Some(last);
        let fig = get_met_plot(&ctx(), &req).unwrap();
        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.data[0].x.len(), 2);
    }

    #[test]
    fn test_hourly_request_keeps_snotel_on_daily_stamps() {
        let mut req = request();
        req.resolution = Resolution::Instantaneous;
        req.snotel_sel = vec!["713:CO:SNTL".to_string()];
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let index = DateIndex::new(ymd(3), ymd(14), Resolution::Instantaneous).unwrap();
        assert_eq!(index.len(), 11 * 24 + 1);
        assert_x_within_index(&fig, &index);
        let temp = fig.traces_with_role(TraceRole::SiteTemp).next().unwrap();
        assert_eq!(temp.x.len(), 12);
        assert_eq!(fig.layout.xaxis.range, vec![index.first().unwrap(), index.last().unwrap()]);
    }

    #[test]
    fn test_forecast_start_after_window_gives_empty_shade() {
        let mut req = request();
        req.forecast_start = Some(ymd(30));
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let shade = fig.data.last().unwrap();
        assert_eq!(shade.role, TraceRole::ForecastShade);
        assert!(shade.x.is_empty());
    }

    struct DownSource;

    impl ObservationSource for DownSource {
        fn screen(
            &self,
            site_id: &str,
            _variables: &[&str],
            _start_date: NaiveDate,
            _end_date: NaiveDate,
            _resolution: Resolution,
        ) -> SiteFrame {
            SiteFrame::new(site_id)
        }
    }

    #[test]
    fn test_live_outage_omits_snotel_traces() {
        let ctx = ctx().with_live_source(Box::new(DownSource));
        let mut req = request();
        req.mode = SourceMode::Live;
        req.snotel_sel = vec!["713:CO:SNTL".to_string()];
        let fig = get_met_plot(&ctx, &req).unwrap();
        assert_eq!(fig.data.len(), 2);

        req.mode = SourceMode::Offline;
        let fig = get_met_plot(&ctx, &req).unwrap();
        assert_eq!(fig.data.len(), 4);
    }

    #[test]
    fn test_invalid_request_is_an_error() {
        let req = MetPlotRequest::new(ymd(14), ymd(3));
        assert!(get_met_plot(&ctx(), &req).is_err());
    }

    #[test]
    fn test_axis_bounds_bracket_freezing() {
        let mut req = request();
        req.snotel_sel = vec!["713:CO:SNTL".to_string()];
        req.csas_sel = vec!["SASP".to_string()];
        let fig = get_met_plot(&ctx(), &req).unwrap();
        let [lo, hi] = fig.layout.yaxis.range;
        assert!(lo <= 0.0 && 0.0 <= 32.0 && 32.0 <= hi);
    }
}
