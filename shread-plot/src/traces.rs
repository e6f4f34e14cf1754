//! Builders for the individual traces of the meteorology figure.

use crate::figure::{Line, Marker, Trace, TraceKind, TraceRole};
use chrono::NaiveDateTime;
use shread_core::date_index::DateIndex;
use shread_core::site::Site;
use shread_data::axis::FREEZE_F;

const TEMP_TEXT: &str = "Degrees (F)";
const PRECIP_TEXT: &str = "Precip (in)";
const ALBEDO_TEXT: &str = "100% - Albedo";
const FORCING_TEXT: &str = "Forcing (W/m^2)";

const FORCING_LABEL: &str = "Radiative Forcing";
const FORCING_COLOR: &str = "green";
const FORECAST_COLOR: &str = "black";
const SHADE_COLOR: &str = "rgba(128,128,128,0.2)";

fn line(color: &str, dash: Option<&str>) -> Option<Line> {
    Some(Line {
        color: Some(color.to_string()),
        dash: dash.map(str::to_string),
        width: None,
    })
}

fn scatter(role: TraceRole, name: &str, index: &DateIndex, y: Vec<Option<f64>>, text: &str) -> Trace {
    let mut t = Trace::new(role, TraceKind::Scatter, name);
    t.x = index.stamps().to_vec();
    t.y = y;
    t.mode = Some("lines".to_string());
    t.text = Some(text.to_string());
    t
}

fn bar(role: TraceRole, name: &str, index: &DateIndex, y: Vec<Option<f64>>, color: &str) -> Trace {
    let mut t = Trace::new(role, TraceKind::Bar, name);
    t.x = index.stamps().to_vec();
    t.y = y;
    t.text = Some(PRECIP_TEXT.to_string());
    t.marker = Some(Marker {
        color: color.to_string(),
    });
    t.showlegend = Some(false);
    t.yaxis = "y2".to_string();
    t
}

/// Dashed 32F reference over the daily index.
pub fn freeze_line(daily: &DateIndex) -> Trace {
    let mut t = scatter(
        TraceRole::FreezeLine,
        &format!("{}F", FREEZE_F),
        daily,
        vec![Some(FREEZE_F); daily.len()],
        TEMP_TEXT,
    );
    t.showlegend = Some(false);
    t.line = line("grey", Some("dash"));
    t
}

pub fn forecast_precip_bar(index: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    bar(
        TraceRole::ForecastPrecip,
        "NWS Mean Precip for selection",
        index,
        y,
        FORECAST_COLOR,
    )
}

pub fn forecast_temp_line(index: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    let mut t = scatter(
        TraceRole::ForecastTemp,
        "NWS Mean Temp for selection",
        index,
        y,
        TEMP_TEXT,
    );
    t.line = line(FORECAST_COLOR, None);
    t
}

pub fn site_precip_bar(site: &Site, daily: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    bar(
        TraceRole::SitePrecip,
        &format!("{} Daily Precip.", site.label()),
        daily,
        y,
        &site.prcp_color,
    )
}

pub fn site_temp_line(site: &Site, daily: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    let mut t = scatter(
        TraceRole::SiteTemp,
        &format!("{} Avg. Temp.", site.label()),
        daily,
        y,
        TEMP_TEXT,
    );
    t.line = line(&site.color, None);
    t
}

/// CSAS temperature, dotted in the site color.
pub fn csas_temp_line(site: &Site, index: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    let mut t = scatter(
        TraceRole::CsasTemp,
        &format!("{} Avg. Temp.", site.site_id),
        index,
        y,
        TEMP_TEXT,
    );
    t.line = line(&site.color, Some("dot"));
    t
}

pub fn albedo_line(site: &Site, index: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    let mut t = scatter(
        TraceRole::Albedo,
        &format!("{} 100% - Albedo", site.site_id),
        index,
        y,
        ALBEDO_TEXT,
    );
    t.line = line(&site.color, Some("dash"));
    t
}

pub fn forcing_mean_line(index: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    let mut t = scatter(
        TraceRole::ForcingMean,
        &format!("{} Mean", FORCING_LABEL),
        index,
        y,
        FORCING_TEXT,
    );
    t.line = line(FORCING_COLOR, None);
    t
}

pub fn forcing_median_line(index: &DateIndex, y: Vec<Option<f64>>) -> Trace {
    let mut t = scatter(
        TraceRole::ForcingMedian,
        &format!("{} Median", FORCING_LABEL),
        index,
        y,
        FORCING_TEXT,
    );
    t.line = line(FORCING_COLOR, Some("dashdot"));
    t
}

/// Grey box from the first index stamp at or after `forecast_start` to the
/// end of the window, spanning `[ymin, ymax]`.
///
/// When the forecast starts after the window the trace is still emitted,
/// with empty x and y.
pub fn shade_forecast(
    index: &DateIndex,
    forecast_start: &NaiveDateTime,
    ymin: f64,
    ymax: f64,
) -> Trace {
    let mut t = Trace::new(TraceRole::ForecastShade, TraceKind::Scatter, "Forecast");
    if let (Some(first), Some(last)) = (index.first_at_or_after(forecast_start), index.last()) {
        t.x = vec![first, first, last, last, first];
        t.y = vec![Some(ymin), Some(ymax), Some(ymax), Some(ymin), Some(ymin)];
    }
    t.mode = Some("lines".to_string());
    t.fill = Some("toself".to_string());
    t.fillcolor = Some(SHADE_COLOR.to_string());
    t.line = Some(Line {
        color: None,
        dash: None,
        width: Some(0.0),
    });
    t.hoverinfo = Some("skip".to_string());
    t.showlegend = Some(false);
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shread_core::date_index::Resolution;
    use shread_utils::dates::start_of_day;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 12, d).unwrap()
    }

    fn index() -> DateIndex {
        DateIndex::new(ymd(3), ymd(14), Resolution::Daily).unwrap()
    }

    #[test]
    fn test_freeze_line_covers_daily_index() {
        let t = freeze_line(&index());
        assert_eq!(t.name, "32F");
        assert_eq!(t.x.len(), 12);
        assert!(t.y.iter().all(|v| *v == Some(32.0)));
        assert_eq!(t.showlegend, Some(false));
        assert_eq!(t.line.as_ref().unwrap().dash.as_deref(), Some("dash"));
    }

    #[test]
    fn test_shade_forecast_inside_window() {
        let idx = index();
        let t = shade_forecast(&idx, &start_of_day(&ymd(10)), -5.0, 50.0);
        assert_eq!(t.fill.as_deref(), Some("toself"));
        assert_eq!(t.x.first(), Some(&start_of_day(&ymd(10))));
        assert!(t.x.contains(&start_of_day(&ymd(14))));
        assert!(t.x.iter().all(|x| idx.position(x).is_some()));
        assert_eq!(t.y.iter().flatten().cloned().fold(f64::MIN, f64::max), 50.0);
    }

    #[test]
    fn test_shade_forecast_after_window_is_empty() {
        let t = shade_forecast(&index(), &start_of_day(&ymd(20)), 0.0, 40.0);
        assert!(t.x.is_empty());
        assert!(t.y.is_empty());
    }

    #[test]
    fn test_shade_forecast_before_window_covers_all() {
        let t = shade_forecast(&index(), &start_of_day(&ymd(1)), 0.0, 40.0);
        assert_eq!(t.x[0], start_of_day(&ymd(3)));
    }

    #[test]
    fn test_bars_go_on_secondary_axis() {
        let t = forecast_precip_bar(&index(), vec![None; 12]);
        assert_eq!(t.kind, TraceKind::Bar);
        assert_eq!(t.yaxis, "y2");
    }
}
