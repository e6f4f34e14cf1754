//! Renderer-neutral figure model.
//!
//! Field names follow the plotly JSON schema so a serialized [`Figure`]
//! can be handed straight to the dashboard's plotting layer.

use chrono::NaiveDateTime;
use serde::Serialize;

/// What a trace represents. Not serialized; used for ordering and lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceRole {
    FreezeLine,
    ForecastPrecip,
    SitePrecip,
    SiteTemp,
    CsasTemp,
    Albedo,
    ForecastTemp,
    ForcingMean,
    ForcingMedian,
    ForecastShade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
}

/// One trace of the figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(skip)]
    pub role: TraceRole,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub x: Vec<NaiveDateTime>,
    /// Gaps serialize as `null`, which the renderer draws as breaks.
    pub y: Vec<Option<f64>>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    pub yaxis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
}

impl Trace {
    /// A bare trace on the primary y axis; builders fill in the styling.
    pub fn new(role: TraceRole, kind: TraceKind, name: &str) -> Self {
        Trace {
            role,
            kind,
            x: Vec::new(),
            y: Vec::new(),
            name: name.to_string(),
            mode: None,
            line: None,
            marker: None,
            text: None,
            showlegend: None,
            yaxis: "y".to_string(),
            fill: None,
            fillcolor: None,
            hoverinfo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub b: u32,
    pub t: u32,
    pub r: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub bgcolor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    pub range: Vec<NaiveDateTime>,
    pub showline: bool,
    pub linecolor: String,
    pub mirror: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub title: Title,
    pub range: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub margin: Margin,
    pub height: u32,
    pub legend: Legend,
    pub hovermode: String,
    pub plot_bgcolor: String,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
    pub yaxis2: YAxis,
}

/// Traces plus layout; built once per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn traces_with_role(&self, role: TraceRole) -> impl Iterator<Item = &Trace> {
        self.data.iter().filter(move |t| t.role == role)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
