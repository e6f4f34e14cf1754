//! Meteorology figure for the SHREAD dashboard.
//!
//! [`get_met_plot`] screens the selected SNOTEL and CSAS sites, reduces
//! gridded forcing and NWS forecasts to basin averages, aligns everything
//! on one date index and returns a [`Figure`] ready to serialize as
//! plotly JSON.

pub mod assembler;
pub mod context;
pub mod figure;
pub mod request;
pub mod traces;

pub use assembler::get_met_plot;
pub use context::MetContext;
pub use figure::{Figure, Trace, TraceRole};
pub use request::{ForecastVar, MetPlotRequest, SourceMode};
