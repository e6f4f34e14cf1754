use serde::{Deserialize, Serialize};

/// Gridded datasets that can be reduced to a basin average.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum GridDataset {
    /// MODDRFS dust radiative forcing, W/m^2
    Forcing,
    /// NDFD air temperature forecast, degrees C
    NdfdTemp,
    /// NDFD quantitative precipitation forecast, inches
    NdfdQpf,
}

impl GridDataset {
    /// Key used in the `grid_points` / `grid_values` cache tables.
    pub fn key(&self) -> &'static str {
        match self {
            GridDataset::Forcing => "forcing",
            GridDataset::NdfdTemp => "ndfd_temp",
            GridDataset::NdfdQpf => "ndfd_qpf",
        }
    }

    pub fn from_key(key: &str) -> Option<GridDataset> {
        match key.trim() {
            "forcing" => Some(GridDataset::Forcing),
            "ndfd_temp" => Some(GridDataset::NdfdTemp),
            "ndfd_qpf" => Some(GridDataset::NdfdQpf),
            _ => None,
        }
    }
}

/// Inclusive `[min, max]` bound on one grid point attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttrRange {
    pub min: f64,
    pub max: f64,
}

impl AttrRange {
    pub fn new(min: f64, max: f64) -> Self {
        AttrRange { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl From<[f64; 2]> for AttrRange {
    fn from(pair: [f64; 2]) -> Self {
        AttrRange::new(pair[0], pair[1])
    }
}

/// Basin and attribute constraints of the spatial screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinFilter {
    pub basin: String,
    pub elevation: AttrRange,
    pub aspect: AttrRange,
    pub slope: AttrRange,
}

impl BasinFilter {
    /// False when an inverted range means no point can pass.
    pub fn is_satisfiable(&self) -> bool {
        self.elevation.is_valid() && self.aspect.is_valid() && self.slope.is_valid()
    }
}
