//! Variable lookup for the CSAS study plots.
//!
//! Each plot logs its own set of sensors, so which column holds air
//! temperature (and whether albedo can be derived) is looked up here
//! instead of branching on site names at the call site. New plots are
//! added by extending [`CSAS_MET_PROFILES`].

use crate::date_index::Resolution;

/// Downward-facing pyranometer (reflected shortwave), W/m^2.
pub const PY_DOWN: &str = "PyDwn_Unfilt_W";
/// Upward-facing pyranometer (incoming shortwave), W/m^2.
pub const PY_UP: &str = "PyUp_Unfilt_W";

/// Sensors used for the meteorology plot at one CSAS site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsasMetProfile {
    pub site_id: &'static str,
    /// Daily-mean air temperature column, degrees C.
    pub temp_daily: &'static str,
    /// Hourly air temperature column, degrees C.
    pub temp_hourly: &'static str,
    /// Whether the plot carries the paired pyranometers needed for albedo.
    pub albedo: bool,
}

impl CsasMetProfile {
    pub fn temperature_var(&self, resolution: Resolution) -> &'static str {
        match resolution {
            Resolution::Daily => self.temp_daily,
            Resolution::Instantaneous => self.temp_hourly,
        }
    }

    /// Every column the plot needs from this site.
    pub fn variables(&self, resolution: Resolution) -> Vec<&'static str> {
        let mut vars = vec![self.temperature_var(resolution)];
        if self.albedo {
            vars.push(PY_DOWN);
            vars.push(PY_UP);
        }
        vars
    }
}

/// Met-capable CSAS sites. SBSG is a stream gauge and is absent on purpose.
pub static CSAS_MET_PROFILES: &[CsasMetProfile] = &[
    CsasMetProfile {
        site_id: "SASP",
        temp_daily: "UpAir_Avg_C",
        temp_hourly: "UpAir_Max_C",
        albedo: true,
    },
    CsasMetProfile {
        site_id: "SBSP",
        temp_daily: "UpAir_Avg_C",
        temp_hourly: "UpAir_Max_C",
        albedo: true,
    },
    CsasMetProfile {
        site_id: "PTSP",
        temp_daily: "Air_Avg_C",
        temp_hourly: "Air_Max_C",
        albedo: false,
    },
];

/// Looks up the met profile for a CSAS site. Returns `None` for sites
/// without meteorology (e.g. the SBSG stream gauge) and unknown codes.
pub fn csas_met_profile(site_id: &str) -> Option<&'static CsasMetProfile> {
    CSAS_MET_PROFILES.iter().find(|p| p.site_id == site_id)
}
