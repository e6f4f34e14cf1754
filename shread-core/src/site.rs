use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

/// Embedded CSV data for the SNOTEL stations shown on the dashboard.
pub static SNOTEL_CSV: &str = include_str!("../../fixtures/snotel_sites.csv");

/// Embedded CSV data for the CSAS study plots and stream gauge.
pub static CSAS_CSV: &str = include_str!("../../fixtures/csas_sites.csv");

/// Which observation network a site belongs to.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum SiteFamily {
    Snotel,
    Csas,
}

/// A monitoring site with its plotting metadata.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Site identifier (SNOTEL triplet such as "713:CO:SNTL", or CSAS code such as "SASP")
    pub site_id: String,
    /// Station number as shown in labels
    pub site_no: String,
    /// Human-readable name of the site
    pub name: String,
    /// Elevation of the site in feet
    pub elev_ft: f64,
    /// Line color for temperature traces
    pub color: String,
    /// Bar color for precipitation traces
    pub prcp_color: String,
    pub family: SiteFamily,
}

impl Site {
    /// Legend label, e.g. "713 Red Mountain Pass (11075 ft)".
    pub fn label(&self) -> String {
        format!("{} {} ({} ft)", self.site_no, self.name, self.elev_ft.round())
    }

    /// Parse a CSV string of site data into a vector of Sites.
    ///
    /// Expected CSV columns: ID, SITE_NO, NAME, ELEV_FT, COLOR, PRCP_COLOR
    pub fn parse_site_csv(csv_object: &str, family: SiteFamily) -> Result<Vec<Site>, csv::Error> {
        let mut site_list: Vec<Site> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
            let site_id = field(0);
            if site_id.is_empty() {
                continue;
            }
            let elev_ft = record
                .get(3)
                .unwrap_or("0")
                .trim()
                .parse::<f64>()
                .unwrap_or(0.0);
            site_list.push(Site {
                site_no: field(1),
                name: field(2),
                elev_ft,
                color: field(4),
                prcp_color: field(5),
                site_id,
                family,
            });
        }
        Ok(site_list)
    }
}

/// Read-only reference table of every site the dashboard knows about.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRegistry {
    snotel: Vec<Site>,
    csas: Vec<Site>,
}

impl SiteRegistry {
    /// Load the registry from the embedded fixtures.
    pub fn load() -> Result<SiteRegistry, csv::Error> {
        SiteRegistry::from_csv(SNOTEL_CSV, CSAS_CSV)
    }

    pub fn from_csv(snotel_csv: &str, csas_csv: &str) -> Result<SiteRegistry, csv::Error> {
        let snotel = Site::parse_site_csv(snotel_csv, SiteFamily::Snotel)?;
        let csas = Site::parse_site_csv(csas_csv, SiteFamily::Csas)?;
        log::info!(
            "[SHREAD] registry: Loaded {} SNOTEL and {} CSAS sites",
            snotel.len(),
            csas.len()
        );
        Ok(SiteRegistry { snotel, csas })
    }

    /// Every site of one family, in fixture order.
    pub fn sites(&self, family: SiteFamily) -> &[Site] {
        match family {
            SiteFamily::Snotel => &self.snotel,
            SiteFamily::Csas => &self.csas,
        }
    }

    /// Look up a site restricted to one family.
    pub fn find_in(&self, family: SiteFamily, site_id: &str) -> Option<&Site> {
        self.sites(family).iter().find(|s| s.site_id == site_id)
    }
}
