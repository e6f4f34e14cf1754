use crate::request::SourceMode;
use shread_core::observation::ObservationSource;
use shread_core::site::SiteRegistry;
use shread_db::Database;

/// Process-wide handles shared by every plot request.
///
/// Built once at start-up and passed by reference into [`crate::get_met_plot`].
pub struct MetContext {
    pub registry: SiteRegistry,
    pub cache: Database,
    live: Option<Box<dyn ObservationSource>>,
}

impl MetContext {
    /// Offline-only context.
    pub fn new(registry: SiteRegistry, cache: Database) -> Self {
        MetContext {
            registry,
            cache,
            live: None,
        }
    }

    /// Attach a live SNOTEL source, used when a request asks for [`SourceMode::Live`].
    pub fn with_live_source(mut self, source: Box<dyn ObservationSource>) -> Self {
        self.live = Some(source);
        self
    }

    /// SNOTEL screener for a request mode. Live without a configured
    /// source falls back to the cache.
    pub fn snotel_source(&self, mode: SourceMode) -> &dyn ObservationSource {
        match (mode, self.live.as_deref()) {
            (SourceMode::Live, Some(live)) => live,
            (SourceMode::Live, None) => {
                log::warn!("[SHREAD] context: live mode requested without a live source, reading cache");
                &self.cache
            }
            (SourceMode::Offline, _) => &self.cache,
        }
    }

    /// CSAS has no public live API, so it always reads the cache.
    pub fn csas_source(&self) -> &dyn ObservationSource {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shread_core::date_index::Resolution;
    use shread_core::observation::SiteFrame;

    struct FixedSource;

    impl ObservationSource for FixedSource {
        fn screen(
            &self,
            site_id: &str,
            _variables: &[&str],
            start_date: NaiveDate,
            _end_date: NaiveDate,
            _resolution: Resolution,
        ) -> SiteFrame {
            let mut frame = SiteFrame::new(site_id);
            frame.insert(start_date.and_hms_opt(0, 0, 0).unwrap(), "TAVG", 99.0);
            frame
        }
    }

    fn screen(source: &dyn ObservationSource) -> SiteFrame {
        let day = NaiveDate::from_ymd_opt(2021, 12, 3).unwrap();
        source.screen("713:CO:SNTL", &["TAVG"], day, day, Resolution::Daily)
    }

    #[test]
    fn test_source_selection() {
        let ctx = MetContext::new(SiteRegistry::load().unwrap(), Database::new().unwrap())
            .with_live_source(Box::new(FixedSource));
        assert_eq!(screen(ctx.snotel_source(SourceMode::Live)).len(), 1);
        assert!(screen(ctx.snotel_source(SourceMode::Offline)).is_empty());
        assert!(screen(ctx.csas_source()).is_empty());
    }

    #[test]
    fn test_live_without_source_reads_cache() {
        let ctx = MetContext::new(SiteRegistry::load().unwrap(), Database::new().unwrap());
        assert!(screen(ctx.snotel_source(SourceMode::Live)).is_empty());
    }
}
