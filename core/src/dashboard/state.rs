use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::dashboard::filter::{DatePreset, FilterState, ViewMode};
use crate::dashboard::view::{Notice, ViewUpdate};
use crate::dates::Locale;
use crate::model::AttendanceFeed;
use crate::prelude::{AttendError, AttendResult, Projection};
use crate::processing::{HistoryFilter, RecordFlattener, RenderedTable, TableRenderer, TodayProjector};
use crate::telemetry::LogManager;

/// Issued when a refresh starts; only the most recent ticket may render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTicket {
    generation: u64,
    filter: FilterState,
}

impl CycleTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> ViewMode {
        self.filter.mode()
    }
}

/// Owns the filter, the request generation and the last successful refresh.
///
/// All transitions are synchronous; the polling controller and the desktop
/// board both drive it.
pub struct Dashboard {
    filter: FilterState,
    locale: Locale,
    generation: u64,
    last_refreshed: Option<NaiveDateTime>,
    logger: LogManager,
}

impl Dashboard {
    pub fn new(locale: Locale) -> Self {
        Self {
            filter: FilterState::inactive(),
            locale,
            generation: 0,
            last_refreshed: None,
            logger: LogManager::new(),
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn mode(&self) -> ViewMode {
        self.filter.mode()
    }

    pub fn last_refreshed(&self) -> Option<NaiveDateTime> {
        self.last_refreshed
    }

    pub fn begin_cycle(&mut self) -> CycleTicket {
        self.generation += 1;
        CycleTicket {
            generation: self.generation,
            filter: self.filter.clone(),
        }
    }

    pub fn is_current(&self, ticket: &CycleTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Turns a fetch outcome into a view update, or `None` when a newer cycle
    /// has been issued since `ticket`.
    pub fn complete_cycle(
        &mut self,
        ticket: &CycleTicket,
        result: AttendResult<AttendanceFeed>,
        now: NaiveDateTime,
    ) -> Option<ViewUpdate> {
        if !self.is_current(ticket) {
            debug!(
                "discarding refresh {} (latest is {})",
                ticket.generation, self.generation
            );
            return None;
        }

        match result {
            Ok(feed) => {
                let table = self.render(&feed, &ticket.filter, now.date());
                self.logger.record_render(table.mode, table.total, feed.len());
                self.last_refreshed = Some(now);
                Some(ViewUpdate::Table {
                    table,
                    last_updated: self.locale.format_last_updated(now),
                })
            }
            Err(err) => {
                self.logger.record_failure(ticket.mode(), &err);
                Some(ViewUpdate::Failed {
                    mode: ticket.mode(),
                    message: self.failure_message(ticket.mode()).to_string(),
                })
            }
        }
    }

    /// LIVE: today's projection. HISTORY: range filter, flatten, render.
    pub fn render(&self, feed: &AttendanceFeed, filter: &FilterState, today: NaiveDate) -> RenderedTable {
        let renderer = TableRenderer::new(self.locale);
        match filter.mode() {
            ViewMode::Live => renderer.render_today(&TodayProjector::new(today).project(feed)),
            ViewMode::History => {
                let filtered = HistoryFilter::new(filter).project(feed);
                renderer.render_history(&RecordFlattener.project(&filtered))
            }
        }
    }

    /// Records a preset choice and returns the date it stands for. The filter
    /// stays inactive until applied.
    pub fn select_preset(&mut self, preset: DatePreset, today: NaiveDate) -> NaiveDate {
        let date = preset.resolve(today);
        self.filter.preset = Some(preset);
        self.filter.selected_date = Some(date);
        date
    }

    pub fn apply_filter(&mut self, date: Option<NaiveDate>, today: NaiveDate) -> AttendResult<Notice> {
        let date = date.ok_or_else(|| AttendError::Validation(self.missing_date_message().into()))?;

        let preset = self.filter.preset;
        let yesterday = preset == Some(DatePreset::Yesterday)
            && date == DatePreset::Yesterday.resolve(today);

        self.filter = FilterState {
            preset,
            ..FilterState::for_date(date)
        };

        let long_date = self.locale.format_long_date(date);
        let message = match (self.locale, yesterday) {
            (Locale::English, false) => format!("Showing history for {}", long_date),
            (Locale::English, true) => format!("Showing yesterday's history: {}", long_date),
            (Locale::Indonesian, false) => format!("Menampilkan riwayat tanggal: {}", long_date),
            (Locale::Indonesian, true) => format!("Menampilkan riwayat kemarin: {}", long_date),
        };
        Ok(Notice::success(message))
    }

    pub fn reset_filter(&mut self) -> Notice {
        self.filter = FilterState::inactive();
        Notice::success(match self.locale {
            Locale::English => "Back to today's attendance",
            Locale::Indonesian => "Kembali menampilkan data hari ini",
        })
    }

    pub fn refresh_notice(&self) -> Notice {
        Notice::success(match self.locale {
            Locale::English => "Data refreshed",
            Locale::Indonesian => "Data diperbarui",
        })
    }

    /// Export is not built yet; the action only announces that.
    pub fn export_csv(&self) -> Notice {
        Notice::success(match self.locale {
            Locale::English => "CSV export is not available yet",
            Locale::Indonesian => "Fitur export CSV dalam pengembangan",
        })
    }

    fn missing_date_message(&self) -> &'static str {
        match self.locale {
            Locale::English => "Please choose a date",
            Locale::Indonesian => "Harap pilih tanggal",
        }
    }

    fn failure_message(&self, mode: ViewMode) -> &'static str {
        match (self.locale, mode) {
            (Locale::English, ViewMode::Live) => {
                "Could not load attendance data. Make sure the feed is reachable."
            }
            (Locale::English, ViewMode::History) => "Could not load filtered attendance data.",
            (Locale::Indonesian, ViewMode::Live) => {
                "Error memuat data. Pastikan file absensi tersedia."
            }
            (Locale::Indonesian, ViewMode::History) => "Error memuat data filter.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::view::NoticeLevel;

    const FEED: &str = r#"{"A1": {"nama":"Dee","jurusan":"CS","angkatan":2024,"riwayat":[{"nama":"Dee","jurusan":"CS","angkatan":2024,"time":"2025-10-14T08:00:00"}]}}"#;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        day(14).and_hms_opt(10, 0, 0).unwrap()
    }

    fn feed() -> AttendanceFeed {
        AttendanceFeed::from_json(FEED).unwrap()
    }

    #[test]
    fn live_cycle_renders_today() {
        let mut dashboard = Dashboard::new(Locale::English);
        let ticket = dashboard.begin_cycle();
        let update = dashboard.complete_cycle(&ticket, Ok(feed()), now()).unwrap();

        let table = update.table().unwrap();
        assert_eq!(table.mode, ViewMode::Live);
        assert_eq!(table.rows.len(), 1);
        assert_eq!((table.total, table.today_count), (1, 1));
        assert_eq!(table.rows[0].badge, "Today");
        assert_eq!(dashboard.last_refreshed(), Some(now()));
        if let ViewUpdate::Table { last_updated, .. } = update {
            assert_eq!(last_updated, "Tuesday, 14 October 2025 10:00:00");
        }
    }

    #[test]
    fn history_cycle_for_a_day_without_records_is_empty() {
        let mut dashboard = Dashboard::new(Locale::English);
        dashboard.apply_filter(Some(day(13)), day(14)).unwrap();
        let ticket = dashboard.begin_cycle();
        let update = dashboard.complete_cycle(&ticket, Ok(feed()), now()).unwrap();

        let table = update.table().unwrap();
        assert_eq!(table.mode, ViewMode::History);
        assert_eq!(table.total, 0);
        assert_eq!(table.placeholder(Locale::English), Some("No attendance on the selected date"));
    }

    #[test]
    fn failed_fetch_leaves_state_untouched() {
        let mut dashboard = Dashboard::new(Locale::English);
        let first = dashboard.begin_cycle();
        dashboard.complete_cycle(&first, Ok(feed()), now());
        dashboard.apply_filter(Some(day(14)), day(14)).unwrap();
        let filter_before = dashboard.filter().clone();

        let ticket = dashboard.begin_cycle();
        let later = now() + chrono::Duration::seconds(10);
        let update = dashboard
            .complete_cycle(&ticket, Err(AttendError::Fetch("connection refused".into())), later)
            .unwrap();

        assert!(update.is_failure());
        assert_eq!(dashboard.filter(), &filter_before);
        assert_eq!(dashboard.last_refreshed(), Some(now()));
        assert_eq!(
            update,
            ViewUpdate::Failed {
                mode: ViewMode::History,
                message: "Could not load filtered attendance data.".into(),
            }
        );
    }

    #[test]
    fn stale_cycles_are_discarded() {
        let mut dashboard = Dashboard::new(Locale::English);
        let tick = dashboard.begin_cycle();
        dashboard.apply_filter(Some(day(14)), day(14)).unwrap();
        let action = dashboard.begin_cycle();

        assert!(dashboard.complete_cycle(&action, Ok(feed()), now()).is_some());
        assert!(dashboard.complete_cycle(&tick, Ok(feed()), now()).is_none());
        assert!(action.generation() > tick.generation());
    }

    #[test]
    fn apply_without_date_is_rejected() {
        let mut dashboard = Dashboard::new(Locale::Indonesian);
        let err = dashboard.apply_filter(None, day(14)).unwrap_err();
        assert_eq!(err, AttendError::Validation("Harap pilih tanggal".into()));
        assert_eq!(dashboard.filter(), &FilterState::inactive());
        assert_eq!(Notice::from_error(&err).level, NoticeLevel::Warning);
    }

    #[test]
    fn yesterday_preset_is_named_in_the_notice() {
        let mut dashboard = Dashboard::new(Locale::English);
        let picked = dashboard.select_preset(DatePreset::Yesterday, day(14));
        assert_eq!(picked, day(13));
        assert!(!dashboard.filter().active);

        let notice = dashboard.apply_filter(Some(picked), day(14)).unwrap();
        assert_eq!(notice.message, "Showing yesterday's history: Monday, 13 October 2025");
        assert_eq!(dashboard.filter().preset, Some(DatePreset::Yesterday));

        let other = dashboard.apply_filter(Some(day(10)), day(14)).unwrap();
        assert_eq!(other.message, "Showing history for Friday, 10 October 2025");
    }

    #[test]
    fn export_announces_work_in_progress() {
        let dashboard = Dashboard::new(Locale::Indonesian);
        let notice = dashboard.export_csv();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "Fitur export CSV dalam pengembangan");
    }

    #[test]
    fn reset_returns_to_live() {
        let mut dashboard = Dashboard::new(Locale::English);
        dashboard.select_preset(DatePreset::Today, day(14));
        dashboard.apply_filter(Some(day(14)), day(14)).unwrap();
        assert_eq!(dashboard.mode(), ViewMode::History);

        let notice = dashboard.reset_filter();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(dashboard.filter(), &FilterState::inactive());
    }

    #[test]
    fn malformed_entries_never_reach_any_view() {
        let feed = AttendanceFeed::from_json(
            r#"{
                "A1": {"nama":"Dee","riwayat":[
                    {"nama":"Dee","jurusan":"CS","angkatan":2024,"time":"not-a-date"},
                    {"nama":"Dee","jurusan":"CS","angkatan":2024,"time":"2025-10-14T08:00:00"}
                ]},
                "B2": {"nama":"Ari","riwayat":[
                    {"nama":"Ari","jurusan":"EE","angkatan":2023,"time":"2025-10-14T09:00:00"}
                ]}
            }"#,
        )
        .unwrap();
        let dashboard = Dashboard::new(Locale::English);

        let live = dashboard.render(&feed, &FilterState::inactive(), day(14));
        assert_eq!(live.total, 2);

        let history = dashboard.render(&feed, &FilterState::for_date(day(14)), day(14));
        assert_eq!(history.total, 2);
        assert!(history.rows.iter().all(|row| row.formatted_timestamp.starts_with("14/10/2025")));
    }
}
