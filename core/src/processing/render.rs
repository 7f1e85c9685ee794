use chrono::NaiveDateTime;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::dashboard::filter::ViewMode;
use crate::dates::{DateMatcher, Locale};
use crate::model::{DisplayRow, FlattenedEntry, Timestamped};
use crate::processing::today::TodayProjection;

/// Rows ready for the view plus the two stat counters shown above the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTable {
    pub mode: ViewMode,
    pub rows: Vec<DisplayRow>,
    pub total: usize,
    pub today_count: usize,
}

impl RenderedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Empty-state text shown in place of rows.
    pub fn placeholder(&self, locale: Locale) -> Option<&'static str> {
        if !self.is_empty() {
            return None;
        }
        Some(match (self.mode, locale) {
            (ViewMode::Live, Locale::English) => "No attendance recorded today yet",
            (ViewMode::Live, Locale::Indonesian) => "Belum ada data absensi hari ini",
            (ViewMode::History, Locale::English) => "No attendance on the selected date",
            (ViewMode::History, Locale::Indonesian) => {
                "Tidak ada data absensi pada tanggal tersebut"
            }
        })
    }
}

/// Orders records newest first. Equal timestamps keep their input order and
/// records whose timestamp does not parse are left out.
pub fn sort_by_timestamp_desc<K, R>(pairs: Vec<(K, R)>) -> Vec<(K, R, NaiveDateTime)>
where
    R: Timestamped,
{
    let mut parsed: Vec<_> = pairs
        .into_iter()
        .filter_map(|(key, record)| match DateMatcher::parse(record.raw_timestamp()) {
            Ok(at) => Some((key, record, at)),
            Err(err) => {
                warn!("Sorter excluding record: {}", err);
                None
            }
        })
        .collect();
    parsed.sort_by(|a, b| b.2.cmp(&a.2));
    parsed
}

pub struct TableRenderer {
    locale: Locale,
}

impl TableRenderer {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn render_today(&self, projection: &TodayProjection) -> RenderedTable {
        let pairs = projection
            .iter()
            .map(|(card_id, entry)| (card_id.as_str(), entry))
            .collect();
        let rows = sort_by_timestamp_desc(pairs)
            .into_iter()
            .enumerate()
            .map(|(idx, (card_id, entry, at))| DisplayRow {
                ordinal: idx + 1,
                card_id: card_id.to_string(),
                name: entry.name.clone(),
                major: entry.major.clone(),
                cohort: entry.cohort.to_string(),
                formatted_timestamp: self.locale.format_date_time(at),
                badge: self.locale.today_badge().to_string(),
            })
            .collect();
        Self::table(ViewMode::Live, rows)
    }

    pub fn render_history(&self, entries: &[FlattenedEntry]) -> RenderedTable {
        let pairs = entries
            .iter()
            .map(|entry| (entry.key.as_str(), entry))
            .collect();
        let rows = sort_by_timestamp_desc(pairs)
            .into_iter()
            .enumerate()
            .map(|(idx, (_, entry, at))| DisplayRow {
                ordinal: idx + 1,
                card_id: entry.card_id.clone(),
                name: entry.name.clone(),
                major: entry.major.clone(),
                cohort: entry.cohort.to_string(),
                formatted_timestamp: self.locale.format_date_time(at),
                badge: self.locale.format_date(at),
            })
            .collect();
        Self::table(ViewMode::History, rows)
    }

    // Both counters report the row count.
    fn table(mode: ViewMode, rows: Vec<DisplayRow>) -> RenderedTable {
        let total = rows.len();
        RenderedTable {
            mode,
            rows,
            total,
            today_count: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckIn, Cohort};

    fn check_in(name: &str, time: &str) -> CheckIn {
        CheckIn {
            name: name.into(),
            major: "CS".into(),
            cohort: Cohort::Year(2024),
            time: time.into(),
        }
    }

    fn entry(key: &str, card: &str, time: &str) -> FlattenedEntry {
        FlattenedEntry {
            key: key.into(),
            card_id: card.into(),
            name: card.to_lowercase(),
            major: "EE".into(),
            cohort: Cohort::Label("2023".into()),
            timestamp: time.into(),
        }
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let records = vec![
            ("a", check_in("a", "2025-10-14T08:00:00")),
            ("b", check_in("b", "2025-10-14T09:00:00")),
            ("c", check_in("c", "2025-10-14T08:00:00")),
            ("d", check_in("d", "2025-10-14T10:00:00")),
        ];
        let keys: Vec<_> = sort_by_timestamp_desc(records)
            .into_iter()
            .map(|(key, _, _)| key)
            .collect();
        assert_eq!(keys, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn sort_drops_unparseable_records() {
        let records = vec![
            ("a", check_in("a", "not-a-date")),
            ("b", check_in("b", "2025-10-14T09:00:00")),
        ];
        let sorted = sort_by_timestamp_desc(records);
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].0, "b");
    }

    #[test]
    fn today_rows_carry_fixed_badge_and_ordinals() {
        let projection = vec![
            ("A1".to_string(), check_in("Dee", "2025-10-14T08:00:00")),
            ("B2".to_string(), check_in("Ari", "2025-10-14T09:15:00")),
        ];
        let table = TableRenderer::new(Locale::English).render_today(&projection);
        assert_eq!(table.mode, ViewMode::Live);
        assert_eq!((table.total, table.today_count), (2, 2));
        assert_eq!(table.rows[0].ordinal, 1);
        assert_eq!(table.rows[0].card_id, "B2");
        assert_eq!(table.rows[0].formatted_timestamp, "14/10/2025 09:15");
        assert_eq!(table.rows[1].card_id, "A1");
        assert!(table.rows.iter().all(|row| row.badge == "Today"));
        assert_eq!(table.placeholder(Locale::English), None);
    }

    #[test]
    fn history_rows_use_date_badges() {
        let entries = vec![
            entry("A1_0", "A1", "2025-10-13T07:00:00"),
            entry("B2_0", "B2", "bogus"),
            entry("A1_1", "A1", "2025-10-14T08:00:00"),
        ];
        let table = TableRenderer::new(Locale::Indonesian).render_history(&entries);
        assert_eq!(table.total, 2);
        assert_eq!(table.rows[0].badge, "14/10/2025");
        assert_eq!(table.rows[1].badge, "13/10/2025");
        assert_eq!(table.rows[1].ordinal, 2);
        assert_eq!(table.rows[1].cohort, "2023");
    }

    #[test]
    fn empty_tables_report_mode_placeholders() {
        let renderer = TableRenderer::new(Locale::English);
        let live = renderer.render_today(&Vec::new());
        let history = renderer.render_history(&[]);
        assert_eq!((live.total, live.today_count), (0, 0));
        assert_eq!(live.placeholder(Locale::English), Some("No attendance recorded today yet"));
        assert_eq!(
            history.placeholder(Locale::Indonesian),
            Some("Tidak ada data absensi pada tanggal tersebut")
        );
    }
}
