use log::warn;

use crate::dashboard::filter::FilterState;
use crate::dates::DateMatcher;
use crate::model::{AttendanceFeed, CardRecord, Student};
use crate::prelude::Projection;

/// Keeps, per card, only the history entries inside the active date range.
pub struct HistoryFilter<'a> {
    filter: &'a FilterState,
}

impl<'a> HistoryFilter<'a> {
    pub fn new(filter: &'a FilterState) -> Self {
        Self { filter }
    }
}

impl Projection for HistoryFilter<'_> {
    type Output = AttendanceFeed;

    fn project(&self, feed: &AttendanceFeed) -> AttendanceFeed {
        let Some((start, end)) = self.filter.bounds() else {
            return feed.clone();
        };

        feed.iter()
            .filter_map(|record| {
                let history: Vec<_> = record
                    .student
                    .history
                    .iter()
                    .filter(|entry| {
                        DateMatcher::is_within_inclusive_range(&entry.time, start, end)
                            .unwrap_or_else(|err| {
                                warn!("HistoryFilter dropping entry for {}: {}", record.card_id, err);
                                false
                            })
                    })
                    .cloned()
                    .collect();

                if history.is_empty() {
                    None
                } else {
                    Some(CardRecord {
                        card_id: record.card_id.clone(),
                        student: Student {
                            history,
                            ..record.student.clone()
                        },
                    })
                }
            })
            .collect()
    }
}
