use chrono::NaiveDate;
use log::debug;

use crate::dates::DateMatcher;
use crate::model::{AttendanceFeed, CheckIn};
use crate::prelude::Projection;

/// One check-in per card, in feed order.
pub type TodayProjection = Vec<(String, CheckIn)>;

/// Reduces each card's history to the first entry recorded on `today`.
///
/// The first matching entry in stored order wins, even when a later entry on
/// the same day exists.
pub struct TodayProjector {
    today: NaiveDate,
}

impl TodayProjector {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    fn is_today(&self, card_id: &str, entry: &CheckIn) -> bool {
        match DateMatcher::calendar_date(&entry.time) {
            Ok(date) => date == self.today,
            Err(err) => {
                debug!("TodayProjector skipping entry for {}: {}", card_id, err);
                false
            }
        }
    }
}

impl Projection for TodayProjector {
    type Output = TodayProjection;

    fn project(&self, feed: &AttendanceFeed) -> TodayProjection {
        feed.iter()
            .filter_map(|record| {
                record
                    .student
                    .history
                    .iter()
                    .find(|entry| self.is_today(&record.card_id, entry))
                    .map(|entry| (record.card_id.clone(), entry.clone()))
            })
            .collect()
    }
}
