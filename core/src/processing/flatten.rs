use crate::model::{AttendanceFeed, FlattenedEntry};
use crate::prelude::Projection;

/// Expands every card's history into one keyed entry per check-in.
pub struct RecordFlattener;

impl Projection for RecordFlattener {
    type Output = Vec<FlattenedEntry>;

    fn project(&self, feed: &AttendanceFeed) -> Vec<FlattenedEntry> {
        let mut flattened = Vec::with_capacity(feed.total_check_ins());
        for record in feed.iter() {
            for (index, entry) in record.student.history.iter().enumerate() {
                flattened.push(FlattenedEntry {
                    key: format!("{}_{}", record.card_id, index),
                    card_id: record.card_id.clone(),
                    name: entry.name.clone(),
                    major: entry.major.clone(),
                    cohort: entry.cohort.clone(),
                    timestamp: entry.time.clone(),
                });
            }
        }
        flattened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_card_and_position() {
        let feed = AttendanceFeed::from_json(
            r#"{
                "A1": {"nama": "Dee", "riwayat": [
                    {"nama": "Dee", "jurusan": "CS", "angkatan": 2024, "time": "2025-10-14T08:00:00"},
                    {"nama": "Dee", "jurusan": "CS", "angkatan": 2024, "time": "bogus"}
                ]},
                "B2": {"nama": "Ari", "riwayat": [
                    {"nama": "Ari", "jurusan": "EE", "angkatan": 2023, "time": "2025-10-13T09:00:00"}
                ]}
            }"#,
        )
        .unwrap();

        let flattened = RecordFlattener.project(&feed);
        let keys: Vec<_> = flattened.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["A1_0", "A1_1", "B2_0"]);
        assert_eq!(flattened.len(), feed.total_check_ins());
        assert_eq!(flattened[1].timestamp, "bogus");
        assert_eq!(flattened[2].major, "EE");
    }
}
