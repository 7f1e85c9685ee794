use log::warn;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::prelude::AttendResult;

/// Cohort year as recorded by the card reader; some exports store it as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cohort {
    Year(i64),
    Label(String),
}

impl Default for Cohort {
    fn default() -> Self {
        Cohort::Label(String::new())
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cohort::Year(year) => write!(f, "{}", year),
            Cohort::Label(label) => f.write_str(label),
        }
    }
}

/// Timestamp accessor shared by every record the sorter can order.
pub trait Timestamped {
    fn raw_timestamp(&self) -> &str;
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn raw_timestamp(&self) -> &str {
        (**self).raw_timestamp()
    }
}

/// One card scan as stored in a student's history.
///
/// Fields decode leniently: `null` becomes empty and other scalars are kept
/// as their JSON text, so a bad `time` only fails that entry's date parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    #[serde(rename = "nama", default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "jurusan", default, deserialize_with = "lenient_text")]
    pub major: String,
    #[serde(rename = "angkatan", default, deserialize_with = "lenient_cohort")]
    pub cohort: Cohort,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
}

impl Timestamped for CheckIn {
    fn raw_timestamp(&self) -> &str {
        &self.time
    }
}

/// Student registered against a card, with its append-only scan history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "nama", default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "jurusan", default, deserialize_with = "lenient_text")]
    pub major: String,
    #[serde(rename = "angkatan", default, deserialize_with = "lenient_cohort")]
    pub cohort: Cohort,
    #[serde(rename = "riwayat", default, deserialize_with = "lenient_history")]
    pub history: Vec<CheckIn>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

fn lenient_cohort<'de, D>(deserializer: D) -> Result<Cohort, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Cohort::default(),
        Value::String(label) => Cohort::Label(label),
        Value::Number(number) => match number.as_i64() {
            Some(year) => Cohort::Year(year),
            None => Cohort::Label(number.to_string()),
        },
        other => Cohort::Label(other.to_string()),
    })
}

// Missing or `null` history is empty; entries that are not objects are skipped.
fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<CheckIn>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        other => {
            warn!("ignoring history that is not a list: {}", other);
            return Ok(Vec::new());
        }
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match CheckIn::deserialize(entry) {
            Ok(check_in) => Some(check_in),
            Err(err) => {
                warn!("skipping unreadable history entry: {}", err);
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub card_id: String,
    pub student: Student,
}

/// Snapshot of the attendance feed, keyed by card id in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFeed {
    cards: Vec<CardRecord>,
}

impl AttendanceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(body: &str) -> AttendResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Adds a card, or replaces an existing one in place so its position is kept.
    pub fn insert(&mut self, card_id: impl Into<String>, student: Student) {
        let card_id = card_id.into();
        match self.cards.iter_mut().find(|record| record.card_id == card_id) {
            Some(record) => record.student = student,
            None => self.cards.push(CardRecord { card_id, student }),
        }
    }

    pub fn get(&self, card_id: &str) -> Option<&Student> {
        self.cards
            .iter()
            .find(|record| record.card_id == card_id)
            .map(|record| &record.student)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardRecord> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total_check_ins(&self) -> usize {
        self.cards.iter().map(|record| record.student.history.len()).sum()
    }
}

impl FromIterator<CardRecord> for AttendanceFeed {
    fn from_iter<I: IntoIterator<Item = CardRecord>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for AttendanceFeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FeedVisitor;

        impl<'de> Visitor<'de> for FeedVisitor {
            type Value = AttendanceFeed;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping card ids to students")
            }

            // An empty export is written as `null`.
            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(AttendanceFeed::default())
            }

            // A repeated card id keeps its first position and its last value.
            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut feed = AttendanceFeed {
                    cards: Vec::with_capacity(map.size_hint().unwrap_or(0)),
                };
                while let Some((card_id, value)) = map.next_entry::<String, Value>()? {
                    match Student::deserialize(value) {
                        Ok(student) => feed.insert(card_id, student),
                        Err(err) => warn!("skipping card {}: {}", card_id, err),
                    }
                }
                Ok(feed)
            }
        }

        deserializer.deserialize_any(FeedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Projection;
    use crate::processing::{RecordFlattener, TodayProjector};
    use chrono::NaiveDate;

    const FEED: &str = r#"{
        "B2": {"nama": "Ari", "jurusan": "EE", "angkatan": "2023", "riwayat": null},
        "A1": {"nama": "Dee", "jurusan": "CS", "angkatan": 2024, "riwayat": [
            {"nama": "Dee", "jurusan": "CS", "angkatan": 2024, "time": "2025-10-14T08:00:00"}
        ]}
    }"#;

    #[test]
    fn feed_keeps_document_order() {
        let feed = AttendanceFeed::from_json(FEED).unwrap();
        let ids: Vec<_> = feed.iter().map(|record| record.card_id.as_str()).collect();
        assert_eq!(ids, vec!["B2", "A1"]);
        assert_eq!(feed.total_check_ins(), 1);
    }

    #[test]
    fn cohort_accepts_numbers_and_text() {
        let feed = AttendanceFeed::from_json(FEED).unwrap();
        assert_eq!(feed.get("A1").unwrap().cohort, Cohort::Year(2024));
        assert_eq!(feed.get("B2").unwrap().cohort.to_string(), "2023");
        assert!(feed.get("B2").unwrap().history.is_empty());
    }

    #[test]
    fn null_feed_is_empty() {
        let feed = AttendanceFeed::from_json("null").unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn odd_field_types_only_spoil_their_own_entry() {
        let body = r#"{
            "A1": {"nama": "Dee", "jurusan": null, "angkatan": null, "riwayat": [
                {"nama": "Dee", "jurusan": "CS", "angkatan": 2024, "time": null},
                {"nama": "Dee", "jurusan": "CS", "angkatan": 2024, "time": 1697270400},
                "garbage"
            ]},
            "B2": {"nama": "Ari", "jurusan": "EE", "angkatan": 2023.5, "riwayat": [
                {"nama": "Ari", "jurusan": "EE", "angkatan": "2023", "time": "2025-10-14T07:30:00"}
            ]},
            "C3": null
        }"#;
        let feed = AttendanceFeed::from_json(body).unwrap();
        assert_eq!(feed.len(), 2);

        let dee = feed.get("A1").unwrap();
        assert_eq!(dee.major, "");
        assert_eq!(dee.cohort, Cohort::default());
        assert_eq!(dee.history.len(), 2);
        assert_eq!(dee.history[0].time, "");
        assert_eq!(dee.history[1].time, "1697270400");
        assert_eq!(feed.get("B2").unwrap().cohort.to_string(), "2023.5");

        let today = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();
        let rows = TodayProjector::new(today).project(&feed);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "B2");
    }

    #[test]
    fn repeated_card_id_keeps_the_last_value_in_the_first_slot() {
        let body = r#"{
            "A1": {"nama": "Old", "riwayat": [{"nama": "Old", "time": "2025-10-14T08:00:00"}]},
            "B2": {"nama": "Ari", "riwayat": []},
            "A1": {"nama": "New", "riwayat": [{"nama": "New", "time": "2025-10-14T09:00:00"}]}
        }"#;
        let feed = AttendanceFeed::from_json(body).unwrap();
        let ids: Vec<_> = feed.iter().map(|record| record.card_id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "B2"]);
        assert_eq!(feed.get("A1").unwrap().name, "New");

        let today = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();
        let rows = TodayProjector::new(today).project(&feed);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.name, "New");

        let keys: Vec<_> = RecordFlattener
            .project(&feed)
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(keys, vec!["A1_0".to_string()]);
    }

    #[test]
    fn non_object_feed_is_a_parse_failure() {
        let err = AttendanceFeed::from_json("[1, 2]").unwrap_err();
        assert!(err.is_feed_failure());
    }
}
