use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ENGLISH_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const INDONESIAN_MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

/// Fixed interface text shown by the desktop board and the terminal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    AppTitle,
    LiveTitle,
    HistoryTitle,
    Total,
    TodayCount,
    LastUpdated,
    Loading,
    PresetToday,
    PresetYesterday,
    ApplyFilter,
    ResetFilter,
    Refresh,
    ExportCsv,
    ActivityLog,
    NoActivity,
    DateFormatHint,
}

/// Language used for labels and long-form dates on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    #[serde(alias = "en")]
    English,
    #[serde(alias = "id")]
    Indonesian,
}

impl Locale {
    pub fn today_badge(self) -> &'static str {
        match self {
            Locale::English => "Today",
            Locale::Indonesian => "Hari Ini",
        }
    }

    pub fn label(self, label: Label) -> &'static str {
        match (self, label) {
            (Locale::English, Label::AppTitle) => "Attendance Board",
            (Locale::English, Label::LiveTitle) => "Today's attendance",
            (Locale::English, Label::HistoryTitle) => "History",
            (Locale::English, Label::Total) => "Total",
            (Locale::English, Label::TodayCount) => "Today",
            (Locale::English, Label::LastUpdated) => "Last updated",
            (Locale::English, Label::Loading) => "Loading attendance data...",
            (Locale::English, Label::PresetToday) => "Today",
            (Locale::English, Label::PresetYesterday) => "Yesterday",
            (Locale::English, Label::ApplyFilter) => "Apply filter",
            (Locale::English, Label::ResetFilter) => "Back to today",
            (Locale::English, Label::Refresh) => "Refresh",
            (Locale::English, Label::ExportCsv) => "Export CSV",
            (Locale::English, Label::ActivityLog) => "Activity log",
            (Locale::English, Label::NoActivity) => "No activity yet",
            (Locale::English, Label::DateFormatHint) => "is not a date; use YYYY-MM-DD",
            (Locale::Indonesian, Label::AppTitle) => "Papan Absensi",
            (Locale::Indonesian, Label::LiveTitle) => "Absensi hari ini",
            (Locale::Indonesian, Label::HistoryTitle) => "Riwayat",
            (Locale::Indonesian, Label::Total) => "Total",
            (Locale::Indonesian, Label::TodayCount) => "Hari Ini",
            (Locale::Indonesian, Label::LastUpdated) => "Terakhir update",
            (Locale::Indonesian, Label::Loading) => "Memuat data absensi...",
            (Locale::Indonesian, Label::PresetToday) => "Hari Ini",
            (Locale::Indonesian, Label::PresetYesterday) => "Kemarin",
            (Locale::Indonesian, Label::ApplyFilter) => "Terapkan filter",
            (Locale::Indonesian, Label::ResetFilter) => "Kembali ke hari ini",
            (Locale::Indonesian, Label::Refresh) => "Muat ulang",
            (Locale::Indonesian, Label::ExportCsv) => "Export CSV",
            (Locale::Indonesian, Label::ActivityLog) => "Log aktivitas",
            (Locale::Indonesian, Label::NoActivity) => "Belum ada aktivitas",
            (Locale::Indonesian, Label::DateFormatHint) => "bukan tanggal; gunakan YYYY-MM-DD",
        }
    }

    /// Table headings in display order: ordinal, card, name, major, cohort, time, status.
    pub fn column_headers(self) -> [&'static str; 7] {
        match self {
            Locale::English => ["#", "Card", "Name", "Major", "Cohort", "Time", "Status"],
            Locale::Indonesian => ["No", "ID Kartu", "Nama", "Jurusan", "Angkatan", "Waktu", "Status"],
        }
    }

    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        match (self, weekday) {
            (Locale::English, Weekday::Mon) => "Monday",
            (Locale::English, Weekday::Tue) => "Tuesday",
            (Locale::English, Weekday::Wed) => "Wednesday",
            (Locale::English, Weekday::Thu) => "Thursday",
            (Locale::English, Weekday::Fri) => "Friday",
            (Locale::English, Weekday::Sat) => "Saturday",
            (Locale::English, Weekday::Sun) => "Sunday",
            (Locale::Indonesian, Weekday::Mon) => "Senin",
            (Locale::Indonesian, Weekday::Tue) => "Selasa",
            (Locale::Indonesian, Weekday::Wed) => "Rabu",
            (Locale::Indonesian, Weekday::Thu) => "Kamis",
            (Locale::Indonesian, Weekday::Fri) => "Jumat",
            (Locale::Indonesian, Weekday::Sat) => "Sabtu",
            (Locale::Indonesian, Weekday::Sun) => "Minggu",
        }
    }

    pub fn month_name(self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::English => ENGLISH_MONTHS[idx],
            Locale::Indonesian => INDONESIAN_MONTHS[idx],
        }
    }

    /// `dd/mm/yyyy`, used for the history badge.
    pub fn format_date(self, value: NaiveDateTime) -> String {
        value.format("%d/%m/%Y").to_string()
    }

    pub fn format_date_time(self, value: NaiveDateTime) -> String {
        match self {
            Locale::English => value.format("%d/%m/%Y %H:%M").to_string(),
            Locale::Indonesian => value.format("%d/%m/%Y, %H.%M").to_string(),
        }
    }

    pub fn format_long_date(self, date: NaiveDate) -> String {
        format!(
            "{}, {} {} {}",
            self.weekday_name(date.weekday()),
            date.day(),
            self.month_name(date.month()),
            date.year()
        )
    }

    pub fn format_last_updated(self, value: NaiveDateTime) -> String {
        let clock = match self {
            Locale::English => value.format("%H:%M:%S"),
            Locale::Indonesian => value.format("%H.%M.%S"),
        };
        format!("{} {}", self.format_long_date(value.date()), clock)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::English => f.write_str("en"),
            Locale::Indonesian => f.write_str("id"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "id" | "indonesian" => Ok(Locale::Indonesian),
            other => Err(format!("unknown locale `{}` (expected en or id)", other)),
        }
    }
}
