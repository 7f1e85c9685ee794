pub mod feed;
pub mod record;

pub use feed::{AttendanceFeed, CardRecord, CheckIn, Cohort, Student, Timestamped};
pub use record::{DisplayRow, FlattenedEntry};
