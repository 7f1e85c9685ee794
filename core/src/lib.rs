//! Projection, filtering and polling core for the attendance board.
//!
//! A feed maps card ids to students and their scan history. The dashboard
//! reduces each snapshot either to today's first check-in per card or to the
//! flattened history inside a chosen date range, then renders rows newest
//! first for whichever view is attached.

pub mod dashboard;
pub mod dates;
pub mod feed;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use dashboard::{AttendanceView, Dashboard, PollingController, ViewUpdate};
pub use prelude::{AttendError, AttendResult, Projection};
