pub mod controller;
pub mod filter;
pub mod state;
pub mod view;

pub use controller::{Command, ControllerHandle, PollingController, DEFAULT_POLL_INTERVAL};
pub use filter::{DatePreset, FilterState, ViewMode};
pub use state::{CycleTicket, Dashboard};
pub use view::{AttendanceView, Clock, LocalClock, Notice, NoticeLevel, ViewUpdate};
