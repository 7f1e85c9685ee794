pub mod flatten;
pub mod history;
pub mod render;
pub mod today;

pub use flatten::RecordFlattener;
pub use history::HistoryFilter;
pub use render::{sort_by_timestamp_desc, RenderedTable, TableRenderer};
pub use today::{TodayProjection, TodayProjector};
