pub mod format;
pub mod matcher;

pub use format::{Label, Locale};
pub use matcher::DateMatcher;
