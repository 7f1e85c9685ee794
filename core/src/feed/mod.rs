pub mod source;

pub use source::{FeedSource, FileFeedSource, HttpFeedSource};
