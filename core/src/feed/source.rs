use chrono::Utc;
use reqwest::{Client, Url};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::AttendanceFeed;
use crate::prelude::{AttendError, AttendResult};

/// Anything that can produce a fresh feed snapshot.
pub trait FeedSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = AttendResult<AttendanceFeed>> + Send;
}

/// Fetches the feed over HTTP, appending a `t` query token so caches are bypassed.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    url: Url,
}

impl HttpFeedSource {
    pub fn new(url: &str) -> AttendResult<Self> {
        Self::with_timeout(url, None)
    }

    pub fn with_timeout(url: &str, timeout: Option<Duration>) -> AttendResult<Self> {
        let url = Url::parse(url).map_err(|e| AttendError::Fetch(format!("invalid feed url {}: {}", url, e)))?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn cache_busted_url(&self, token: i64) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("t", &token.to_string());
        url
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self) -> impl Future<Output = AttendResult<AttendanceFeed>> + Send {
        let url = self.cache_busted_url(Utc::now().timestamp_millis());
        let client = self.client.clone();
        async move {
            let response = client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(AttendError::Status(status.as_u16()));
            }
            let body = response.text().await?;
            AttendanceFeed::from_json(&body)
        }
    }
}

/// Reads the feed from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeedSource for FileFeedSource {
    fn fetch(&self) -> impl Future<Output = AttendResult<AttendanceFeed>> + Send {
        let path = self.path.clone();
        async move {
            let body = tokio::fs::read_to_string(&path).await?;
            AttendanceFeed::from_json(&body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn cache_token_is_appended_to_existing_query() {
        let plain = HttpFeedSource::new("http://127.0.0.1:8080/absensi.json").unwrap();
        assert_eq!(
            plain.cache_busted_url(42).as_str(),
            "http://127.0.0.1:8080/absensi.json?t=42"
        );

        let with_query = HttpFeedSource::new("http://example.com/feed.json?branch=main").unwrap();
        assert_eq!(
            with_query.cache_busted_url(7).as_str(),
            "http://example.com/feed.json?branch=main&t=7"
        );
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = HttpFeedSource::new("not a url").unwrap_err();
        assert!(matches!(err, AttendError::Fetch(_)));
    }

    #[tokio::test]
    async fn file_source_reads_feed() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(br#"{"A1": {"nama": "Dee", "riwayat": []}}"#)
            .unwrap();
        let feed = FileFeedSource::new(temp.path()).fetch().await.unwrap();
        assert_eq!(feed.len(), 1);
    }

    #[tokio::test]
    async fn file_source_reports_missing_and_malformed_files() {
        let missing = FileFeedSource::new("/definitely/not/here.json").fetch().await;
        assert!(matches!(missing, Err(AttendError::Io(_))));

        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"{not json").unwrap();
        let malformed = FileFeedSource::new(temp.path()).fetch().await;
        assert!(matches!(malformed, Err(AttendError::Parse(_))));
    }

    #[tokio::test]
    async fn unreachable_http_feed_is_a_fetch_failure() {
        let source = HttpFeedSource::new("http://127.0.0.1:9/absensi.json").unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(err.is_feed_failure());
    }
}
