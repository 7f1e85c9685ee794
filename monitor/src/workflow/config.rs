use anyhow::{bail, Context};
use attendcore::dates::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the monitor reads the attendance feed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedTarget {
    Url(String),
    File(PathBuf),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    pub feed_url: Option<String>,
    pub feed_file: Option<PathBuf>,
    pub interval_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub locale: Locale,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            feed_file: None,
            interval_secs: 10,
            request_timeout_secs: None,
            locale: Locale::default(),
        }
    }
}

impl MonitorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading monitor config {}", path_ref.display()))?;
        let config: MonitorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing monitor config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line values win over the file; unset flags leave it alone.
    pub fn apply_overrides(
        &mut self,
        feed_url: Option<String>,
        feed_file: Option<PathBuf>,
        interval_secs: Option<u64>,
        locale: Option<Locale>,
    ) {
        if let Some(url) = feed_url {
            self.feed_url = Some(url);
            self.feed_file = None;
        }
        if let Some(file) = feed_file {
            self.feed_file = Some(file);
            self.feed_url = None;
        }
        if let Some(secs) = interval_secs {
            self.interval_secs = secs;
        }
        if let Some(locale) = locale {
            self.locale = locale;
        }
    }

    pub fn feed_target(&self) -> anyhow::Result<FeedTarget> {
        match (&self.feed_url, &self.feed_file) {
            (Some(url), None) => Ok(FeedTarget::Url(url.clone())),
            (None, Some(file)) => Ok(FeedTarget::File(file.clone())),
            (Some(_), Some(_)) => bail!("configure either feed_url or feed_file, not both"),
            (None, None) => bail!("no feed configured; pass --feed-url, --feed-file or --serve"),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_poll_every_ten_seconds() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.interval(), Duration::from_secs(10));
        assert!(cfg.feed_target().is_err());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"feed_url: http://127.0.0.1:8080/absensi.json\ninterval_secs: 5\nlocale: id\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = MonitorConfig::load(&path).unwrap();
        assert_eq!(cfg.interval_secs, 5);
        assert_eq!(cfg.locale, Locale::Indonesian);
        assert_eq!(
            cfg.feed_target().unwrap(),
            FeedTarget::Url("http://127.0.0.1:8080/absensi.json".into())
        );
    }

    #[test]
    fn overrides_replace_the_feed_target() {
        let mut cfg = MonitorConfig {
            feed_url: Some("http://example.com/absensi.json".into()),
            ..Default::default()
        };
        cfg.apply_overrides(None, Some("local.json".into()), Some(0), None);
        assert_eq!(cfg.feed_target().unwrap(), FeedTarget::File("local.json".into()));
        assert_eq!(cfg.interval(), Duration::from_secs(1));
    }

    #[test]
    fn both_targets_is_an_error() {
        let cfg = MonitorConfig {
            feed_url: Some("http://example.com/absensi.json".into()),
            feed_file: Some("local.json".into()),
            ..Default::default()
        };
        assert!(cfg.feed_target().is_err());
    }
}
