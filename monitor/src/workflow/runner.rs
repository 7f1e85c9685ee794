use crate::terminal::view::{OutputFormat, TerminalView};
use crate::workflow::config::{FeedTarget, MonitorConfig};
use anyhow::{bail, Context};
use attendcore::dashboard::{AttendanceView, Clock, DatePreset, Dashboard, LocalClock, PollingController};
use attendcore::dates::Locale;
use attendcore::feed::{FeedSource, FileFeedSource, HttpFeedSource};
use chrono::NaiveDate;
use log::info;

/// Filter the monitor starts with; both unset means live mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartupFilter {
    pub preset: Option<DatePreset>,
    pub date: Option<NaiveDate>,
}

impl StartupFilter {
    pub fn is_set(&self) -> bool {
        self.preset.is_some() || self.date.is_some()
    }
}

#[derive(Clone)]
pub struct Runner {
    config: MonitorConfig,
    format: OutputFormat,
}

impl Runner {
    pub fn new(config: MonitorConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }

    /// Polls until Ctrl+C, or renders a single refresh when `once` is set.
    pub async fn execute(&self, startup: StartupFilter, once: bool) -> anyhow::Result<()> {
        match self.config.feed_target()? {
            FeedTarget::Url(url) => {
                let source = HttpFeedSource::with_timeout(&url, self.config.request_timeout())
                    .context("creating HTTP feed source")?;
                info!("polling {}", url);
                self.drive(source, startup, once).await
            }
            FeedTarget::File(path) => {
                info!("polling {}", path.display());
                self.drive(FileFeedSource::new(path), startup, once).await
            }
        }
    }

    async fn drive<S: FeedSource>(&self, source: S, startup: StartupFilter, once: bool) -> anyhow::Result<()> {
        let view = TerminalView::new(self.config.locale, self.format);
        if once {
            return run_once(&source, &view, self.config.locale, startup, &LocalClock).await;
        }

        let mut controller = PollingController::new(source, view, self.config.locale)
            .with_interval(self.config.interval());
        if startup.is_set() {
            controller = controller
                .with_initial_filter(startup.preset, startup.date)
                .context("applying startup filter")?;
        }
        let handle = controller.spawn();

        tokio::signal::ctrl_c()
            .await
            .context("awaiting Ctrl+C to exit")?;
        handle.shutdown().await;
        Ok(())
    }
}

/// One fetch-and-render pass without the polling loop. A failed fetch is an error.
pub async fn run_once<S, V, C>(
    source: &S,
    view: &V,
    locale: Locale,
    startup: StartupFilter,
    clock: &C,
) -> anyhow::Result<()>
where
    S: FeedSource,
    V: AttendanceView,
    C: Clock,
{
    let mut dashboard = Dashboard::new(locale);
    let today = clock.now().date();
    if startup.is_set() {
        let preset_date = startup.preset.map(|preset| dashboard.select_preset(preset, today));
        let notice = dashboard
            .apply_filter(startup.date.or(preset_date), today)
            .context("applying startup filter")?;
        view.notify(&notice);
    }

    let ticket = dashboard.begin_cycle();
    let result = source.fetch().await;
    let failure = result.as_ref().err().cloned();
    if let Some(update) = dashboard.complete_cycle(&ticket, result, clock.now()) {
        view.present(&update);
    }
    if let Some(err) = failure {
        bail!("refresh failed: {}", err);
    }
    Ok(())
}
