use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};

use crate::dashboard::filter::{DatePreset, FilterState};
use crate::dashboard::state::Dashboard;
use crate::dashboard::view::{AttendanceView, Clock, LocalClock, Notice};
use crate::dates::Locale;
use crate::feed::FeedSource;
use crate::prelude::AttendResult;
use crate::telemetry::{PollMetrics, PollSnapshot};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// User actions routed to the controller task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    SelectPreset(DatePreset),
    ApplyFilter(Option<NaiveDate>),
    ResetFilter,
    ExportCsv,
    Shutdown,
}

fn lock(dashboard: &Mutex<Dashboard>) -> MutexGuard<'_, Dashboard> {
    dashboard.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives refresh cycles on a fixed interval and in response to user actions.
///
/// Each cycle fetches on its own task, so a slow fetch never delays the next
/// tick. When cycles overlap, only the most recently started one renders.
pub struct PollingController<S, V, C = LocalClock> {
    source: Arc<S>,
    view: Arc<V>,
    clock: Arc<C>,
    dashboard: Arc<Mutex<Dashboard>>,
    metrics: Arc<PollMetrics>,
    interval: Duration,
}

impl<S: FeedSource, V: AttendanceView> PollingController<S, V, LocalClock> {
    pub fn new(source: S, view: V, locale: Locale) -> Self {
        Self {
            source: Arc::new(source),
            view: Arc::new(view),
            clock: Arc::new(LocalClock),
            dashboard: Arc::new(Mutex::new(Dashboard::new(locale))),
            metrics: Arc::new(PollMetrics::new()),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl<S: FeedSource, V: AttendanceView, C: Clock> PollingController<S, V, C> {
    pub fn with_clock<K: Clock>(self, clock: K) -> PollingController<S, V, K> {
        PollingController {
            source: self.source,
            view: self.view,
            clock: Arc::new(clock),
            dashboard: self.dashboard,
            metrics: self.metrics,
            interval: self.interval,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Starts in history mode for `date` (or the preset's date) instead of live.
    pub fn with_initial_filter(
        self,
        preset: Option<DatePreset>,
        date: Option<NaiveDate>,
    ) -> AttendResult<Self> {
        let today = self.clock.now().date();
        {
            let mut dashboard = lock(&self.dashboard);
            let preset_date = preset.map(|preset| dashboard.select_preset(preset, today));
            let notice = dashboard.apply_filter(date.or(preset_date), today)?;
            info!("{}", notice.message);
        }
        Ok(self)
    }

    /// Starts the polling task. The first refresh happens immediately.
    pub fn spawn(self) -> ControllerHandle {
        let (commands, receiver) = mpsc::unbounded_channel();
        let dashboard = Arc::clone(&self.dashboard);
        let metrics = Arc::clone(&self.metrics);
        let task = tokio::spawn(self.run(receiver));
        ControllerHandle {
            commands,
            dashboard,
            metrics,
            task,
        }
    }

    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles = JoinSet::new();
        info!("PollingController started ({:?} interval)", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.start_cycle(&mut cycles),
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command, &mut cycles),
                },
                Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                    if let Err(err) = joined {
                        if err.is_panic() {
                            warn!("refresh cycle panicked: {}", err);
                        }
                    }
                }
            }
        }

        cycles.abort_all();
        info!("PollingController stopped");
    }

    fn handle(&self, command: Command, cycles: &mut JoinSet<()>) {
        let today = self.clock.now().date();
        match command {
            Command::Refresh => {
                self.start_cycle(cycles);
                let notice = lock(&self.dashboard).refresh_notice();
                self.view.notify(&notice);
            }
            Command::SelectPreset(preset) => {
                let date = lock(&self.dashboard).select_preset(preset, today);
                debug!("preset {:?} selects {}", preset, date);
            }
            Command::ApplyFilter(date) => {
                let outcome = lock(&self.dashboard).apply_filter(date, today);
                match outcome {
                    Ok(notice) => {
                        self.start_cycle(cycles);
                        self.view.notify(&notice);
                    }
                    Err(err) => {
                        warn!("filter rejected: {}", err);
                        self.view.notify(&Notice::from_error(&err));
                    }
                }
            }
            Command::ResetFilter => {
                let notice = lock(&self.dashboard).reset_filter();
                self.start_cycle(cycles);
                self.view.notify(&notice);
            }
            Command::ExportCsv => {
                let notice = lock(&self.dashboard).export_csv();
                self.view.notify(&notice);
            }
            Command::Shutdown => {}
        }
    }

    fn start_cycle(&self, cycles: &mut JoinSet<()>) {
        let ticket = lock(&self.dashboard).begin_cycle();
        self.metrics.record_started();

        let source = Arc::clone(&self.source);
        let view = Arc::clone(&self.view);
        let clock = Arc::clone(&self.clock);
        let dashboard = Arc::clone(&self.dashboard);
        let metrics = Arc::clone(&self.metrics);

        cycles.spawn(async move {
            let result = source.fetch().await;
            let now = clock.now();
            let update = lock(&dashboard).complete_cycle(&ticket, result, now);
            match update {
                Some(update) => {
                    if update.is_failure() {
                        metrics.record_failed();
                    } else {
                        metrics.record_rendered();
                    }
                    view.present(&update);
                }
                None => metrics.record_stale(),
            }
        });
    }
}

/// Handle for sending actions to a running controller and inspecting its state.
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    dashboard: Arc<Mutex<Dashboard>>,
    metrics: Arc<PollMetrics>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("controller already stopped; command dropped");
        }
    }

    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    pub fn select_preset(&self, preset: DatePreset) {
        self.send(Command::SelectPreset(preset));
    }

    pub fn apply_filter(&self, date: Option<NaiveDate>) {
        self.send(Command::ApplyFilter(date));
    }

    pub fn reset_filter(&self) {
        self.send(Command::ResetFilter);
    }

    pub fn export_csv(&self) {
        self.send(Command::ExportCsv);
    }

    pub fn filter_state(&self) -> FilterState {
        lock(&self.dashboard).filter().clone()
    }

    pub fn last_refreshed(&self) -> Option<NaiveDateTime> {
        lock(&self.dashboard).last_refreshed()
    }

    pub fn metrics(&self) -> PollSnapshot {
        self.metrics.snapshot()
    }

    /// Stops the ticker and aborts any fetch still in flight.
    pub async fn shutdown(self) {
        self.send(Command::Shutdown);
        if let Err(err) = self.task.await {
            warn!("controller task ended abnormally: {}", err);
        }
    }
}
