use attendcore::dashboard::{
    Clock, CycleTicket, Dashboard, DatePreset, LocalClock, Notice, NoticeLevel, ViewMode,
    ViewUpdate,
};
use attendcore::dates::{Label, Locale};
use attendcore::feed::{FeedSource, HttpFeedSource};
use attendcore::model::{AttendanceFeed, DisplayRow};
use attendcore::AttendResult;
use chrono::NaiveDate;
use iced::{
    time,
    widget::{button, column, row, scrollable, text, text_input, Column, Container, Row},
    Alignment, Color, Element, Length, Subscription, Task, Theme,
};
use std::time::Duration;

const DEFAULT_FEED_URL: &str = "http://127.0.0.1:8080/absensi.json";
const REFRESH_INTERVAL: Duration = Duration::from_secs(10);
const COLUMN_WIDTHS: [f32; 7] = [40.0, 110.0, 180.0, 120.0, 70.0, 150.0, 100.0];

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Board::boot, Board::update, Board::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(board: &Board) -> String {
    board.label(Label::AppTitle).into()
}

fn application_subscription(_: &Board) -> Subscription<Message> {
    time::every(REFRESH_INTERVAL).map(|_| Message::Tick)
}

fn application_theme(_: &Board) -> Theme {
    Theme::Light
}

/// Feed URL from the first argument, then an optional locale (`en` or `id`).
fn launch_settings() -> (String, Locale) {
    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
    let locale = args
        .next()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();
    (url, locale)
}

struct Board {
    source: Option<HttpFeedSource>,
    dashboard: Dashboard,
    date_input: String,
    update: Option<ViewUpdate>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    FeedFetched(CycleTicket, AttendResult<AttendanceFeed>),
    DateInputChanged(String),
    PresetSelected(DatePreset),
    ApplyFilter,
    ResetFilter,
    Refresh,
    ExportCsv,
}

impl Board {
    fn boot() -> (Self, Task<Message>) {
        let (url, locale) = launch_settings();
        let (source, status) = match HttpFeedSource::new(&url) {
            Ok(source) => (Some(source), locale.label(Label::Loading).to_string()),
            Err(err) => (None, format!("x {}", err)),
        };
        let mut board = Board {
            source,
            dashboard: Dashboard::new(locale),
            date_input: today().format("%Y-%m-%d").to_string(),
            update: None,
            status,
            history: Vec::new(),
        };
        let task = board.start_cycle();
        (board, task)
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => state.start_cycle(),
            Message::FeedFetched(ticket, result) => {
                let now = LocalClock.now();
                if let Some(update) = state.dashboard.complete_cycle(&ticket, result, now) {
                    state.status = match &update {
                        ViewUpdate::Table { last_updated, .. } => {
                            format!("{}: {}", state.label(Label::LastUpdated), last_updated)
                        }
                        ViewUpdate::Failed { message, .. } => message.clone(),
                    };
                    state.update = Some(update);
                }
                Task::none()
            }
            Message::DateInputChanged(value) => {
                state.date_input = value;
                Task::none()
            }
            Message::PresetSelected(preset) => {
                let date = state.dashboard.select_preset(preset, today());
                state.date_input = date.format("%Y-%m-%d").to_string();
                Task::none()
            }
            Message::ApplyFilter => {
                let input = state.date_input.trim();
                let date = if input.is_empty() {
                    None
                } else {
                    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
                        Ok(date) => Some(date),
                        Err(_) => {
                            let message = format!(
                                "`{}` {}",
                                input,
                                state.label(Label::DateFormatHint)
                            );
                            state.push_notice(&Notice::warning(message));
                            return Task::none();
                        }
                    }
                };
                match state.dashboard.apply_filter(date, today()) {
                    Ok(notice) => {
                        state.push_notice(&notice);
                        state.start_cycle()
                    }
                    Err(err) => {
                        state.push_notice(&Notice::from_error(&err));
                        Task::none()
                    }
                }
            }
            Message::ResetFilter => {
                let notice = state.dashboard.reset_filter();
                state.push_notice(&notice);
                state.date_input = today().format("%Y-%m-%d").to_string();
                state.start_cycle()
            }
            Message::Refresh => {
                let notice = state.dashboard.refresh_notice();
                state.push_notice(&notice);
                state.start_cycle()
            }
            Message::ExportCsv => {
                let notice = state.dashboard.export_csv();
                state.push_notice(&notice);
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let (total, today_count) = state
            .update
            .as_ref()
            .and_then(ViewUpdate::table)
            .map(|table| (table.total, table.today_count))
            .unwrap_or((0, 0));

        let locale = state.dashboard.locale();
        let mode_label = match state.dashboard.mode() {
            ViewMode::Live => locale.label(Label::LiveTitle).to_string(),
            ViewMode::History => match state.dashboard.filter().selected_date {
                Some(date) => format!(
                    "{}: {}",
                    locale.label(Label::HistoryTitle),
                    locale.format_long_date(date)
                ),
                None => locale.label(Label::HistoryTitle).to_string(),
            },
        };

        let header = column![
            text(locale.label(Label::AppTitle)).size(26),
            text(mode_label).size(16),
            text(&state.status).size(13),
            row![
                text(format!("{}: {}", locale.label(Label::Total), total)).size(18),
                text(format!("{}: {}", locale.label(Label::TodayCount), today_count)).size(18),
            ]
            .spacing(24),
        ]
        .spacing(6);

        let controls = row![
            text_input("YYYY-MM-DD", &state.date_input)
                .on_input(Message::DateInputChanged)
                .padding(6)
                .width(Length::Fixed(140.0)),
            button(locale.label(Label::PresetToday))
                .on_press(Message::PresetSelected(DatePreset::Today))
                .padding(8),
            button(locale.label(Label::PresetYesterday))
                .on_press(Message::PresetSelected(DatePreset::Yesterday))
                .padding(8),
            button(locale.label(Label::ApplyFilter))
                .on_press(Message::ApplyFilter)
                .padding(8),
            button(locale.label(Label::ResetFilter))
                .on_press(Message::ResetFilter)
                .padding(8),
            button(locale.label(Label::Refresh))
                .on_press(Message::Refresh)
                .padding(8),
            button(locale.label(Label::ExportCsv))
                .on_press(Message::ExportCsv)
                .padding(8),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let body: Column<'_, Message> = match &state.update {
            None => Column::new().push(text(locale.label(Label::Loading)).size(14)),
            Some(ViewUpdate::Failed { message, .. }) => Column::new().push(
                text(format!("x {}", message))
                    .size(14)
                    .color(Color::from_rgb(0.8, 0.2, 0.2)),
            ),
            Some(ViewUpdate::Table { table, .. }) => {
                let heading = table_row(locale.column_headers().map(String::from));
                match table.placeholder(locale) {
                    Some(placeholder) => Column::new()
                        .spacing(4)
                        .push(heading)
                        .push(text(placeholder).size(14)),
                    None => table
                        .rows
                        .iter()
                        .fold(Column::new().spacing(4).push(heading), |col, row| {
                            col.push(table_row(row_cells(row)))
                        }),
                }
            }
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text(locale.label(Label::NoActivity)).size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let layout = column![
            header,
            controls,
            Container::new(scrollable(body).height(Length::Fill)).padding(6),
            text(locale.label(Label::ActivityLog)).size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(12)
        .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn start_cycle(&mut self) -> Task<Message> {
        let Some(source) = self.source.clone() else {
            return Task::none();
        };
        let ticket = self.dashboard.begin_cycle();
        Task::perform(
            async move { (ticket, source.fetch().await) },
            |(ticket, result)| Message::FeedFetched(ticket, result),
        )
    }

    fn label(&self, label: Label) -> &'static str {
        self.dashboard.locale().label(label)
    }

    fn push_notice(&mut self, notice: &Notice) {
        let marker = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "!",
        };
        self.status = notice.message.clone();
        self.push_history(format!("[{}] {}", marker, notice.message));
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn today() -> NaiveDate {
    LocalClock.now().date()
}

fn row_cells(row: &DisplayRow) -> [String; 7] {
    [
        row.ordinal.to_string(),
        row.card_id.clone(),
        row.name.clone(),
        row.major.clone(),
        row.cohort.clone(),
        row.formatted_timestamp.clone(),
        row.badge.clone(),
    ]
}

fn table_row<'a>(cells: [String; 7]) -> Element<'a, Message> {
    Row::with_children(
        cells
            .into_iter()
            .zip(COLUMN_WIDTHS)
            .map(|(cell, width)| text(cell).size(13).width(Length::Fixed(width)).into()),
    )
    .spacing(8)
    .into()
}
