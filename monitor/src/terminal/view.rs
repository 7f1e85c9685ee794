use attendcore::dashboard::{AttendanceView, Notice, NoticeLevel, ViewUpdate};
use attendcore::dates::{Label, Locale};
use attendcore::model::DisplayRow;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Prints every update to stdout, either as an aligned table or as JSON lines.
pub struct TerminalView {
    locale: Locale,
    format: OutputFormat,
}

impl TerminalView {
    pub fn new(locale: Locale, format: OutputFormat) -> Self {
        Self { locale, format }
    }
}

impl AttendanceView for TerminalView {
    fn present(&self, update: &ViewUpdate) {
        match self.format {
            OutputFormat::Table => println!("{}", render_update(update, self.locale)),
            OutputFormat::Json => match serde_json::to_string(update) {
                Ok(line) => println!("{}", line),
                Err(err) => warn!("could not encode update: {}", err),
            },
        }
    }

    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Success => println!("[ok] {}", notice.message),
            NoticeLevel::Warning => println!("[!] {}", notice.message),
        }
    }
}

pub fn render_update(update: &ViewUpdate, locale: Locale) -> String {
    match update {
        ViewUpdate::Failed { message, .. } => format!("x {}", message),
        ViewUpdate::Table {
            table,
            last_updated,
        } => {
            let mut out = format!(
                "{}: {}\n{}: {} | {}: {}\n",
                locale.label(Label::LastUpdated),
                last_updated,
                locale.label(Label::Total),
                table.total,
                locale.label(Label::TodayCount),
                table.today_count
            );
            match table.placeholder(locale) {
                Some(placeholder) => out.push_str(placeholder),
                None => out.push_str(&render_rows(&table.rows, locale)),
            }
            out
        }
    }
}

fn render_rows(rows: &[DisplayRow], locale: Locale) -> String {
    let headers = locale.column_headers();
    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|row| {
            [
                row.ordinal.to_string(),
                row.card_id.clone(),
                row.name.clone(),
                row.major.clone(),
                row.cohort.clone(),
                row.formatted_timestamp.clone(),
                row.badge.clone(),
            ]
        })
        .collect();

    let mut widths = headers.map(|header| header.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = headers.map(String::from);
    std::iter::once(&header)
        .chain(cells.iter())
        .map(|line| format_line(line, &widths))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_line(cells: &[String; 7], widths: &[usize; 7]) -> String {
    cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
