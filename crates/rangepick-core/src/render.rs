use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::grid::{CalendarGrid, DayCell};
use crate::preset::PresetName;
use crate::range::DateRange;
use crate::session::SessionHandle;

const CELL_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    json: bool,
}

impl Renderer {
    pub fn new(cfg: &Config, json: bool) -> Self {
        Self {
            color: cfg.color,
            json,
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn print_session(&mut self, session: &SessionHandle) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let grid = session.grid();

        if self.json {
            write_json(&mut out, &grid)?;
            return Ok(());
        }

        writeln!(out, "Select Date Range")?;
        writeln!(out, "{}", session.header_label())?;
        writeln!(out)?;
        let color = self.use_color();
        write_grid(&mut out, &grid, color)?;
        writeln!(out)?;
        writeln!(
            out,
            "presets: {}",
            PresetName::all()
                .iter()
                .map(|preset| preset.as_key())
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(
            out,
            "apply: {}",
            if session.apply_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        )?;
        Ok(())
    }

    pub fn print_state<T: Serialize>(&mut self, state: &T) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string_pretty(state)?)?;
        Ok(())
    }

    pub fn print_committed(&mut self, range: &DateRange) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if self.json {
            write_json(&mut out, range)?;
        } else {
            let days = range.day_count();
            let unit = if days == 1 { "day" } else { "days" };
            writeln!(
                out,
                "committed {}  ({} .. {}, {days} {unit})",
                range.display_label(),
                range.start,
                range.end
            )?;
        }
        Ok(())
    }

    pub fn print_notice(&mut self, message: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.paint(message, "33"))?;
        Ok(())
    }

    fn use_color(&self) -> bool {
        self.color && io::stdout().is_terminal()
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.use_color() {
            return text.to_string();
        }
        paint(text, code)
    }
}

fn paint(text: &str, code: &str) -> String {
    format!("\x1b[{code}m{text}\x1b[0m")
}

fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Seven columns of [`CELL_WIDTH`] under a
/// centered month title. Endpoints are bracketed,
/// interior days dashed, disabled days wrapped in
/// parentheses and today starred.
pub fn write_grid<W: Write>(mut writer: W, grid: &CalendarGrid, color: bool) -> anyhow::Result<()> {
    let total = CELL_WIDTH * 7;
    let title = grid.title();
    let padding = total.saturating_sub(UnicodeWidthStr::width(title.as_str())) / 2;
    writeln!(writer, "{}{}", " ".repeat(padding), title)?;

    for label in grid.weekday_labels() {
        write!(writer, "{label:>width$}", width = CELL_WIDTH - 1)?;
        write!(writer, " ")?;
    }
    writeln!(writer)?;

    for week in grid.weeks() {
        for cell in week {
            write!(writer, "{}", format_cell(cell, color))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn format_cell(cell: &DayCell, color: bool) -> String {
    let day = cell.date.day();
    let text = if cell.is_endpoint() {
        format!("[{day:>2}]")
    } else if cell.is_in_range {
        format!("-{day:>2}-")
    } else if cell.is_disabled {
        format!("({day:>2})")
    } else if cell.is_today {
        format!(" {day:>2}*")
    } else {
        format!(" {day:>2} ")
    };

    if !color {
        return text;
    }

    let code = if cell.is_endpoint() {
        "7"
    } else if cell.is_in_range {
        "36"
    } else if cell.is_disabled {
        "90"
    } else if !cell.is_current_month {
        "2"
    } else if cell.is_today {
        "1"
    } else {
        return text;
    };
    paint(&text, code)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bounds::DateBounds;
    use crate::clock::FixedClock;
    use crate::date::CalendarDate;

    fn day(raw: &str) -> CalendarDate {
        CalendarDate::parse(raw).expect("valid date")
    }

    #[test]
    fn plain_grid_marks_range_and_bounds() {
        let bounds = DateBounds::new(day("2025-02-15"), Arc::new(FixedClock::new(day("2025-03-10"))));
        let initial = DateRange::ordered(day("2025-03-03"), day("2025-03-05")).expect("ordered");
        let session = SessionHandle::open(initial, bounds);

        let mut buf = Vec::new();
        write_grid(&mut buf, &session.grid(), false).expect("render grid");
        let text = String::from_utf8(buf).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0].trim(), "March 2025");
        assert!(lines[1].contains("Mo"));
        assert!(lines[1].trim_end().ends_with("Su"));
        // 6 weeks of March 2025 below title and header.
        assert_eq!(lines.len(), 8);
        assert!(text.contains("[ 3]"));
        assert!(text.contains("- 4-"));
        assert!(text.contains("[ 5]"));
        assert!(text.contains(" 10*"));
        assert!(text.contains("(11)"));
        assert!(lines.iter().skip(2).all(|line| line.len() == CELL_WIDTH * 7));
    }
}
