use serde::Serialize;

use crate::bounds::DateBounds;
use crate::date::{
  CalendarDate,
  YearMonth,
  month_grid_days,
  weekday_labels
};
use crate::selection::RangeSelection;

/// Display flags for one visible day. Cells hold
/// no state of their own; the grid is rebuilt
/// from scratch after every change.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize,
)]
pub struct DayCell {
  pub date:             CalendarDate,
  pub is_current_month: bool,
  pub is_today:         bool,
  pub is_disabled:      bool,
  pub is_range_start:   bool,
  pub is_range_end:     bool,
  pub is_in_range:      bool
}

impl DayCell {
  #[must_use]
  pub fn is_endpoint(&self) -> bool {
    self.is_range_start || self.is_range_end
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid {
  pub view:  YearMonth,
  pub cells: Vec<DayCell>
}

impl CalendarGrid {
  /// Rows of seven, Monday first.
  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[DayCell]> {
    self.cells.chunks(7)
  }

  #[must_use]
  pub fn title(&self) -> String {
    self.view.title()
  }

  #[must_use]
  pub fn weekday_labels(
    &self
  ) -> [&'static str; 7] {
    weekday_labels()
  }

  #[must_use]
  pub fn cell(
    &self,
    date: CalendarDate
  ) -> Option<&DayCell> {
    self
      .cells
      .iter()
      .find(|cell| cell.date == date)
  }
}

/// The month a picker is looking at. Moving it
/// never touches the selection.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct CalendarView {
  month: YearMonth
}

impl CalendarView {
  #[must_use]
  pub fn new(month: YearMonth) -> Self {
    Self { month }
  }

  #[must_use]
  pub fn showing(
    date: CalendarDate
  ) -> Self {
    Self {
      month: YearMonth::of(date)
    }
  }

  #[must_use]
  pub fn month(&self) -> YearMonth {
    self.month
  }

  pub fn prev_month(&mut self) {
    self.month = self.month.prev();
    tracing::debug!(
      year = self.month.year(),
      month = self.month.month(),
      "moved view back"
    );
  }

  pub fn next_month(&mut self) {
    self.month = self.month.next();
    tracing::debug!(
      year = self.month.year(),
      month = self.month.month(),
      "moved view forward"
    );
  }
}

#[tracing::instrument(skip(
  selection, bounds
))]
pub fn build_calendar_grid(
  view: YearMonth,
  selection: &RangeSelection,
  bounds: &DateBounds
) -> CalendarGrid {
  let today = bounds.today();
  let cells = month_grid_days(view)
    .into_iter()
    .map(|date| {
      DayCell {
        date,
        is_current_month: view
          .contains(date),
        is_today: date == today,
        is_disabled: bounds
          .is_disabled(date),
        is_range_start: selection
          .is_range_start(date),
        is_range_end: selection
          .is_range_end(date),
        is_in_range: selection
          .is_in_range(date)
      }
    })
    .collect::<Vec<_>>();

  tracing::trace!(
    cells = cells.len(),
    "built calendar grid"
  );
  CalendarGrid { view, cells }
}
