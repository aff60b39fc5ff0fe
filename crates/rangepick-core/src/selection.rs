use serde::Serialize;

use crate::bounds::DateBounds;
use crate::date::{
  CalendarDate,
  is_same_day,
  is_strictly_between
};
use crate::preset::{
  PresetName,
  preset_range
};
use crate::range::DateRange;

/// Which endpoint the next click sets.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
)]
pub enum SelectionPhase {
  #[default]
  PickingStart,
  PickingEnd
}

/// The editing buffer. It may be incomplete, and
/// a preset clamped from outside the window can
/// leave it inverted.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
)]
pub struct TentativeRange {
  pub start: Option<CalendarDate>,
  pub end:   Option<CalendarDate>
}

impl TentativeRange {
  #[must_use]
  pub fn from_range(
    range: DateRange
  ) -> Self {
    Self {
      start: Some(range.start),
      end:   Some(range.end)
    }
  }

  /// Complete and ordered, i.e. what apply
  /// would commit.
  #[must_use]
  pub fn committable(
    &self
  ) -> Option<DateRange> {
    match (self.start, self.end) {
      | (Some(start), Some(end)) => {
        DateRange::ordered(start, end)
      }
      | _ => None
    }
  }

  /// Header text with a dash standing in for a
  /// missing endpoint.
  #[must_use]
  pub fn display_label(&self) -> String {
    let side =
      |date: Option<CalendarDate>| {
        date
          .map(CalendarDate::short_label)
          .unwrap_or_else(|| {
            "\u{2014}".to_string()
          })
      };
    format!(
      "{} \u{2013} {}",
      side(self.start),
      side(self.end)
    )
  }
}

/// Two-phase range selection state.
///
/// Every transition is total: disabled days and
/// incomplete ranges just fail to make progress.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct RangeSelection {
  tentative: TentativeRange,
  phase:     SelectionPhase,
  hover:     Option<CalendarDate>
}

impl RangeSelection {
  /// Seeded from the committed range so
  /// reopening shows the previous selection.
  #[must_use]
  pub fn seeded(
    committed: DateRange
  ) -> Self {
    Self {
      tentative: TentativeRange::from_range(
        committed
      ),
      phase:     SelectionPhase::PickingStart,
      hover:     None
    }
  }

  #[must_use]
  pub fn tentative(
    &self
  ) -> TentativeRange {
    self.tentative
  }

  #[must_use]
  pub fn phase(&self) -> SelectionPhase {
    self.phase
  }

  #[must_use]
  pub fn hover_date(
    &self
  ) -> Option<CalendarDate> {
    self.hover
  }

  /// Returns whether the click changed
  /// anything; disabled days are ignored.
  pub fn select(
    &mut self,
    date: CalendarDate,
    bounds: &DateBounds
  ) -> bool {
    if bounds.is_disabled(date) {
      tracing::debug!(
        date = %date,
        "ignoring click on disabled day"
      );
      return false;
    }

    match (self.phase, self.tentative.start)
    {
      | (SelectionPhase::PickingEnd, Some(anchor)) => {
        self.tentative = if date < anchor {
          TentativeRange {
            start: Some(date),
            end:   Some(anchor)
          }
        } else {
          TentativeRange {
            start: Some(anchor),
            end:   Some(date)
          }
        };
        self.phase =
          SelectionPhase::PickingStart;
      }
      // PickingEnd always carries a start, so
      // this is the PickingStart case.
      | _ => {
        self.tentative = TentativeRange {
          start: Some(date),
          end:   None
        };
        self.phase =
          SelectionPhase::PickingEnd;
      }
    }

    tracing::debug!(
      date = %date,
      phase = ?self.phase,
      start = ?self.tentative.start,
      end = ?self.tentative.end,
      "selected day"
    );
    true
  }

  /// Pointer moved onto `date`, or off the grid
  /// for `None`. Disabled days are ignored.
  pub fn hover(
    &mut self,
    date: Option<CalendarDate>,
    bounds: &DateBounds
  ) -> bool {
    if let Some(day) = date
      && bounds.is_disabled(day)
    {
      tracing::trace!(
        date = %day,
        "ignoring hover on disabled day"
      );
      return false;
    }
    tracing::trace!(hover = ?date, "hover");
    self.hover = date;
    true
  }

  /// Sets both endpoints at once; the next click
  /// starts a fresh range.
  pub fn apply_range(
    &mut self,
    range: DateRange
  ) {
    self.tentative =
      TentativeRange::from_range(range);
    self.phase =
      SelectionPhase::PickingStart;
  }

  pub fn apply_preset(
    &mut self,
    name: PresetName,
    bounds: &DateBounds
  ) -> DateRange {
    let range = preset_range(name, bounds);
    self.apply_range(range);
    range
  }

  /// Back to the clamped This Month preset.
  pub fn reset(
    &mut self,
    bounds: &DateBounds
  ) -> DateRange {
    self.apply_preset(
      PresetName::ThisMonth,
      bounds
    )
  }

  #[must_use]
  pub fn committable(
    &self
  ) -> Option<DateRange> {
    self.tentative.committable()
  }

  #[must_use]
  pub fn is_range_start(
    &self,
    date: CalendarDate
  ) -> bool {
    self
      .tentative
      .start
      .is_some_and(|start| {
        is_same_day(date, start)
      })
  }

  #[must_use]
  pub fn is_range_end(
    &self,
    date: CalendarDate
  ) -> bool {
    self
      .tentative
      .end
      .is_some_and(|end| {
        is_same_day(date, end)
      })
  }

  /// Interior of the selected pair, or while
  /// picking the end, the interior of the range
  /// a click on the hovered day would produce.
  #[must_use]
  pub fn is_in_range(
    &self,
    date: CalendarDate
  ) -> bool {
    let TentativeRange { start, end } =
      self.tentative;
    if start.is_some() && end.is_some() {
      return is_strictly_between(
        date, start, end
      );
    }

    match (start, self.hover, self.phase) {
      | (
        Some(anchor),
        Some(hover),
        SelectionPhase::PickingEnd
      ) => {
        is_strictly_between(
          date,
          Some(anchor.min(hover)),
          Some(anchor.max(hover))
        )
      }
      | _ => false
    }
  }
}
