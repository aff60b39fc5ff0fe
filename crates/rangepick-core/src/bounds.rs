use std::sync::Arc;

use crate::clock::Clock;
use crate::date::CalendarDate;
use crate::range::DateRange;

/// Earliest selectable day unless configured
/// otherwise.
pub const DEFAULT_MIN_DATE: (i32, u32, u32) =
  (2025, 2, 15);

#[must_use]
pub fn default_min_date() -> CalendarDate {
  let (year, month, day) =
    DEFAULT_MIN_DATE;
  CalendarDate::from_ymd(year, month, day)
    .unwrap_or_else(|_| {
      CalendarDate::from_naive(
        chrono::NaiveDate::MIN
      )
    })
}

/// The allowed window `[min_date, today]`.
///
/// Every endpoint that can reach a committed
/// range passes through [`clamp_lower`] or
/// [`clamp_upper`], and [`is_disabled`] decides
/// which grid cells react to input.
///
/// [`clamp_lower`]: DateBounds::clamp_lower
/// [`clamp_upper`]: DateBounds::clamp_upper
/// [`is_disabled`]: DateBounds::is_disabled
#[derive(Debug, Clone)]
pub struct DateBounds {
  min_date: CalendarDate,
  clock:    Arc<dyn Clock>
}

impl DateBounds {
  pub fn new(
    min_date: CalendarDate,
    clock: Arc<dyn Clock>
  ) -> Self {
    let bounds = Self { min_date, clock };
    if min_date > bounds.today() {
      tracing::warn!(
        min_date = %min_date,
        today = %bounds.today(),
        "minimum date lies after today; \
         every day is disabled"
      );
    }
    bounds
  }

  #[must_use]
  pub fn min_date(&self) -> CalendarDate {
    self.min_date
  }

  #[must_use]
  pub fn today(&self) -> CalendarDate {
    self.clock.today()
  }

  #[must_use]
  pub fn clock(&self) -> Arc<dyn Clock> {
    Arc::clone(&self.clock)
  }

  #[must_use]
  pub fn clamp_lower(
    &self,
    date: CalendarDate
  ) -> CalendarDate {
    if date < self.min_date {
      self.min_date
    } else {
      date
    }
  }

  #[must_use]
  pub fn clamp_upper(
    &self,
    date: CalendarDate
  ) -> CalendarDate {
    let today = self.today();
    if date > today { today } else { date }
  }

  #[must_use]
  pub fn is_disabled(
    &self,
    date: CalendarDate
  ) -> bool {
    date > self.today()
      || date < self.min_date
  }

  /// `[min_date, today]` as a range, or `None`
  /// when the minimum lies after today.
  #[must_use]
  pub fn window(&self) -> Option<DateRange> {
    DateRange::ordered(
      self.min_date,
      self.today()
    )
  }

  /// Ordered with both endpoints selectable,
  /// i.e. a range that may be committed.
  #[must_use]
  pub fn admits(
    &self,
    range: &DateRange
  ) -> bool {
    range.is_ordered()
      && self.window().is_some_and(|window| {
        window.contains(range.start)
          && window.contains(range.end)
      })
  }
}
