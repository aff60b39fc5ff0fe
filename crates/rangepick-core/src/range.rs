use serde::{
  Deserialize,
  Serialize
};

use crate::date::CalendarDate;

/// Inclusive pair of days.
///
/// A committed range always has
/// `start <= end`; [`DateRange::ordered`] is the
/// checked constructor. Presets may produce an
/// inverted candidate when the whole preset sits
/// outside the allowed window, which is why the
/// fields stay public and the check is explicit.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
pub struct DateRange {
  pub start: CalendarDate,
  pub end:   CalendarDate
}

impl DateRange {
  #[must_use]
  pub fn ordered(
    start: CalendarDate,
    end: CalendarDate
  ) -> Option<Self> {
    (start <= end)
      .then_some(Self { start, end })
  }

  #[must_use]
  pub fn is_ordered(&self) -> bool {
    self.start <= self.end
  }

  #[must_use]
  pub fn contains(
    &self,
    date: CalendarDate
  ) -> bool {
    date >= self.start && date <= self.end
  }

  #[must_use]
  pub fn day_count(&self) -> i64 {
    (self.end.naive() - self.start.naive())
      .num_days()
      + 1
  }

  /// Button label, e.g. `Mar 5 – Mar 10`.
  #[must_use]
  pub fn display_label(&self) -> String {
    format!(
      "{} \u{2013} {}",
      self.start.short_label(),
      self.end.short_label()
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(raw: &str) -> CalendarDate {
    CalendarDate::parse(raw)
      .expect("valid date")
  }

  #[test]
  fn ordered_rejects_inverted_pairs() {
    assert!(
      DateRange::ordered(
        day("2025-03-05"),
        day("2025-03-01")
      )
      .is_none()
    );
    let single = DateRange::ordered(
      day("2025-03-05"),
      day("2025-03-05")
    )
    .expect("single day range");
    assert_eq!(single.day_count(), 1);
    assert!(single.contains(day("2025-03-05")));
  }

  #[test]
  fn serializes_as_start_end_object() {
    let range = DateRange::ordered(
      day("2025-03-01"),
      day("2025-03-05")
    )
    .expect("ordered");
    let json = serde_json::to_value(range)
      .expect("serialize");
    assert_eq!(
      json,
      serde_json::json!({
        "start": "2025-03-01",
        "end": "2025-03-05"
      })
    );

    let back: DateRange =
      serde_json::from_value(json)
        .expect("deserialize");
    assert_eq!(back, range);
  }

  #[test]
  fn display_label_uses_short_days() {
    let range = DateRange::ordered(
      day("2025-03-05"),
      day("2025-03-10")
    )
    .expect("ordered");
    assert_eq!(
      range.display_label(),
      "Mar 5 \u{2013} Mar 10"
    );
  }
}
