use serde::{
  Deserialize,
  Serialize
};

use crate::bounds::DateBounds;
use crate::date::{
  CalendarDate,
  YearMonth
};
use crate::range::DateRange;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PresetName {
  ThisWeek,
  LastWeek,
  ThisMonth,
  LastMonth,
  #[serde(rename = "last-30-days")]
  Last30Days
}

impl PresetName {
  #[must_use]
  pub fn all() -> [Self; 5] {
    [
      Self::ThisWeek,
      Self::LastWeek,
      Self::ThisMonth,
      Self::LastMonth,
      Self::Last30Days
    ]
  }

  #[must_use]
  pub fn as_key(self) -> &'static str {
    match self {
      | Self::ThisWeek => "this-week",
      | Self::LastWeek => "last-week",
      | Self::ThisMonth => "this-month",
      | Self::LastMonth => "last-month",
      | Self::Last30Days => "last-30-days"
    }
  }

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | Self::ThisWeek => "This Week",
      | Self::LastWeek => "Last Week",
      | Self::ThisMonth => "This Month",
      | Self::LastMonth => "Last Month",
      | Self::Last30Days => "Last 30 Days"
    }
  }

  /// Accepts a key (`last-month`) or a label
  /// (`Last Month`), ignoring case.
  #[must_use]
  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    let wanted = key.trim();
    Self::all().into_iter().find(|preset| {
      preset
        .as_key()
        .eq_ignore_ascii_case(wanted)
        || preset
          .label()
          .eq_ignore_ascii_case(wanted)
    })
  }

  /// Unclamped derivation from `today`.
  #[must_use]
  pub fn raw_range(
    self,
    today: CalendarDate
  ) -> DateRange {
    match self {
      | Self::ThisWeek => {
        let start = today.start_of_week();
        DateRange {
          start,
          end: start.add_days(6)
        }
      }
      | Self::LastWeek => {
        let start = today
          .start_of_week()
          .add_days(-7);
        DateRange {
          start,
          end: start.add_days(6)
        }
      }
      | Self::ThisMonth => {
        let month = YearMonth::of(today);
        DateRange {
          start: month.first_day(),
          end:   month.last_day()
        }
      }
      | Self::LastMonth => {
        let month =
          YearMonth::of(today).prev();
        DateRange {
          start: month.first_day(),
          end:   month.last_day()
        }
      }
      | Self::Last30Days => {
        DateRange {
          start: today.add_days(-29),
          end:   today
        }
      }
    }
  }
}

/// The range a preset offers inside `bounds`:
/// the start is only ever raised to the minimum
/// and the end only ever lowered to today.
#[tracing::instrument(skip(bounds))]
pub fn preset_range(
  name: PresetName,
  bounds: &DateBounds
) -> DateRange {
  let raw = name.raw_range(bounds.today());
  let range = DateRange {
    start: bounds.clamp_lower(raw.start),
    end:   bounds.clamp_upper(raw.end)
  };
  tracing::debug!(
    preset = name.as_key(),
    raw_start = %raw.start,
    raw_end = %raw.end,
    start = %range.start,
    end = %range.end,
    "derived preset range"
  );
  range
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::clock::FixedClock;

  fn day(raw: &str) -> CalendarDate {
    CalendarDate::parse(raw)
      .expect("valid date")
  }

  fn bounds(
    min: &str,
    today: &str
  ) -> DateBounds {
    DateBounds::new(
      day(min),
      Arc::new(FixedClock::new(day(today)))
    )
  }

  fn range(
    start: &str,
    end: &str
  ) -> DateRange {
    DateRange {
      start: day(start),
      end:   day(end)
    }
  }

  #[test]
  fn last_month_start_is_raised_to_minimum()
  {
    let policy =
      bounds("2025-02-15", "2025-03-10");
    assert_eq!(
      preset_range(
        PresetName::LastMonth,
        &policy
      ),
      range("2025-02-15", "2025-02-28")
    );
  }

  #[test]
  fn this_week_end_is_lowered_to_today() {
    // 2025-03-10 is a Monday.
    let policy =
      bounds("2025-02-15", "2025-03-10");
    assert_eq!(
      preset_range(
        PresetName::ThisWeek,
        &policy
      ),
      range("2025-03-10", "2025-03-10")
    );
  }

  #[test]
  fn unclamped_derivations() {
    // Thursday.
    let today = day("2025-06-12");
    assert_eq!(
      PresetName::ThisWeek.raw_range(today),
      range("2025-06-09", "2025-06-15")
    );
    assert_eq!(
      PresetName::LastWeek.raw_range(today),
      range("2025-06-02", "2025-06-08")
    );
    assert_eq!(
      PresetName::ThisMonth
        .raw_range(today),
      range("2025-06-01", "2025-06-30")
    );
    assert_eq!(
      PresetName::LastMonth
        .raw_range(today),
      range("2025-05-01", "2025-05-31")
    );
    assert_eq!(
      PresetName::Last30Days
        .raw_range(today),
      range("2025-05-14", "2025-06-12")
    );
  }

  #[test]
  fn sunday_belongs_to_the_ending_week() {
    let today = day("2025-06-15");
    assert_eq!(
      PresetName::ThisWeek.raw_range(today),
      range("2025-06-09", "2025-06-15")
    );
  }

  #[test]
  fn last_month_in_january_is_december() {
    let today = day("2026-01-20");
    assert_eq!(
      PresetName::LastMonth
        .raw_range(today),
      range("2025-12-01", "2025-12-31")
    );
  }

  #[test]
  fn every_preset_stays_inside_the_window() {
    let mut today = day("2025-02-15");
    while today <= day("2026-03-31") {
      let policy = DateBounds::new(
        day("2025-02-15"),
        Arc::new(FixedClock::new(today))
      );
      for name in PresetName::all() {
        let r = preset_range(name, &policy);
        assert!(
          r.start >= policy.min_date(),
          "{name:?} on {today}"
        );
        assert!(
          r.end <= today,
          "{name:?} on {today}"
        );
      }
      today = today.add_days(1);
    }
  }

  #[test]
  fn preset_outside_window_comes_out_inverted()
  {
    // The minimum is today, so last week lies
    // entirely before it.
    let policy =
      bounds("2025-03-12", "2025-03-12");
    let r = preset_range(
      PresetName::LastWeek,
      &policy
    );
    assert_eq!(
      r,
      range("2025-03-12", "2025-03-09")
    );
    assert!(!r.is_ordered());
  }

  #[test]
  fn parses_keys_and_labels() {
    assert_eq!(
      PresetName::from_key("last-30-days"),
      Some(PresetName::Last30Days)
    );
    assert_eq!(
      PresetName::from_key("This Week"),
      Some(PresetName::ThisWeek)
    );
    assert_eq!(
      PresetName::from_key("LAST-MONTH"),
      Some(PresetName::LastMonth)
    );
    assert_eq!(
      PresetName::from_key("yesterday"),
      None
    );
    for name in PresetName::all() {
      assert_eq!(
        PresetName::from_key(name.as_key()),
        Some(name)
      );
    }
  }
}
