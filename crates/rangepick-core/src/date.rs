use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{
  Datelike,
  Duration,
  NaiveDate
};
use regex::Regex;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};

use crate::error::DateError;

const CANONICAL_FORMAT: &str =
  "%Y-%m-%d";
const CANONICAL_PATTERN: &str =
  r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$";

/// A day with no time component.
///
/// The canonical text form is zero-padded
/// `YYYY-MM-DD`, so the derived ordering agrees
/// with lexicographic ordering of that form.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
  #[must_use]
  pub fn from_naive(
    date: NaiveDate
  ) -> Self {
    Self(date)
  }

  pub fn from_ymd(
    year: i32,
    month: u32,
    day: u32
  ) -> Result<Self, DateError> {
    NaiveDate::from_ymd_opt(
      year, month, day
    )
    .map(Self)
    .ok_or_else(|| {
      DateError::InvalidDay {
        input: format!(
          "{year:04}-{month:02}-{day:02}"
        )
      }
    })
  }

  /// Strict boundary parser: anything other
  /// than a real zero-padded `YYYY-MM-DD` day
  /// is rejected, nothing is coerced.
  pub fn parse(
    input: &str
  ) -> Result<Self, DateError> {
    let shaped = canonical_shape()
      .is_some_and(|re| {
        re.is_match(input)
      });
    if !shaped {
      return Err(DateError::Malformed {
        input: input.to_string()
      });
    }

    NaiveDate::parse_from_str(
      input,
      CANONICAL_FORMAT
    )
    .map(Self)
    .map_err(|_| {
      DateError::InvalidDay {
        input: input.to_string()
      }
    })
  }

  #[must_use]
  pub fn naive(self) -> NaiveDate {
    self.0
  }

  #[must_use]
  pub fn year(self) -> i32 {
    self.0.year()
  }

  #[must_use]
  pub fn month(self) -> u32 {
    self.0.month()
  }

  #[must_use]
  pub fn day(self) -> u32 {
    self.0.day()
  }

  /// Column of this day in a Monday-first
  /// week, 0 for Monday through 6 for Sunday.
  #[must_use]
  pub fn weekday_index(self) -> u32 {
    self
      .0
      .weekday()
      .num_days_from_monday()
  }

  #[must_use]
  pub fn add_days(
    self,
    days: i64
  ) -> Self {
    self
      .0
      .checked_add_signed(Duration::days(
        days
      ))
      .map(Self)
      .unwrap_or(self)
  }

  #[must_use]
  pub fn start_of_week(self) -> Self {
    self.add_days(
      -i64::from(self.weekday_index())
    )
  }

  /// Short display form, e.g. `Mar 5`.
  #[must_use]
  pub fn short_label(self) -> String {
    self.0.format("%b %-d").to_string()
  }
}

impl fmt::Display for CalendarDate {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{}",
      self.0.format(CANONICAL_FORMAT)
    )
  }
}

impl FromStr for CalendarDate {
  type Err = DateError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl Serialize for CalendarDate {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de>
  for CalendarDate
{
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    Self::parse(&raw)
      .map_err(serde::de::Error::custom)
  }
}

fn canonical_shape()
-> Option<&'static Regex> {
  static SHAPE: OnceLock<Option<Regex>> =
    OnceLock::new();
  SHAPE
    .get_or_init(|| {
      match Regex::new(CANONICAL_PATTERN)
      {
        | Ok(re) => Some(re),
        | Err(err) => {
          tracing::error!(
            error = %err,
            "failed compiling canonical \
             date pattern"
          );
          None
        }
      }
    })
    .as_ref()
}

#[must_use]
pub fn is_same_day(
  a: CalendarDate,
  b: CalendarDate
) -> bool {
  a == b
}

/// True when `date` lies strictly inside
/// `(start, end)`. Missing bounds never contain
/// anything.
#[must_use]
pub fn is_strictly_between(
  date: CalendarDate,
  start: Option<CalendarDate>,
  end: Option<CalendarDate>
) -> bool {
  match (start, end) {
    | (Some(start), Some(end)) => {
      date > start && date < end
    }
    | _ => false
  }
}

/// A validated calendar month, the unit the day
/// grid is built for.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
)]
pub struct YearMonth {
  year:  i32,
  month: u32
}

impl YearMonth {
  pub fn new(
    year: i32,
    month: u32
  ) -> Result<Self, DateError> {
    let valid = (1..=12).contains(&month)
      && NaiveDate::from_ymd_opt(
        year, month, 1
      )
      .is_some()
      && next_month_first(year, month)
        .is_some();
    if valid {
      Ok(Self { year, month })
    } else {
      Err(DateError::InvalidMonth {
        year,
        month
      })
    }
  }

  #[must_use]
  pub fn of(date: CalendarDate) -> Self {
    Self {
      year:  date.year(),
      month: date.month()
    }
  }

  #[must_use]
  pub fn year(self) -> i32 {
    self.year
  }

  #[must_use]
  pub fn month(self) -> u32 {
    self.month
  }

  #[must_use]
  pub fn first_day(self) -> CalendarDate {
    CalendarDate(
      NaiveDate::from_ymd_opt(
        self.year, self.month, 1
      )
      .unwrap_or(NaiveDate::MIN)
    )
  }

  #[must_use]
  pub fn last_day(self) -> CalendarDate {
    next_month_first(
      self.year, self.month
    )
    .map(|first| {
      CalendarDate(first).add_days(-1)
    })
    .unwrap_or_else(|| self.first_day())
  }

  #[must_use]
  pub fn days_in_month(self) -> u32 {
    self.last_day().day()
  }

  #[must_use]
  pub fn contains(
    self,
    date: CalendarDate
  ) -> bool {
    date.year() == self.year
      && date.month() == self.month
  }

  /// December wraps into January of the next
  /// year.
  #[must_use]
  pub fn next(self) -> Self {
    let (year, month) =
      if self.month >= 12 {
        (self.year.saturating_add(1), 1)
      } else {
        (self.year, self.month + 1)
      };
    Self::new(year, month).unwrap_or(self)
  }

  /// January wraps into December of the
  /// previous year.
  #[must_use]
  pub fn prev(self) -> Self {
    let (year, month) =
      if self.month <= 1 {
        (self.year.saturating_sub(1), 12)
      } else {
        (self.year, self.month - 1)
      };
    Self::new(year, month).unwrap_or(self)
  }

  /// Header text, e.g. `March 2025`.
  #[must_use]
  pub fn title(self) -> String {
    self
      .first_day()
      .naive()
      .format("%B %Y")
      .to_string()
  }
}

fn next_month_first(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  let (next_year, next_month) =
    if month >= 12 {
      (year.checked_add(1)?, 1)
    } else {
      (year, month + 1)
    };
  NaiveDate::from_ymd_opt(
    next_year, next_month, 1
  )
}

/// Days shown for `view`: the whole month,
/// preceded by the previous month's tail so the
/// 1st lands on its Monday-first column and
/// followed by the next month's head so the last
/// week is complete.
#[must_use]
pub fn month_grid_days(
  view: YearMonth
) -> Vec<CalendarDate> {
  let first = view.first_day();
  let last = view.last_day();
  let leading =
    i64::from(first.weekday_index());
  let trailing =
    6 - i64::from(last.weekday_index());
  let total = leading
    + i64::from(view.days_in_month())
    + trailing;
  let grid_start =
    first.add_days(-leading);

  (0..total)
    .map(|offset| {
      grid_start.add_days(offset)
    })
    .collect()
}

#[must_use]
pub fn weekday_labels()
-> [&'static str; 7] {
  ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(raw: &str) -> CalendarDate {
    CalendarDate::parse(raw)
      .expect("valid date")
  }

  #[test]
  fn parses_canonical_dates() {
    let parsed = day("2025-03-05");
    assert_eq!(parsed.year(), 2025);
    assert_eq!(parsed.month(), 3);
    assert_eq!(parsed.day(), 5);
    assert_eq!(
      parsed.to_string(),
      "2025-03-05"
    );
  }

  #[test]
  fn rejects_non_canonical_shapes() {
    for raw in [
      "2025-3-5",
      "25-03-05",
      " 2025-03-05",
      "2025-03-05T00:00",
      "2025/03/05",
      "",
      "2025-٠٣-05"
    ] {
      assert!(
        matches!(
          CalendarDate::parse(raw),
          Err(DateError::Malformed { .. })
        ),
        "{raw:?} should be malformed"
      );
    }
  }

  #[test]
  fn rejects_impossible_days() {
    for raw in [
      "2025-02-29",
      "2025-13-01",
      "2025-04-31",
      "2025-00-10"
    ] {
      assert!(
        matches!(
          CalendarDate::parse(raw),
          Err(DateError::InvalidDay { .. })
        ),
        "{raw:?} should be invalid"
      );
    }
    assert!(
      CalendarDate::parse("2024-02-29")
        .is_ok()
    );
  }

  #[test]
  fn format_then_parse_is_identity() {
    let mut current = day("2023-12-25");
    for _ in 0..800 {
      let text = current.to_string();
      assert_eq!(day(&text), current);
      current = current.add_days(1);
    }
  }

  #[test]
  fn ordering_matches_canonical_text() {
    let a = day("2025-02-28");
    let b = day("2025-03-01");
    assert!(a < b);
    assert!(
      a.to_string() < b.to_string()
    );
  }

  #[test]
  fn strictly_between_excludes_bounds() {
    let start = Some(day("2025-03-01"));
    let end = Some(day("2025-03-05"));
    assert!(is_strictly_between(
      day("2025-03-03"),
      start,
      end
    ));
    assert!(!is_strictly_between(
      day("2025-03-01"),
      start,
      end
    ));
    assert!(!is_strictly_between(
      day("2025-03-05"),
      start,
      end
    ));
    assert!(!is_strictly_between(
      day("2025-03-03"),
      start,
      None
    ));
  }

  #[test]
  fn grid_pads_to_monday_first_weeks() {
    // March 2025 starts on a Saturday and
    // ends on a Monday.
    let view = YearMonth::new(2025, 3)
      .expect("valid month");
    let days = month_grid_days(view);

    assert_eq!(days.len() % 7, 0);
    assert_eq!(days.len(), 42);
    assert_eq!(days[0], day("2025-02-24"));
    assert_eq!(days[5], day("2025-03-01"));
    assert_eq!(
      days[days.len() - 1],
      day("2025-04-06")
    );
    assert!(days.windows(2).all(|pair| {
      pair[0].add_days(1) == pair[1]
    }));
  }

  #[test]
  fn grid_without_padding_when_aligned() {
    // February 2027 starts on a Monday and
    // ends on a Sunday.
    let view = YearMonth::new(2027, 2)
      .expect("valid month");
    let days = month_grid_days(view);
    assert_eq!(days.len(), 28);
    assert_eq!(days[0], day("2027-02-01"));
    assert_eq!(days[27], day("2027-02-28"));
  }

  #[test]
  fn month_navigation_wraps_years() {
    let december = YearMonth::new(2025, 12)
      .expect("valid month");
    assert_eq!(
      december.next(),
      YearMonth::new(2026, 1)
        .expect("valid month")
    );

    let january = YearMonth::new(2025, 1)
      .expect("valid month");
    assert_eq!(
      january.prev(),
      YearMonth::new(2024, 12)
        .expect("valid month")
    );
  }

  #[test]
  fn month_bounds_and_titles() {
    let feb = YearMonth::new(2024, 2)
      .expect("valid month");
    assert_eq!(
      feb.last_day(),
      day("2024-02-29")
    );
    assert_eq!(feb.title(), "February 2024");
    assert!(
      YearMonth::new(2024, 13).is_err()
    );
    assert!(
      YearMonth::new(2024, 0).is_err()
    );
  }

  #[test]
  fn week_start_is_monday() {
    assert_eq!(
      day("2025-03-16").start_of_week(),
      day("2025-03-10")
    );
    assert_eq!(
      day("2025-03-10").start_of_week(),
      day("2025-03-10")
    );
  }

  #[test]
  fn short_label_drops_padding() {
    assert_eq!(
      day("2025-03-05").short_label(),
      "Mar 5"
    );
  }

  #[test]
  fn serde_uses_canonical_string() {
    let json = serde_json::to_string(
      &day("2025-03-05")
    )
    .expect("serialize");
    assert_eq!(json, "\"2025-03-05\"");

    let bad = serde_json::from_str::<
      CalendarDate,
    >("\"2025-3-5\"");
    assert!(bad.is_err());
  }
}
