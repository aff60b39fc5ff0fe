use std::fmt;

use chrono::{
  Local,
  Utc
};
use chrono_tz::Tz;

use crate::date::CalendarDate;

pub const TIMEZONE_ENV_VAR: &str =
  "RANGEPICK_TIMEZONE";

/// Source of "today". Read on every call, never
/// cached, because a picker can stay open across
/// midnight.
pub trait Clock:
  fmt::Debug + Send + Sync
{
  fn today(&self) -> CalendarDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
  timezone: Option<Tz>
}

impl SystemClock {
  #[must_use]
  pub fn local() -> Self {
    Self { timezone: None }
  }

  #[must_use]
  pub fn in_timezone(tz: Tz) -> Self {
    Self { timezone: Some(tz) }
  }

  #[must_use]
  pub fn timezone(&self) -> Option<Tz> {
    self.timezone
  }
}

impl Clock for SystemClock {
  fn today(&self) -> CalendarDate {
    let naive = match self.timezone {
      | Some(tz) => {
        Utc::now()
          .with_timezone(&tz)
          .date_naive()
      }
      | None => Local::now().date_naive()
    };
    CalendarDate::from_naive(naive)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct FixedClock(CalendarDate);

impl FixedClock {
  #[must_use]
  pub fn new(today: CalendarDate) -> Self {
    Self(today)
  }
}

impl Clock for FixedClock {
  fn today(&self) -> CalendarDate {
    self.0
  }
}

/// Picks the timezone "today" is evaluated in:
/// the env var first, then the configured id.
/// `None` means the machine's local zone.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Option<Tz> {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return Some(tz);
  }

  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "time.timezone")
  {
    return Some(tz);
  }

  tracing::debug!(
    "no timezone configured; using local \
     zone"
  );
  None
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured picker timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}
