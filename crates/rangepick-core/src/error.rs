use thiserror::Error;

/// Rejection of a date string at the input
/// boundary. Nothing past the parser ever sees
/// a malformed date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
  #[error(
    "malformed date '{input}': expected \
     zero-padded YYYY-MM-DD"
  )]
  Malformed { input: String },

  #[error(
    "'{input}' is not a calendar day"
  )]
  InvalidDay { input: String },

  #[error(
    "invalid month {month} for year \
     {year}"
  )]
  InvalidMonth { year: i32, month: u32 }
}
