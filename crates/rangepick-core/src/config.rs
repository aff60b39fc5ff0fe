use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::bounds::{
  DateBounds,
  default_min_date
};
use crate::clock::{
  Clock,
  SystemClock,
  resolve_timezone
};
use crate::date::CalendarDate;

pub const CONFIG_ENV_VAR: &str =
  "RANGEPICK_CONFIG";
const CONFIG_DIR_NAME: &str = "rangepick";
const CONFIG_FILE_NAME: &str =
  "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
  bounds:  BoundsSection,
  time:    TimeSection,
  display: DisplaySection
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BoundsSection {
  min_date: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TimeSection {
  timezone: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DisplaySection {
  color: Option<bool>
}

#[derive(Debug, Clone)]
pub struct Config {
  pub min_date:     CalendarDate,
  pub timezone:     Option<String>,
  pub color:        bool,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      min_date:     default_min_date(),
      timezone:     None,
      color:        true,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let path = resolve_config_path(
      config_override
    )?;
    if let Some(path) = path {
      info!(config = %path.display(), "loading config");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no config file found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(self))]
  pub fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let parsed =
      toml::from_str::<ConfigFile>(&text)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;

    if let Some(raw) =
      parsed.bounds.min_date
    {
      self.min_date =
        CalendarDate::parse(raw.trim())
          .with_context(|| {
            format!(
              "invalid bounds.min_date in \
               {}",
              path.display()
            )
          })?;
    }
    if let Some(tz) = parsed.time.timezone
    {
      self.timezone = Some(tz);
    }
    if let Some(color) =
      parsed.display.color
    {
      self.color = color;
    }

    self.loaded_files.push(path);
    Ok(())
  }

  /// Applies `key=value` pairs on top of the
  /// loaded file. A leading `rc.` is accepted.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      match key.as_str() {
        | "bounds.min_date" => {
          self.min_date =
            CalendarDate::parse(v.trim())
              .with_context(|| {
                format!(
                  "invalid override \
                   {key}={v}"
                )
              })?;
        }
        | "time.timezone" => {
          self.timezone =
            Some(v.trim().to_string());
        }
        | "display.color" => {
          self.color = parse_bool(&v);
        }
        | _ => {
          warn!(key = %key, "unknown override key; ignoring");
        }
      }
    }
    Ok(())
  }

  #[must_use]
  pub fn system_clock(&self) -> SystemClock {
    match resolve_timezone(
      self.timezone.as_deref()
    ) {
      | Some(tz) => {
        SystemClock::in_timezone(tz)
      }
      | None => SystemClock::local()
    }
  }

  pub fn bounds(
    &self,
    clock: Arc<dyn Clock>
  ) -> DateBounds {
    DateBounds::new(self.min_date, clock)
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(config_env) =
    std::env::var(CONFIG_ENV_VAR)
  {
    if config_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      config_env
    )));
  }

  let Some(base) = dirs::config_dir()
  else {
    warn!(
      "cannot determine config \
       directory; using defaults"
    );
    return Ok(None);
  };
  let candidate = base
    .join(CONFIG_DIR_NAME)
    .join(CONFIG_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tempfile::NamedTempFile;

  use super::*;

  fn write_config(
    body: &str
  ) -> NamedTempFile {
    let mut file = NamedTempFile::new()
      .expect("temp config");
    file
      .write_all(body.as_bytes())
      .expect("write config");
    file
  }

  #[test]
  fn defaults_without_file() {
    let cfg = Config::default();
    assert_eq!(
      cfg.min_date.to_string(),
      "2025-02-15"
    );
    assert!(cfg.color);
    assert!(cfg.timezone.is_none());
  }

  #[test]
  fn loads_all_sections() {
    let file = write_config(
      r#"
[bounds]
min_date = "2024-11-01"

[time]
timezone = "Europe/Berlin"

[display]
color = false
"#
    );
    let cfg = Config::load(Some(file.path()))
      .expect("load config");
    assert_eq!(
      cfg.min_date.to_string(),
      "2024-11-01"
    );
    assert_eq!(
      cfg.timezone.as_deref(),
      Some("Europe/Berlin")
    );
    assert!(!cfg.color);
    assert_eq!(cfg.loaded_files.len(), 1);
  }

  #[test]
  fn partial_file_keeps_defaults() {
    let file = write_config(
      "[display]\ncolor = false\n"
    );
    let cfg = Config::load(Some(file.path()))
      .expect("load config");
    assert_eq!(
      cfg.min_date,
      default_min_date()
    );
    assert!(!cfg.color);
  }

  #[test]
  fn malformed_min_date_fails_fast() {
    let file = write_config(
      "[bounds]\nmin_date = \"2025-2-15\"\n"
    );
    let err = Config::load(Some(file.path()))
      .expect_err("malformed date");
    assert!(
      format!("{err:#}")
        .contains("bounds.min_date")
    );
  }

  #[test]
  fn overrides_win_over_file() {
    let mut cfg = Config::default();
    cfg
      .apply_overrides(vec![
        (
          "rc.bounds.min_date".to_string(),
          "2025-01-01".to_string()
        ),
        (
          "display.color".to_string(),
          "off".to_string()
        ),
        (
          "no.such.key".to_string(),
          "1".to_string()
        ),
      ])
      .expect("apply overrides");
    assert_eq!(
      cfg.min_date.to_string(),
      "2025-01-01"
    );
    assert!(!cfg.color);

    let bad = cfg.apply_overrides(vec![(
      "bounds.min_date".to_string(),
      "yesterday".to_string()
    )]);
    assert!(bad.is_err());
  }

  #[test]
  fn missing_file_is_an_error() {
    let dir =
      tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    assert!(
      Config::load(Some(&missing)).is_err()
    );
  }
}
