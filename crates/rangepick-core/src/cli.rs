use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::date::CalendarDate;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rangepick",
    version,
    about = "Bounded date-range picker driven from the terminal",
    disable_help_subcommand = true,
    after_help = "Actions: select DATE, hover DATE|none, preset NAME, reset, apply, cancel, open, prev, next, show, state, help.\nWithout actions, one action per line is read from stdin."
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Pin "today" instead of reading the system clock.
    #[arg(long = "today")]
    pub today: Option<CalendarDate>,

    /// First day of the initially committed range.
    #[arg(long = "start", requires = "end")]
    pub start: Option<CalendarDate>,

    /// Last day of the initially committed range.
    #[arg(long = "end", requires = "start")]
    pub end: Option<CalendarDate>,

    /// Print grids and state as JSON instead of text.
    #[arg(long = "json")]
    pub json: bool,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_globals_and_trailing_actions() {
        let cli = GlobalCli::parse_from([
            "rangepick",
            "-vv",
            "--today",
            "2025-03-10",
            "--rc",
            "bounds.min_date=2025-02-15",
            "select",
            "2025-03-05",
            "apply",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.today.map(|d| d.to_string()).as_deref(), Some("2025-03-10"));
        assert_eq!(cli.rc_overrides.len(), 1);
        assert_eq!(cli.rc_overrides[0].key, "bounds.min_date");
        assert_eq!(cli.rest, vec!["select", "2025-03-05", "apply"]);
    }

    #[test]
    fn rejects_malformed_dates_at_the_boundary() {
        let parsed = GlobalCli::try_parse_from(["rangepick", "--today", "2025-3-10"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn start_requires_end() {
        let parsed = GlobalCli::try_parse_from(["rangepick", "--start", "2025-03-01"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn keyval_requires_equals() {
        assert!("display.color".parse::<KeyVal>().is_err());
        let kv = "display.color = off".parse::<KeyVal>().expect("keyval");
        assert_eq!(kv.key, "display.color");
        assert_eq!(kv.value, "off");
    }
}
