pub mod bounds;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod date;
pub mod error;
pub mod grid;
pub mod preset;
pub mod range;
pub mod render;
pub mod selection;
pub mod session;

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::{
  Context,
  anyhow
};
use clap::Parser;
use tracing::{
  debug,
  error,
  info
};

pub use bounds::DateBounds;
pub use clock::{
  Clock,
  FixedClock,
  SystemClock
};
pub use date::{
  CalendarDate,
  YearMonth
};
pub use error::DateError;
pub use grid::{
  CalendarGrid,
  DayCell
};
pub use preset::PresetName;
pub use range::DateRange;
pub use selection::{
  RangeSelection,
  SelectionPhase,
  TentativeRange
};
pub use session::{
  RangePicker,
  SessionHandle
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting rangepick"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg
    .apply_overrides(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
    .context(
      "failed to apply --rc overrides"
    )?;

  let clock: Arc<dyn Clock> =
    match cli.today {
      | Some(today) => {
        debug!(today = %today, "using pinned today");
        Arc::new(FixedClock::new(today))
      }
      | None => Arc::new(cfg.system_clock())
    };
  let bounds = cfg.bounds(clock);

  let initial = initial_range(
    cli.start, cli.end, &bounds
  )?;
  info!(
    start = %initial.start,
    end = %initial.end,
    min_date = %bounds.min_date(),
    today = %bounds.today(),
    "seeding picker"
  );

  let mut renderer =
    render::Renderer::new(&cfg, cli.json);
  let mut listener = renderer.clone();
  let mut picker = RangePicker::new(
    initial,
    bounds,
    move |range: &DateRange| {
      if let Err(err) =
        listener.print_committed(range)
      {
        error!(error = %err, "failed to print committed range");
      }
    }
  );
  picker.open();

  if cli.rest.is_empty() {
    commands::run_interactive(
      &mut picker,
      &mut renderer
    )?;
  } else {
    let actions =
      commands::parse_script(&cli.rest)?;
    commands::run_script(
      &mut picker,
      &mut renderer,
      actions
    )?;
  }

  info!(
    committed = %picker.display_label(),
    "done"
  );
  Ok(())
}

/// The committed range the picker starts from:
/// the given pair, which must be ordered and
/// selectable, or the clamped This Month preset.
pub fn initial_range(
  start: Option<CalendarDate>,
  end: Option<CalendarDate>,
  bounds: &DateBounds
) -> anyhow::Result<DateRange> {
  match (start, end) {
    | (Some(start), Some(end)) => {
      let range =
        DateRange::ordered(start, end)
          .ok_or_else(|| {
            anyhow!(
              "start {start} is after end \
               {end}"
            )
          })?;
      for endpoint in [start, end] {
        if bounds.is_disabled(endpoint) {
          return Err(anyhow!(
            "{endpoint} is outside the \
             selectable window {} .. {}",
            bounds.min_date(),
            bounds.today()
          ));
        }
      }
      Ok(range)
    }
    | (None, None) => {
      let range = preset::preset_range(
        PresetName::ThisMonth,
        bounds
      );
      if range.is_ordered() {
        Ok(range)
      } else {
        Err(anyhow!(
          "no selectable days: minimum \
           {} lies after today {}",
          bounds.min_date(),
          bounds.today()
        ))
      }
    }
    | _ => {
      Err(anyhow!(
        "--start and --end must be given \
         together"
      ))
    }
  }
}
