use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::date::CalendarDate;
use crate::preset::PresetName;
use crate::render::Renderer;
use crate::session::RangePicker;

const CLOSED_NOTICE: &str = "picker is closed; run 'open' first";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select(CalendarDate),
    Hover(Option<CalendarDate>),
    Preset(PresetName),
    Reset,
    Apply,
    Cancel,
    Open,
    Prev,
    Next,
    Show,
    State,
    Help,
}

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "select", "hover", "preset", "reset", "apply", "cancel", "open", "prev", "next", "show",
        "state", "help",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

fn takes_argument(command: &str) -> bool {
    matches!(command, "select" | "hover" | "preset")
}

fn build_action(command: &str, arg: Option<&str>) -> anyhow::Result<Action> {
    let action = match command {
        "select" => {
            let raw = arg.ok_or_else(|| anyhow!("select needs a date"))?;
            Action::Select(CalendarDate::parse(raw).with_context(|| format!("select {raw}"))?)
        }
        "hover" => {
            let raw = arg.ok_or_else(|| anyhow!("hover needs a date or 'none'"))?;
            if raw.eq_ignore_ascii_case("none") {
                Action::Hover(None)
            } else {
                Action::Hover(Some(CalendarDate::parse(raw).with_context(|| format!("hover {raw}"))?))
            }
        }
        "preset" => {
            let raw = arg.ok_or_else(|| anyhow!("preset needs a name"))?;
            let name = PresetName::from_key(raw).ok_or_else(|| {
                let known = PresetName::all().iter().map(|p| p.as_key()).collect::<Vec<_>>().join(", ");
                anyhow!("unknown preset '{raw}'; expected one of: {known}")
            })?;
            Action::Preset(name)
        }
        "reset" => Action::Reset,
        "apply" => Action::Apply,
        "cancel" => Action::Cancel,
        "open" => Action::Open,
        "prev" => Action::Prev,
        "next" => Action::Next,
        "show" => Action::Show,
        "state" => Action::State,
        "help" => Action::Help,
        other => return Err(anyhow!("unknown action: {other}")),
    };
    Ok(action)
}

/// Parses a whole script up front so a bad token
/// aborts before any action runs.
#[instrument(skip_all)]
pub fn parse_script(tokens: &[String]) -> anyhow::Result<Vec<Action>> {
    let known = known_command_names();
    let mut actions = Vec::new();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        let command = expand_command_abbrev(token.as_str(), &known)
            .ok_or_else(|| anyhow!("unknown or ambiguous action: {token}"))?;
        let arg = if takes_argument(command) {
            Some(
                iter.next()
                    .ok_or_else(|| anyhow!("{command} is missing its argument"))?
                    .as_str(),
            )
        } else {
            None
        };
        debug!(token = %token, command, ?arg, "parsed action");
        actions.push(build_action(command, arg)?);
    }

    Ok(actions)
}

/// One action per line; blank lines and `#`
/// comments yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Action>> {
    let line = line.split_once('#').map_or(line, |(before, _)| before).trim();
    if line.is_empty() {
        return Ok(None);
    }
    let tokens = line.split_whitespace().map(str::to_string).collect::<Vec<_>>();
    let mut actions = parse_script(&tokens)?;
    if actions.len() != 1 {
        return Err(anyhow!("expected exactly one action per line, got {}", actions.len()));
    }
    Ok(actions.pop())
}

#[instrument(skip(picker, renderer))]
pub fn dispatch(picker: &mut RangePicker, renderer: &mut Renderer, action: Action) -> anyhow::Result<()> {
    match action {
        Action::Help => print_help(renderer),
        Action::Open => {
            let session = picker.open();
            renderer.print_session(session)
        }
        Action::Apply if !picker.is_open() => {
            warn!("apply on a closed picker");
            renderer.print_notice(CLOSED_NOTICE)
        }
        Action::Apply => match picker.apply() {
            Some(range) => {
                info!(start = %range.start, end = %range.end, days = range.day_count(), "range committed");
                Ok(())
            }
            None => renderer.print_notice("apply disabled: pick a start and an end inside the window"),
        },
        Action::Cancel => {
            picker.close();
            Ok(())
        }
        other => dispatch_to_session(picker, renderer, other),
    }
}

fn dispatch_to_session(picker: &mut RangePicker, renderer: &mut Renderer, action: Action) -> anyhow::Result<()> {
    let Some(session) = picker.session_mut().filter(|session| session.is_open()) else {
        warn!(?action, "picker is closed");
        return renderer.print_notice(CLOSED_NOTICE);
    };

    match action {
        Action::Select(date) => {
            if !session.select(date) {
                renderer.print_notice(&format!("{date} is outside the selectable window"))?;
            }
        }
        Action::Hover(date) => {
            session.hover(date);
        }
        Action::Preset(name) => {
            session.apply_preset(name);
        }
        Action::Reset => {
            session.reset();
        }
        Action::Prev => session.prev_month(),
        Action::Next => session.next_month(),
        Action::Show => renderer.print_session(session)?,
        Action::State => renderer.print_state(&session.snapshot())?,
        _ => {}
    }

    Ok(())
}

pub fn run_script(picker: &mut RangePicker, renderer: &mut Renderer, actions: Vec<Action>) -> anyhow::Result<()> {
    for action in actions {
        dispatch(picker, renderer, action)?;
    }
    Ok(())
}

/// Reads actions from stdin until EOF or `quit`.
/// A bad line is reported and skipped.
pub fn run_interactive(picker: &mut RangePicker, renderer: &mut Renderer) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    if prompt && let Some(session) = picker.session() {
        renderer.print_session(session)?;
    }

    let mut lines = stdin.lock().lines();
    loop {
        if prompt {
            print!("rangepick> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed reading stdin")?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }

        match parse_line(&line) {
            Ok(Some(action)) => dispatch(picker, renderer, action)?,
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, line = %line, "rejected input line");
                eprintln!("error: {err:#}");
            }
        }
    }

    Ok(())
}

fn print_help(renderer: &mut Renderer) -> anyhow::Result<()> {
    let presets = PresetName::all().iter().map(|p| p.as_key()).collect::<Vec<_>>().join(" | ");
    let text = format!(
        "select YYYY-MM-DD   pick the start, then the end\n\
         hover YYYY-MM-DD|none\n\
         preset {presets}\n\
         reset               back to this month\n\
         apply               commit the range\n\
         cancel              close without committing\n\
         open                reopen the picker\n\
         prev | next         move the calendar\n\
         show | state        print the grid or the JSON state"
    );
    renderer.print_notice(&text)
}
