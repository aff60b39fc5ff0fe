use std::fmt;

use serde::Serialize;
use tracing::{
  debug,
  info,
  instrument
};
use uuid::Uuid;

use crate::bounds::DateBounds;
use crate::date::{
  CalendarDate,
  YearMonth
};
use crate::grid::{
  CalendarGrid,
  CalendarView,
  build_calendar_grid
};
use crate::preset::PresetName;
use crate::range::DateRange;
use crate::selection::{
  RangeSelection,
  SelectionPhase,
  TentativeRange
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
  Open,
  Applied,
  Cancelled
}

/// One open picker: the editing buffer, the
/// month being looked at and the window both are
/// checked against.
///
/// Once applied or cancelled the session is
/// closed and every operation becomes a no-op.
#[derive(Debug, Clone)]
pub struct SessionHandle {
  id:        Uuid,
  selection: RangeSelection,
  view:      CalendarView,
  bounds:    DateBounds,
  status:    SessionStatus
}

/// Serializable view of a session for the CLI
/// `state` command.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
  pub id:            Uuid,
  pub status:        SessionStatus,
  pub phase:         SelectionPhase,
  pub tentative:     TentativeRange,
  pub hover:         Option<CalendarDate>,
  pub view:          YearMonth,
  pub apply_enabled: bool
}

impl SessionHandle {
  #[instrument(skip_all, fields(initial = %initial.display_label()))]
  pub fn open(
    initial: DateRange,
    bounds: DateBounds
  ) -> Self {
    let id = Uuid::new_v4();
    let view =
      CalendarView::showing(bounds.today());
    debug!(
      %id,
      start = %initial.start,
      end = %initial.end,
      "opened picker session"
    );
    Self {
      id,
      selection: RangeSelection::seeded(
        initial
      ),
      view,
      bounds,
      status: SessionStatus::Open
    }
  }

  #[must_use]
  pub fn id(&self) -> Uuid {
    self.id
  }

  #[must_use]
  pub fn status(&self) -> SessionStatus {
    self.status
  }

  #[must_use]
  pub fn is_open(&self) -> bool {
    self.status == SessionStatus::Open
  }

  #[must_use]
  pub fn selection(
    &self
  ) -> &RangeSelection {
    &self.selection
  }

  #[must_use]
  pub fn tentative(
    &self
  ) -> TentativeRange {
    self.selection.tentative()
  }

  #[must_use]
  pub fn phase(&self) -> SelectionPhase {
    self.selection.phase()
  }

  #[must_use]
  pub fn bounds(&self) -> &DateBounds {
    &self.bounds
  }

  #[must_use]
  pub fn view_month(&self) -> YearMonth {
    self.view.month()
  }

  fn accepts(&self, op: &str) -> bool {
    if !self.is_open() {
      debug!(
        id = %self.id,
        op,
        status = ?self.status,
        "ignoring operation on closed session"
      );
    }
    self.is_open()
  }

  pub fn select(
    &mut self,
    date: CalendarDate
  ) -> bool {
    self.accepts("select")
      && self
        .selection
        .select(date, &self.bounds)
  }

  pub fn hover(
    &mut self,
    date: Option<CalendarDate>
  ) -> bool {
    self.accepts("hover")
      && self
        .selection
        .hover(date, &self.bounds)
  }

  pub fn apply_preset(
    &mut self,
    name: PresetName
  ) -> Option<DateRange> {
    if !self.accepts("apply_preset") {
      return None;
    }
    Some(
      self
        .selection
        .apply_preset(name, &self.bounds)
    )
  }

  pub fn reset(
    &mut self
  ) -> Option<DateRange> {
    if !self.accepts("reset") {
      return None;
    }
    Some(self.selection.reset(&self.bounds))
  }

  pub fn prev_month(&mut self) {
    if self.accepts("prev_month") {
      self.view.prev_month();
    }
  }

  pub fn next_month(&mut self) {
    if self.accepts("next_month") {
      self.view.next_month();
    }
  }

  /// Apply-button state.
  #[must_use]
  pub fn apply_enabled(&self) -> bool {
    self.is_open() && self.committable().is_some()
  }

  /// The buffer as it would be committed: complete,
  /// ordered and inside the window. A range seeded
  /// from outside the window stays uncommittable
  /// until it is re-picked.
  fn committable(&self) -> Option<DateRange> {
    self
      .selection
      .committable()
      .filter(|range| self.bounds.admits(range))
  }

  /// Commits and closes when the buffer is
  /// complete, ordered and selectable; otherwise
  /// nothing changes and the session stays open.
  #[instrument(skip(self), fields(id = %self.id))]
  pub fn apply(
    &mut self
  ) -> Option<DateRange> {
    if !self.accepts("apply") {
      return None;
    }
    let Some(range) = self.committable() else {
      debug!(
        tentative = ?self.selection.tentative(),
        "apply disabled; range incomplete, inverted \
         or outside the window"
      );
      return None;
    };
    self.status = SessionStatus::Applied;
    info!(
      start = %range.start,
      end = %range.end,
      "applied date range"
    );
    Some(range)
  }

  /// Closes without committing.
  pub fn cancel(&mut self) {
    if self.accepts("cancel") {
      self.status = SessionStatus::Cancelled;
      debug!(
        id = %self.id,
        "cancelled picker session"
      );
    }
  }

  /// Replaces the buffer with a range supplied
  /// from outside while the session is open.
  pub fn reseed(
    &mut self,
    committed: DateRange
  ) {
    if self.accepts("reseed") {
      self.selection.apply_range(committed);
    }
  }

  #[must_use]
  pub fn grid(&self) -> CalendarGrid {
    build_calendar_grid(
      self.view.month(),
      &self.selection,
      &self.bounds
    )
  }

  #[must_use]
  pub fn header_label(&self) -> String {
    self.tentative().display_label()
  }

  #[must_use]
  pub fn snapshot(&self) -> SessionSnapshot {
    SessionSnapshot {
      id:            self.id,
      status:        self.status,
      phase:         self.phase(),
      tentative:     self.tentative(),
      hover:         self
        .selection
        .hover_date(),
      view:          self.view.month(),
      apply_enabled: self.apply_enabled()
    }
  }
}

type ChangeListener =
  Box<dyn FnMut(&DateRange)>;

/// Owner of the committed range. Opens sessions
/// seeded from it and tells the listener about
/// each successful apply, exactly once.
pub struct RangePicker {
  committed: DateRange,
  bounds:    DateBounds,
  session:   Option<SessionHandle>,
  on_change: ChangeListener
}

impl fmt::Debug for RangePicker {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("RangePicker")
      .field("committed", &self.committed)
      .field("bounds", &self.bounds)
      .field("session", &self.session)
      .finish_non_exhaustive()
  }
}

impl RangePicker {
  pub fn new<F>(
    committed: DateRange,
    bounds: DateBounds,
    on_change: F
  ) -> Self
  where
    F: FnMut(&DateRange) + 'static
  {
    if !bounds.admits(&committed) {
      tracing::warn!(
        start = %committed.start,
        end = %committed.end,
        "initial committed range is inverted or \
         outside the window; apply stays disabled \
         until it is re-picked"
      );
    }
    Self {
      committed,
      bounds,
      session: None,
      on_change: Box::new(on_change)
    }
  }

  #[must_use]
  pub fn committed(&self) -> DateRange {
    self.committed
  }

  #[must_use]
  pub fn bounds(&self) -> &DateBounds {
    &self.bounds
  }

  #[must_use]
  pub fn is_open(&self) -> bool {
    self
      .session
      .as_ref()
      .is_some_and(SessionHandle::is_open)
  }

  #[must_use]
  pub fn session(
    &self
  ) -> Option<&SessionHandle> {
    self.session.as_ref()
  }

  pub fn session_mut(
    &mut self
  ) -> Option<&mut SessionHandle> {
    self.session.as_mut()
  }

  /// Opens a session seeded from the committed
  /// range, or returns the one already open.
  pub fn open(
    &mut self
  ) -> &mut SessionHandle {
    let reusable = self
      .session
      .as_ref()
      .is_some_and(SessionHandle::is_open);
    if !reusable {
      self.session = None;
    }
    let committed = self.committed;
    let bounds = &self.bounds;
    self.session.get_or_insert_with(|| {
      SessionHandle::open(
        committed,
        bounds.clone()
      )
    })
  }

  pub fn apply(
    &mut self
  ) -> Option<DateRange> {
    let applied =
      self.session.as_mut()?.apply()?;
    self.session = None;
    self.committed = applied;
    (self.on_change)(&applied);
    Some(applied)
  }

  /// Closing without apply discards the buffer.
  pub fn close(&mut self) {
    if let Some(mut session) =
      self.session.take()
    {
      session.cancel();
    }
  }

  /// The surrounding application changed the
  /// committed range; an open session follows.
  pub fn set_committed(
    &mut self,
    range: DateRange
  ) {
    debug!(
      start = %range.start,
      end = %range.end,
      admitted = self.bounds.admits(&range),
      "committed range replaced externally"
    );
    self.committed = range;
    if let Some(session) =
      self.session.as_mut()
    {
      session.reseed(range);
    }
  }

  #[must_use]
  pub fn display_label(&self) -> String {
    self.committed.display_label()
  }
}
