//! Drag-selection state for the schedule grid.
//!
//! A gesture starts with a press on an available block, extends while the
//! pointer moves over further blocks of the same day, and ends on release
//! anywhere in the terminal. The selected span survives the release so the
//! grid keeps its highlight until the next gesture or an explicit clear.

use chrono::NaiveDate;

use crate::models::{BlockRange, MANUAL_BLOCK_REASON};
use crate::utils::{block_end_time, format_iso_date};

/// Callback invoked with the normalized range on every selection update,
/// or `None` when the selection is cleared.
pub type OnSelectionChange = Box<dyn FnMut(Option<BlockRange>) + Send>;

// === Types ===

/// A contiguous run of blocks on one day. `anchor` is where the gesture
/// started, `head` where it currently ends; neither is required to be the
/// smaller index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SelectionSpan {
    day: NaiveDate,
    anchor: usize,
    head: usize,
}

impl SelectionSpan {
    /// Endpoints ordered low to high.
    fn bounds(self) -> (usize, usize) {
        (self.anchor.min(self.head), self.anchor.max(self.head))
    }
}

/// Gesture phase. A drag always carries its span, so "dragging without an
/// anchor" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging(SelectionSpan),
}

/// Tracks one grid's drag gesture over (day, time-block) cells.
///
/// One instance per schedule grid; instances are never shared. All invalid
/// input (unknown labels, day mismatches) is silently ignored so a stray
/// pointer event can never corrupt the grid's visual state.
pub struct BlockSelection {
    /// Ordered start-time labels valid for selection. Order defines
    /// adjacency; labels outside this list are inert.
    blocks: Vec<String>,
    /// Duration of one block, used only for the emitted end time.
    block_minutes: i64,
    state: DragState,
    /// Last completed span, kept after release so the highlight persists.
    last: Option<SelectionSpan>,
    on_change: Option<OnSelectionChange>,
}

// === BlockSelection ===

impl BlockSelection {
    #[must_use]
    pub fn new(blocks: Vec<String>, block_minutes: i64) -> Self {
        Self {
            blocks,
            block_minutes,
            state: DragState::Idle,
            last: None,
            on_change: None,
        }
    }

    /// Attach a selection-change callback.
    #[must_use]
    pub fn on_change(mut self, callback: impl FnMut(Option<BlockRange>) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Replace the available blocks (e.g. after navigating to another
    /// week). Any selection over the old labels is dropped without an
    /// emission, since nothing was ever persisted for it.
    pub fn reset_blocks(&mut self, blocks: Vec<String>, block_minutes: i64) {
        self.blocks = blocks;
        self.block_minutes = block_minutes;
        self.state = DragState::Idle;
        self.last = None;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// The day of the in-progress or last-completed selection.
    #[must_use]
    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.span().map(|span| span.day)
    }

    /// Begin a new selection anchored at `time` within `day`.
    ///
    /// No-op when `time` is not an available block. On success the previous
    /// highlight is discarded and a single-block range is emitted.
    pub fn press(&mut self, day: NaiveDate, time: &str) {
        let Some(index) = self.index_of(time) else {
            return;
        };
        let span = SelectionSpan {
            day,
            anchor: index,
            head: index,
        };
        self.state = DragState::Dragging(span);
        self.last = None;
        self.emit(span);
    }

    /// Extend the in-progress selection to `time`.
    ///
    /// No-op unless a drag is active, `day` matches the drag's day
    /// (selections never span days), and `time` is an available block.
    pub fn extend(&mut self, day: NaiveDate, time: &str) {
        let DragState::Dragging(span) = self.state else {
            return;
        };
        if span.day != day {
            return;
        }
        let Some(index) = self.index_of(time) else {
            return;
        };
        let span = SelectionSpan {
            head: index,
            ..span
        };
        self.state = DragState::Dragging(span);
        self.emit(span);
    }

    /// End the gesture. Fires on pointer release anywhere in the terminal,
    /// not just over the grid. The span is kept so the highlight survives.
    pub fn release(&mut self) {
        if let DragState::Dragging(span) = self.state {
            self.last = Some(span);
            self.state = DragState::Idle;
        }
    }

    /// Whether `(day, time)` falls inside the current highlight.
    #[must_use]
    pub fn is_cell_selected(&self, day: NaiveDate, time: &str) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        if span.day != day {
            return false;
        }
        let Some(index) = self.index_of(time) else {
            return false;
        };
        let (lo, hi) = span.bounds();
        (lo..=hi).contains(&index)
    }

    /// Drop the selection entirely and emit `None` exactly once.
    ///
    /// This resets the gesture phase too: a drag that was still in flight
    /// cannot resurrect the cleared anchor on a later pointer move.
    pub fn clear(&mut self) {
        self.state = DragState::Idle;
        self.last = None;
        if let Some(callback) = self.on_change.as_mut() {
            callback(None);
        }
    }

    /// The range descriptor for the current highlight, if any.
    #[must_use]
    pub fn current_range(&self) -> Option<BlockRange> {
        self.span().and_then(|span| self.range_for(span))
    }

    // === Internal ===

    fn span(&self) -> Option<SelectionSpan> {
        match self.state {
            DragState::Dragging(span) => Some(span),
            DragState::Idle => self.last,
        }
    }

    fn index_of(&self, time: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block == time)
    }

    fn range_for(&self, span: SelectionSpan) -> Option<BlockRange> {
        let (lo, hi) = span.bounds();
        let start_time = self.blocks.get(lo)?.clone();
        let end_time = block_end_time(self.blocks.get(hi)?, self.block_minutes)?;
        Some(BlockRange {
            date: format_iso_date(span.day),
            start_time,
            end_time,
            reason: MANUAL_BLOCK_REASON.to_string(),
        })
    }

    fn emit(&mut self, span: SelectionSpan) {
        // Unparseable labels update the highlight but emit nothing rather
        // than producing a garbage end time.
        let Some(range) = self.range_for(span) else {
            return;
        };
        if let Some(callback) = self.on_change.as_mut() {
            callback(Some(range));
        }
    }
}
