//! Session controller: owns the loaded catalog, the cursor, the layout and
//! the overlay, and turns key input into the minimal UI update.

use tracing::{debug, info};

use super::overlay::{DetailOverlay, DetailView};
use super::selection::{Cursor, Direction, GridSelection, RowAlignment, SelectionChange};
use crate::catalog::LoadReport;
use crate::layout::{project, GridModel};
use crate::models::{row_lengths, Collection, Item, LayoutMode};

/// Logical input events coming from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    Move(Direction),
    Activate,
    Dismiss,
    ToggleLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

/// What the host has to do after an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Nothing changed; the host must not touch the UI.
    None,
    /// Flip the selected state of exactly two tiles.
    Reselect(SelectionChange),
    /// Replace every row.
    Rerender,
    OverlayOpened(DetailView),
    OverlayClosed,
}

pub struct Browser {
    collections: Vec<Collection>,
    selection: GridSelection,
    layout: LayoutMode,
    overlay: DetailOverlay,
    phase: Phase,
    generation: u64,
}

impl Browser {
    pub fn new(layout: LayoutMode, alignment: RowAlignment) -> Self {
        Self {
            collections: Vec::new(),
            selection: GridSelection::new(alignment),
            layout,
            overlay: DetailOverlay::default(),
            phase: Phase::Loading,
            generation: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.selection.cursor()
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    #[cfg(test)]
    pub fn overlay(&self) -> &DetailOverlay {
        &self.overlay
    }

    pub fn selection(&self) -> &GridSelection {
        &self.selection
    }

    /// Starts a new load and returns its generation. Results carrying any
    /// other generation are discarded by `finish_loading`.
    pub fn begin_loading(&mut self) -> u64 {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.generation
    }

    /// Invalidates any load still in flight.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.phase = Phase::Loading;
    }

    pub fn finish_loading(&mut self, generation: u64, report: LoadReport) -> Update {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Ignoring stale catalog load"
            );
            return Update::None;
        }

        self.selection.set_rows(row_lengths(&report.collections));
        self.collections = report.collections;
        self.phase = Phase::Ready;
        info!(
            "Browser ready with {} rows, cursor {:?}",
            self.collections.len(),
            self.selection.cursor()
        );
        Update::Rerender
    }

    pub fn selected_item(&self) -> Option<&Item> {
        let cursor = self.selection.cursor()?;
        self.collections.get(cursor.row)?.items.get(cursor.col)
    }

    pub fn handle(&mut self, input: NavInput) -> Update {
        if !self.is_ready() {
            return Update::None;
        }

        if self.overlay.is_open() {
            return match input {
                NavInput::Dismiss => {
                    self.overlay.close();
                    Update::OverlayClosed
                }
                _ => Update::None,
            };
        }

        match input {
            NavInput::Move(direction) => self
                .selection
                .move_selection(direction)
                .map_or(Update::None, Update::Reselect),
            NavInput::Activate => match self.selected_item().cloned() {
                Some(item) => Update::OverlayOpened(self.overlay.open(item)),
                None => Update::None,
            },
            NavInput::Dismiss => Update::None,
            NavInput::ToggleLayout => {
                self.layout = self.layout.toggled();
                debug!(layout = self.layout.label(), "Layout toggled");
                Update::Rerender
            }
        }
    }

    /// Pointer selection of a tile. Gated the same way as key movement.
    pub fn select(&mut self, cursor: Cursor) -> Update {
        if !self.is_ready() || self.overlay.is_open() {
            return Update::None;
        }
        self.selection
            .select(cursor)
            .map_or(Update::None, Update::Reselect)
    }

    /// Row strips report how many tiles fit once they have a width.
    pub fn set_visible_columns(&mut self, count: usize) {
        self.selection.set_visible_columns(count);
    }

    pub fn grid(&self) -> GridModel {
        project(&self.collections, self.selection.cursor(), self.layout)
    }
}
