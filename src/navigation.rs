//! Input side of the viewer: the controls a reader can activate and the
//! key chords bound to them. Nothing here mutates the position directly;
//! every control resolves to a [`NavCommand`] that the app applies to the
//! [`PageController`](crate::page_controller::PageController).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::page_controller::PageView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Advance,
    Retreat,
    JumpTo(usize),
    JumpToLast,
}

/// A clickable/activatable thing on screen that drives navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Previous,
    Next,
    Chapter(usize),
}

impl Control {
    /// Disabled controls must never reach the controller.
    pub fn is_enabled(&self, view: &PageView) -> bool {
        match self {
            Control::Previous => !view.is_first,
            Control::Next => !view.is_last,
            Control::Chapter(index) => *index < view.length,
        }
    }

    pub fn command(&self) -> NavCommand {
        match self {
            Control::Previous => NavCommand::Retreat,
            Control::Next => NavCommand::Advance,
            Control::Chapter(index) => NavCommand::JumpTo(*index),
        }
    }

    /// Resolve activation to a command, or `None` when the control is disabled.
    pub fn activate(&self, view: &PageView) -> Option<NavCommand> {
        self.is_enabled(view).then(|| self.command())
    }
}

/// The two logical chords of the keyboard listener.
pub fn control_for_key(key: &KeyEvent) -> Option<Control> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::PageDown => {
            Some(Control::Next)
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => Some(Control::Previous),
        _ => None,
    }
}

/// Number of filled cells for a progress bar `width` cells wide.
/// Reaches `width` only when `progress == 1.0`.
pub fn progress_fill(progress: f64, width: u16) -> u16 {
    let filled = (progress.clamp(0.0, 1.0) * f64::from(width)).floor() as u16;
    filled.min(width)
}

/// Whole percent of chapters reached, `100` only on the last chapter.
pub fn progress_percent(view: &PageView) -> usize {
    (view.position + 1) * 100 / view.length.max(1)
}

/// Layout of the direct-jump grid: one cell per chapter, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorGrid {
    pub chapters: usize,
    pub columns: usize,
}

impl NavigatorGrid {
    pub fn new(chapters: usize, columns: usize) -> Self {
        Self {
            chapters,
            columns: columns.max(1),
        }
    }

    pub fn rows(&self) -> usize {
        self.chapters.div_ceil(self.columns)
    }

    pub fn cell_at(&self, row: usize, column: usize) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        let index = row * self.columns + column;
        (index < self.chapters).then_some(index)
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }

    /// First row to draw so that the active chapter's row stays visible
    /// within `visible_rows`.
    pub fn first_visible_row(&self, active: usize, visible_rows: usize) -> usize {
        if visible_rows == 0 {
            return self.row_of(active);
        }
        let active_row = self.row_of(active);
        let max_first = self.rows().saturating_sub(visible_rows);
        active_row
            .saturating_sub(visible_rows.saturating_sub(1))
            .min(max_first)
    }
}
