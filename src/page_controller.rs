use log::debug;
use thiserror::Error;

use crate::document::{Document, DocumentError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("chapter {index} is out of range (document has {length} chapters)")]
    OutOfRangeSelection { index: usize, length: usize },
}

/// Outcome of a transition. `from == to` for guarded no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
}

impl Transition {
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

/// Snapshot of the position and everything derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageView {
    pub position: usize,
    pub length: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub progress: f64,
}

impl PageView {
    /// 1-based chapter number for display.
    pub fn chapter_number(&self) -> usize {
        self.position + 1
    }
}

/// Owns the reading position. Every mutation goes through
/// [`advance`](Self::advance), [`retreat`](Self::retreat) or
/// [`jump_to`](Self::jump_to), so `position < length` holds after each call.
#[derive(Debug)]
pub struct PageController {
    position: usize,
    length: usize,
}

impl PageController {
    pub fn new(length: usize) -> Result<Self, DocumentError> {
        if length == 0 {
            return Err(DocumentError::Empty);
        }
        Ok(Self {
            position: 0,
            length,
        })
    }

    /// Controller for a loaded document, which is never empty.
    pub fn for_document(document: &Document) -> Self {
        Self {
            position: 0,
            length: document.len().max(1),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    pub fn is_last(&self) -> bool {
        self.position + 1 == self.length
    }

    pub fn progress(&self) -> f64 {
        (self.position + 1) as f64 / self.length as f64
    }

    pub fn view(&self) -> PageView {
        PageView {
            position: self.position,
            length: self.length,
            is_first: self.is_first(),
            is_last: self.is_last(),
            progress: self.progress(),
        }
    }

    pub fn advance(&mut self) -> Transition {
        let from = self.position;
        if !self.is_last() {
            self.position += 1;
        }
        self.record(from)
    }

    pub fn retreat(&mut self) -> Transition {
        let from = self.position;
        if !self.is_first() {
            self.position -= 1;
        }
        self.record(from)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<Transition, NavigationError> {
        if index >= self.length {
            return Err(NavigationError::OutOfRangeSelection {
                index,
                length: self.length,
            });
        }
        let from = self.position;
        self.position = index;
        Ok(self.record(from))
    }

    pub fn jump_to_last(&mut self) -> Transition {
        let from = self.position;
        self.position = self.length - 1;
        self.record(from)
    }

    fn record(&self, from: usize) -> Transition {
        let transition = Transition {
            from,
            to: self.position,
        };
        if transition.is_change() {
            debug!(
                "Position {} -> {} of {}",
                transition.from, transition.to, self.length
            );
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_at(length: usize, position: usize) -> PageController {
        let mut controller = PageController::new(length).unwrap();
        controller.jump_to(position).unwrap();
        controller
    }

    #[test]
    fn zero_length_is_refused() {
        assert_eq!(PageController::new(0).unwrap_err(), DocumentError::Empty);
    }

    #[test]
    fn starts_at_first_chapter() {
        let controller = PageController::new(3).unwrap();
        assert_eq!(controller.position(), 0);
        assert!(controller.is_first());
        assert!(!controller.is_last());
    }

    #[test]
    fn repeated_advance_saturates_at_last() {
        for length in 1..6 {
            for start in 0..length {
                for n in 0..8 {
                    let mut controller = controller_at(length, start);
                    for _ in 0..n {
                        controller.advance();
                    }
                    assert_eq!(controller.position(), (start + n).min(length - 1));
                }
            }
        }
    }

    #[test]
    fn repeated_retreat_saturates_at_first() {
        for length in 1..6 {
            for start in 0..length {
                for n in 0..8 {
                    let mut controller = controller_at(length, start);
                    for _ in 0..n {
                        controller.retreat();
                    }
                    assert_eq!(controller.position(), start.saturating_sub(n));
                }
            }
        }
    }

    #[test]
    fn guarded_transitions_report_no_change() {
        let mut controller = PageController::new(2).unwrap();
        let t = controller.retreat();
        assert_eq!(t, Transition { from: 0, to: 0 });
        assert!(!t.is_change());

        assert!(controller.advance().is_change());
        assert!(!controller.advance().is_change());
    }

    #[test]
    fn jump_to_in_range_and_out_of_range() {
        let mut controller = PageController::new(4).unwrap();
        for i in 0..4 {
            controller.jump_to(i).unwrap();
            assert_eq!(controller.position(), i);
        }

        let err = controller.jump_to(4).unwrap_err();
        assert_eq!(
            err,
            NavigationError::OutOfRangeSelection {
                index: 4,
                length: 4
            }
        );
        assert_eq!(controller.position(), 3);

        assert!(controller.jump_to(usize::MAX).is_err());
        assert_eq!(controller.position(), 3);
    }

    #[test]
    fn jump_to_current_position_is_a_no_op_transition() {
        let mut controller = controller_at(5, 2);
        let t = controller.jump_to(2).unwrap();
        assert!(!t.is_change());
        assert_eq!(controller.position(), 2);
    }

    #[test]
    fn progress_is_monotonic_and_full_only_at_end() {
        for length in 1..12 {
            let mut controller = PageController::new(length).unwrap();
            let mut previous = 0.0;
            for _ in 0..length {
                let view = controller.view();
                assert!(view.progress >= previous);
                assert_eq!(view.progress == 1.0, view.is_last);
                previous = view.progress;
                controller.advance();
            }
        }
    }

    #[test]
    fn first_and_last_coincide_only_for_single_chapter() {
        for length in 1..6 {
            for position in 0..length {
                let view = controller_at(length, position).view();
                if view.is_first && view.is_last {
                    assert_eq!(length, 1);
                }
            }
        }
    }

    #[test]
    fn five_chapter_walkthrough() {
        let mut controller = PageController::new(5).unwrap();
        let mut positions = Vec::new();
        let mut progress = Vec::new();

        let mut record = |c: &PageController| {
            positions.push(c.position());
            progress.push(c.progress());
        };

        controller.advance();
        record(&controller);
        controller.advance();
        record(&controller);
        controller.jump_to(4).unwrap();
        record(&controller);
        controller.advance();
        record(&controller);
        controller.retreat();
        record(&controller);
        controller.retreat();
        record(&controller);

        assert_eq!(positions, vec![1, 2, 4, 4, 3, 2]);
        assert_eq!(progress, vec![0.4, 0.6, 1.0, 1.0, 0.8, 0.6]);
    }

    #[test]
    fn single_chapter_document() {
        let mut controller = PageController::new(1).unwrap();
        assert!(controller.is_first() && controller.is_last());
        assert_eq!(controller.progress(), 1.0);
        assert!(!controller.advance().is_change());
        assert!(!controller.retreat().is_change());
        assert_eq!(controller.position(), 0);
    }

    #[test]
    fn jump_to_last_lands_on_final_chapter() {
        let mut controller = PageController::new(7).unwrap();
        assert_eq!(controller.jump_to_last(), Transition { from: 0, to: 6 });
        assert!(!controller.jump_to_last().is_change());
    }
}
