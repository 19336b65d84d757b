//! Per-reel highlight state
//!
//! Presentation-side model of which visible symbols are lit after a spin.
//! Every paid line's mask is OR-ed in; all highlights drop as soon as the
//! next spin starts.

use crate::evaluator::ActiveMask;
use crate::game_mode::{SpinEvent, SpinListener};
use crate::symbols::{REEL_COUNT, VISIBLE_SLOTS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReelHighlights {
    cells: [[bool; VISIBLE_SLOTS]; REEL_COUNT],
}

impl ReelHighlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Light every cell that is active in any of `masks`
    pub fn apply(&mut self, masks: &[ActiveMask]) {
        for mask in masks {
            for (reel, slots) in mask.cells.iter().enumerate() {
                for (slot, &active) in slots.iter().enumerate() {
                    if active {
                        self.cells[reel][slot] = true;
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells = Default::default();
    }

    pub fn is_highlighted(&self, reel: usize, slot: usize) -> bool {
        self.cells
            .get(reel)
            .and_then(|r| r.get(slot))
            .copied()
            .unwrap_or(false)
    }

    /// Highlighted slots of the reel with `band_id` (1-based)
    pub fn for_band(&self, band_id: u32) -> Option<[bool; VISIBLE_SLOTS]> {
        let reel = (band_id as usize).checked_sub(1)?;
        self.cells.get(reel).copied()
    }

    pub fn count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c).count()
    }
}

impl SpinListener for ReelHighlights {
    fn on_spin_event(&mut self, event: &SpinEvent) {
        match event {
            SpinEvent::SpinStarted { .. } => self.clear(),
            SpinEvent::SpinFinished { outcome } => self.apply(&outcome.active_masks),
        }
    }
}
