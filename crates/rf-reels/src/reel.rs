//! Reel strip position model
//!
//! A reel is a circular strip of symbols plus a continuous position. The
//! position is only ever written by the animation driver; the visible symbols
//! are resolved from it on demand, so they can be read every frame while the
//! reel is moving as well as after it settled.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::{SymbolId, VISIBLE_SLOTS};

/// Lookup of symbols that have a renderable asset bound to them
pub trait AssetCatalog {
    fn has_asset(&self, symbol: &SymbolId) -> bool;
}

impl AssetCatalog for HashSet<SymbolId> {
    fn has_asset(&self, symbol: &SymbolId) -> bool {
        self.contains(symbol)
    }
}

/// Catalog used when nothing is rendered: every symbol counts as bound
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessAssets;

impl AssetCatalog for HeadlessAssets {
    fn has_asset(&self, _symbol: &SymbolId) -> bool {
        true
    }
}

/// One reel: a circular symbol strip and its continuous position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelStrip {
    /// 1-based reel identifier (left to right)
    band_id: u32,
    /// Symbols in strip order
    strip: Vec<SymbolId>,
    /// Number of simultaneously visible symbols
    visible_slots: usize,
    /// Current (fractional) position
    position: f64,
    /// Position at the previous frame, for motion consumers
    previous_position: f64,
}

impl ReelStrip {
    /// Build a reel with the standard three visible slots
    pub fn build(
        band_id: u32,
        strip: Vec<SymbolId>,
        assets: &dyn AssetCatalog,
    ) -> SlotResult<Self> {
        Self::build_with_slots(band_id, strip, VISIBLE_SLOTS, assets)
    }

    /// Build a reel
    ///
    /// Fails when `band_id` is 0, when the strip cannot fill the visible
    /// slots, or when one of the initially visible symbols has no asset.
    pub fn build_with_slots(
        band_id: u32,
        strip: Vec<SymbolId>,
        visible_slots: usize,
        assets: &dyn AssetCatalog,
    ) -> SlotResult<Self> {
        if band_id < 1 {
            return Err(SlotError::InvalidBandId(band_id));
        }

        if strip.len() < visible_slots || strip.is_empty() {
            return Err(SlotError::StripTooShort {
                band_id,
                len: strip.len(),
                required: visible_slots.max(1),
            });
        }

        if let Some(missing) = strip.iter().take(visible_slots).find(|s| !assets.has_asset(s)) {
            log::error!("Reel {band_id}: missing loaded asset of {missing}");
            return Err(SlotError::MissingAssetBinding {
                band_id,
                symbol: missing.to_string(),
            });
        }

        Ok(Self {
            band_id,
            strip,
            visible_slots,
            position: 0.0,
            previous_position: 0.0,
        })
    }

    pub fn band_id(&self) -> u32 {
        self.band_id
    }

    /// 0-based index derived from the band id
    pub fn reel_index(&self) -> usize {
        self.band_id.saturating_sub(1) as usize
    }

    pub fn strip(&self) -> &[SymbolId] {
        &self.strip
    }

    pub fn len(&self) -> usize {
        self.strip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strip.is_empty()
    }

    pub fn visible_slots(&self) -> usize {
        self.visible_slots
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn previous_position(&self) -> f64 {
        self.previous_position
    }

    /// Distance travelled since the previous frame
    pub fn motion_delta(&self) -> f64 {
        self.position - self.previous_position
    }

    /// Written by the animation driver. No validation.
    pub fn set_position(&mut self, value: f64) {
        self.previous_position = self.position;
        self.position = value;
    }

    /// Strip index shown at `slot` for the current position
    pub fn strip_index(&self, slot: usize) -> usize {
        let len = self.strip.len();
        // half-way positions round up, toward the next strip index;
        // wrapped in floating point so any finite position stays in range
        let base = (self.position + 0.5).floor().rem_euclid(len as f64) as usize;
        (base + slot) % len
    }

    /// Symbol shown at visible slot `slot` (0 = topmost)
    pub fn resolve_visible_symbol(&self, slot: usize) -> &SymbolId {
        &self.strip[self.strip_index(slot)]
    }

    /// All visible symbols, top to bottom
    pub fn visible_symbols(&self) -> Vec<&SymbolId> {
        (0..self.visible_slots)
            .map(|slot| self.resolve_visible_symbol(slot))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(names: &[&str]) -> Vec<SymbolId> {
        names.iter().map(|&n| SymbolId::from(n)).collect()
    }

    #[test]
    fn test_build_rejects_band_zero() {
        let result = ReelStrip::build(0, strip(&["a", "b", "c"]), &HeadlessAssets);
        assert!(matches!(result, Err(SlotError::InvalidBandId(0))));
    }

    #[test]
    fn test_build_rejects_short_strip() {
        let result = ReelStrip::build(1, strip(&["a", "b"]), &HeadlessAssets);
        assert!(matches!(result, Err(SlotError::StripTooShort { len: 2, .. })));
    }

    #[test]
    fn test_build_checks_visible_assets_only() {
        let assets: HashSet<SymbolId> = strip(&["a", "b", "c"]).into_iter().collect();

        // "z" sits beyond the initially visible slots
        let reel = ReelStrip::build(2, strip(&["a", "b", "c", "z"]), &assets);
        assert!(reel.is_ok());

        let missing = ReelStrip::build(2, strip(&["a", "z", "c"]), &assets);
        match missing {
            Err(SlotError::MissingAssetBinding { band_id, symbol }) => {
                assert_eq!(band_id, 2);
                assert_eq!(symbol, "z");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_visible_symbols_wrap() {
        let mut reel = ReelStrip::build(1, strip(&["a", "b", "c", "d", "e"]), &HeadlessAssets).unwrap();

        reel.set_position(3.0);
        let names: Vec<&str> = reel.visible_symbols().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["d", "e", "a"]);

        reel.set_position(-1.0);
        assert_eq!(reel.resolve_visible_symbol(0).as_str(), "e");
    }

    #[test]
    fn test_position_rounds_to_nearest() {
        let mut reel = ReelStrip::build(1, strip(&["a", "b", "c", "d"]), &HeadlessAssets).unwrap();

        reel.set_position(1.4);
        assert_eq!(reel.resolve_visible_symbol(0).as_str(), "b");

        reel.set_position(1.6);
        assert_eq!(reel.resolve_visible_symbol(0).as_str(), "c");

        reel.set_position(-0.5);
        assert_eq!(reel.resolve_visible_symbol(0).as_str(), "a");
    }

    #[test]
    fn test_resolution_is_periodic() {
        let names = ["a", "b", "c", "d", "e", "f", "g"];
        let mut reel = ReelStrip::build(1, strip(&names), &HeadlessAssets).unwrap();
        let n = names.len() as f64;

        for step in 0..30 {
            let p = step as f64 * 0.25 - 5.1;
            reel.set_position(p);
            let base: Vec<SymbolId> = reel.visible_symbols().into_iter().cloned().collect();

            for k in [-3.0, -1.0, 1.0, 4.0] {
                reel.set_position(p + k * n);
                let shifted: Vec<SymbolId> = reel.visible_symbols().into_iter().cloned().collect();
                assert_eq!(base, shifted, "position {p} shifted by {k} strips");
            }
        }
    }

    #[test]
    fn test_huge_positions_wrap() {
        let mut reel = ReelStrip::build(1, strip(&["a", "b", "c", "d", "e", "f", "g"]), &HeadlessAssets).unwrap();

        // 10^19 is exact in f64 and is 3 mod 7
        reel.set_position(1e19);
        let names: Vec<&str> = reel.visible_symbols().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["d", "e", "f"]);

        reel.set_position(-1e19);
        assert_eq!(reel.resolve_visible_symbol(0).as_str(), "e");

        reel.set_position(f64::MAX);
        assert!(reel.strip_index(2) < reel.len());
    }

    #[test]
    fn test_motion_delta_tracks_previous_frame() {
        let mut reel = ReelStrip::build(1, strip(&["a", "b", "c"]), &HeadlessAssets).unwrap();
        reel.set_position(2.5);
        reel.set_position(4.0);
        assert_eq!(reel.previous_position(), 2.5);
        assert_eq!(reel.motion_delta(), 1.5);
    }
}
