//! Machine configuration
//!
//! Loaded once (JSON or YAML), validated, then shared read-only.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::paylines::{PayLine, PayLineTable, Paytable, standard_7_paylines};
use crate::reel::{AssetCatalog, HeadlessAssets, ReelStrip};
use crate::symbols::{SymbolId, VISIBLE_SLOTS};
use crate::tween::Ease;

/// Spin targets and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinSettings {
    /// Logical strip length used for random stops
    pub reel_length: u32,
    /// Whole rotations every reel makes
    pub base_spins: u32,
    /// Additional whole rotations on top of the base
    pub extra_spins: u32,
    /// Duration of the first reel (ms)
    pub base_duration_ms: f64,
    /// Added per reel index (ms)
    pub per_reel_increment_ms: f64,
    /// Duration added per jitter step (ms)
    pub jitter_step_ms: f64,
    /// Jitter is drawn from `0..=max_jitter`, once per spin
    pub max_jitter: u32,
    /// Easing of the reel position
    pub ease: Ease,
}

impl SpinSettings {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            reel_length: 20,
            base_spins: 1,
            extra_spins: 1,
            base_duration_ms: 2500.0,
            per_reel_increment_ms: 600.0,
            jitter_step_ms: 600.0,
            max_jitter: 2,
            ease: Ease::BackOut,
        }
    }

    /// Fast timing, no jitter
    pub fn turbo() -> Self {
        Self {
            base_spins: 1,
            extra_spins: 0,
            base_duration_ms: 800.0,
            per_reel_increment_ms: 150.0,
            jitter_step_ms: 0.0,
            max_jitter: 0,
            ..Self::normal()
        }
    }

    /// Duration for reel `reel_index` with the spin's jitter value
    pub fn duration_ms(&self, reel_index: usize, jitter: u32) -> f64 {
        self.base_duration_ms
            + reel_index as f64 * self.per_reel_increment_ms
            + jitter as f64 * self.jitter_step_ms
    }

    pub fn validate(&self) -> SlotResult<()> {
        if self.reel_length < 1 {
            return Err(SlotError::Config("reel_length must be at least 1".into()));
        }
        if !self.base_duration_ms.is_finite() || self.base_duration_ms <= 0.0 {
            return Err(SlotError::Config(format!(
                "base_duration_ms must be positive and finite, got {}",
                self.base_duration_ms
            )));
        }
        for (name, value) in [
            ("per_reel_increment_ms", self.per_reel_increment_ms),
            ("jitter_step_ms", self.jitter_step_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SlotError::Config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self::normal()
    }
}

/// One reel's definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelConfig {
    pub band_id: u32,
    pub strip: Vec<SymbolId>,
}

impl ReelConfig {
    pub fn new(band_id: u32, strip: &[&str]) -> Self {
        Self {
            band_id,
            strip: strip.iter().map(|&s| SymbolId::from(s)).collect(),
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub reels: Vec<ReelConfig>,
    pub paylines: Vec<PayLine>,
    pub paytable: Paytable,
    #[serde(default)]
    pub spin: SpinSettings,
    /// Symbols with a bound visual; `None` when running headless
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<SymbolId>>,
}

impl SlotConfig {
    /// The shipped 5-reel machine
    pub fn standard() -> Self {
        Self {
            reels: vec![
                ReelConfig::new(1, &[
                    "hv2", "lv3", "lv3", "hv1", "hv1", "lv1", "hv1", "hv4", "lv1", "hv3",
                    "hv2", "hv3", "lv4", "hv4", "lv1", "hv2", "lv4", "lv1", "lv3", "hv2",
                ]),
                ReelConfig::new(2, &[
                    "hv1", "lv2", "lv3", "lv2", "lv1", "lv1", "lv4", "lv1", "lv1", "hv4",
                    "lv3", "hv2", "lv1", "lv3", "hv1", "lv1", "lv2", "lv4", "lv3", "lv2",
                ]),
                ReelConfig::new(3, &[
                    "lv1", "hv2", "lv3", "lv4", "hv3", "hv2", "lv2", "hv2", "hv2", "lv1",
                    "hv3", "lv1", "hv1", "lv2", "hv3", "hv2", "hv4", "hv1", "lv2", "lv4",
                ]),
                ReelConfig::new(4, &[
                    "hv2", "lv2", "hv3", "lv2", "lv4", "lv4", "hv3", "lv2", "lv4", "hv1",
                    "lv1", "hv1", "lv2", "hv3", "lv2", "lv3", "hv2", "lv1", "hv3", "lv2",
                ]),
                ReelConfig::new(5, &[
                    "lv3", "lv4", "hv2", "hv3", "hv4", "hv1", "hv3", "hv2", "hv2", "hv4",
                    "hv4", "hv2", "lv2", "hv4", "hv1", "lv2", "hv1", "lv2", "hv4", "lv4",
                ]),
            ],
            paylines: standard_7_paylines(),
            paytable: Paytable::standard(),
            spin: SpinSettings::normal(),
            assets: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOADING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SlotError::Serialization(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let config: Self = serde_yml::from_str(yaml)
            .map_err(|e| SlotError::Serialization(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, format picked by extension (`.yaml`/`.yml`, else JSON)
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            Self::from_yaml(&text)?
        } else {
            Self::from_json(&text)?
        };
        log::info!("Loaded slot config from {:?} ({} reels)", path, config.reels.len());
        Ok(config)
    }

    /// Export config as JSON
    pub fn to_json(&self) -> SlotResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SlotError::Serialization(e.to_string()))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn validate(&self) -> SlotResult<()> {
        if self.reels.is_empty() {
            return Err(SlotError::Config("at least one reel is required".into()));
        }

        let mut seen = HashSet::new();
        for reel in &self.reels {
            if reel.band_id < 1 {
                return Err(SlotError::InvalidBandId(reel.band_id));
            }
            if !seen.insert(reel.band_id) {
                return Err(SlotError::Config(format!("duplicate band id {}", reel.band_id)));
            }
            if reel.strip.len() < VISIBLE_SLOTS {
                return Err(SlotError::StripTooShort {
                    band_id: reel.band_id,
                    len: reel.strip.len(),
                    required: VISIBLE_SLOTS,
                });
            }
            if reel.strip.len() != self.spin.reel_length as usize {
                return Err(SlotError::Config(format!(
                    "reel {} has {} symbols, random stops are drawn over {}",
                    reel.band_id,
                    reel.strip.len(),
                    self.spin.reel_length
                )));
            }
        }

        self.pay_line_table()?;
        self.spin.validate()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BUILDING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Shared read-only pay-line table
    pub fn pay_line_table(&self) -> SlotResult<Arc<PayLineTable>> {
        PayLineTable::new(self.paylines.clone(), self.paytable.clone()).map(Arc::new)
    }

    /// Build all reels, sorted by band id
    ///
    /// Uses the configured asset list when present; otherwise every symbol
    /// counts as bound.
    pub fn build_reels(&self) -> SlotResult<Vec<ReelStrip>> {
        match &self.assets {
            Some(list) => {
                let catalog: HashSet<SymbolId> = list.iter().cloned().collect();
                self.build_reels_with(&catalog)
            }
            None => self.build_reels_with(&HeadlessAssets),
        }
    }

    /// Build all reels against an explicit asset catalog
    pub fn build_reels_with(&self, assets: &dyn AssetCatalog) -> SlotResult<Vec<ReelStrip>> {
        let mut reels = self
            .reels
            .iter()
            .map(|r| ReelStrip::build(r.band_id, r.strip.clone(), assets))
            .collect::<SlotResult<Vec<_>>>()?;
        reels.sort_by_key(ReelStrip::band_id);
        Ok(reels)
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self::standard()
    }
}
