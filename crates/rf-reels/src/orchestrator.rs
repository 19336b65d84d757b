//! Spin orchestration
//!
//! Computes a target position and duration for every reel, hands them to the
//! animator and watches the completions. A spin settles when every reel it
//! started has reported completion; the order in which they finish does not
//! matter.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SpinSettings;
use crate::error::{RejectReason, SlotError, SlotResult};
use crate::reel::ReelStrip;
use crate::symbols::{REEL_COUNT, SymbolGrid, VISIBLE_SLOTS};
use crate::tween::{PositionAnimator, Tween, TweenDriver, TweenKey};

/// How the targets of a spin were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinMode {
    /// Random stop per reel
    Random,
    /// Caller supplied the target positions
    Directed,
}

/// Inbound spin request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    /// Literal target position per reel; `None` spins randomly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_positions: Option<Vec<f64>>,
}

impl SpinRequest {
    pub fn random() -> Self {
        Self { to_positions: None }
    }

    pub fn directed(to_positions: impl Into<Vec<f64>>) -> Self {
        Self {
            to_positions: Some(to_positions.into()),
        }
    }

    pub fn mode(&self) -> SpinMode {
        if self.to_positions.is_some() {
            SpinMode::Directed
        } else {
            SpinMode::Random
        }
    }
}

/// Target and timing for one reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelSpinPlan {
    pub reel_index: usize,
    pub from: f64,
    pub target: f64,
    pub duration_ms: f64,
    /// Chosen stop on the logical strip (random mode only)
    pub final_stop: Option<u32>,
}

/// Everything handed to the animator for one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinPlan {
    pub spin_id: u64,
    pub mode: SpinMode,
    /// Duration jitter shared by all reels of the spin
    pub jitter: u32,
    pub reels: Vec<ReelSpinPlan>,
}

/// Grid read back once every reel has stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledSpin {
    pub spin_id: u64,
    pub grid: SymbolGrid,
}

#[derive(Debug, Clone)]
struct PendingSpin {
    spin_id: u64,
    remaining: BTreeSet<usize>,
}

/// Drives the reels of one machine through spins
pub struct SpinOrchestrator<A: PositionAnimator = TweenDriver> {
    /// Reels, sorted by band id
    reels: Vec<ReelStrip>,
    settings: SpinSettings,
    animator: A,
    rng: StdRng,
    last_spin_id: u64,
    pending: Option<PendingSpin>,
}

impl SpinOrchestrator<TweenDriver> {
    /// Orchestrator with the built-in tween driver
    pub fn with_tween_driver(reels: Vec<ReelStrip>, settings: SpinSettings) -> SlotResult<Self> {
        Self::new(reels, settings, TweenDriver::new())
    }
}

impl<A: PositionAnimator> SpinOrchestrator<A> {
    /// Create an orchestrator over exactly five reels of three visible slots
    pub fn new(mut reels: Vec<ReelStrip>, settings: SpinSettings, animator: A) -> SlotResult<Self> {
        if reels.len() != REEL_COUNT || reels.iter().any(|r| r.visible_slots() != VISIBLE_SLOTS) {
            return Err(SlotError::InvalidGridShape {
                expected_rows: VISIBLE_SLOTS,
                expected_cols: REEL_COUNT,
                rows: reels.iter().map(ReelStrip::visible_slots).max().unwrap_or(0),
                cols: reels.len(),
            });
        }
        settings.validate()?;
        if let Some(reel) = reels.iter().find(|r| r.len() != settings.reel_length as usize) {
            return Err(SlotError::Config(format!(
                "reel {} has {} symbols, random stops are drawn over {}",
                reel.band_id(),
                reel.len(),
                settings.reel_length
            )));
        }
        reels.sort_by_key(ReelStrip::band_id);

        Ok(Self {
            reels,
            settings,
            animator,
            rng: StdRng::from_os_rng(),
            last_spin_id: 0,
            pending: None,
        })
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn reels(&self) -> &[ReelStrip] {
        &self.reels
    }

    pub fn settings(&self) -> &SpinSettings {
        &self.settings
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    /// Reel indices still moving in the current spin
    pub fn pending_reels(&self) -> Vec<usize> {
        self.pending
            .as_ref()
            .map(|p| p.remaining.iter().copied().collect())
            .unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLANNING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Compute targets and durations without starting anything
    pub fn plan(&mut self, request: &SpinRequest) -> SlotResult<SpinPlan> {
        let spin_id = self.last_spin_id + 1;

        match &request.to_positions {
            Some(targets) => self.plan_directed(spin_id, targets),
            None => Ok(self.plan_random(spin_id)),
        }
    }

    fn plan_directed(&self, spin_id: u64, targets: &[f64]) -> SlotResult<SpinPlan> {
        if targets.len() != self.reels.len() {
            return Err(SlotError::SpinRejected(RejectReason::TargetCountMismatch {
                expected: self.reels.len(),
                actual: targets.len(),
            }));
        }
        if let Some(reel_index) = targets.iter().position(|t| !t.is_finite()) {
            return Err(SlotError::SpinRejected(RejectReason::NonFiniteTarget { reel_index }));
        }

        let reels = self
            .reels
            .iter()
            .zip(targets)
            .enumerate()
            .map(|(reel_index, (reel, &target))| ReelSpinPlan {
                reel_index,
                from: reel.position(),
                target,
                duration_ms: self.settings.duration_ms(reel_index, 0),
                final_stop: None,
            })
            .collect();

        Ok(SpinPlan {
            spin_id,
            mode: SpinMode::Directed,
            jitter: 0,
            reels,
        })
    }

    fn plan_random(&mut self, spin_id: u64) -> SpinPlan {
        let length = self.settings.reel_length.max(1);
        let jitter = self.rng.random_range(0..=self.settings.max_jitter);

        let mut reels = Vec::with_capacity(self.reels.len());
        for (reel_index, reel) in self.reels.iter().enumerate() {
            let final_stop = self.rng.random_range(0..length);
            let current = reel.position();

            // forward distance to the chosen stop, always in [0, length)
            let minimal_distance = (final_stop as f64 - current).rem_euclid(length as f64);
            let full_spins = self.settings.base_spins + self.settings.extra_spins + reel_index as u32;
            let target = current + (full_spins as f64) * length as f64 + minimal_distance;

            reels.push(ReelSpinPlan {
                reel_index,
                from: current,
                target,
                duration_ms: self.settings.duration_ms(reel_index, jitter),
                final_stop: Some(final_stop),
            });
        }

        SpinPlan {
            spin_id,
            mode: SpinMode::Random,
            jitter,
            reels,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN EXECUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Plan a spin and hand every reel to the animator
    pub fn start(&mut self, request: &SpinRequest) -> SlotResult<SpinPlan> {
        if self.is_spinning() {
            return Err(SlotError::SpinRejected(RejectReason::AlreadySpinning));
        }

        let plan = self.plan(request)?;
        self.last_spin_id = plan.spin_id;

        for reel in &plan.reels {
            log::debug!(
                "Spin {} reel {}: {:.2} -> {:.2} over {:.0}ms",
                plan.spin_id,
                reel.reel_index + 1,
                reel.from,
                reel.target,
                reel.duration_ms
            );
            self.animator.animate(Tween {
                key: TweenKey {
                    spin_id: plan.spin_id,
                    reel_index: reel.reel_index,
                },
                from: reel.from,
                to: reel.target,
                duration_ms: reel.duration_ms,
                ease: self.settings.ease,
            });
        }

        self.pending = Some(PendingSpin {
            spin_id: plan.spin_id,
            remaining: plan.reels.iter().map(|r| r.reel_index).collect(),
        });

        Ok(plan)
    }

    /// Advance the animation by one frame
    ///
    /// Returns the settled grid on the frame the last pending reel completes,
    /// and `None` on every other frame.
    pub fn advance(&mut self, delta_ms: f64) -> Option<SettledSpin> {
        for update in self.animator.advance(delta_ms) {
            let Some(pending) = self
                .pending
                .as_mut()
                .filter(|p| p.spin_id == update.key.spin_id)
            else {
                log::debug!(
                    "Ignoring update of reel {} from spin {}",
                    update.key.reel_index + 1,
                    update.key.spin_id
                );
                continue;
            };

            if let Some(reel) = self.reels.get_mut(update.key.reel_index) {
                reel.set_position(update.value);
            }
            if update.finished {
                pending.remaining.remove(&update.key.reel_index);
            }
        }

        let settled = self
            .pending
            .as_ref()
            .is_some_and(|p| p.remaining.is_empty());
        if !settled {
            return None;
        }

        let spin = self.pending.take()?;
        log::info!("Spin {} settled", spin.spin_id);
        Some(SettledSpin {
            spin_id: spin.spin_id,
            grid: self.settled_grid(),
        })
    }

    /// Visible symbols of all reels, transposed into row-major form
    pub fn settled_grid(&self) -> SymbolGrid {
        let reel_major = std::array::from_fn(|reel| {
            std::array::from_fn(|slot| self.reels[reel].resolve_visible_symbol(slot).clone())
        });
        SymbolGrid::from_reel_major(reel_major)
    }
}
