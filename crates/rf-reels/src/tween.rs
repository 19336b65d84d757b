//! Position tweening
//!
//! The orchestrator never moves reels itself. It hands a [`Tween`] to a
//! [`PositionAnimator`] and applies whatever values come back on each frame.
//! A `finished` update is the completion notification and is produced exactly
//! once per tween.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Easing curve for a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Constant rate
    Linear,
    /// Decelerating quadratic
    QuadOut,
    /// Decelerating cubic
    CubicOut,
    /// Decelerating sine quarter period
    SineOut,
    /// Overshoots the target slightly, then settles back onto it
    #[default]
    BackOut,
}

/// Overshoot amount for [`Ease::BackOut`]
const BACK_OVERSHOOT: f64 = 1.70158;

impl Ease {
    /// Evaluate curve at position t (0.0 - 1.0)
    ///
    /// Returns 0.0 at t = 0 and 1.0 at t = 1. `BackOut` exceeds 1.0 in between.
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Ease::Linear => t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::CubicOut => 1.0 - (1.0 - t).powi(3),
            Ease::SineOut => (t * FRAC_PI_2).sin(),
            Ease::BackOut => {
                let c1 = BACK_OVERSHOOT;
                let c3 = c1 + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u.powi(3) + c1 * u.powi(2)
            }
        }
    }
}

/// Identifies which reel of which spin a tween drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweenKey {
    pub spin_id: u64,
    pub reel_index: usize,
}

/// A request to move a value from `from` to `to` over `duration_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub key: TweenKey,
    pub from: f64,
    pub to: f64,
    pub duration_ms: f64,
    pub ease: Ease,
}

impl Tween {
    /// Value at `elapsed_ms`; exactly `to` once the duration has passed
    pub fn value_at(&self, elapsed_ms: f64) -> f64 {
        let t = self.progress(elapsed_ms);
        if t >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.ease.evaluate(t)
    }

    /// Normalized progress (0.0 - 1.0)
    ///
    /// A zero, negative or non-finite duration counts as already complete.
    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        if !self.duration_ms.is_finite() || self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Value produced for one tween on one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TweenUpdate {
    pub key: TweenKey,
    pub value: f64,
    /// Set on the final update of the tween
    pub finished: bool,
}

/// Animation collaborator contract
pub trait PositionAnimator {
    /// Start a tween. A tween with the same key replaces the running one.
    fn animate(&mut self, tween: Tween);

    /// Advance all tweens by `delta_ms`
    fn advance(&mut self, delta_ms: f64) -> Vec<TweenUpdate>;

    /// Number of tweens still running
    fn active_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct ActiveTween {
    tween: Tween,
    elapsed_ms: f64,
}

/// Default frame-driven [`PositionAnimator`]
#[derive(Debug, Clone, Default)]
pub struct TweenDriver {
    active: Vec<ActiveTween>,
}

impl TweenDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionAnimator for TweenDriver {
    fn animate(&mut self, tween: Tween) {
        self.active.retain(|a| a.tween.key != tween.key);
        self.active.push(ActiveTween {
            tween,
            elapsed_ms: 0.0,
        });
    }

    fn advance(&mut self, delta_ms: f64) -> Vec<TweenUpdate> {
        let delta_ms = delta_ms.max(0.0);
        let mut updates = Vec::with_capacity(self.active.len());

        for active in &mut self.active {
            active.elapsed_ms += delta_ms;
            let finished = active.tween.progress(active.elapsed_ms) >= 1.0;
            updates.push(TweenUpdate {
                key: active.tween.key,
                value: active.tween.value_at(active.elapsed_ms),
                finished,
            });
        }

        self.active
            .retain(|a| a.tween.progress(a.elapsed_ms) < 1.0);

        updates
    }

    fn active_count(&self) -> usize {
        self.active.len()
    }
}
