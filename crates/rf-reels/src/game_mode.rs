//! Game mode controller
//!
//! Idle/Spinning state machine around a [`SpinOrchestrator`]. Accepts spin
//! requests, runs the evaluation pipeline when the reels settle, stores the
//! latest outcome and notifies listeners.
//!
//! ```text
//!  Idle ──start_spinning──▶ Spinning ──(all reels settled)──▶ Idle
//!                │                          │
//!           SpinStarted                 evaluate → publish → SpinFinished
//! ```

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::config::SlotConfig;
use crate::error::{RejectReason, SlotError, SlotResult};
use crate::evaluator::{ActiveMask, LineResults, WinEvaluator};
use crate::orchestrator::{SettledSpin, SpinMode, SpinOrchestrator, SpinPlan, SpinRequest};
use crate::paylines::PayLineTable;
use crate::symbols::SymbolGrid;
use crate::ticker::{FrameTick, TickListener};
use crate::tween::{PositionAnimator, TweenDriver};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Idle,
    Spinning,
}

/// Result of one settled spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub spin_id: u64,
    pub mode: SpinMode,
    /// Row-major settled grid
    pub grid: SymbolGrid,
    /// One entry per pay line
    pub line_results: LineResults,
    /// One reel-major mask per paid line
    pub active_masks: Vec<ActiveMask>,
    pub total_points: u32,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.line_results.win_count() > 0
    }
}

/// Notification sent to [`SpinListener`]s
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinEvent {
    /// Sent before any reel has moved
    SpinStarted { spin_id: u64, mode: SpinMode },
    /// Sent after the outcome has been stored
    SpinFinished { outcome: Arc<SpinOutcome> },
}

/// Receives spin notifications
pub trait SpinListener {
    fn on_spin_event(&mut self, event: &SpinEvent);
}

impl<L: SpinListener + ?Sized> SpinListener for Arc<Mutex<L>> {
    fn on_spin_event(&mut self, event: &SpinEvent) {
        self.lock().on_spin_event(event);
    }
}

/// Read handle on the latest outcome
///
/// The outcome is swapped as a whole, so a reader sees either the previous
/// spin's outcome or the new one, never a mix.
#[derive(Debug, Clone, Default)]
pub struct LatestOutcome {
    inner: Arc<RwLock<Option<Arc<SpinOutcome>>>>,
}

impl LatestOutcome {
    pub fn get(&self) -> Option<Arc<SpinOutcome>> {
        self.inner.read().clone()
    }

    fn publish(&self, outcome: Arc<SpinOutcome>) {
        *self.inner.write() = Some(outcome);
    }
}

/// Spin state machine
pub struct GameModeController<A: PositionAnimator = TweenDriver> {
    orchestrator: Option<SpinOrchestrator<A>>,
    evaluator: WinEvaluator,
    state: GameState,
    current_mode: SpinMode,
    latest: LatestOutcome,
    listeners: Vec<Box<dyn SpinListener>>,
}

impl GameModeController<TweenDriver> {
    /// Controller for a config, with the built-in tween driver
    pub fn from_config(config: &SlotConfig) -> SlotResult<Self> {
        config.validate()?;
        let mut controller = Self::new(config.pay_line_table()?);
        let orchestrator =
            SpinOrchestrator::with_tween_driver(config.build_reels()?, config.spin.clone())?;
        controller.set_orchestrator(orchestrator)?;
        Ok(controller)
    }
}

impl<A: PositionAnimator> GameModeController<A> {
    /// Controller without reels; spins are rejected until reels are set
    pub fn new(table: Arc<PayLineTable>) -> Self {
        Self {
            orchestrator: None,
            evaluator: WinEvaluator::new(table),
            state: GameState::Idle,
            current_mode: SpinMode::Random,
            latest: LatestOutcome::default(),
            listeners: Vec::new(),
        }
    }

    /// Install the reels. Not allowed while a spin is in flight.
    pub fn set_orchestrator(&mut self, orchestrator: SpinOrchestrator<A>) -> SlotResult<()> {
        if self.is_running() {
            return Err(SlotError::SpinRejected(RejectReason::AlreadySpinning));
        }
        log::info!("Slots game mode active ({} reels)", orchestrator.reels().len());
        self.orchestrator = Some(orchestrator);
        Ok(())
    }

    pub fn add_listener(&mut self, listener: Box<dyn SpinListener>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == GameState::Spinning
    }

    pub fn orchestrator(&self) -> Option<&SpinOrchestrator<A>> {
        self.orchestrator.as_ref()
    }

    pub fn orchestrator_mut(&mut self) -> Option<&mut SpinOrchestrator<A>> {
        self.orchestrator.as_mut()
    }

    pub fn evaluator(&self) -> &WinEvaluator {
        &self.evaluator
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Accept a spin request
    ///
    /// Rejected without any state change when reels are missing, a spin is
    /// already running, or directed targets do not fit the reels.
    pub fn start_spinning(&mut self, request: SpinRequest) -> SlotResult<SpinPlan> {
        let Some(orchestrator) = self.orchestrator.as_mut() else {
            log::warn!("Spin rejected: reels not set");
            return Err(SlotError::SpinRejected(RejectReason::ReelsNotConfigured));
        };

        if self.state == GameState::Spinning {
            log::warn!("Spin rejected: already spinning");
            return Err(SlotError::SpinRejected(RejectReason::AlreadySpinning));
        }

        let plan = orchestrator.start(&request).inspect_err(|e| {
            log::warn!("Spin rejected: {e}");
        })?;

        self.state = GameState::Spinning;
        self.current_mode = plan.mode;
        log::info!("Spin {} begins ({:?})", plan.spin_id, plan.mode);

        self.emit(&SpinEvent::SpinStarted {
            spin_id: plan.spin_id,
            mode: plan.mode,
        });
        Ok(plan)
    }

    /// Spins cannot be cancelled; rejected while spinning, a no-op when idle
    pub fn request_cancel(&self) -> SlotResult<()> {
        if self.is_running() {
            log::warn!("Cancel rejected: spin in flight");
            return Err(SlotError::SpinRejected(RejectReason::CancelWhileSpinning));
        }
        Ok(())
    }

    /// Advance reel animation by `delta_ms`
    pub fn update(&mut self, delta_ms: f64) {
        let Some(orchestrator) = self.orchestrator.as_mut() else {
            return;
        };

        if let Some(settled) = orchestrator.advance(delta_ms) {
            self.finish_spinning(settled);
        }
    }

    fn finish_spinning(&mut self, settled: SettledSpin) {
        let evaluation = self.evaluator.evaluate(&settled.grid);
        let total_points = evaluation.total_points();

        let outcome = Arc::new(SpinOutcome {
            spin_id: settled.spin_id,
            mode: self.current_mode,
            grid: settled.grid,
            line_results: evaluation.lines,
            active_masks: evaluation.active_masks,
            total_points,
        });

        self.latest.publish(Arc::clone(&outcome));
        self.state = GameState::Idle;

        log::info!(
            "Spin {} finished: {} winning lines, {} points",
            outcome.spin_id,
            outcome.line_results.win_count(),
            outcome.total_points
        );
        self.emit(&SpinEvent::SpinFinished { outcome });
    }

    fn emit(&mut self, event: &SpinEvent) {
        for listener in &mut self.listeners {
            listener.on_spin_event(event);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LATEST OUTCOME
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn latest_outcome(&self) -> Option<Arc<SpinOutcome>> {
        self.latest.get()
    }

    pub fn latest_line_results(&self) -> Option<LineResults> {
        self.latest.get().map(|o| o.line_results.clone())
    }

    pub fn latest_active_masks(&self) -> Vec<ActiveMask> {
        self.latest
            .get()
            .map(|o| o.active_masks.clone())
            .unwrap_or_default()
    }

    /// Shareable read handle for presentation code
    pub fn outcome_handle(&self) -> LatestOutcome {
        self.latest.clone()
    }
}

impl<A: PositionAnimator> TickListener for GameModeController<A> {
    fn on_tick(&mut self, tick: &FrameTick) {
        self.update(tick.delta_ms);
    }
}
