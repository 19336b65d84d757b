//! # rf-reels: Reel Spin & Win Evaluation Core
//!
//! Mechanical core of a five-reel, three-row slot machine: where each reel
//! stands, when a multi-reel spin has settled, and what the settled grid pays.
//! Rendering is left to the caller; the core needs a position animator, a
//! frame tick and nothing else.
//!
//! ## Architecture
//!
//! ```text
//! GameModeController (Idle ⇄ Spinning, SpinStarted / SpinFinished)
//!     │
//!     ├── SpinOrchestrator
//!     │       ├── ReelStrip × 5 (circular strip + continuous position)
//!     │       └── PositionAnimator (TweenDriver)
//!     │
//!     └── WinEvaluator ── PayLineTable (7 lines + paytable)
//!           │
//!           v
//!     SpinOutcome → LatestOutcome / ReelHighlights
//! ```
//!
//! Everything runs on one frame clock ([`FrameTicker`]); nothing blocks.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod game_mode;
pub mod highlight;
pub mod orchestrator;
pub mod paylines;
pub mod reel;
pub mod symbols;
pub mod ticker;
pub mod tween;

pub use config::*;
pub use error::*;
pub use evaluator::*;
pub use game_mode::*;
pub use highlight::*;
pub use orchestrator::*;
pub use paylines::*;
pub use reel::*;
pub use symbols::*;
pub use ticker::*;
pub use tween::*;
