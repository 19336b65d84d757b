//! Frame tick source
//!
//! Everything in the core runs on one cooperative frame clock: the ticker
//! produces a [`FrameTick`] and hands it to each listener in turn.

use serde::{Deserialize, Serialize};

/// One frame of the shared clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTick {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Time since the previous frame (ms)
    pub delta_ms: f64,
    /// Time since the ticker started (ms)
    pub elapsed_ms: f64,
}

/// Receives frame ticks
pub trait TickListener {
    fn on_tick(&mut self, tick: &FrameTick);
}

/// Fixed-cadence frame clock
#[derive(Debug, Clone)]
pub struct FrameTicker {
    interval_ms: f64,
    frame: u64,
    elapsed_ms: f64,
}

impl FrameTicker {
    /// Ticker running at `fps` frames per second
    pub fn new(fps: f64) -> Self {
        let fps = if fps > 0.0 { fps } else { 60.0 };
        Self {
            interval_ms: 1000.0 / fps,
            frame: 0,
            elapsed_ms: 0.0,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Produce the next tick at the regular cadence
    pub fn next_tick(&mut self) -> FrameTick {
        self.advance(self.interval_ms)
    }

    /// Produce a tick with an explicit delta (e.g., a late frame)
    pub fn advance(&mut self, delta_ms: f64) -> FrameTick {
        let delta_ms = delta_ms.max(0.0);
        self.frame += 1;
        self.elapsed_ms += delta_ms;
        FrameTick {
            frame: self.frame,
            delta_ms,
            elapsed_ms: self.elapsed_ms,
        }
    }

    /// Produce the next tick and deliver it to every listener, in order
    pub fn dispatch(&mut self, listeners: &mut [&mut dyn TickListener]) -> FrameTick {
        let tick = self.next_tick();
        for listener in listeners.iter_mut() {
            listener.on_tick(&tick);
        }
        tick
    }

    /// Tick `listener` until `done` holds or `max_frames` frames have passed
    ///
    /// Returns the number of frames ticked, or `None` if the limit was hit.
    pub fn run_until<L, F>(&mut self, listener: &mut L, max_frames: u64, mut done: F) -> Option<u64>
    where
        L: TickListener,
        F: FnMut(&L) -> bool,
    {
        for count in 1..=max_frames {
            let tick = self.next_tick();
            listener.on_tick(&tick);
            if done(listener) {
                return Some(count);
            }
        }
        None
    }
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<u64>,
        total_ms: f64,
    }

    impl TickListener for Recorder {
        fn on_tick(&mut self, tick: &FrameTick) {
            self.frames.push(tick.frame);
            self.total_ms += tick.delta_ms;
        }
    }

    #[test]
    fn test_fixed_cadence() {
        let mut ticker = FrameTicker::new(50.0);
        let t1 = ticker.next_tick();
        let t2 = ticker.next_tick();

        assert_eq!(t1.frame, 1);
        assert_eq!(t2.frame, 2);
        assert_eq!(t2.delta_ms, 20.0);
        assert_eq!(t2.elapsed_ms, 40.0);
    }

    #[test]
    fn test_dispatch_reaches_all_listeners() {
        let mut ticker = FrameTicker::new(100.0);
        let mut a = Recorder::default();
        let mut b = Recorder::default();

        ticker.dispatch(&mut [&mut a, &mut b]);
        ticker.dispatch(&mut [&mut a, &mut b]);

        assert_eq!(a.frames, vec![1, 2]);
        assert_eq!(b.frames, vec![1, 2]);
        assert_eq!(a.total_ms, 20.0);
    }

    #[test]
    fn test_run_until_limit() {
        let mut ticker = FrameTicker::default();
        let mut recorder = Recorder::default();

        assert_eq!(ticker.run_until(&mut recorder, 10, |r| r.frames.len() == 4), Some(4));
        assert_eq!(ticker.run_until(&mut recorder, 3, |_| false), None);
        assert_eq!(recorder.frames.len(), 7);
    }

    #[test]
    fn test_invalid_fps_falls_back() {
        let ticker = FrameTicker::new(0.0);
        assert!((ticker.interval_ms() - 1000.0 / 60.0).abs() < 1e-9);
    }
}
