//! Read → convert → scale → present, once per tick, while the viewer is live.
//!
//! The loop is a [`RepeatingTask`] that the session polls. A cycle runs only
//! when the task is due *and* the state allows rendering; afterwards the task
//! is re-armed only if the state still allows it. Leaving `Live` therefore
//! stops the repetition without touching a cycle already in progress.

use std::time::{Duration, Instant};

use crate::camera::{CaptureSource, SensorBackend};
use crate::control::ViewerState;
use crate::convert;
use crate::display::DisplaySurface;
use crate::scaler;
use crate::scheduler::RepeatingTask;
use crate::types::{ScaledPlacement, Viewport};

/// Nominal time between cycles.
pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Presented(ScaledPlacement),
    /// No frame this tick; the previous image stays up.
    Missed,
    /// A frame was read but the surface refused it.
    PresentFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub presented: u64,
    pub missed: u64,
    pub consecutive_misses: u64,
}

pub struct RenderLoop {
    viewport: Viewport,
    task: RepeatingTask,
    stats: RenderStats,
    clock: Box<dyn Fn() -> Instant>,
}

impl RenderLoop {
    pub fn new(viewport: Viewport, tick: Duration) -> Self {
        Self {
            viewport,
            task: RepeatingTask::new(tick),
            stats: RenderStats::default(),
            clock: Box::new(Instant::now),
        }
    }

    /// Replace the wall clock used to time the next tick.
    pub fn with_clock(mut self, clock: impl Fn() -> Instant + 'static) -> Self {
        self.set_clock(clock);
        self
    }

    pub fn set_clock(&mut self, clock: impl Fn() -> Instant + 'static) {
        self.clock = Box::new(clock);
    }

    /// Current time on the render clock.
    pub fn now(&self) -> Instant {
        (self.clock)()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Arm the first cycle to run right away.
    pub fn start(&mut self, now: Instant) {
        self.task.arm_now(now);
    }

    /// Stop re-arming. A pending tick is dropped.
    pub fn cancel(&mut self) {
        self.task.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_armed()
    }

    /// How long the caller may sleep before the next cycle is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.task.time_until_due(now)
    }

    /// Run the cycle if it is due and `state` allows it, then re-arm if
    /// `state_after` still allows rendering.
    ///
    /// `state_after` is read once the cycle has finished, so a transition
    /// that lands while the cycle runs suppresses the successor. The next
    /// tick is one interval after the cycle finished, not after it started.
    pub fn poll<B, D, F>(
        &mut self,
        now: Instant,
        state: ViewerState,
        capture: &mut CaptureSource<B>,
        surface: &mut D,
        state_after: F,
    ) -> Option<CycleOutcome>
    where
        B: SensorBackend,
        D: DisplaySurface + ?Sized,
        F: FnOnce() -> ViewerState,
    {
        if !state.allows_render() {
            self.task.cancel();
            return None;
        }
        if !self.task.take_due(now) {
            return None;
        }

        let outcome = self.run_cycle(capture, surface);

        if state_after().allows_render() {
            let finished = self.now();
            self.task.arm_after(finished);
        } else {
            log::debug!("render loop not re-armed: state left live");
        }
        Some(outcome)
    }

    /// One read → convert → scale → present pass.
    pub fn run_cycle<B, D>(
        &mut self,
        capture: &mut CaptureSource<B>,
        surface: &mut D,
    ) -> CycleOutcome
    where
        B: SensorBackend,
        D: DisplaySurface + ?Sized,
    {
        let frame = match capture.read_frame() {
            Ok(frame) => frame,
            Err(miss) => {
                self.stats.missed += 1;
                self.stats.consecutive_misses += 1;
                if self.stats.consecutive_misses == 1 {
                    log::warn!("capture miss ({miss}), retrying next tick");
                } else {
                    log::debug!(
                        "capture miss ({miss}), {} in a row, retrying next tick",
                        self.stats.consecutive_misses
                    );
                }
                return CycleOutcome::Missed;
            }
        };

        if self.stats.consecutive_misses > 0 {
            log::info!(
                "frames resumed after {} missed ticks",
                self.stats.consecutive_misses
            );
            self.stats.consecutive_misses = 0;
        }

        // Placement follows the frame's own size every cycle.
        let placement = scaler::place(frame.resolution(), self.viewport);
        let Some(image) = convert::scale_frame(&frame, &placement) else {
            self.stats.missed += 1;
            log::warn!("frame buffer shorter than {}x{}", frame.width, frame.height);
            return CycleOutcome::Missed;
        };

        match surface.present(
            &image.pixels,
            image.width,
            image.height,
            placement.offset_x as usize,
            placement.offset_y as usize,
        ) {
            Ok(()) => {
                self.stats.presented += 1;
                CycleOutcome::Presented(placement)
            }
            Err(e) => {
                log::warn!("present failed: {e}");
                CycleOutcome::PresentFailed
            }
        }
    }
}
