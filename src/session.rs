//! One viewing session: the single-threaded loop that pumps UI events,
//! applies control transitions and drives the render loop.
//!
//! All device access happens here, on the caller's thread. A transition
//! requested by an event is applied before the next render cycle is
//! considered, never in the middle of one.

use std::thread;
use std::time::{Duration, Instant};

use crate::camera::{CaptureSource, SensorBackend};
use crate::control::{ControlEvent, ControlStateMachine, Effect, ViewerState};
use crate::display::{DisplaySurface, UiEvent};
use crate::error::{CaptureError, Error};
use crate::render::{CycleOutcome, RenderLoop, RenderStats};
use crate::shutdown::ShutdownInvoker;
use crate::types::Viewport;

/// Longest the loop sleeps before pumping window events again.
pub const EVENT_POLL: Duration = Duration::from_millis(10);

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Window closed or EXIT pressed.
    Closed,
    /// Shutdown confirmed and the command was launched.
    ShutdownInvoked,
    /// Shutdown confirmed but the command could not be launched.
    ShutdownFailed,
}

impl From<UiEvent> for ControlEvent {
    fn from(event: UiEvent) -> Self {
        match event {
            UiEvent::WindowClosed | UiEvent::ExitPressed => ControlEvent::CloseRequested,
            UiEvent::ShutdownPressed => ControlEvent::ShutdownRequested,
            UiEvent::ConfirmPressed => ControlEvent::ShutdownConfirmed,
            UiEvent::CancelPressed => ControlEvent::ShutdownCancelled,
        }
    }
}

pub struct Session<B: SensorBackend, D: DisplaySurface, S: ShutdownInvoker> {
    capture: CaptureSource<B>,
    surface: D,
    shutdown: S,
    control: ControlStateMachine,
    render: RenderLoop,
    end: Option<SessionEnd>,
}

/// Open the window, then the camera. If the camera cannot be opened the
/// window is closed again before the error is returned.
pub fn open_devices<B, D, FS, FC>(
    open_surface: FS,
    open_capture: FC,
) -> Result<(D, CaptureSource<B>), Error>
where
    B: SensorBackend,
    D: DisplaySurface,
    FS: FnOnce() -> Result<D, Error>,
    FC: FnOnce() -> Result<CaptureSource<B>, CaptureError>,
{
    let mut surface = open_surface()?;
    match open_capture() {
        Ok(capture) => Ok((surface, capture)),
        Err(e) => {
            surface.close();
            Err(e.into())
        }
    }
}

impl<B: SensorBackend, D: DisplaySurface, S: ShutdownInvoker> Session<B, D, S> {
    pub fn new(
        capture: CaptureSource<B>,
        surface: D,
        shutdown: S,
        viewport: Viewport,
        tick: Duration,
    ) -> Self {
        Self {
            capture,
            surface,
            shutdown,
            control: ControlStateMachine::new(),
            render: RenderLoop::new(viewport, tick),
            end: None,
        }
    }

    /// Time render ticks with `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: impl Fn() -> Instant + 'static) -> Self {
        self.render.set_clock(clock);
        self
    }

    pub fn state(&self) -> ViewerState {
        self.control.state()
    }

    pub fn end(&self) -> Option<SessionEnd> {
        self.end
    }

    pub fn stats(&self) -> RenderStats {
        self.render.stats()
    }

    pub fn capture(&self) -> &CaptureSource<B> {
        &self.capture
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn is_render_armed(&self) -> bool {
        self.render.is_armed()
    }

    /// Enter Live: the first cycle is due immediately.
    pub fn start(&mut self, now: Instant) {
        self.render.start(now);
    }

    /// Feed one operator intent through the state machine and run its effects.
    pub fn dispatch(&mut self, event: ControlEvent, now: Instant) {
        let effects = self.control.handle(event);
        for effect in effects {
            self.apply(*effect, now);
        }
    }

    fn apply(&mut self, effect: Effect, now: Instant) {
        match effect {
            Effect::StopRendering => self.render.cancel(),
            Effect::ResumeRendering => self.render.start(now),
            Effect::ShowConfirm => self.surface.set_confirm_visible(true),
            Effect::HideConfirm => self.surface.set_confirm_visible(false),
            Effect::ReleaseCapture => self.capture.release(),
            Effect::CloseSurface => {
                self.surface.close();
                self.end.get_or_insert(SessionEnd::Closed);
            }
            Effect::InvokeShutdown => {
                // The camera is already gone; a failure here is only reported.
                let end = match self.shutdown.invoke() {
                    Ok(()) => SessionEnd::ShutdownInvoked,
                    Err(e) => {
                        log::error!("{e}");
                        SessionEnd::ShutdownFailed
                    }
                };
                self.end = Some(end);
            }
        }
    }

    /// One pass of the loop: pump events, then run the render cycle if it is due.
    pub fn step(&mut self, now: Instant) -> Option<CycleOutcome> {
        for event in self.surface.poll_events() {
            log::debug!("ui event {event:?}");
            self.dispatch(event.into(), now);
        }

        let state = self.control.state();
        let control = &self.control;
        self.render.poll(now, state, &mut self.capture, &mut self.surface, || {
            control.state()
        })
    }

    pub fn is_running(&self) -> bool {
        self.control.state() != ViewerState::Terminating
    }

    /// Run until the operator closes the window or confirms shutdown.
    pub fn run(&mut self) -> SessionEnd {
        self.start(self.render.now());

        while self.is_running() {
            self.step(self.render.now());
            if !self.is_running() {
                break;
            }
            let wait = self
                .render
                .time_until_due(self.render.now())
                .map_or(EVENT_POLL, |d| d.min(EVENT_POLL));
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }

        let stats = self.render.stats();
        log::info!(
            "session ended: {} frames presented, {} ticks missed",
            stats.presented,
            stats.missed
        );
        self.end.unwrap_or(SessionEnd::Closed)
    }
}
