//! Viewer state machine.
//!
//! `transition` is pure: it maps a state and an event to the next state and
//! the side effects the session must carry out, in order. Events that make
//! no sense in the current state are ignored.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Live,
    ShutdownConfirm,
    Terminating,
}

impl ViewerState {
    /// Only `Live` may start a render cycle.
    pub fn allows_render(self) -> bool {
        self == ViewerState::Live
    }
}

impl fmt::Display for ViewerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewerState::Live => "live",
            ViewerState::ShutdownConfirm => "shutdown-confirm",
            ViewerState::Terminating => "terminating",
        };
        f.write_str(s)
    }
}

/// Operator intents, already decoded from raw UI input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Window closed or EXIT pressed.
    CloseRequested,
    /// SHUTDOWN pressed.
    ShutdownRequested,
    ShutdownConfirmed,
    ShutdownCancelled,
}

/// Side effects of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StopRendering,
    ResumeRendering,
    ShowConfirm,
    HideConfirm,
    ReleaseCapture,
    CloseSurface,
    InvokeShutdown,
}

// Both ways out converge on Terminating, which releases the camera first.
const CLOSE: &[Effect] = &[
    Effect::StopRendering,
    Effect::HideConfirm,
    Effect::ReleaseCapture,
    Effect::CloseSurface,
];
const ASK: &[Effect] = &[Effect::StopRendering, Effect::ShowConfirm];
const CONFIRM: &[Effect] = &[
    Effect::HideConfirm,
    Effect::ReleaseCapture,
    Effect::InvokeShutdown,
    Effect::CloseSurface,
];
const CANCEL: &[Effect] = &[Effect::HideConfirm, Effect::ResumeRendering];

/// Next state and effects, or `None` if `event` is ignored in `state`.
pub fn transition(
    state: ViewerState,
    event: ControlEvent,
) -> Option<(ViewerState, &'static [Effect])> {
    use ControlEvent::*;
    use ViewerState::*;

    match (state, event) {
        (Live | ShutdownConfirm, CloseRequested) => Some((Terminating, CLOSE)),
        (Live, ShutdownRequested) => Some((ShutdownConfirm, ASK)),
        (ShutdownConfirm, ShutdownConfirmed) => Some((Terminating, CONFIRM)),
        (ShutdownConfirm, ShutdownCancelled) => Some((Live, CANCEL)),
        _ => None,
    }
}

/// Holds the current state and applies [`transition`].
#[derive(Debug, Clone)]
pub struct ControlStateMachine {
    state: ViewerState,
}

impl Default for ControlStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlStateMachine {
    pub fn new() -> Self {
        Self {
            state: ViewerState::Live,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn request_close(&mut self) -> &'static [Effect] {
        self.handle(ControlEvent::CloseRequested)
    }

    pub fn request_shutdown(&mut self) -> &'static [Effect] {
        self.handle(ControlEvent::ShutdownRequested)
    }

    pub fn confirm(&mut self) -> &'static [Effect] {
        self.handle(ControlEvent::ShutdownConfirmed)
    }

    pub fn cancel(&mut self) -> &'static [Effect] {
        self.handle(ControlEvent::ShutdownCancelled)
    }

    /// Apply `event`; returns the effects to run (empty if ignored).
    pub fn handle(&mut self, event: ControlEvent) -> &'static [Effect] {
        match transition(self.state, event) {
            Some((next, effects)) => {
                log::info!("{} -> {} on {:?}", self.state, next, event);
                self.state = next;
                effects
            }
            None => {
                log::debug!("ignoring {:?} while {}", event, self.state);
                &[]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_live() {
        assert_eq!(ControlStateMachine::new().state(), ViewerState::Live);
    }

    #[test]
    fn test_close_from_live_terminates_and_releases() {
        let mut sm = ControlStateMachine::new();
        let effects = sm.request_close();
        assert_eq!(sm.state(), ViewerState::Terminating);
        assert!(effects.contains(&Effect::ReleaseCapture));
        assert!(effects.contains(&Effect::CloseSurface));
        assert!(!effects.contains(&Effect::InvokeShutdown));
    }

    #[test]
    fn test_shutdown_confirm_round_trip() {
        let mut sm = ControlStateMachine::new();
        assert_eq!(sm.request_shutdown(), &[Effect::StopRendering, Effect::ShowConfirm]);
        assert_eq!(sm.state(), ViewerState::ShutdownConfirm);

        assert_eq!(sm.cancel(), &[Effect::HideConfirm, Effect::ResumeRendering]);
        assert_eq!(sm.state(), ViewerState::Live);
    }

    #[test]
    fn test_confirm_releases_before_invoking_shutdown() {
        let mut sm = ControlStateMachine::new();
        sm.request_shutdown();
        let effects = sm.confirm();
        assert_eq!(sm.state(), ViewerState::Terminating);

        let release = effects.iter().position(|e| *e == Effect::ReleaseCapture);
        let invoke = effects.iter().position(|e| *e == Effect::InvokeShutdown);
        assert!(release.unwrap() < invoke.unwrap());
    }

    #[test]
    fn test_confirm_and_cancel_ignored_while_live() {
        let mut sm = ControlStateMachine::new();
        assert!(sm.confirm().is_empty());
        assert!(sm.cancel().is_empty());
        assert_eq!(sm.state(), ViewerState::Live);
    }

    #[test]
    fn test_close_during_confirm_terminates() {
        let mut sm = ControlStateMachine::new();
        sm.request_shutdown();
        let effects = sm.request_close();
        assert_eq!(sm.state(), ViewerState::Terminating);
        assert!(effects.contains(&Effect::ReleaseCapture));
        assert!(!effects.contains(&Effect::InvokeShutdown));
    }

    #[test]
    fn test_terminating_is_terminal() {
        let events = [
            ControlEvent::CloseRequested,
            ControlEvent::ShutdownRequested,
            ControlEvent::ShutdownConfirmed,
            ControlEvent::ShutdownCancelled,
        ];
        for event in events {
            assert_eq!(transition(ViewerState::Terminating, event), None);
        }
    }

    #[test]
    fn test_only_live_allows_render() {
        assert!(ViewerState::Live.allows_render());
        assert!(!ViewerState::ShutdownConfirm.allows_render());
        assert!(!ViewerState::Terminating.allows_render());
    }
}
