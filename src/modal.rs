//! The lifecycle of the detail overlay.
//!
//! Opening and closing each take two steps so that a visual transition can run between them:
//!
//! ```text
//! Closed --open--> Opening --(enter delay)--> Open --close--> Closing --(exit delay)--> Closed
//! ```
//!
//! The machine itself never sleeps. Transitions that need a delay hand back a [`Timer`]; the
//! owner fires it after [`Timer::delay`] has passed. Every transition that schedules a timer
//! bumps the generation, so a timer scheduled before a later `open` or `close` is ignored.

use std::time::Duration;

use tracing::trace;

use crate::config::ModalConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Opening,
    Open,
    Closing,
}

impl Phase {
    /// Whether the overlay is part of the render tree at all.
    pub fn visible(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether the overlay is in its settled, fully open appearance.
    pub fn animating(&self) -> bool {
        matches!(self, Self::Open)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Settle,
    Hide,
}

/// A delayed transition, valid only for the generation it was scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub generation: u64,
    pub step: Step,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    Button,
    Escape,

    /// A click on the backdrop; only honored when the click landed on the backdrop itself rather
    /// than on the dialog inside it.
    Backdrop { on_backdrop: bool },
}

/// A snapshot of the overlay for renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalState<'a, T> {
    pub visible: bool,
    pub animating: bool,
    pub selected: Option<&'a T>,
}

#[derive(Debug)]
pub struct Modal<T> {
    phase: Phase,
    selected: Option<T>,
    generation: u64,
    enter_delay: Duration,
    exit_delay: Duration,
}

impl<T> Modal<T> {
    pub fn new(cfg: &ModalConfig) -> Self {
        Self {
            phase: Phase::Closed,
            selected: None,
            generation: 0,
            enter_delay: cfg.enter_delay.into(),
            exit_delay: cfg.exit_delay.into(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn state(&self) -> ModalState<'_, T> {
        ModalState {
            visible: self.phase.visible(),
            animating: self.phase.animating(),
            selected: self.selected(),
        }
    }

    /// Shows `item`.
    ///
    /// While opening or open, only the selection changes. Otherwise the overlay becomes visible
    /// right away and the returned timer settles it into the open phase. Reopening during the
    /// exit transition cancels the pending hide.
    #[must_use]
    pub fn open(&mut self, item: T) -> Option<Timer> {
        self.selected = Some(item);

        match self.phase {
            Phase::Opening | Phase::Open => None,

            Phase::Closed | Phase::Closing => {
                self.phase = Phase::Opening;

                Some(self.schedule(Step::Settle, self.enter_delay))
            }
        }
    }

    /// Starts the exit transition; the returned timer removes the overlay once it has run.
    ///
    /// Does nothing unless the overlay is opening or open.
    #[must_use]
    pub fn close(&mut self) -> Option<Timer> {
        match self.phase {
            Phase::Opening | Phase::Open => {
                self.phase = Phase::Closing;

                Some(self.schedule(Step::Hide, self.exit_delay))
            }

            Phase::Closed | Phase::Closing => None,
        }
    }

    #[must_use]
    pub fn request_close(&mut self, request: CloseRequest) -> Option<Timer> {
        match request {
            CloseRequest::Backdrop { on_backdrop: false } => None,
            _ => self.close(),
        }
    }

    /// Applies a delayed transition. Returns `false` if the timer went stale in the meantime.
    pub fn fire(&mut self, timer: Timer) -> bool {
        if timer.generation != self.generation {
            trace!(?timer, generation = self.generation, "Ignoring a stale modal timer");

            return false;
        }

        match (timer.step, self.phase) {
            (Step::Settle, Phase::Opening) => self.phase = Phase::Open,

            (Step::Hide, Phase::Closing) => {
                self.phase = Phase::Closed;
                self.selected = None;
            }

            _ => return false,
        }

        true
    }

    fn schedule(&mut self, step: Step, delay: Duration) -> Timer {
        self.generation += 1;

        Timer {
            generation: self.generation,
            step,
            delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modal() -> Modal<&'static str> {
        Modal::new(&ModalConfig::default())
    }

    fn assert_consistent(modal: &Modal<&'static str>) {
        let state = modal.state();

        assert!(!state.animating || state.visible, "{state:?}");
        assert_eq!(state.visible, state.selected.is_some(), "{state:?}");
    }

    #[test]
    fn starts_closed() {
        let modal = modal();

        assert_eq!(
            modal.state(),
            ModalState {
                visible: false,
                animating: false,
                selected: None
            }
        );
    }

    #[test]
    fn open_then_close() {
        let mut modal = modal();

        let settle = modal.open("x").unwrap();
        assert_eq!(settle.step, Step::Settle);
        assert_eq!(settle.delay, Duration::from_millis(10));
        assert_eq!(modal.phase(), Phase::Opening);
        assert!(modal.state().visible);
        assert!(!modal.state().animating);

        assert!(modal.fire(settle));
        assert_eq!(modal.phase(), Phase::Open);
        assert!(modal.state().animating);

        let hide = modal.close().unwrap();
        assert_eq!(hide.step, Step::Hide);
        assert_eq!(hide.delay, Duration::from_millis(300));
        assert_eq!(modal.phase(), Phase::Closing);
        assert!(modal.state().visible);
        assert_eq!(modal.selected(), Some(&"x"));

        assert!(modal.fire(hide));
        assert_eq!(modal.phase(), Phase::Closed);
        assert_eq!(modal.selected(), None);
        assert_consistent(&modal);
    }

    #[test]
    fn close_before_the_enter_delay() {
        let mut modal = modal();

        let settle = modal.open("x").unwrap();
        let hide = modal.close().unwrap();
        assert_consistent(&modal);

        // The enter delay elapses first but must not bring the overlay back.
        assert!(!modal.fire(settle));
        assert_eq!(modal.phase(), Phase::Closing);
        assert_consistent(&modal);

        assert!(modal.fire(hide));
        assert_eq!(modal.phase(), Phase::Closed);
        assert_eq!(modal.selected(), None);
        assert_consistent(&modal);
    }

    #[test]
    fn reopen_while_closing() {
        let mut modal = modal();

        let settle = modal.open("x").unwrap();
        modal.fire(settle);
        let hide = modal.close().unwrap();

        let settle = modal.open("y").unwrap();
        assert_eq!(modal.phase(), Phase::Opening);
        assert!(modal.fire(settle));

        assert!(!modal.fire(hide));
        assert_eq!(modal.phase(), Phase::Open);
        assert_eq!(modal.selected(), Some(&"y"));
        assert_consistent(&modal);
    }

    #[test]
    fn stale_hide_fired_before_the_new_settle() {
        let mut modal = modal();

        let settle = modal.open("x").unwrap();
        modal.fire(settle);
        let hide = modal.close().unwrap();
        let settle = modal.open("y").unwrap();

        assert!(!modal.fire(hide));
        assert_eq!(modal.phase(), Phase::Opening);
        assert_eq!(modal.selected(), Some(&"y"));

        assert!(modal.fire(settle));
        assert_eq!(modal.phase(), Phase::Open);
    }

    #[test]
    fn open_while_open_only_swaps_the_selection() {
        let mut modal = modal();

        let settle = modal.open("x").unwrap();
        assert_eq!(modal.open("y"), None);
        assert!(modal.fire(settle));

        assert_eq!(modal.open("z"), None);
        assert_eq!(modal.phase(), Phase::Open);
        assert_eq!(modal.selected(), Some(&"z"));
    }

    #[test]
    fn close_requests_when_closed_are_ignored() {
        let mut modal = modal();

        assert_eq!(modal.close(), None);
        assert_eq!(modal.request_close(CloseRequest::Escape), None);
        assert_eq!(modal.phase(), Phase::Closed);
    }

    #[test]
    fn repeated_close_is_ignored() {
        let mut modal = modal();

        let settle = modal.open("x").unwrap();
        modal.fire(settle);
        let hide = modal.close().unwrap();

        assert_eq!(modal.request_close(CloseRequest::Button), None);
        assert!(modal.fire(hide));
    }

    #[test]
    fn backdrop_clicks_inside_the_dialog_are_ignored() {
        let mut modal = modal();

        let settle = modal.open("x").unwrap();
        modal.fire(settle);

        assert_eq!(
            modal.request_close(CloseRequest::Backdrop { on_backdrop: false }),
            None
        );
        assert_eq!(modal.phase(), Phase::Open);

        assert!(modal
            .request_close(CloseRequest::Backdrop { on_backdrop: true })
            .is_some());
        assert_eq!(modal.phase(), Phase::Closing);
    }
}
