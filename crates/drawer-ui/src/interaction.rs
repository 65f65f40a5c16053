//! Percent-driven interactive transition state.
//!
//! [`InteractiveTransition`] is the driver a gesture feeds: it only records
//! the percent it is given and turns the terminal decision into a completion
//! speed for the transition context. Exactly one of [`finish`] or [`cancel`]
//! takes effect per session.
//!
//! [`finish`]: InteractiveTransition::finish
//! [`cancel`]: InteractiveTransition::cancel

/// One progress reading computed from a gesture sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransitionProgress {
    /// Completion fraction in `[0, 1]`.
    pub percent: f32,
    /// `1` moving towards completion, `-1` moving back, `0` at rest.
    pub velocity_sign: i8,
    /// Speed the remainder would play at if finished now.
    pub completion_speed: f32,
}

impl TransitionProgress {
    pub fn new(percent: f32, velocity_y: f32, epsilon: f32) -> Self {
        let percent = percent.clamp(0.0, 1.0);
        let velocity_sign = if velocity_y > 0.0 {
            1
        } else if velocity_y < 0.0 {
            -1
        } else {
            0
        };
        Self {
            percent,
            velocity_sign,
            completion_speed: finish_speed(percent, epsilon),
        }
    }
}

#[inline]
fn finish_speed(percent: f32, epsilon: f32) -> f32 {
    1.0 - percent.max(epsilon)
}

/// How an interactive session ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Terminal {
    Finished,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct InteractiveTransition {
    in_progress: bool,
    percent: f32,
    terminal: Option<Terminal>,
    epsilon: f32,
}

impl InteractiveTransition {
    pub fn new(epsilon: f32) -> Self {
        Self {
            in_progress: false,
            percent: 0.0,
            terminal: None,
            epsilon: epsilon.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Starts a new session; any previous terminal state is forgotten.
    pub fn begin(&mut self) {
        if self.in_progress {
            log::debug!("interactive transition restarted at {:.2} without a terminal call", self.percent);
        }
        self.in_progress = true;
        self.percent = 0.0;
        self.terminal = None;
    }

    #[inline]
    pub fn interaction_in_progress(&self) -> bool {
        self.in_progress
    }

    #[inline]
    pub fn percent(&self) -> f32 {
        self.percent
    }

    #[inline]
    pub fn terminal(&self) -> Option<Terminal> {
        self.terminal
    }

    /// Records `percent` and returns the value to apply, or `None` outside a session.
    pub fn update(&mut self, percent: f32) -> Option<f32> {
        if !self.in_progress {
            return None;
        }
        self.percent = percent.clamp(0.0, 1.0);
        Some(self.percent)
    }

    /// Ends the session towards completion; returns the completion speed.
    pub fn finish(&mut self) -> Option<f32> {
        self.terminate(Terminal::Finished)
            .map(|_| finish_speed(self.percent, self.epsilon))
    }

    /// Ends the session back towards the start; returns the completion speed.
    pub fn cancel(&mut self) -> Option<f32> {
        self.terminate(Terminal::Cancelled).map(|_| self.percent)
    }

    fn terminate(&mut self, terminal: Terminal) -> Option<Terminal> {
        if !self.in_progress {
            log::debug!("{terminal:?} ignored: no interaction in progress (was {:?})", self.terminal);
            return None;
        }
        self.in_progress = false;
        self.terminal = Some(terminal);
        Some(terminal)
    }
}
