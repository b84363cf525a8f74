//! Interruptible blend-factor animation.
//!
//! The blend factor is never stepped imperatively; a transition is a pure
//! function of the instant it started, so sampling it at any `now` yields the
//! same value regardless of how often frames land in between. Starting a new
//! transition captures the current interpolated value as its origin, which is
//! what makes engage-during-release (and vice versa) continuous.

use std::time::{Duration, Instant};

/// Time remapping applied to a transition's linear progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingCurve {
    Linear,
    Smoothstep,
    /// Exponential ease-in-out: slow start, fast middle, slow tail.
    #[default]
    ExpoInOut,
}

impl EasingCurve {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            EasingCurve::Linear => clamped,
            EasingCurve::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            EasingCurve::ExpoInOut => {
                if clamped <= 0.0 {
                    0.0
                } else if clamped >= 1.0 {
                    1.0
                } else if clamped < 0.5 {
                    0.5 * 2.0_f32.powf(20.0 * clamped - 10.0)
                } else {
                    1.0 - 0.5 * 2.0_f32.powf(-20.0 * clamped + 10.0)
                }
            }
        }
    }
}

/// A single in-flight animation of the blend factor.
#[derive(Debug, Clone, Copy)]
struct BlendTransition {
    from: f32,
    target: f32,
    started_at: Instant,
    duration: Duration,
    curve: EasingCurve,
}

impl BlendTransition {
    fn value_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32().max(f32::EPSILON);
        self.from + (self.target - self.from) * self.curve.sample(progress)
    }

    fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }
}

/// Owns the blend factor and its (at most one) running transition.
///
/// The factor starts at 0 (texture A fully visible) and only moves through
/// animated transitions; there is no way to set it instantaneously.
#[derive(Debug, Clone, Copy)]
pub struct BlendState {
    resting: f32,
    transition: Option<BlendTransition>,
}

impl BlendState {
    pub fn new() -> Self {
        Self {
            resting: 0.0,
            transition: None,
        }
    }

    /// Samples the blend factor at `now`, retiring a finished transition so
    /// the factor stays pinned at its target afterwards.
    pub fn factor(&mut self, now: Instant) -> f32 {
        if let Some(transition) = self.transition {
            if transition.finished(now) {
                self.resting = transition.target;
                self.transition = None;
                return self.resting;
            }
            return transition.value_at(now);
        }
        self.resting
    }

    /// Starts a transition toward `target`, cancelling any in-flight one.
    ///
    /// The new transition departs from the factor value at `now`, so an
    /// interruption never produces a visual snap.
    pub fn animate_to(&mut self, target: f32, now: Instant, duration: Duration, curve: EasingCurve) {
        let from = self.factor(now);
        self.resting = from;
        self.transition = Some(BlendTransition {
            from,
            target: target.clamp(0.0, 1.0),
            started_at: now,
            duration,
            curve,
        });
    }

    /// True while a transition is still running at `now`.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.transition
            .map(|transition| !transition.finished(now))
            .unwrap_or(false)
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::new()
    }
}
