//! Clip switching with optional crossfade.
//!
//! ```text
//!            crossfade request (fade > 0)
//!   Idle ────────────────────────────────▶ Blending
//!    ▲                                        │
//!    └──────── progress reaches 1.0 ──────────┘
//!              ("next" becomes "current")
//! ```
//!
//! While blending both clocks advance on their own and a separate timer
//! accumulates real seconds. A retarget while blending starts a new blend
//! from the held "current" clock; the partially blended pose is not kept.

use crate::animation::clip::AnimationClip;
use crate::animation::clock::AnimationClock;

/// An in-flight blend toward `next`.
#[derive(Debug, Clone)]
pub struct Crossfade {
    pub(crate) next: AnimationClock,
    elapsed: f32,
    duration: f32,
}

impl Crossfade {
    #[inline]
    #[must_use]
    pub fn next(&self) -> &AnimationClock {
        &self.next
    }

    #[inline]
    #[must_use]
    pub fn target_clip(&self) -> Option<usize> {
        self.next.clip_index()
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// `elapsed / duration`, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Result of a clip switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Nothing changed.
    Ignored,
    /// Switched instantly.
    Cut,
    /// A blend started from the idle state.
    Started,
    /// An in-flight blend was replaced by one toward a new target.
    Retargeted,
}

/// Owns the active clock and, while blending, the incoming one.
#[derive(Debug, Clone)]
pub struct Animator {
    current: AnimationClock,
    fade: Option<Crossfade>,
    min_fade_seconds: f32,
}

impl Animator {
    #[must_use]
    pub fn new(current: AnimationClock) -> Self {
        Self {
            current,
            fade: None,
            min_fade_seconds: 0.0,
        }
    }

    /// Positive fade durations shorter than this are stretched to it.
    #[must_use]
    pub fn with_min_fade(mut self, seconds: f32) -> Self {
        self.min_fade_seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> &AnimationClock {
        &self.current
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut AnimationClock {
        &mut self.current
    }

    #[inline]
    #[must_use]
    pub fn crossfade(&self) -> Option<&Crossfade> {
        self.fade.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_blending(&self) -> bool {
        self.fade.is_some()
    }

    #[inline]
    #[must_use]
    pub fn blend_progress(&self) -> Option<f32> {
        self.fade.as_ref().map(Crossfade::progress)
    }

    /// Both clocks, for pose evaluation: `(current, next)`.
    pub(crate) fn clocks_mut(&mut self) -> (&mut AnimationClock, Option<(&mut AnimationClock, f32)>) {
        let progress = self.blend_progress();
        let next = self
            .fade
            .as_mut()
            .zip(progress)
            .map(|(fade, p)| (&mut fade.next, p));
        (&mut self.current, next)
    }

    // ========================================================================
    // Switching
    // ========================================================================

    /// Switches to `index` immediately, cancelling any blend. Re-selecting
    /// the current clip while idle does nothing.
    pub fn cut_to(&mut self, index: usize, clip: &AnimationClip) -> TransitionOutcome {
        if self.fade.is_none() && self.current.clip_index() == Some(index) {
            return TransitionOutcome::Ignored;
        }
        self.fade = None;
        self.current.set_clip(index, clip);
        log::debug!("Cut to clip {index} '{}'", clip.name);
        TransitionOutcome::Cut
    }

    /// Drops to the bind pose, cancelling any blend.
    pub fn clear(&mut self) {
        self.fade = None;
        self.current.clear_clip();
    }

    /// Blends toward `index` over `fade_seconds`; a non-positive duration is
    /// an instant cut.
    ///
    /// Ignored when `index` is already the idle clip, already the blend
    /// target, or the clip being blended away from.
    pub fn request_crossfade(
        &mut self,
        index: usize,
        clip: &AnimationClip,
        fade_seconds: f32,
    ) -> TransitionOutcome {
        if !(fade_seconds.is_finite() && fade_seconds > 0.0) {
            return self.cut_to(index, clip);
        }

        let retarget = match &self.fade {
            None if self.current.clip_index() == Some(index) => {
                return TransitionOutcome::Ignored;
            }
            None => false,
            Some(fade) => {
                if fade.target_clip() == Some(index) || self.current.clip_index() == Some(index) {
                    return TransitionOutcome::Ignored;
                }
                true
            }
        };

        let mut next = self.current.fork();
        next.set_clip(index, clip);

        let duration = fade_seconds.max(self.min_fade_seconds);
        self.fade = Some(Crossfade {
            next,
            elapsed: 0.0,
            duration,
        });

        log::debug!("Crossfade to clip {index} '{}' over {duration:.3}s", clip.name);

        if retarget {
            TransitionOutcome::Retargeted
        } else {
            TransitionOutcome::Started
        }
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Advances both clocks and the blend timer. When the blend completes
    /// the incoming clock replaces the current one.
    pub fn advance(&mut self, dt: f64) {
        self.current.advance(dt);

        let Some(fade) = &mut self.fade else {
            return;
        };

        fade.next.advance(dt);
        if dt.is_finite() && dt > 0.0 {
            fade.elapsed += dt as f32;
        }

        if fade.progress() >= 1.0 {
            if let Some(done) = self.fade.take() {
                log::debug!("Crossfade to clip {:?} finished", done.next.clip_index());
                self.current = done.next;
            }
        }
    }

    // ========================================================================
    // Transport (applies to both clocks)
    // ========================================================================

    pub fn play(&mut self) {
        self.for_each_clock(AnimationClock::play);
    }

    pub fn pause(&mut self) {
        self.for_each_clock(AnimationClock::pause);
    }

    pub fn toggle(&mut self) {
        self.for_each_clock(AnimationClock::toggle);
    }

    pub fn stop(&mut self) {
        self.for_each_clock(AnimationClock::stop);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.for_each_clock(|clock| clock.set_speed(speed));
    }

    fn for_each_clock(&mut self, mut f: impl FnMut(&mut AnimationClock)) {
        f(&mut self.current);
        if let Some(fade) = &mut self.fade {
            f(&mut fade.next);
        }
    }
}
