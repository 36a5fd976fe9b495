use serde::{Deserialize, Serialize};

use crate::animation::clip::{AnimationClip, ChannelCursors, ClipTiming};

/// Upper bound for playback speed unless configured otherwise.
pub const DEFAULT_MAX_SPEED: f32 = 8.0;

/// What happens when clip time leaves `[0, duration]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Wrap back to the start.
    #[default]
    Loop,
    /// Hold the final pose.
    Once,
    /// Play forward, then backward.
    PingPong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Elapsed time is zero and does not advance.
    Stopped,
    Playing,
    /// Elapsed time is frozen; the clip stays selected.
    Paused,
}

/// Playback state of one clip: which clip, how far into it, how fast.
///
/// Elapsed time is kept in seconds (`f64`) and converted to the clip's tick
/// base only when sampling, so wrapping happens on ticks and does not drift
/// for non-integer tick rates.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    clip: Option<usize>,
    timing: Option<ClipTiming>,
    elapsed: f64,
    speed: f32,
    max_speed: f32,
    state: PlaybackState,
    pub loop_mode: LoopMode,

    pub(crate) cursors: Vec<ChannelCursors>,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock {
    /// A stopped clock with no clip selected (bind pose).
    #[must_use]
    pub fn new() -> Self {
        Self {
            clip: None,
            timing: None,
            elapsed: 0.0,
            speed: 1.0,
            max_speed: DEFAULT_MAX_SPEED,
            state: PlaybackState::Stopped,
            loop_mode: LoopMode::Loop,
            cursors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = if max_speed.is_finite() { max_speed.max(0.0) } else { DEFAULT_MAX_SPEED };
        self.speed = self.speed.min(self.max_speed);
        self
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// A clock with the same speed, limits, loop mode and playback state,
    /// but no clip and no elapsed time.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            clip: None,
            timing: None,
            elapsed: 0.0,
            speed: self.speed,
            max_speed: self.max_speed,
            state: self.state,
            loop_mode: self.loop_mode,
            cursors: Vec::new(),
        }
    }

    // ========================================================================
    // Clip selection
    // ========================================================================

    /// Selects `clip` (stored at `index` in the owner's clip list), resets
    /// elapsed time to zero and recomputes the duration.
    pub fn set_clip(&mut self, index: usize, clip: &AnimationClip) {
        self.clip = Some(index);
        self.timing = Some(clip.timing());
        self.elapsed = 0.0;
        self.cursors.clear();
        self.cursors.resize(clip.channels.len(), ChannelCursors::default());
    }

    /// Returns to the bind pose sentinel.
    pub fn clear_clip(&mut self) {
        self.clip = None;
        self.timing = None;
        self.elapsed = 0.0;
        self.cursors.clear();
    }

    #[inline]
    #[must_use]
    pub fn clip_index(&self) -> Option<usize> {
        self.clip
    }

    #[inline]
    #[must_use]
    pub fn timing(&self) -> Option<ClipTiming> {
        self.timing
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Playing becomes Paused; anything else starts playing.
    pub fn toggle(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        } else {
            self.state = PlaybackState::Playing;
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.elapsed = 0.0;
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Clamps into `[0, max_speed]`; NaN stops time.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_nan() { 0.0 } else { speed.clamp(0.0, self.max_speed) };
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advances elapsed time by `dt * speed` while playing a clip.
    pub fn advance(&mut self, dt: f64) {
        if self.state != PlaybackState::Playing || self.clip.is_none() {
            return;
        }
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.elapsed += dt * f64::from(self.speed);
    }

    #[inline]
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Jumps to `seconds` without changing the playback state.
    pub fn set_elapsed_seconds(&mut self, seconds: f64) {
        self.elapsed = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    }

    /// Duration of the selected clip in seconds; zero in bind pose.
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.timing.map_or(0.0, |t| t.duration_seconds())
    }

    /// Elapsed time converted to ticks and wrapped by the loop mode: the
    /// value handed to the keyframe sampler.
    #[must_use]
    pub fn sample_ticks(&self) -> f32 {
        let Some(timing) = self.timing else {
            return 0.0;
        };

        let duration = timing.duration_ticks;
        let ticks = timing.seconds_to_ticks(self.elapsed);

        let wrapped = match self.loop_mode {
            LoopMode::Loop => {
                let t = ticks.rem_euclid(duration);
                // A whole number of loops can round to just under `duration`
                if duration - t <= duration * 4.0 * f64::EPSILON { 0.0 } else { t }
            }
            LoopMode::Once => ticks.clamp(0.0, duration),
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let t = ticks.rem_euclid(double_duration);
                if t > duration { double_duration - t } else { t }
            }
        };

        wrapped as f32
    }
}
