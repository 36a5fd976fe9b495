use glam::{Mat4, Quat, Vec3};

use crate::animation::tracks::{KeyframeCursor, KeyframeTrack};
use crate::utils::trs::{Trs, compose_trs};

/// Keyframes driving one scene node. Any of the three tracks may be empty,
/// in which case that component stays at its identity value.
#[derive(Debug, Clone)]
pub struct NodeChannel {
    /// Name of the scene node this channel animates.
    pub node_name: String,
    pub positions: KeyframeTrack<Vec3>,
    pub rotations: KeyframeTrack<Quat>,
    pub scales: KeyframeTrack<Vec3>,
}

/// Per-channel search cursors, one per track.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelCursors {
    pub position: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

impl NodeChannel {
    #[must_use]
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            positions: KeyframeTrack::empty(),
            rotations: KeyframeTrack::empty(),
            scales: KeyframeTrack::empty(),
        }
    }

    #[must_use]
    pub fn with_positions(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.positions = track;
        self
    }

    #[must_use]
    pub fn with_rotations(mut self, track: KeyframeTrack<Quat>) -> Self {
        self.rotations = track;
        self
    }

    #[must_use]
    pub fn with_scales(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.scales = track;
        self
    }

    /// Latest key time over the three tracks, in ticks.
    #[must_use]
    pub fn last_key_time(&self) -> Option<f32> {
        [
            self.positions.last_time(),
            self.rotations.last_time(),
            self.scales.last_time(),
        ]
        .into_iter()
        .flatten()
        .reduce(f32::max)
    }

    /// Samples translation, rotation and scale independently.
    #[must_use]
    pub fn sample_trs(&self, time: f32) -> Trs {
        Trs {
            translation: self.positions.sample(time, Vec3::ZERO),
            rotation: self.rotations.sample(time, Quat::IDENTITY),
            scale: self.scales.sample(time, Vec3::ONE),
        }
    }

    /// Cursor-accelerated [`sample_trs`](Self::sample_trs).
    pub fn sample_trs_with_cursors(&self, time: f32, cursors: &mut ChannelCursors) -> Trs {
        Trs {
            translation: self
                .positions
                .sample_with_cursor(time, Vec3::ZERO, &mut cursors.position),
            rotation: self
                .rotations
                .sample_with_cursor(time, Quat::IDENTITY, &mut cursors.rotation),
            scale: self
                .scales
                .sample_with_cursor(time, Vec3::ONE, &mut cursors.scale),
        }
    }

    /// Local matrix at `time`, composed as `T * R * S`.
    #[inline]
    pub fn sample_local(&self, time: f32, cursors: &mut ChannelCursors) -> Mat4 {
        compose_trs(&self.sample_trs_with_cursors(time, cursors))
    }
}

/// Time base of a clip, derived from its keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipTiming {
    /// Never zero: a declared rate of 0 means "ticks are seconds".
    pub ticks_per_second: f64,
    /// At least one tick when the clip has no keys.
    pub duration_ticks: f64,
}

impl ClipTiming {
    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.duration_ticks / self.ticks_per_second
    }

    #[inline]
    #[must_use]
    pub fn seconds_to_ticks(&self, seconds: f64) -> f64 {
        seconds * self.ticks_per_second
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// As declared by the asset; 0 means keys are already in seconds.
    pub ticks_per_second: f64,
    /// As declared by the asset. Only used when no channel has keys.
    pub declared_duration_ticks: f64,
    pub channels: Vec<NodeChannel>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ticks_per_second: f64,
        declared_duration_ticks: f64,
        channels: Vec<NodeChannel>,
    ) -> Self {
        Self {
            name: name.into(),
            ticks_per_second,
            declared_duration_ticks,
            channels,
        }
    }

    /// Ticks per second with the "0 means seconds" rule applied.
    #[must_use]
    pub fn effective_ticks_per_second(&self) -> f64 {
        if self.ticks_per_second > 0.0 && self.ticks_per_second.is_finite() {
            self.ticks_per_second
        } else {
            1.0
        }
    }

    /// Duration in ticks: the latest key across every channel, or the
    /// declared duration (at least one tick) when there are no keys.
    #[must_use]
    pub fn duration_ticks(&self) -> f64 {
        let from_keys = self
            .channels
            .iter()
            .filter_map(NodeChannel::last_key_time)
            .fold(0.0_f64, |acc, t| acc.max(f64::from(t)));

        if from_keys > 0.0 {
            from_keys
        } else if self.declared_duration_ticks.is_finite() {
            self.declared_duration_ticks.max(1.0)
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn timing(&self) -> ClipTiming {
        ClipTiming {
            ticks_per_second: self.effective_ticks_per_second(),
            duration_ticks: self.duration_ticks(),
        }
    }

    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.timing().duration_seconds()
    }
}
