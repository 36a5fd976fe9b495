//! Animation Module
//!
//! - [`tracks`]: keyframe tracks and the sampler
//! - [`clip`]: clips, per-node channels and clip timing
//! - [`clock`]: playback state of one clip
//! - [`binder`]: channel-to-node resolution, done once per clip
//! - [`crossfade`]: clip switching and two-clock blending

pub mod values;
pub mod tracks;
pub mod clip;
pub mod clock;
pub mod binder;
pub mod crossfade;

pub use clip::{AnimationClip, ChannelCursors, ClipTiming, NodeChannel};
pub use clock::{AnimationClock, LoopMode, PlaybackState};
pub use binder::{ClipBinding, NodeSource};
pub use crossfade::{Animator, Crossfade, TransitionOutcome};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
