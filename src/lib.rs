#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod character;
pub mod errors;
pub mod scene;
pub mod settings;
pub mod utils;

pub use animation::{AnimationClip, AnimationClock, Animator, KeyframeTrack, LoopMode, NodeChannel};
pub use assets::CharacterAsset;
#[cfg(feature = "gltf")]
pub use assets::GltfLoader;
pub use character::{Character, Rig, RigDiagnostics};
pub use errors::{MarionetteError, Result};
pub use scene::{Bone, BonePalette, BonePaletteSink, NodeHierarchy, SceneNode, Skeleton};
pub use settings::CharacterSettings;
