//! Scene Module
//!
//! Node hierarchy and skinning data:
//! - SceneNode: imported node tree (name, local bind transform, children)
//! - NodeHierarchy: flattened, parent-first node arena used every frame
//! - Skeleton: bones with their offset (inverse bind) matrices
//! - BonePalette: per-bone skinning matrices handed to the renderer

pub mod node;
pub mod hierarchy;
pub mod skeleton;
pub mod palette;

pub use node::SceneNode;
pub use hierarchy::NodeHierarchy;
pub use skeleton::{Bone, Skeleton};
pub use palette::{BonePalette, BonePaletteSink};
