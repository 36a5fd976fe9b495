//! Character Module
//!
//! - [`Rig`]: load-time preparation of a [`CharacterAsset`](crate::assets::CharacterAsset),
//!   shared between instances
//! - [`Character`]: one animated instance with its own clocks and palette

pub mod rig;
pub mod instance;

pub use instance::Character;
pub use rig::{Rig, RigDiagnostics};
