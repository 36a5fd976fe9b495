//! Asset Module
//!
//! The import contract ([`CharacterAsset`]) and the loaders producing it.

pub mod character_asset;
pub mod loaders;

pub use character_asset::CharacterAsset;
#[cfg(feature = "gltf")]
pub use loaders::GltfLoader;
