#[cfg(feature = "gltf")]
pub mod gltf;

#[cfg(feature = "gltf")]
pub use self::gltf::{GLTF_ROOT_NAME, GltfLoader};
