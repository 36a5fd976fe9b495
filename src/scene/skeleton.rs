use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::scene::hierarchy::NodeHierarchy;

/// A skinning bone.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Name of the scene node driving this bone.
    pub name: String,
    /// Inverse bind matrix: maps a vertex from mesh space into the bone's
    /// bind-local space. Precomputed by the importer.
    pub offset: Mat4,
}

impl Bone {
    #[must_use]
    pub fn new(name: impl Into<String>, offset: Mat4) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }
}

/// Bone registry of a loaded asset.
///
/// Bone order is the GPU palette order: `bones[i]` is uploaded to slot `i`
/// (`joints[i]` in the shader). Built once at load time and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    index_by_name: FxHashMap<String, usize>,
}

impl Skeleton {
    /// Registers bones in order. A name seen twice keeps its first slot and
    /// offset, matching how bones collected from several meshes are merged.
    #[must_use]
    pub fn new(bones: impl IntoIterator<Item = Bone>) -> Self {
        let mut skeleton = Self::default();
        for bone in bones {
            if skeleton.index_by_name.contains_key(&bone.name) {
                continue;
            }
            skeleton
                .index_by_name
                .insert(bone.name.clone(), skeleton.bones.len());
            skeleton.bones.push(bone);
        }
        skeleton
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[inline]
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    /// Maps every bone to the hierarchy node carrying its name. `None`
    /// marks a bone the asset has no node for.
    #[must_use]
    pub fn resolve_nodes(&self, hierarchy: &NodeHierarchy) -> Vec<Option<usize>> {
        self.bones
            .iter()
            .map(|bone| hierarchy.index_of(&bone.name))
            .collect()
    }
}
