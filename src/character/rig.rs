use glam::Mat4;

use crate::animation::binder::ClipBinding;
use crate::animation::clip::AnimationClip;
use crate::assets::character_asset::CharacterAsset;
use crate::scene::hierarchy::NodeHierarchy;
use crate::scene::skeleton::Skeleton;

/// Asset-quality counters, computed once at load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RigDiagnostics {
    pub node_count: usize,
    /// Distinct bones in the skeleton.
    pub bone_count: usize,
    /// Bones that fit in the palette.
    pub palette_bones: usize,
    /// Bones dropped because the palette is full.
    pub truncated_bones: usize,
    /// Bones with no scene node of the same name.
    pub unmatched_bones: usize,
    /// Channels (over all clips) targeting no scene node.
    pub unbound_channels: usize,
}

/// Immutable, load-time data shared by every instance of a character.
///
/// Holds the flattened hierarchy, bone registry, bone-to-node and
/// channel-to-node resolutions, and the root correction matrix.
#[derive(Debug, Clone)]
pub struct Rig {
    name: String,
    hierarchy: NodeHierarchy,
    skeleton: Skeleton,
    bone_nodes: Vec<Option<usize>>,
    clips: Vec<AnimationClip>,
    bindings: Vec<ClipBinding>,
    root_inverse: Mat4,
    palette_capacity: usize,
    diagnostics: RigDiagnostics,
}

impl Rig {
    /// Prepares an asset for a palette of `palette_capacity` slots.
    #[must_use]
    pub fn new(asset: CharacterAsset, palette_capacity: usize) -> Self {
        let CharacterAsset {
            name,
            root,
            clips,
            bones,
        } = asset;

        let hierarchy = NodeHierarchy::from_root(&root);
        let skeleton = Skeleton::new(bones);
        let bone_nodes = skeleton.resolve_nodes(&hierarchy);
        let bindings: Vec<ClipBinding> = clips
            .iter()
            .map(|clip| ClipBinding::bind(&hierarchy, clip))
            .collect();

        let root_transform = hierarchy.root_transform();
        let root_inverse = if root_transform.determinant().abs() > f32::EPSILON {
            root_transform.inverse()
        } else {
            log::warn!("Character '{name}': scene root transform is not invertible, using identity");
            Mat4::IDENTITY
        };

        let palette_bones = skeleton.len().min(palette_capacity);
        let diagnostics = RigDiagnostics {
            node_count: hierarchy.len(),
            bone_count: skeleton.len(),
            palette_bones,
            truncated_bones: skeleton.len() - palette_bones,
            unmatched_bones: bone_nodes.iter().filter(|n| n.is_none()).count(),
            unbound_channels: bindings.iter().map(ClipBinding::unbound_channels).sum(),
        };

        if diagnostics.truncated_bones > 0 {
            log::warn!(
                "Character '{name}': {} bones exceed the palette capacity of {palette_capacity}; {} bones will not be skinned",
                diagnostics.bone_count,
                diagnostics.truncated_bones
            );
        }
        if diagnostics.unmatched_bones > 0 {
            let first = skeleton
                .bones()
                .iter()
                .zip(&bone_nodes)
                .find(|(_, node)| node.is_none())
                .map_or("", |(bone, _)| bone.name.as_str());
            log::warn!(
                "Character '{name}': {} bones have no matching scene node (first: '{first}')",
                diagnostics.unmatched_bones
            );
        }
        log::info!(
            "Character '{name}': {} nodes, {} bones, {} clips",
            diagnostics.node_count,
            diagnostics.bone_count,
            clips.len()
        );

        Self {
            name,
            hierarchy,
            skeleton,
            bone_nodes,
            clips,
            bindings,
            root_inverse,
            palette_capacity,
            diagnostics,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Palette size the diagnostics were computed for.
    #[inline]
    #[must_use]
    pub fn palette_capacity(&self) -> usize {
        self.palette_capacity
    }

    #[inline]
    #[must_use]
    pub fn hierarchy(&self) -> &NodeHierarchy {
        &self.hierarchy
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Hierarchy index per bone, `None` when unmatched.
    #[inline]
    #[must_use]
    pub fn bone_nodes(&self) -> &[Option<usize>] {
        &self.bone_nodes
    }

    #[inline]
    #[must_use]
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    #[inline]
    #[must_use]
    pub fn clip(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index)
    }

    #[inline]
    #[must_use]
    pub fn binding(&self, index: usize) -> Option<&ClipBinding> {
        self.bindings.get(index)
    }

    #[inline]
    #[must_use]
    pub fn root_inverse(&self) -> Mat4 {
        self.root_inverse
    }

    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> RigDiagnostics {
        self.diagnostics
    }

    /// First clip whose name contains any of `hints`, case-insensitively.
    #[must_use]
    pub fn find_clip<S: AsRef<str>>(&self, hints: &[S]) -> Option<usize> {
        let hints: Vec<String> = hints
            .iter()
            .map(|h| h.as_ref().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        self.clips.iter().position(|clip| {
            let name = clip.name.to_lowercase();
            hints.iter().any(|h| name.contains(h.as_str()))
        })
    }
}
