//! Flattened scene hierarchy and pose evaluation.
//!
//! The imported [`SceneNode`] tree is flattened once, depth first, into
//! parallel arrays addressed by a stable node index. Depth-first order puts
//! every parent before its children, so a single forward pass over the
//! arrays composes global transforms:
//!
//! ```text
//! global[i] = global[parent[i]] * local[i]
//! ```
//!
//! Evaluation writes into a caller-owned `&mut [Mat4]` of length
//! [`NodeHierarchy::len`], which the character reuses every frame.

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::animation::binder::{ClipBinding, NodeSource};
use crate::animation::clip::{AnimationClip, ChannelCursors};
use crate::scene::node::SceneNode;
use crate::utils::trs::compose_trs;

#[derive(Debug, Clone)]
pub struct NodeHierarchy {
    names: Vec<String>,
    parents: Vec<Option<usize>>,
    default_locals: Vec<Mat4>,
    index_by_name: FxHashMap<String, usize>,
}

impl NodeHierarchy {
    /// Flattens the tree under `root`. The root gets index 0.
    #[must_use]
    pub fn from_root(root: &SceneNode) -> Self {
        let capacity = root.subtree_len();
        let mut hierarchy = Self {
            names: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
            default_locals: Vec::with_capacity(capacity),
            index_by_name: FxHashMap::default(),
        };

        let mut duplicates = 0usize;
        let mut stack: Vec<(&SceneNode, Option<usize>)> = vec![(root, None)];

        while let Some((node, parent)) = stack.pop() {
            let index = hierarchy.names.len();
            hierarchy.names.push(node.name.clone());
            hierarchy.parents.push(parent);
            hierarchy.default_locals.push(node.transform);

            if hierarchy.index_by_name.contains_key(&node.name) {
                duplicates += 1;
            } else {
                hierarchy.index_by_name.insert(node.name.clone(), index);
            }

            // Reverse so the first child is visited first
            for child in node.children.iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        if duplicates > 0 {
            log::warn!(
                "Scene graph has {duplicates} node(s) with duplicate names; the first occurrence is used for lookups"
            );
        }

        hierarchy
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    #[inline]
    #[must_use]
    pub fn default_local(&self, index: usize) -> Option<Mat4> {
        self.default_locals.get(index).copied()
    }

    /// Local transform of the scene root.
    #[must_use]
    pub fn root_transform(&self) -> Mat4 {
        self.default_locals.first().copied().unwrap_or(Mat4::IDENTITY)
    }

    /// Allocates a transform buffer sized for this hierarchy.
    #[must_use]
    pub fn new_transform_buffer(&self) -> Vec<Mat4> {
        vec![Mat4::IDENTITY; self.len()]
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Static hierarchy: every node uses its default local transform.
    pub fn evaluate_bind_pose(&self, globals: &mut [Mat4]) {
        self.propagate(globals, |i| self.default_locals[i]);
    }

    /// Animated hierarchy at `time` (ticks, already wrapped).
    ///
    /// Nodes bound to a channel use the sampled TRS; all others keep their
    /// default local transform. `cursors` is indexed like `clip.channels`.
    pub fn evaluate_animated(
        &self,
        clip: &AnimationClip,
        binding: &ClipBinding,
        time: f32,
        cursors: &mut [ChannelCursors],
        globals: &mut [Mat4],
    ) {
        let sources = binding.sources();

        self.propagate(globals, |i| match sources.get(i) {
            Some(NodeSource::Animated(channel_index)) => {
                let Some(channel) = clip.channels.get(*channel_index) else {
                    return self.default_locals[i];
                };
                match cursors.get_mut(*channel_index) {
                    Some(cursor) => channel.sample_local(time, cursor),
                    None => compose_trs(&channel.sample_trs(time)),
                }
            }
            Some(NodeSource::Static(local)) => *local,
            None => self.default_locals[i],
        });
    }

    fn propagate(&self, globals: &mut [Mat4], mut local_of: impl FnMut(usize) -> Mat4) {
        let count = self.len().min(globals.len());
        for i in 0..count {
            let local = local_of(i);
            globals[i] = match self.parents[i] {
                Some(parent) => globals[parent] * local,
                None => local,
            };
        }
    }

    /// Looks up an evaluated global transform by node name.
    #[must_use]
    pub fn global_by_name(&self, globals: &[Mat4], name: &str) -> Option<Mat4> {
        self.index_of(name).and_then(|i| globals.get(i).copied())
    }

    /// Pairs every node name with its evaluated global transform.
    pub fn iter_globals<'a>(
        &'a self,
        globals: &'a [Mat4],
    ) -> impl Iterator<Item = (&'a str, Mat4)> + 'a {
        self.names
            .iter()
            .zip(globals.iter())
            .map(|(name, global)| (name.as_str(), *global))
    }
}
