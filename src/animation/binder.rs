use glam::Mat4;

use crate::animation::clip::AnimationClip;
use crate::scene::hierarchy::NodeHierarchy;

/// Where a node's local transform comes from while a clip plays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeSource {
    /// Not animated by the clip: the node's default local transform.
    Static(Mat4),
    /// Sampled from `clip.channels[index]`.
    Animated(usize),
}

/// Resolution of one clip's channels against a hierarchy.
///
/// Built once at load time so evaluation never looks nodes up by name.
#[derive(Debug, Clone)]
pub struct ClipBinding {
    sources: Vec<NodeSource>,
    unbound_channels: usize,
}

impl ClipBinding {
    /// Binds each channel to the node with the same name. When two channels
    /// target the same node the later one wins; channels naming no node are
    /// counted and skipped.
    #[must_use]
    pub fn bind(hierarchy: &NodeHierarchy, clip: &AnimationClip) -> Self {
        let mut sources: Vec<NodeSource> = (0..hierarchy.len())
            .map(|i| NodeSource::Static(hierarchy.default_local(i).unwrap_or(Mat4::IDENTITY)))
            .collect();

        let mut unbound_channels = 0;
        let mut first_unbound: Option<&str> = None;

        for (channel_index, channel) in clip.channels.iter().enumerate() {
            if let Some(node_index) = hierarchy.index_of(&channel.node_name) {
                sources[node_index] = NodeSource::Animated(channel_index);
            } else {
                unbound_channels += 1;
                first_unbound.get_or_insert(channel.node_name.as_str());
            }
        }

        if let Some(name) = first_unbound {
            log::warn!(
                "Clip '{}': {unbound_channels} channel(s) target nodes missing from the scene (first: '{name}')",
                clip.name
            );
        }

        Self {
            sources,
            unbound_channels,
        }
    }

    /// One entry per hierarchy node.
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[NodeSource] {
        &self.sources
    }

    #[inline]
    #[must_use]
    pub fn unbound_channels(&self) -> usize {
        self.unbound_channels
    }

    #[must_use]
    pub fn animated_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s, NodeSource::Animated(_)))
            .count()
    }
}
