use crate::animation::clip::AnimationClip;
use crate::animation::tracks::KeyframeTrack;
use crate::animation::values::Interpolatable;
use crate::errors::{MarionetteError, Result};
use crate::scene::node::SceneNode;
use crate::scene::skeleton::Bone;

/// Everything the importer extracts for one skinned character.
///
/// - `root`: the scene graph with per-node default transforms
/// - `clips`: keyframe animations, channels addressed by node name
/// - `bones`: bones collected from every mesh, in palette order
///
/// Constructed through [`CharacterAsset::new`], which rejects content the
/// runtime cannot evaluate safely.
#[derive(Debug, Clone)]
pub struct CharacterAsset {
    pub name: String,
    pub root: SceneNode,
    pub clips: Vec<AnimationClip>,
    pub bones: Vec<Bone>,
}

impl CharacterAsset {
    pub fn new(
        name: impl Into<String>,
        root: SceneNode,
        clips: Vec<AnimationClip>,
        bones: Vec<Bone>,
    ) -> Result<Self> {
        let asset = Self {
            name: name.into(),
            root,
            clips,
            bones,
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Checks transforms are finite and key times are finite and
    /// non-decreasing.
    pub fn validate(&self) -> Result<()> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if !node.transform.is_finite() {
                return Err(MarionetteError::InvalidAsset(format!(
                    "node '{}' has a non-finite transform",
                    node.name
                )));
            }
            stack.extend(node.children.iter());
        }

        for bone in &self.bones {
            if !bone.offset.is_finite() {
                return Err(MarionetteError::InvalidAsset(format!(
                    "bone '{}' has a non-finite offset matrix",
                    bone.name
                )));
            }
        }

        for clip in &self.clips {
            if clip.ticks_per_second.is_nan() || clip.ticks_per_second < 0.0 {
                return Err(MarionetteError::InvalidAsset(format!(
                    "clip '{}' has invalid ticks per second {}",
                    clip.name, clip.ticks_per_second
                )));
            }
            for channel in &clip.channels {
                let context = |track: &str| format!("clip '{}', node '{}', {track}", clip.name, channel.node_name);
                check_track(&channel.positions, || context("position keys"))?;
                check_track(&channel.rotations, || context("rotation keys"))?;
                check_track(&channel.scales, || context("scale keys"))?;
            }
        }

        Ok(())
    }
}

fn check_track<T: Interpolatable>(
    track: &KeyframeTrack<T>,
    context: impl Fn() -> String,
) -> Result<()> {
    if let Some(t) = track.times.iter().find(|t| !t.is_finite()) {
        return Err(MarionetteError::InvalidAsset(format!(
            "{}: non-finite key time {t}",
            context()
        )));
    }
    if track.times.windows(2).any(|w| w[1] < w[0]) {
        return Err(MarionetteError::InvalidAsset(format!(
            "{}: key times are not in order",
            context()
        )));
    }
    Ok(())
}
