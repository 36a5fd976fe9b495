//! glTF 2.0 / GLB character loader.
//!
//! Produces a [`CharacterAsset`] from a `.gltf` or `.glb` document:
//!
//! 1. Buffers: GLB binary chunk, external `.bin` files, or `data:` URIs
//! 2. Scene graph: a synthetic `gltf_root` whose children are the default
//!    scene's root nodes
//! 3. Bones: joints of every skin, deduplicated by name, with their inverse
//!    bind matrices
//! 4. Clips: one per animation, channels grouped per target node
//!
//! glTF key times are seconds, so clips are created with a tick rate of 0
//! ("ticks are seconds").

use std::fs;
use std::path::Path;

use base64::Engine;
use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::clip::{AnimationClip, NodeChannel};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::character_asset::CharacterAsset;
use crate::errors::{MarionetteError, Result};
use crate::scene::node::SceneNode;
use crate::scene::skeleton::Bone;

/// Name of the synthetic node parenting the scene's root nodes.
pub const GLTF_ROOT_NAME: &str = "gltf_root";

pub struct GltfLoader;

impl GltfLoader {
    /// Reads and imports a file. External buffers resolve relative to it.
    pub fn load(path: &Path) -> Result<CharacterAsset> {
        let bytes = fs::read(path)?;
        let base_path = path.parent().unwrap_or(Path::new("./"));
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("character");

        Self::import(&bytes, base_path, name)
    }

    /// Imports an in-memory `.gltf` (JSON) or `.glb` document.
    pub fn from_slice(bytes: &[u8], base_path: &Path) -> Result<CharacterAsset> {
        Self::import(bytes, base_path, "character")
    }

    fn import(bytes: &[u8], base_path: &Path, name: &str) -> Result<CharacterAsset> {
        let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;

        let buffers = Self::load_buffers(&gltf, base_path)?;
        Self::check_ranges(&gltf, &buffers)?;

        let root = Self::build_scene_graph(&gltf)?;
        let bones = Self::load_skins(&gltf, &buffers)?;
        let clips = Self::load_animations(&gltf, &buffers)?;

        log::info!(
            "Loaded glTF '{name}': {} nodes, {} bones, {} clips",
            root.subtree_len(),
            bones.len(),
            clips.len()
        );

        CharacterAsset::new(name, root, clips, bones)
    }

    // --- Buffers ---

    fn load_buffers(gltf: &gltf::Gltf, base_path: &Path) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf.blob.clone().ok_or_else(|| {
                    MarionetteError::MissingBufferData {
                        context: "missing GLB binary chunk".to_string(),
                        index: buffer.index(),
                    }
                })?,
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)?,
                gltf::buffer::Source::Uri(uri) => {
                    let buffer_path = base_path.join(uri);
                    fs::read(&buffer_path).map_err(|e| MarionetteError::MissingBufferData {
                        context: format!("{}: {e}", buffer_path.display()),
                        index: buffer.index(),
                    })?
                }
            };

            if data.len() < buffer.length() {
                return Err(MarionetteError::MissingBufferData {
                    context: format!(
                        "buffer declares {} bytes but only {} are available",
                        buffer.length(),
                        data.len()
                    ),
                    index: buffer.index(),
                });
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    /// Rejects views and accessors reaching past their data, so that
    /// readers never slice out of bounds.
    fn check_ranges(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<()> {
        for view in gltf.views() {
            let buffer_index = view.buffer().index();
            let available = buffers.get(buffer_index).map_or(0, Vec::len);
            if view.offset() + view.length() > available {
                return Err(MarionetteError::MalformedAccessor(format!(
                    "buffer view {} spans {}..{} of a {available}-byte buffer",
                    view.index(),
                    view.offset(),
                    view.offset() + view.length()
                )));
            }
        }

        for accessor in gltf.accessors() {
            let Some(view) = accessor.view() else {
                continue;
            };
            if accessor.count() == 0 {
                continue;
            }
            let stride = view.stride().unwrap_or(accessor.size());
            let end = accessor.offset() + stride * (accessor.count() - 1) + accessor.size();
            if end > view.length() {
                return Err(MarionetteError::MalformedAccessor(format!(
                    "accessor {} needs {end} bytes of a {}-byte view",
                    accessor.index(),
                    view.length()
                )));
            }
        }

        Ok(())
    }

    // --- Scene graph ---

    fn build_scene_graph(gltf: &gltf::Gltf) -> Result<SceneNode> {
        let scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .ok_or_else(|| MarionetteError::MissingScene("document defines no scenes".to_string()))?;

        let mut visited = vec![false; gltf.nodes().count()];
        let mut root = SceneNode::new(GLTF_ROOT_NAME, Mat4::IDENTITY);
        for node in scene.nodes() {
            root.children.push(Self::build_node(&node, &mut visited)?);
        }
        Ok(root)
    }

    fn build_node(node: &gltf::Node, visited: &mut [bool]) -> Result<SceneNode> {
        match visited.get_mut(node.index()) {
            Some(seen) if !*seen => *seen = true,
            _ => {
                return Err(MarionetteError::InvalidAsset(format!(
                    "node {} appears more than once in the hierarchy",
                    node.index()
                )));
            }
        }

        let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
        let mut scene_node = SceneNode::new(node_name(node), transform);
        for child in node.children() {
            scene_node.children.push(Self::build_node(&child, visited)?);
        }
        Ok(scene_node)
    }

    // --- Skins ---

    fn load_skins(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<Bone>> {
        let mut bones = Vec::new();
        let mut seen = FxHashMap::default();

        for skin in gltf.skins() {
            let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let ibms: Vec<Mat4> = reader
                .read_inverse_bind_matrices()
                .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
                .unwrap_or_default();

            for (i, joint) in skin.joints().enumerate() {
                let name = node_name(&joint);
                if seen.contains_key(&name) {
                    continue;
                }
                seen.insert(name.clone(), bones.len());
                let offset = ibms.get(i).copied().unwrap_or(Mat4::IDENTITY);
                bones.push(Bone::new(name, offset));
            }
        }

        Ok(bones)
    }

    // --- Animations ---

    fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<AnimationClip>> {
        let mut clips = Vec::new();

        for anim in gltf.animations() {
            let clip_name = anim.name().unwrap_or_default().to_string();
            let mut channels: Vec<NodeChannel> = Vec::new();
            let mut channel_by_node: FxHashMap<usize, usize> = FxHashMap::default();
            let mut max_time = 0.0_f32;

            for channel in anim.channels() {
                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let target = channel.target();
                let gltf_node = target.node();

                let times: Vec<f32> = reader
                    .read_inputs()
                    .ok_or_else(|| {
                        MarionetteError::MalformedAccessor(format!(
                            "animation '{clip_name}': unreadable sampler input"
                        ))
                    })?
                    .collect();
                if let Some(&last) = times.last() {
                    max_time = max_time.max(last);
                }

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let outputs = reader.read_outputs().ok_or_else(|| {
                    MarionetteError::MalformedAccessor(format!(
                        "animation '{clip_name}': unreadable sampler output"
                    ))
                })?;

                let slot = *channel_by_node.entry(gltf_node.index()).or_insert_with(|| {
                    channels.push(NodeChannel::new(node_name(&gltf_node)));
                    channels.len() - 1
                });
                let node_channel = &mut channels[slot];

                match outputs {
                    gltf::animation::util::ReadOutputs::Translations(iter) => {
                        let values = iter.map(Vec3::from_array).collect();
                        node_channel.positions = KeyframeTrack::new(times, values, interpolation);
                    }
                    gltf::animation::util::ReadOutputs::Rotations(iter) => {
                        let values = iter.into_f32().map(Quat::from_array).collect();
                        node_channel.rotations = KeyframeTrack::new(times, values, interpolation);
                    }
                    gltf::animation::util::ReadOutputs::Scales(iter) => {
                        let values = iter.map(Vec3::from_array).collect();
                        node_channel.scales = KeyframeTrack::new(times, values, interpolation);
                    }
                    gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {}
                }
            }

            // Morph-only targets leave empty channels behind
            channels.retain(|c| !(c.positions.is_empty() && c.rotations.is_empty() && c.scales.is_empty()));

            clips.push(AnimationClip::new(clip_name, 0.0, f64::from(max_time), channels));
        }

        Ok(clips)
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), ToString::to_string)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| MarionetteError::DataUriError(format!("not a base64 data URI: {:.40}", uri)))?;
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}
