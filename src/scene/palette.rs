//! Bone palette: the per-frame skinning matrices handed to the renderer.
//!
//! # Composition
//!
//! For bone `i` driven by node `n`:
//!
//! ```text
//! palette[i] = root_inverse * global[n] * offset[i]
//! ```
//!
//! `offset` takes a vertex from mesh space into the bone's bind space,
//! `global` takes it back out using this frame's pose, and `root_inverse`
//! cancels the scene root's own transform so palettes are root-relative.
//! In bind pose, when offsets are the inverse bind globals, every slot is
//! identity.

use glam::Mat4;

use crate::scene::skeleton::Skeleton;
use crate::utils::trs::blend_trs;

/// Receives the palette each frame, e.g. by writing a uniform buffer.
pub trait BonePaletteSink {
    /// `matrices` are tightly packed, [`BonePalette::STRIDE`] bytes apart.
    fn upload_bones(&mut self, matrices: &[Mat4]);
}

/// Fixed-capacity array of bone matrices.
///
/// Slots past [`bone_count`](Self::bone_count) always hold identity.
#[derive(Debug, Clone)]
pub struct BonePalette {
    matrices: Vec<Mat4>,
    bone_count: usize,
}

impl BonePalette {
    /// Size of one palette entry in bytes (a column-major `mat4x4<f32>`).
    pub const STRIDE: usize = std::mem::size_of::<Mat4>();

    /// An all-identity palette. A capacity of zero is raised to one so
    /// there is always something to upload.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; capacity.max(1)],
            bone_count: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.matrices.len()
    }

    /// Number of populated slots (`<= capacity`).
    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Every slot, populated or not.
    #[inline]
    #[must_use]
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Populated slots only.
    #[inline]
    #[must_use]
    pub fn active(&self) -> &[Mat4] {
        &self.matrices[..self.bone_count]
    }

    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Mat4> {
        self.matrices.get(slot)
    }

    /// Raw bytes of the full palette, ready for a buffer write.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }

    /// How many of `skeleton`'s bones fit.
    #[inline]
    #[must_use]
    pub fn fitted_count(&self, skeleton: &Skeleton) -> usize {
        skeleton.len().min(self.capacity())
    }

    /// Recomputes every slot from a pose.
    ///
    /// - `bone_nodes[i]`: hierarchy index of bone `i` (from
    ///   [`Skeleton::resolve_nodes`]). Unresolved bones use an identity
    ///   global transform.
    /// - `globals`: evaluated global transforms, indexed by node.
    /// - Bones past capacity are dropped.
    pub fn build(
        &mut self,
        skeleton: &Skeleton,
        bone_nodes: &[Option<usize>],
        globals: &[Mat4],
        root_inverse: &Mat4,
    ) {
        let count = self.fitted_count(skeleton);

        for (slot, bone) in skeleton.bones().iter().take(count).enumerate() {
            let global = bone_nodes
                .get(slot)
                .copied()
                .flatten()
                .and_then(|node| globals.get(node))
                .copied()
                .unwrap_or(Mat4::IDENTITY);

            self.matrices[slot] = *root_inverse * global * bone.offset;
        }

        self.matrices[count..].fill(Mat4::IDENTITY);
        self.bone_count = count;
    }

    /// Per-slot TRS blend: `t = 0` gives `from`, `t = 1` gives `to`.
    pub fn blend(&mut self, from: &BonePalette, to: &BonePalette, t: f32) {
        let count = from
            .bone_count
            .max(to.bone_count)
            .min(self.capacity())
            .min(from.capacity())
            .min(to.capacity());

        for slot in 0..count {
            self.matrices[slot] = blend_trs(&from.matrices[slot], &to.matrices[slot], t);
        }

        self.matrices[count..].fill(Mat4::IDENTITY);
        self.bone_count = count;
    }

    /// Hands the populated slots (at least one) to `sink`.
    pub fn upload(&self, sink: &mut dyn BonePaletteSink) {
        let count = self.bone_count.max(1).min(self.capacity());
        sink.upload_bones(&self.matrices[..count]);
    }
}
