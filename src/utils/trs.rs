//! Translation / rotation / scale helpers used when blending two poses.
//!
//! Palette matrices are general affine transforms. Blending them component
//! by component gives shears and collapses, so each matrix is decomposed
//! into TRS, the parts are interpolated separately and the result is
//! recomposed with [`compose_trs`].

use glam::{Mat3, Mat4, Quat, Vec3};

/// Column lengths below this are treated as collapsed axes.
pub const DEGENERATE_SCALE_EPSILON: f32 = 1e-8;

/// A decomposed affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Trs {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };
}

impl Default for Trs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Splits `m` into translation, rotation and (signed) scale.
///
/// Never produces NaN:
/// - If any basis column is shorter than [`DEGENERATE_SCALE_EPSILON`], the
///   scale is clamped to that epsilon per axis and the rotation is identity.
/// - A mirrored basis (negative determinant) has its Z axis and Z scale
///   negated so the extracted rotation stays proper.
#[must_use]
pub fn decompose_trs(m: &Mat4) -> Trs {
    let translation = m.w_axis.truncate();

    let c0 = m.x_axis.truncate();
    let c1 = m.y_axis.truncate();
    let c2 = m.z_axis.truncate();

    let sx = c0.length();
    let sy = c1.length();
    let sz = c2.length();

    let eps = DEGENERATE_SCALE_EPSILON;
    let collapsed = |s: f32| s.is_nan() || s < eps;
    if collapsed(sx) || collapsed(sy) || collapsed(sz) {
        let clamp = |s: f32| if s.is_finite() { s.max(eps) } else { eps };
        return Trs {
            translation: if translation.is_finite() { translation } else { Vec3::ZERO },
            rotation: Quat::IDENTITY,
            scale: Vec3::new(clamp(sx), clamp(sy), clamp(sz)),
        };
    }

    let r0 = c0 / sx;
    let r1 = c1 / sy;
    let mut r2 = c2 / sz;
    let mut scale = Vec3::new(sx, sy, sz);

    if r0.dot(r1.cross(r2)) < 0.0 {
        r2 = -r2;
        scale.z = -scale.z;
    }

    let mut rotation = Quat::from_mat3(&Mat3::from_cols(r0, r1, r2)).normalize();
    if rotation.is_nan() {
        rotation = Quat::IDENTITY;
    }

    Trs {
        translation,
        rotation,
        scale,
    }
}

/// Builds `T * R * S`: scale first, then rotate, then translate.
#[inline]
#[must_use]
pub fn compose_trs(trs: &Trs) -> Mat4 {
    Mat4::from_scale_rotation_translation(trs.scale, trs.rotation, trs.translation)
}

/// Normalises `q`, substituting identity for a zero-length quaternion.
#[inline]
#[must_use]
pub fn normalize_or_identity(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq > 0.0 && len_sq.is_finite() {
        q * len_sq.sqrt().recip()
    } else {
        Quat::IDENTITY
    }
}

/// Spherical interpolation along the shorter arc.
///
/// `b` is negated when the two quaternions lie in opposite hemispheres, so
/// the rotation never takes the long way around.
#[must_use]
pub fn slerp_shortest(a: Quat, b: Quat, t: f32) -> Quat {
    let a = normalize_or_identity(a);
    let mut b = normalize_or_identity(b);

    if a.dot(b) < 0.0 {
        b = -b;
    }

    a.slerp(b, t)
}

/// Interpolates two decomposed transforms: linear for translation and
/// scale, shortest-path spherical for rotation.
#[must_use]
pub fn lerp_trs(a: &Trs, b: &Trs, t: f32) -> Trs {
    Trs {
        translation: a.translation.lerp(b.translation, t),
        rotation: slerp_shortest(a.rotation, b.rotation, t),
        scale: a.scale.lerp(b.scale, t),
    }
}

/// Blends two affine matrices through their TRS decompositions.
///
/// The endpoints return the inputs untouched, so sheared matrices (which
/// TRS cannot represent) survive a blend at 0 or 1.
#[must_use]
pub fn blend_trs(a: &Mat4, b: &Mat4, t: f32) -> Mat4 {
    if t.is_nan() || t <= 0.0 {
        return *a;
    }
    if t >= 1.0 {
        return *b;
    }
    compose_trs(&lerp_trs(&decompose_trs(a), &decompose_trs(b), t))
}
