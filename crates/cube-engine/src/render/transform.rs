//! Model, view and projection matrices.
//!
//! Only the model matrix changes after setup. It accumulates rotation frame
//! over frame, so errors compound rather than being recomputed from an angle.

use glam::{Mat4, Vec3};

/// Component-wise tolerance under which eye and target count as coincident.
const LOOK_AT_EPSILON: f32 = 1e-6;

/// Camera placement for the view matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for CameraConfig {
    /// Eye on the target at the origin. Produces an identity view matrix.
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl CameraConfig {
    pub fn with_eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    pub fn is_degenerate(&self) -> bool {
        is_degenerate_look_at(self.eye, self.target, self.up)
    }
}

/// Orthographic box, passed to [`build_projection_matrix`] as-is.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    /// `[-2, 2]` on X and Y, `near = 2`, `far = -2`.
    fn default() -> Self {
        Self {
            left: -2.0,
            right: 2.0,
            bottom: -2.0,
            top: 2.0,
            near: 2.0,
            far: -2.0,
        }
    }
}

/// Identity model matrix.
pub fn build_model_matrix() -> Mat4 {
    Mat4::IDENTITY
}

/// Right-handed look-at view matrix.
///
/// Returns identity when `eye` and `target` coincide, as gl-matrix's
/// `lookAt` does. Also returns identity when `up` is parallel to the view
/// direction; gl-matrix does not special-case that and yields zeroed basis
/// rows instead.
pub fn build_view_matrix(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    if is_degenerate_look_at(eye, target, up) {
        return Mat4::IDENTITY;
    }
    Mat4::look_at_rh(eye, target, up)
}

pub fn is_degenerate_look_at(eye: Vec3, target: Vec3, up: Vec3) -> bool {
    let dir = target - eye;
    if dir.abs().max_element() < LOOK_AT_EPSILON {
        return true;
    }
    dir.cross(up).length_squared() < LOOK_AT_EPSILON * LOOK_AT_EPSILON
}

/// Orthographic projection into the `z ∈ [0, 1]` clip volume.
///
/// `near` and `far` are taken verbatim; `near > far` is accepted and flips
/// the depth direction.
pub fn build_projection_matrix(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    Mat4::orthographic_rh(left, right, bottom, top, near, far)
}

/// `model = model * Rx(angle) * Ry(angle) * Rz(angle)`.
pub fn rotate(model: &mut Mat4, angle: f32) {
    *model = *model * rotation_step(angle);
}

/// The matrix one [`rotate`] call multiplies in.
pub fn rotation_step(angle: f32) -> Mat4 {
    Mat4::from_rotation_x(angle) * Mat4::from_rotation_y(angle) * Mat4::from_rotation_z(angle)
}

/// The three transform matrices of the renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Transform {
    pub fn new(camera: &CameraConfig, projection: &ProjectionConfig) -> Self {
        if camera.is_degenerate() {
            log::warn!(
                "degenerate camera (eye {:?}, target {:?}, up {:?}); view matrix is identity",
                camera.eye,
                camera.target,
                camera.up
            );
        }
        let p = projection;
        Self {
            model: build_model_matrix(),
            view: build_view_matrix(camera.eye, camera.target, camera.up),
            projection: build_projection_matrix(p.left, p.right, p.bottom, p.top, p.near, p.far),
        }
    }

    pub fn rotate(&mut self, angle: f32) {
        rotate(&mut self.model, angle);
    }

    /// `projection * view * model`, as the vertex stage composes it.
    pub fn clip_from_object(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(&CameraConfig::default(), &ProjectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    // ── rotate ────────────────────────────────────────────────────────────

    #[test]
    fn zero_angle_leaves_model_unchanged() {
        let mut m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let before = m;
        rotate(&mut m, 0.0);
        assert!(approx(m, before));
    }

    #[test]
    fn rotations_compound() {
        let theta = 0.025;
        let mut m = build_model_matrix();
        for _ in 0..10 {
            rotate(&mut m, theta);
        }
        let (rx, ry, rz) = (
            Mat4::from_rotation_x(theta),
            Mat4::from_rotation_y(theta),
            Mat4::from_rotation_z(theta),
        );
        let mut expected = Mat4::IDENTITY;
        for _ in 0..10 {
            expected = expected * rx * ry * rz;
        }
        assert!(approx(m, expected));

        // Accumulated, not recomputed: ten steps differ from one 10x step.
        let mut once = build_model_matrix();
        rotate(&mut once, theta * 10.0);
        assert!(!approx(m, once));
    }

    #[test]
    fn rotation_order_is_x_then_y_then_z() {
        let a = 0.3;
        let mut m = Mat4::IDENTITY;
        rotate(&mut m, a);
        let expected =
            Mat4::from_rotation_x(a) * Mat4::from_rotation_y(a) * Mat4::from_rotation_z(a);
        assert!(approx(m, expected));

        let other = Mat4::from_rotation_z(a) * Mat4::from_rotation_y(a) * Mat4::from_rotation_x(a);
        assert!(!approx(m, other));
    }

    #[test]
    fn four_quarter_turns_return_to_identity() {
        let mut m = build_model_matrix();
        for _ in 0..4 {
            rotate(&mut m, FRAC_PI_2);
        }
        assert!(approx(m, Mat4::IDENTITY));
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[test]
    fn coincident_eye_and_target_yield_identity() {
        let v = build_view_matrix(Vec3::ZERO, Vec3::ZERO, Vec3::Y);
        assert_eq!(v, Mat4::IDENTITY);
        assert!(CameraConfig::default().is_degenerate());
    }

    #[test]
    fn up_parallel_to_view_direction_is_degenerate() {
        assert!(is_degenerate_look_at(Vec3::ZERO, Vec3::Y, Vec3::Y));
        assert_eq!(build_view_matrix(Vec3::ZERO, Vec3::Y, Vec3::Y), Mat4::IDENTITY);
    }

    #[test]
    fn regular_camera_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let v = build_view_matrix(eye, Vec3::ZERO, Vec3::Y);
        let p = v * eye.extend(1.0);
        assert!(p.truncate().abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(!CameraConfig::default().with_eye(eye).is_degenerate());
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn ortho_maps_box_corners_to_clip_corners() {
        let p = ProjectionConfig::default();
        let m = build_projection_matrix(p.left, p.right, p.bottom, p.top, p.near, p.far);

        let lo = m * Vec4::new(-2.0, -2.0, 0.0, 1.0);
        let hi = m * Vec4::new(2.0, 2.0, 0.0, 1.0);
        assert!(lo.truncate().truncate().abs_diff_eq(glam::Vec2::new(-1.0, -1.0), 1e-6));
        assert!(hi.truncate().truncate().abs_diff_eq(glam::Vec2::new(1.0, 1.0), 1e-6));
    }

    #[test]
    fn shipped_depth_range_keeps_the_unit_cube_inside_clip_volume() {
        let m = Transform::default().projection;
        for z in [-1.0_f32, 0.0, 1.0] {
            let clip = m * Vec4::new(0.0, 0.0, z, 1.0);
            assert!((0.0..=1.0).contains(&clip.z), "z = {z} maps to {}", clip.z);
        }
        // near = 2, far = -2: -z ends up closer under a `Less` depth test.
        let pos = m * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let neg = m * Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert!(neg.z < pos.z);
    }

    // ── Transform ─────────────────────────────────────────────────────────

    #[test]
    fn default_transform_starts_from_identity_model_and_view() {
        let t = Transform::default();
        assert_eq!(t.model, Mat4::IDENTITY);
        assert_eq!(t.view, Mat4::IDENTITY);
        assert!(approx(t.clip_from_object(), t.projection));
    }

    #[test]
    fn transform_rotate_only_touches_model() {
        let mut t = Transform::default();
        let (view, projection) = (t.view, t.projection);
        t.rotate(0.5);
        assert_ne!(t.model, Mat4::IDENTITY);
        assert_eq!(t.view, view);
        assert_eq!(t.projection, projection);
    }
}
