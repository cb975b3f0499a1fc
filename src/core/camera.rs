//! Virtual camera that turns 3D moves of a flat card into a 2D projective
//! matrix.
//!
//! The camera keeps a stack of model matrices.  [`Camera::translate`] and
//! [`Camera::rotate_y`] pre-concatenate onto the top of the stack, so the most
//! recent call is the first one applied to the card.  [`Camera::matrix`]
//! projects the unit patch (x to the right, y up) through the model matrix
//! onto the view plane as seen from an eye eight inches in front of it.
//!
//! No scene exists: the camera only ever looks at one card through the origin.

use euclid::default::{Point3D, Transform3D, Vector3D};

use super::matrix::Matrix3;

/// Location units are inches; the projection works in pixels.
pub const PIXELS_PER_INCH: f32 = 72.0;

/// Default eye position, eight inches in front of the view plane.
pub const DEFAULT_LOCATION_Z: f32 = -8.0;

/// 3D viewpoint with save/restore.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Model matrices; the last entry is the live one and the stack is never
    /// empty.
    stack: Vec<Transform3D<f32>>,
    /// Eye position in pixels.
    location: Point3D<f32>,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            stack: vec![Transform3D::identity()],
            location: Point3D::new(0.0, 0.0, DEFAULT_LOCATION_Z * PIXELS_PER_INCH),
        }
    }

    // ── stack ───────────────────────────────────────────────────

    /// Push a copy of the current model matrix.
    pub fn save(&mut self) {
        let top = *self.current();
        self.stack.push(top);
    }

    /// Pop back to the state of the matching [`save`](Self::save).
    pub fn restore(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            tracing::warn!("camera restore without matching save; ignored");
        }
    }

    /// Drop every saved level and clear the model matrix.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
        self.stack[0] = Transform3D::identity();
    }

    /// Number of outstanding `save` calls.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    fn current(&self) -> &Transform3D<f32> {
        // `stack` always holds the base level.
        &self.stack[self.stack.len() - 1]
    }

    fn pre_concat(&mut self, op: Transform3D<f32>) {
        let top = self.stack.len() - 1;
        self.stack[top] = op.then(&self.stack[top]);
    }

    // ── model moves ─────────────────────────────────────────────

    /// Move the card.  Positive `z` pushes it away from the eye.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.pre_concat(Transform3D::translation(x, y, z));
    }

    /// Turn about the vertical axis by `deg` degrees.  Positive angles swing
    /// the right edge of the card away from the eye.
    pub fn rotate_y(&mut self, deg: f32) {
        let (s, c) = deg.to_radians().sin_cos();
        self.pre_concat(Transform3D::new(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ));
    }

    // ── projection ──────────────────────────────────────────────

    /// Project the current model matrix into a 2D drawing matrix.
    ///
    /// A card sitting exactly on the eye plane cannot be projected; the
    /// identity is returned for it.
    pub fn matrix(&self) -> Matrix3 {
        let model = self.current();

        let u = model.transform_vector3d(Vector3D::new(1.0, 0.0, 0.0));
        let v = model.transform_vector3d(Vector3D::new(0.0, -1.0, 0.0));
        // Model matrices are affine, so the origin lands on the translation row.
        let origin = Point3D::new(model.m41, model.m42, model.m43);
        let diff = origin - self.location;

        let depth = diff.z;
        if depth.abs() < f32::EPSILON {
            tracing::warn!("card on the camera plane; projecting as identity");
            return Matrix3::IDENTITY;
        }

        // Eye looks down +z with the zenith pointing to -y.
        let focal = -self.location.z;
        Matrix3 {
            scale_x: focal * u.x / depth,
            skew_x: focal * v.x / depth,
            trans_x: focal * diff.x / depth,
            skew_y: -focal * u.y / depth,
            scale_y: -focal * v.y / depth,
            trans_y: -focal * diff.y / depth,
            persp_0: u.z / depth,
            persp_1: v.z / depth,
            persp_2: 1.0,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn untouched_camera_projects_identity() {
        let camera = Camera::new();
        let m = camera.matrix();
        assert!(close(m.scale_x, 1.0));
        assert!(close(m.scale_y, 1.0));
        assert!(!m.has_perspective());
    }

    #[test]
    fn pushing_the_card_away_shrinks_it() {
        let mut camera = Camera::new();
        camera.translate(0.0, 0.0, 100.0);
        let m = camera.matrix();
        let expected = 576.0 / 676.0;
        assert!(close(m.scale_x, expected), "{}", m.scale_x);
        assert!(close(m.scale_y, expected), "{}", m.scale_y);
    }

    #[test]
    fn pulling_the_card_closer_enlarges_it() {
        let mut camera = Camera::new();
        camera.translate(0.0, 0.0, -80.0);
        let m = camera.matrix();
        assert!(m.scale_x > 1.0);
        assert!(close(m.scale_x, 576.0 / 496.0));
    }

    #[test]
    fn rotate_y_adds_horizontal_perspective_only() {
        let mut camera = Camera::new();
        camera.rotate_y(30.0);
        let m = camera.matrix();
        let (s, c) = 30f32.to_radians().sin_cos();
        assert!(close(m.scale_x, c));
        assert!(close(m.scale_y, 1.0));
        assert!(close(m.persp_0, s / 576.0));
        assert_eq!(m.persp_1, 0.0);
        assert_eq!(m.skew_x, 0.0);
    }

    #[test]
    fn opposite_angles_mirror_the_perspective() {
        let mut left = Camera::new();
        left.rotate_y(15.0);
        let mut right = Camera::new();
        right.rotate_y(-15.0);
        let (l, r) = (left.matrix(), right.matrix());
        assert!(close(l.scale_x, r.scale_x));
        assert!(close(l.persp_0, -r.persp_0));
    }

    #[test]
    fn restore_returns_to_saved_state() {
        let mut camera = Camera::new();
        camera.translate(0.0, 0.0, 50.0);
        let before = camera.matrix();

        camera.save();
        assert_eq!(camera.depth(), 1);
        camera.rotate_y(40.0);
        camera.translate(0.0, 0.0, -200.0);
        camera.restore();

        assert_eq!(camera.depth(), 0);
        assert_eq!(camera.matrix(), before);
    }

    #[test]
    fn unmatched_restore_is_ignored() {
        let mut camera = Camera::new();
        camera.translate(10.0, 0.0, 0.0);
        let before = camera.matrix();
        camera.restore();
        assert_eq!(camera.matrix(), before);
    }

    #[test]
    fn reset_clears_model_and_stack() {
        let mut camera = Camera::new();
        camera.save();
        camera.save();
        camera.rotate_y(10.0);
        camera.reset();
        assert_eq!(camera.depth(), 0);
        assert!(camera.matrix().is_identity());
    }

    #[test]
    fn turn_then_push_matches_hand_projection() {
        // Last call applies first: the card turns, then moves back.
        let mut camera = Camera::new();
        camera.translate(0.0, 0.0, 100.0);
        camera.rotate_y(20.0);
        let m = camera.matrix();
        let (s, c) = 20f32.to_radians().sin_cos();
        assert!(close(m.scale_x, 576.0 * c / 676.0));
        assert!(close(m.persp_0, s / 676.0));
        assert!(close(m.scale_y, 576.0 / 676.0));
    }

    #[test]
    fn card_on_eye_plane_projects_identity() {
        let mut camera = Camera::new();
        camera.translate(0.0, 0.0, -576.0);
        assert!(camera.matrix().is_identity());
    }
}
