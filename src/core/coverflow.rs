//! Coverflow geometry: how far each card turns and how close it sits.
//!
//! A card's horizontal offset from the viewport centre, measured in card
//! widths, maps linearly onto a rotation about the vertical axis, capped at
//! [`CoverflowConfig::max_rotation_angle`].  Cards short of the cap are also
//! pulled toward the eye, so the middle card is the largest.
//!
//! [`CoverflowTransformer`] is driven by a scrolling host through two hooks:
//! [`on_size_changed`](CoverflowTransformer::on_size_changed) whenever the
//! viewport is resized, and
//! [`child_static_transformation`](CoverflowTransformer::child_static_transformation)
//! once per visible child per draw.

use super::camera::Camera;
use super::transformation::{TransformKind, Transformation};

/// Depth every card is pushed back by before zoom is applied.
pub const BASE_DEPTH: f32 = 100.0;

/// Extra depth per degree of rotation for cards short of the cap.
pub const ZOOM_PER_DEGREE: f64 = 1.5;

pub const DEFAULT_MAX_ROTATION_ANGLE: i32 = 20;
pub const DEFAULT_MAX_ZOOM: i32 = -180;

// ───────────────────────────────────────── config ────────────

/// Tuning for the effect.  Rebuilt, never mutated, when a setting changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverflowConfig {
    max_rotation_angle: i32,
    max_zoom: i32,
}

impl CoverflowConfig {
    /// A negative rotation bound is taken as 0: cards stay flat and share
    /// one depth.
    pub fn new(max_rotation_angle: i32, max_zoom: i32) -> Self {
        Self {
            max_rotation_angle: max_rotation_angle.max(0),
            max_zoom,
        }
    }

    /// Largest rotation, in degrees, any card receives.
    pub fn max_rotation_angle(&self) -> i32 {
        self.max_rotation_angle
    }

    /// Depth offset applied to cards short of the rotation cap.  More
    /// negative values bring them closer.
    pub fn max_zoom(&self) -> i32 {
        self.max_zoom
    }

    pub fn with_max_rotation_angle(self, max_rotation_angle: i32) -> Self {
        Self::new(max_rotation_angle, self.max_zoom)
    }

    pub fn with_max_zoom(self, max_zoom: i32) -> Self {
        Self { max_zoom, ..self }
    }
}

impl Default for CoverflowConfig {
    fn default() -> Self {
        Self {
            max_rotation_angle: DEFAULT_MAX_ROTATION_ANGLE,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

// ───────────────────────────────────────── geometry ──────────

/// Viewport size and horizontal padding, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    pub padding_left: i32,
    pub padding_right: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            padding_left: 0,
            padding_right: 0,
        }
    }

    pub fn with_padding(self, padding_left: i32, padding_right: i32) -> Self {
        Self {
            padding_left,
            padding_right,
            ..self
        }
    }

    /// Midpoint of the padding-excluded content area (truncating division).
    pub fn center_x(&self) -> i32 {
        (self.width - self.padding_left - self.padding_right) / 2 + self.padding_left
    }
}

/// Where a child sits this frame.  Read once per call and not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildGeometry {
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl ChildGeometry {
    pub fn new(left: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            width,
            height,
        }
    }

    /// Horizontal centre (truncating division).  Widened so a child near
    /// the edge of the `i32` range cannot overflow.
    pub fn center_x(&self) -> i64 {
        self.left as i64 + (self.width / 2) as i64
    }
}

/// Rotation in degrees for a child, clamped to `±max_rotation_angle`.
///
/// Positive when the child is left of centre, negative when right of it.
/// The fractional angle is truncated toward zero, not rounded.
pub fn rotation_angle(child: &ChildGeometry, viewport_center_x: i32, config: &CoverflowConfig) -> i32 {
    let child_center = child.center_x();
    let viewport_center_x = viewport_center_x as i64;
    if child_center == viewport_center_x || child.width == 0 {
        return 0;
    }

    let max = config.max_rotation_angle;
    let offset = (viewport_center_x - child_center) as f32 / child.width as f32;
    // The cast saturates; the clamp keeps `i32::MIN` out too.
    let angle = (offset * max as f32) as i32;
    angle.clamp(-max, max)
}

/// Extra depth for a child turned by `angle`, or `None` at the rotation cap.
pub fn zoom_amount(angle: i32, config: &CoverflowConfig) -> Option<f32> {
    let rotation = angle.unsigned_abs();
    if rotation < config.max_rotation_angle.unsigned_abs() {
        Some((config.max_zoom as f64 + rotation as f64 * ZOOM_PER_DEGREE) as f32)
    } else {
        None
    }
}

// ───────────────────────────────────────── transformer ───────

/// Computes per-child coverflow transforms for a scrolling host.
#[derive(Debug, Clone, Default)]
pub struct CoverflowTransformer {
    config: CoverflowConfig,
    /// Set by the first resize.
    viewport_center_x: Option<i32>,
    camera: Camera,
}

impl CoverflowTransformer {
    pub fn new(config: CoverflowConfig) -> Self {
        Self {
            config,
            viewport_center_x: None,
            camera: Camera::new(),
        }
    }

    pub fn config(&self) -> CoverflowConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CoverflowConfig) {
        self.config = config;
    }

    pub fn max_rotation_angle(&self) -> i32 {
        self.config.max_rotation_angle()
    }

    pub fn set_max_rotation_angle(&mut self, max_rotation_angle: i32) {
        self.config = self.config.with_max_rotation_angle(max_rotation_angle);
    }

    pub fn max_zoom(&self) -> i32 {
        self.config.max_zoom()
    }

    pub fn set_max_zoom(&mut self, max_zoom: i32) {
        self.config = self.config.with_max_zoom(max_zoom);
    }

    /// Cached centre, `None` until the first resize.
    pub fn viewport_center_x(&self) -> Option<i32> {
        self.viewport_center_x
    }

    /// Resize hook.  Recomputes the cached viewport centre.
    pub fn on_size_changed(&mut self, viewport: Viewport) {
        let center = viewport.center_x();
        tracing::debug!(
            width = viewport.width,
            padding_left = viewport.padding_left,
            padding_right = viewport.padding_right,
            center,
            "coverflow viewport resized"
        );
        self.viewport_center_x = Some(center);
    }

    /// Per-child hook.  Fills `out` and always returns `true`.  Before the
    /// first resize there is no centre to measure against, so `out` is left
    /// cleared (identity matrix, full opacity).
    pub fn child_static_transformation(&mut self, child: &ChildGeometry, out: &mut Transformation) -> bool {
        let Some(center) = self.viewport_center_x else {
            tracing::debug!("child transform requested before first resize");
            out.clear();
            return true;
        };
        let config = self.config;
        self.compute_child_transform(child, center, &config, out)
    }

    /// Write the coverflow transform for `child` into `out`.  Always `true`.
    pub fn compute_child_transform(
        &mut self,
        child: &ChildGeometry,
        viewport_center_x: i32,
        config: &CoverflowConfig,
        out: &mut Transformation,
    ) -> bool {
        out.clear();
        out.set_kind(TransformKind::Matrix);

        let angle = rotation_angle(child, viewport_center_x, config);
        tracing::trace!(
            left = child.left,
            width = child.width,
            center = viewport_center_x,
            angle,
            "coverflow child"
        );

        self.camera.reset();
        self.camera.save();

        self.camera.translate(0.0, 0.0, BASE_DEPTH);
        if let Some(zoom) = zoom_amount(angle, config) {
            self.camera.translate(0.0, 0.0, zoom);
        }
        self.camera.rotate_y(angle as f32);

        let matrix = out.matrix_mut();
        *matrix = self.camera.matrix();
        let half_w = (child.width / 2) as f32;
        let half_h = (child.height / 2) as f32;
        matrix.pre_translate(-half_w, -half_h);
        matrix.post_translate(half_w, half_h);

        self.camera.restore();
        self.camera.reset();
        true
    }
}

/// Stateless form of the per-child transform.
pub fn child_transform(child: &ChildGeometry, viewport_center_x: i32, config: &CoverflowConfig) -> Transformation {
    let mut out = Transformation::new();
    CoverflowTransformer::new(*config).compute_child_transform(child, viewport_center_x, config, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn viewport_center_excludes_padding() {
        assert_eq!(Viewport::new(300, 200).center_x(), 150);
        assert_eq!(Viewport::new(300, 200).with_padding(20, 40).center_x(), 140);
        // Truncating division.
        assert_eq!(Viewport::new(301, 200).center_x(), 150);
    }

    #[test]
    fn child_center_truncates() {
        assert_eq!(ChildGeometry::new(10, 5, 5).center_x(), 12);
        assert_eq!(ChildGeometry::new(-10, 5, 5).center_x(), -8);
    }

    #[test]
    fn centred_child_has_no_rotation() {
        let config = CoverflowConfig::default();
        assert_eq!(rotation_angle(&ChildGeometry::new(100, 100, 80), 150, &config), 0);
    }

    #[test]
    fn angle_is_truncated_toward_zero() {
        let config = CoverflowConfig::default();
        // (150 - 157) / 100 * 20 = -1.4
        assert_eq!(rotation_angle(&ChildGeometry::new(107, 100, 80), 150, &config), -1);
        // (150 - 143) / 100 * 20 = 1.4
        assert_eq!(rotation_angle(&ChildGeometry::new(93, 100, 80), 150, &config), 1);
        // (150 - 146) / 100 * 20 = 0.8
        assert_eq!(rotation_angle(&ChildGeometry::new(96, 100, 80), 150, &config), 0);
    }

    #[test]
    fn angle_is_clamped_with_sign() {
        let config = CoverflowConfig::default();
        assert_eq!(rotation_angle(&ChildGeometry::new(-500, 100, 80), 150, &config), 20);
        assert_eq!(rotation_angle(&ChildGeometry::new(900, 100, 80), 150, &config), -20);
    }

    #[test]
    fn zero_width_child_is_treated_as_centred() {
        let config = CoverflowConfig::default();
        assert_eq!(rotation_angle(&ChildGeometry::new(0, 0, 80), 150, &config), 0);
    }

    #[test]
    fn zoom_only_below_cap() {
        let config = CoverflowConfig::default();
        assert_eq!(zoom_amount(0, &config), Some(-180.0));
        assert_eq!(zoom_amount(-5, &config), Some(-172.5));
        assert_eq!(zoom_amount(20, &config), None);
        assert_eq!(zoom_amount(-20, &config), None);
    }

    #[test]
    fn zero_rotation_bound_means_flat_fixed_zoom() {
        let config = CoverflowConfig::new(0, -180);
        assert_eq!(rotation_angle(&ChildGeometry::new(0, 100, 80), 150, &config), 0);
        assert_eq!(zoom_amount(0, &config), None);
    }

    #[test]
    fn negative_rotation_bound_clamps_to_zero() {
        assert_eq!(CoverflowConfig::new(-1, 0), CoverflowConfig::new(0, 0));
        assert_eq!(CoverflowConfig::default().with_max_rotation_angle(-30).max_rotation_angle(), 0);

        let mut transformer = CoverflowTransformer::default();
        transformer.set_max_rotation_angle(-5);
        assert_eq!(transformer.max_rotation_angle(), 0);
        let config = transformer.config();
        assert_eq!(rotation_angle(&ChildGeometry::new(0, 100, 80), 150, &config), 0);
        assert_eq!(zoom_amount(0, &config), None);
    }

    #[test]
    fn setters_rebuild_config() {
        let mut transformer = CoverflowTransformer::default();
        transformer.set_max_rotation_angle(45);
        transformer.set_max_zoom(-120);
        assert_eq!(transformer.config(), CoverflowConfig::new(45, -120));
    }

    #[test]
    fn hook_before_resize_supplies_identity() {
        let mut transformer = CoverflowTransformer::default();
        let mut t = Transformation::new();
        t.matrix_mut().scale_x = 9.0;
        t.set_kind(TransformKind::Matrix);
        assert!(transformer.child_static_transformation(&ChildGeometry::new(0, 100, 80), &mut t));
        assert_eq!(t, Transformation::new());
        assert!(t.effective_matrix().is_identity());
    }

    #[test]
    fn huge_bound_stays_within_range() {
        let config = CoverflowConfig::new(i32::MAX, -180);
        let right = rotation_angle(&ChildGeometry::new(350, 100, 80), 150, &config);
        let left = rotation_angle(&ChildGeometry::new(-50, 100, 80), 150, &config);
        assert_eq!(right, -i32::MAX);
        assert_eq!(left, i32::MAX);
        assert_eq!(zoom_amount(right, &config), None);
        assert_eq!(zoom_amount(i32::MIN, &CoverflowConfig::default()), None);
    }

    #[test]
    fn children_at_the_edge_of_the_range_do_not_overflow() {
        assert_eq!(ChildGeometry::new(i32::MAX - 10, 100, 80).center_x(), i32::MAX as i64 + 40);

        let config = CoverflowConfig::default();
        assert_eq!(rotation_angle(&ChildGeometry::new(i32::MAX - 10, 100, 80), i32::MIN, &config), -20);
        assert_eq!(rotation_angle(&ChildGeometry::new(i32::MIN, i32::MAX, 80), i32::MAX, &config), 20);

        let mut transformer = CoverflowTransformer::default();
        transformer.on_size_changed(Viewport::new(300, 100));
        let mut t = Transformation::new();
        assert!(transformer.child_static_transformation(&ChildGeometry::new(i32::MAX - 10, 100, 80), &mut t));
        assert!(t.matrix().has_perspective());
    }

    #[test]
    fn resize_caches_center() {
        let mut transformer = CoverflowTransformer::default();
        assert_eq!(transformer.viewport_center_x(), None);
        transformer.on_size_changed(Viewport::new(300, 100));
        assert_eq!(transformer.viewport_center_x(), Some(150));
        transformer.on_size_changed(Viewport::new(500, 100).with_padding(10, 10));
        assert_eq!(transformer.viewport_center_x(), Some(250));
    }

    #[test]
    fn centred_child_is_scaled_about_its_own_center() {
        let config = CoverflowConfig::default();
        let child = ChildGeometry::new(100, 100, 80);
        let t = child_transform(&child, 150, &config);
        assert_eq!(t.kind(), TransformKind::Matrix);

        let m = t.matrix();
        // depth = 100 - 180 = -80, scale = 576 / 496
        let scale = 576.0 / 496.0;
        assert!(close(m.scale_x, scale));
        assert!(close(m.scale_y, scale));
        let (x, y) = m.map_point(50.0, 40.0).unwrap();
        assert!(close(x, 50.0) && close(y, 40.0), "{x} {y}");
    }

    #[test]
    fn camera_is_left_clean_between_calls() {
        let mut transformer = CoverflowTransformer::default();
        transformer.on_size_changed(Viewport::new(300, 100));
        let mut first = Transformation::new();
        let mut second = Transformation::new();
        let child = ChildGeometry::new(125, 100, 80);
        transformer.child_static_transformation(&child, &mut first);
        transformer.child_static_transformation(&ChildGeometry::new(0, 100, 80), &mut Transformation::new());
        transformer.child_static_transformation(&child, &mut second);
        assert_eq!(first, second);
        assert_eq!(transformer.camera.depth(), 0);
    }
}
