//! 3x3 projective matrix for 2D drawing with a perspective row.
//!
//! Layout follows the usual canvas convention (row-major, column vectors):
//!
//! ```text
//! | scale_x  skew_x   trans_x |   | x |
//! | skew_y   scale_y  trans_y | * | y |
//! | persp_0  persp_1  persp_2 |   | 1 |
//! ```
//!
//! Mapping a point divides by the third row, which is what lets a flat card
//! look tilted away from the viewer.

use std::fmt;


/// Below this magnitude a determinant is treated as zero.
const DEGENERATE_DET: f64 = 1e-12;

/// Projective 2D transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub scale_x: f32,
    pub skew_x: f32,
    pub trans_x: f32,
    pub skew_y: f32,
    pub scale_y: f32,
    pub trans_y: f32,
    pub persp_0: f32,
    pub persp_1: f32,
    pub persp_2: f32,
}

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3 {
        scale_x: 1.0,
        skew_x: 0.0,
        trans_x: 0.0,
        skew_y: 0.0,
        scale_y: 1.0,
        trans_y: 0.0,
        persp_0: 0.0,
        persp_1: 0.0,
        persp_2: 1.0,
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Pure translation by `(dx, dy)`.
    pub fn translate(dx: f32, dy: f32) -> Self {
        Self {
            trans_x: dx,
            trans_y: dy,
            ..Self::IDENTITY
        }
    }

    /// Build from nine values in row-major order.
    pub fn from_array(m: [f32; 9]) -> Self {
        Self {
            scale_x: m[0],
            skew_x: m[1],
            trans_x: m[2],
            skew_y: m[3],
            scale_y: m[4],
            trans_y: m[5],
            persp_0: m[6],
            persp_1: m[7],
            persp_2: m[8],
        }
    }

    /// The nine values in row-major order.
    pub fn to_array(&self) -> [f32; 9] {
        [
            self.scale_x,
            self.skew_x,
            self.trans_x,
            self.skew_y,
            self.scale_y,
            self.trans_y,
            self.persp_0,
            self.persp_1,
            self.persp_2,
        ]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when the third row is anything other than `[0, 0, 1]`.
    pub fn has_perspective(&self) -> bool {
        self.persp_0 != 0.0 || self.persp_1 != 0.0 || self.persp_2 != 1.0
    }

    /// `self * other`; `other` is applied to points first.
    pub fn concat(&self, other: &Matrix3) -> Matrix3 {
        let a = self.to_array();
        let b = other.to_array();
        let mut out = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        Matrix3::from_array(out)
    }

    /// Translate points before this matrix sees them.
    pub fn pre_translate(&mut self, dx: f32, dy: f32) {
        *self = self.concat(&Matrix3::translate(dx, dy));
    }

    /// Translate points after this matrix has mapped them.
    pub fn post_translate(&mut self, dx: f32, dy: f32) {
        *self = Matrix3::translate(dx, dy).concat(self);
    }

    /// Map a point, dividing through by the homogeneous coordinate.
    ///
    /// Returns `None` when the point lands on or behind the projection
    /// plane (`w <= 0`).
    pub fn map_point(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        let w = self.persp_0 * x + self.persp_1 * y + self.persp_2;
        if w <= f32::EPSILON {
            return None;
        }
        let px = self.scale_x * x + self.skew_x * y + self.trans_x;
        let py = self.skew_y * x + self.scale_y * y + self.trans_y;
        Some((px / w, py / w))
    }

    /// Inverse matrix, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix3> {
        let m = self.to_array().map(f64::from);
        let (a, b, c) = (m[0], m[1], m[2]);
        let (d, e, f) = (m[3], m[4], m[5]);
        let (g, h, i) = (m[6], m[7], m[8]);

        let co_a = e * i - f * h;
        let co_b = f * g - d * i;
        let co_c = d * h - e * g;
        let det = a * co_a + b * co_b + c * co_c;
        if det.abs() < DEGENERATE_DET {
            return None;
        }
        let inv = 1.0 / det;

        let adj = [
            co_a,
            c * h - b * i,
            b * f - c * e,
            co_b,
            a * i - c * g,
            c * d - a * f,
            co_c,
            b * g - a * h,
            a * e - b * d,
        ];
        Some(Matrix3::from_array(adj.map(|v| (v * inv) as f32)))
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Matrix3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.4} {:.4} {:.4}][{:.4} {:.4} {:.4}][{:.6} {:.6} {:.4}]",
            self.scale_x,
            self.skew_x,
            self.trans_x,
            self.skew_y,
            self.scale_y,
            self.trans_y,
            self.persp_0,
            self.persp_1,
            self.persp_2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn identity_maps_points_unchanged() {
        let m = Matrix3::identity();
        assert!(m.is_identity());
        assert!(!m.has_perspective());
        assert_eq!(m.map_point(12.0, -3.5), Some((12.0, -3.5)));
    }

    #[test]
    fn pre_translate_applies_before_post_translate_after() {
        let mut m = Matrix3::identity();
        m.scale_x = 2.0;
        m.scale_y = 2.0;
        m.pre_translate(-5.0, -5.0);
        m.post_translate(5.0, 5.0);
        // Scaling about (5, 5) leaves that point fixed.
        assert_eq!(m.map_point(5.0, 5.0), Some((5.0, 5.0)));
        assert_eq!(m.map_point(10.0, 5.0), Some((15.0, 5.0)));
    }

    #[test]
    fn perspective_row_divides() {
        let mut m = Matrix3::identity();
        m.persp_0 = 0.01;
        assert!(m.has_perspective());
        let (x, y) = m.map_point(100.0, 50.0).unwrap();
        assert!(close(x, 50.0));
        assert!(close(y, 25.0));
    }

    #[test]
    fn points_behind_the_plane_are_rejected() {
        let mut m = Matrix3::identity();
        m.persp_0 = -0.01;
        assert_eq!(m.map_point(100.0, 0.0), None);
        assert_eq!(m.map_point(200.0, 0.0), None);
    }

    #[test]
    fn invert_undoes_a_projective_map() {
        let mut m = Matrix3::identity();
        m.scale_x = 0.9;
        m.scale_y = 1.1;
        m.persp_0 = 0.0005;
        m.pre_translate(-40.0, -30.0);
        m.post_translate(40.0, 30.0);

        let inv = m.invert().expect("invertible");
        let (x, y) = m.map_point(17.0, 9.0).unwrap();
        let (bx, by) = inv.map_point(x, y).unwrap();
        assert!(close(bx, 17.0), "{bx}");
        assert!(close(by, 9.0), "{by}");
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let mut m = Matrix3::identity();
        m.scale_x = 0.0;
        assert!(m.invert().is_none());
    }
}
