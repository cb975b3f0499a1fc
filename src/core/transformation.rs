//! Per-child output of a transform pass.
//!
//! The host owns one [`Transformation`] per draw and hands it to the
//! transformer to fill in, so nothing is allocated per child.

use super::matrix::Matrix3;

/// Which channels of a [`Transformation`] the host should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformKind {
    Identity,
    Alpha,
    Matrix,
    #[default]
    Both,
}

impl TransformKind {
    pub fn applies_matrix(self) -> bool {
        matches!(self, TransformKind::Matrix | TransformKind::Both)
    }

    pub fn applies_alpha(self) -> bool {
        matches!(self, TransformKind::Alpha | TransformKind::Both)
    }
}

/// Matrix + opacity to apply to a child before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    matrix: Matrix3,
    alpha: f32,
    kind: TransformKind,
}

impl Transformation {
    pub fn new() -> Self {
        Self {
            matrix: Matrix3::IDENTITY,
            alpha: 1.0,
            kind: TransformKind::default(),
        }
    }

    /// Back to identity matrix, full opacity and the default kind.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut Matrix3 {
        &mut self.matrix
    }

    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: TransformKind) {
        self.kind = kind;
    }

    /// The matrix the host should draw with, honouring [`kind`](Self::kind).
    pub fn effective_matrix(&self) -> Matrix3 {
        if self.kind.applies_matrix() {
            self.matrix
        } else {
            Matrix3::IDENTITY
        }
    }

    /// The opacity the host should draw with, honouring [`kind`](Self::kind).
    pub fn effective_alpha(&self) -> f32 {
        if self.kind.applies_alpha() {
            self.alpha
        } else {
            1.0
        }
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_every_channel() {
        let mut t = Transformation::new();
        t.matrix_mut().scale_x = 3.0;
        t.set_kind(TransformKind::Alpha);
        t.clear();
        assert_eq!(t, Transformation::new());
    }

    #[test]
    fn fresh_and_cleared_share_the_default_kind() {
        assert_eq!(Transformation::new().kind(), TransformKind::default());
        assert_eq!(Transformation::default().kind(), TransformKind::Both);

        let mut t = Transformation::new();
        t.set_kind(TransformKind::Identity);
        t.clear();
        assert_eq!(t.kind(), TransformKind::default());
        assert!(t.effective_matrix().is_identity());
        assert_eq!(t.effective_alpha(), 1.0);
    }

    #[test]
    fn kind_gates_what_the_host_applies() {
        let mut t = Transformation::new();
        t.matrix_mut().scale_x = 2.0;

        t.set_kind(TransformKind::Matrix);
        assert_eq!(t.effective_matrix().scale_x, 2.0);
        assert_eq!(t.effective_alpha(), 1.0);

        t.set_kind(TransformKind::Alpha);
        assert!(t.effective_matrix().is_identity());

        t.set_kind(TransformKind::Identity);
        assert!(t.effective_matrix().is_identity());
    }
}
