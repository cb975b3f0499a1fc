//! Core algorithms – coverflow geometry, the virtual camera, and image
//! discovery.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod camera;
pub mod coverflow;
pub mod gallery;
pub mod matrix;
pub mod transformation;

pub use camera::Camera;
pub use coverflow::{
    child_transform, rotation_angle, zoom_amount, ChildGeometry, CoverflowConfig,
    CoverflowTransformer, Viewport,
};
pub use matrix::Matrix3;
pub use transformation::{TransformKind, Transformation};
