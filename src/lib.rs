//! Coverflow for the terminal.
//!
//! The [`core`] layer holds the pure geometry: a virtual camera, the
//! projective matrices it produces, and the [`core::CoverflowTransformer`]
//! that turns a child's horizontal offset from the viewport centre into a
//! rotation and zoom.  The [`app`] and [`ui`] layers wrap it in a Ratatui
//! image browser.

pub mod app;
pub mod config;
pub mod core;
pub mod ui;
