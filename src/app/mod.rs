//! Application orchestration: state, event loop and input handling.

pub mod event;
pub mod handler;
pub mod image_runtime;
pub mod settings;
pub mod state;
