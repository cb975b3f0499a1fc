//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::config::AppConfig;
use crate::core::coverflow::CoverflowTransformer;
use crate::core::gallery::GalleryEntry;
use crate::ui::strip::StripState;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Strip,
    SettingsMenu,
    ControlsSubmenu,
}

/// Smallest and largest zoom the zoom keys will reach.
pub const ZOOM_RANGE: (i32, i32) = (-400, 200);
/// Zoom key step.
pub const ZOOM_STEP: i32 = 20;
/// Rotation key step, in degrees.
pub const ROTATION_STEP: i32 = 5;
/// Rotation key ceiling, in degrees.
pub const ROTATION_MAX: i32 = 85;

/// Top-level application state.
pub struct AppState {
    /// Directory the images came from.
    pub root: PathBuf,
    /// Images in strip order.
    pub entries: Vec<GalleryEntry>,
    /// Decoded thumbnails (path → pixels).  Populated asynchronously.
    pub thumbs: HashMap<PathBuf, Arc<RgbaImage>>,
    /// Thumbnails already handed to a decoder.
    pub requested: HashSet<PathBuf>,
    /// Selection, scroll animation and the transformer.
    pub strip: StripState,
    /// User configuration.
    pub config: AppConfig,
    /// Where `config` is persisted; `None` keeps changes in memory only.
    pub config_file: Option<PathBuf>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// Currently highlighted row in the controls submenu.
    pub controls_selected: usize,
    /// When true, the next key press is captured as a new binding.
    pub awaiting_rebind: bool,
}

impl AppState {
    pub fn new(root: PathBuf, entries: Vec<GalleryEntry>, config: AppConfig) -> Self {
        let strip = StripState::new(
            CoverflowTransformer::new(config.coverflow),
            config.scroll_speed,
        );
        Self {
            root,
            entries,
            thumbs: HashMap::new(),
            requested: HashSet::new(),
            strip,
            config,
            config_file: None,
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
        }
    }

    /// Distance between neighbouring card origins, in columns.
    pub fn card_pitch(&self) -> u16 {
        self.config.card_width.saturating_add(self.config.card_spacing)
    }

    /// Move the selection, clamped to the strip.
    pub fn select(&mut self, index: usize) {
        let pitch = self.card_pitch();
        self.strip.select(index, self.entries.len(), pitch);
        self.status_message = None;
    }

    pub fn selected_entry(&self) -> Option<&GalleryEntry> {
        self.entries.get(self.strip.selected)
    }

    /// Paths of cards within `radius` of the selection that have not been
    /// handed to a decoder yet.  Marks them as requested.
    pub fn take_thumbnail_requests(&mut self, radius: usize) -> Vec<PathBuf> {
        let start = self.strip.selected.saturating_sub(radius);
        let end = self.strip.selected.saturating_add(radius + 1).min(self.entries.len());
        let mut paths = Vec::new();
        for entry in self.entries.get(start..end).unwrap_or_default() {
            if self.requested.insert(entry.path.clone()) {
                paths.push(entry.path.clone());
            }
        }
        paths
    }

    /// How many cards either side of the selection fit in `width` columns.
    pub fn visible_radius(&self, width: u16) -> usize {
        let pitch = self.card_pitch().max(1) as usize;
        (width as usize / 2) / pitch + 1
    }

    /// Change the rotation cap, keeping config and transformer in step.
    pub fn set_max_rotation_angle(&mut self, angle: i32) {
        let angle = angle.clamp(0, ROTATION_MAX);
        let coverflow = self.config.coverflow.with_max_rotation_angle(angle);
        self.config.coverflow = coverflow;
        self.strip.transformer.set_config(coverflow);
        self.persist_config();
        self.status_message = Some(format!("Max rotation: {angle}°"));
    }

    /// Change the zoom offset, keeping config and transformer in step.
    pub fn set_max_zoom(&mut self, zoom: i32) {
        let zoom = zoom.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
        let coverflow = self.config.coverflow.with_max_zoom(zoom);
        self.config.coverflow = coverflow;
        self.strip.transformer.set_config(coverflow);
        self.persist_config();
        self.status_message = Some(format!("Max zoom: {zoom}"));
    }

    /// Write the config if a file is attached.  Failures only surface in
    /// the status bar.
    pub fn persist_config(&mut self) {
        let Some(path) = self.config_file.as_deref() else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            tracing::warn!("{e}");
            self.status_message = Some(e.to_string());
        }
    }
}
