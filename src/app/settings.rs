//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and UI renderers consume the same source of truth without cross-importing.

use super::state::{ActiveView, AppState};

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Opens a submenu.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. } | Self::Cycle { label, .. } => label,
        }
    }
}

/// The value after `current` in `steps`, wrapping.  Values not in
/// the list restart from the first step.
fn next_step<T: PartialEq + Copy>(steps: &[T], current: T) -> T {
    match steps.iter().position(|s| *s == current) {
        Some(i) => steps[(i + 1) % steps.len()],
        None => steps[0],
    }
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Cycle {
        label: "Max Rotation",
        value: |s| format!("{}°", s.config.coverflow.max_rotation_angle()),
        cycle: |s| {
            const ANGLES: &[i32] = &[0, 10, 20, 30, 45, 60];
            let next = next_step(ANGLES, s.config.coverflow.max_rotation_angle());
            s.set_max_rotation_angle(next);
        },
    },
    SettingsItem::Cycle {
        label: "Max Zoom",
        value: |s| s.config.coverflow.max_zoom().to_string(),
        cycle: |s| {
            const ZOOMS: &[i32] = &[-240, -180, -120, -60, 0];
            let next = next_step(ZOOMS, s.config.coverflow.max_zoom());
            s.set_max_zoom(next);
        },
    },
    SettingsItem::Cycle {
        label: "Card Width",
        value: |s| format!("{} cols", s.config.card_width),
        cycle: |s| {
            const WIDTHS: &[u16] = &[24, 32, 40, 56, 72];
            s.config.card_width = next_step(WIDTHS, s.config.card_width);
            s.persist_config();
            s.status_message = Some(format!("Card width: {}", s.config.card_width));
        },
    },
    SettingsItem::Cycle {
        label: "Card Spacing",
        value: |s| format!("{} cols", s.config.card_spacing),
        cycle: |s| {
            const GAPS: &[u16] = &[0, 2, 4, 8, 12];
            s.config.card_spacing = next_step(GAPS, s.config.card_spacing);
            s.persist_config();
            s.status_message = Some(format!("Card spacing: {}", s.config.card_spacing));
        },
    },
    SettingsItem::Cycle {
        label: "Scroll Speed",
        value: |s| format!("{:.2}", s.config.scroll_speed),
        cycle: |s| {
            const SPEEDS: &[f64] = &[0.2, 0.35, 0.5, 0.75];
            s.config.scroll_speed = next_step(SPEEDS, s.config.scroll_speed);
            s.strip.scroll.set_speed(s.config.scroll_speed);
            s.persist_config();
            s.status_message = Some(format!("Scroll speed: {:.2}", s.config.scroll_speed));
        },
    },
];
