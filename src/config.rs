//! User configuration: coverflow tuning, strip layout, keybindings and
//! persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/coverflow/config.toml` (default
//! `~/.config/coverflow/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

use crate::core::coverflow::{CoverflowConfig, DEFAULT_MAX_ROTATION_ANGLE, DEFAULT_MAX_ZOOM};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the strip view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    PrevCard,
    NextCard,
    FirstCard,
    LastCard,
    RotateMore,
    RotateLess,
    ZoomIn,
    ZoomOut,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help line and config file).
    pub const ALL: &[Action] = &[
        Action::PrevCard,
        Action::NextCard,
        Action::FirstCard,
        Action::LastCard,
        Action::RotateMore,
        Action::RotateLess,
        Action::ZoomIn,
        Action::ZoomOut,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::PrevCard => "Previous",
            Action::NextCard => "Next",
            Action::FirstCard => "First",
            Action::LastCard => "Last",
            Action::RotateMore => "More Rotation",
            Action::RotateLess => "Less Rotation",
            Action::ZoomIn => "Zoom In",
            Action::ZoomOut => "Zoom Out",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::PrevCard => "prev_card",
            Action::NextCard => "next_card",
            Action::FirstCard => "first_card",
            Action::LastCard => "last_card",
            Action::RotateMore => "rotate_more",
            Action::RotateLess => "rotate_less",
            Action::ZoomIn => "zoom_in",
            Action::ZoomOut => "zoom_out",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code plus modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Binding for a pressed key, keeping only the modifiers we compare.
    pub fn from_key_event(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers & Self::modifier_mask(event.code),
        }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = Self::modifier_mask(event.code);
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Character keys already carry SHIFT in their case (`G`, `?`, `+`).
    fn modifier_mask(code: KeyCode) -> KeyModifiers {
        match code {
            KeyCode::Char(_) => KeyModifiers::CONTROL | KeyModifiers::ALT,
            _ => KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT,
        }
    }

    /// User-friendly display string (e.g. `"Alt+←"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = self.modifier_prefix();
        s.push_str(&match self.code {
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            _ => self.code_name(),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Alt+Left"`, `"q"`).
    fn to_config_string(&self) -> String {
        let mut s = self.modifier_prefix();
        s.push_str(&self.code_name());
        s
    }

    fn modifier_prefix(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s
    }

    fn code_name(&self) -> String {
        match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Delete => "Delete".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        }
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Left"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        // `+` is both a key and the modifier separator.
        let (mod_part, key_part) = if s == "+" {
            ("", "+")
        } else if let Some(prefix) = s.strip_suffix("++") {
            (prefix, "+")
        } else {
            s.rsplit_once('+').unwrap_or(("", s))
        };
        if key_part.is_empty() {
            return None;
        }

        for part in mod_part.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            // Single characters keep their case.
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

pub const DEFAULT_CARD_WIDTH: u16 = 40;
pub const DEFAULT_CARD_SPACING: u16 = 4;
pub const DEFAULT_SCROLL_SPEED: f64 = 0.35;

/// Application configuration as loaded from disk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Rotation cap and zoom offset handed to the transformer.
    pub coverflow: CoverflowConfig,
    /// Card width in terminal columns.
    pub card_width: u16,
    /// Gap between neighbouring cards in terminal columns.
    pub card_spacing: u16,
    /// Smooth-scroll damping per tick.
    pub scroll_speed: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            coverflow: CoverflowConfig::default(),
            card_width: DEFAULT_CARD_WIDTH,
            card_spacing: DEFAULT_CARD_SPACING,
            scroll_speed: DEFAULT_SCROLL_SPEED,
        }
    }
}

impl AppConfig {
    /// Hard-coded default bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(PrevCard, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(NextCard, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(FirstCard, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(LastCard, vec![KeyBind::new(End, n), KeyBind::new(Char('G'), n)]);
        m.insert(RotateMore, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(RotateLess, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(ZoomIn, vec![KeyBind::new(Char('+'), n), KeyBind::new(Char('='), n)]);
        m.insert(ZoomOut, vec![KeyBind::new(Char('-'), n)]);
        m.insert(OpenSettings, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Bind `bind` to `action`, removing it from any other action first.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for binds in self.bindings.values_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    /// Restore all bindings to the built-in defaults.
    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"← / h"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: browse | {}/{}: rotation | {}/{}: zoom | {}: settings",
            self.short_binding(Action::PrevCard),
            self.short_binding(Action::NextCard),
            self.short_binding(Action::RotateMore),
            self.short_binding(Action::RotateLess),
            self.short_binding(Action::ZoomIn),
            self.short_binding(Action::ZoomOut),
            self.short_binding(Action::OpenSettings),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from `path`, falling back to defaults for anything missing
    /// or unreadable.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
                Self::default()
            }
        }
    }

    /// Persist to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, self.serialise()).map_err(write_err)?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();
        let mut max_rotation = DEFAULT_MAX_ROTATION_ANGLE;
        let mut max_zoom = DEFAULT_MAX_ZOOM;

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "max_rotation_angle" => {
                    if let Ok(v) = value.parse::<i32>() {
                        max_rotation = v.clamp(0, 89);
                    }
                    continue;
                }
                "max_zoom" => {
                    if let Ok(v) = value.parse::<i32>() {
                        max_zoom = v.clamp(-500, 500);
                    }
                    continue;
                }
                "card_width" => {
                    if let Ok(v) = value.parse::<u16>() {
                        config.card_width = v.clamp(8, 200);
                    }
                    continue;
                }
                "card_spacing" => {
                    if let Ok(v) = value.parse::<u16>() {
                        config.card_spacing = v.min(50);
                    }
                    continue;
                }
                "scroll_speed" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.scroll_speed = v.clamp(0.05, 0.95);
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };

            let mut parsed = Vec::new();
            for part in value.split(',') {
                let part = part.trim().trim_matches('"');
                if let Some(bind) = KeyBind::parse(part) {
                    parsed.push(bind);
                }
            }
            // An empty value keeps the action deliberately unbound.
            if !parsed.is_empty() || value.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config.coverflow = CoverflowConfig::new(max_rotation, max_zoom);
        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# coverflow configuration".to_string(),
            String::new(),
            "# Effect".to_string(),
            format!("max_rotation_angle = {}", self.coverflow.max_rotation_angle()),
            format!("max_zoom = {}", self.coverflow.max_zoom()),
            String::new(),
            "# Layout".to_string(),
            format!("card_width = {}", self.card_width),
            format!("card_spacing = {}", self.card_spacing),
            format!("scroll_speed = {}", self.scroll_speed),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Backspace, Delete, Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/coverflow/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("coverflow").join("config.toml")
}
