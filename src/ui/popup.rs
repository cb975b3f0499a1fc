//! Popup overlay widgets for the settings menu and controls submenu.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::settings::{SettingsItem, SETTINGS_ITEMS};
use crate::app::state::AppState;
use crate::config::{Action, AppConfig};
use crate::ui::theme::Theme;

const POPUP_WIDTH: u16 = 44;
const CONTROLS_WIDTH: u16 = 52;

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(Theme::popup_title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::counter_style())
}

/// Label column on the left, value column right-aligned to `width`.
fn two_column_row(
    selected: bool,
    label: &str,
    value: String,
    value_style: Style,
    width: usize,
) -> Line<'static> {
    let prefix = if selected { " ▸ " } else { "   " };
    let (base, value_style) = if selected {
        let hl = Theme::selected_style();
        (hl, value_style.bg(Color::DarkGray))
    } else {
        (Style::default().fg(Color::White), value_style)
    };
    let label_col = format!("{prefix}{label:<18}");
    let value_width = width.saturating_sub(label_col.chars().count()).max(1);
    Line::from(vec![
        Span::styled(label_col, base),
        Span::styled(format!("{value:>value_width$} "), value_style),
    ])
}

// ───────────────────────────────────────── settings popup ────

/// Settings menu popup overlay.
pub struct SettingsPopup<'a> {
    pub state: &'a AppState,
    pub selected: usize,
}

impl Widget for SettingsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = SETTINGS_ITEMS.len() as u16 + 6;
        let popup = centered_fixed(POPUP_WIDTH, height, area);
        Clear.render(popup, buf);

        let block = popup_block(" Settings ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let width = inner.width.saturating_sub(1) as usize;
        let mut lines = vec![Line::raw("")];
        for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
            let value = match item {
                SettingsItem::Submenu { .. } => "›".to_string(),
                SettingsItem::Cycle { value, .. } => value(self.state),
            };
            lines.push(two_column_row(
                i == self.selected,
                item.label(),
                value,
                Theme::value_style(),
                width,
            ));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter/Space: change  Esc: close",
            Theme::counter_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── controls popup ────

/// Interactive keybinding popup overlay.
pub struct ControlsPopup<'a> {
    pub config: &'a AppConfig,
    pub selected: usize,
    pub awaiting_rebind: bool,
}

impl Widget for ControlsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // actions + reset row + two blanks + hint + borders
        let height = Action::ALL.len() as u16 + 7;
        let popup = centered_fixed(CONTROLS_WIDTH, height, area);
        Clear.render(popup, buf);

        let block = popup_block(" Controls ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let width = inner.width.saturating_sub(1) as usize;
        let keys_style = Style::default().fg(Color::Yellow);
        let mut lines = vec![Line::raw("")];

        for (i, &action) in Action::ALL.iter().enumerate() {
            let selected = i == self.selected;
            let keys = if selected && self.awaiting_rebind {
                "Press a key…".to_string()
            } else {
                self.config.display_bindings(action)
            };
            lines.push(two_column_row(selected, action.label(), keys, keys_style, width));
        }

        let reset_selected = self.selected == Action::ALL.len();
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("{}⟳ Reset to defaults", if reset_selected { " ▸ " } else { "   " }),
            if reset_selected {
                Theme::selected_style()
            } else {
                Style::default().fg(Color::White)
            },
        )));

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter: add key  Del: clear  Esc: back",
            Theme::counter_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn find_row(buf: &Buffer, needle: &str) -> Option<String> {
        (0..buf.area.height).map(|y| row_text(buf, y)).find(|r| r.contains(needle))
    }

    #[test]
    fn centered_rect_is_clamped() {
        let r = centered_fixed(50, 10, Rect::new(0, 0, 30, 20));
        assert_eq!(r, Rect::new(0, 5, 30, 10));
    }

    #[test]
    fn settings_show_current_values() {
        let state = AppState::new(PathBuf::from("."), Vec::new(), AppConfig::default());
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        SettingsPopup { state: &state, selected: 1 }.render(area, &mut buf);

        let rotation = find_row(&buf, "Max Rotation").unwrap();
        assert!(rotation.contains("20°"), "{rotation}");
        assert!(rotation.contains('▸'));
        let zoom = find_row(&buf, "Max Zoom").unwrap();
        assert!(zoom.contains("-180"), "{zoom}");
    }

    #[test]
    fn controls_prompt_while_rebinding() {
        let config = AppConfig::default();
        let area = Rect::new(0, 0, 60, 24);
        let mut buf = Buffer::empty(area);
        ControlsPopup { config: &config, selected: 0, awaiting_rebind: true }
            .render(area, &mut buf);

        let row = find_row(&buf, Action::PrevCard.label()).unwrap();
        assert!(row.contains("Press a key"), "{row}");
        assert!(find_row(&buf, "Reset to defaults").is_some());
    }
}
