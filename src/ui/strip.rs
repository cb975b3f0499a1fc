//! The coverflow strip is a horizontally scrolling row of image cards.
//!
//! This widget is the scrolling host for [`CoverflowTransformer`]: it owns
//! card layout, scroll position and drawing, and asks the transformer for a
//! matrix per visible card.
//!
//! Drawing happens in "pixels": each terminal column is one pixel wide and
//! each row holds two pixels stacked with `▀` / `▄` half-blocks.  Cards are
//! rasterised by inverse-mapping every destination pixel through the card's
//! matrix, and painted from the outermost inward so the middle card ends up
//! on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Block, Paragraph, StatefulWidget, Widget},
};

use crate::core::coverflow::{ChildGeometry, CoverflowTransformer, Viewport};
use crate::core::gallery::GalleryEntry;
use crate::core::matrix::Matrix3;
use crate::core::transformation::Transformation;
use crate::ui::smooth_scroll::SmoothScroll;
use crate::ui::theme::Theme;

/// Cards take this share of the strip height, leaving room for zoom.
const CARD_HEIGHT_RATIO: f32 = 0.8;
const PLACEHOLDER_RGB: [u8; 3] = [48, 52, 64];
const PLACEHOLDER_EDGE_RGB: [u8; 3] = [96, 104, 128];
const LETTERBOX_RGB: [u8; 3] = [16, 16, 20];

type Rgb = [u8; 3];

// ─── state ──────────────────────────────────────────────────────

/// Scroll position, animation and the transformer the strip drives.
#[derive(Debug, Clone)]
pub struct StripState {
    pub selected: usize,
    pub scroll: SmoothScroll,
    pub transformer: CoverflowTransformer,
    /// Viewport last reported to the transformer.
    viewport: Option<Viewport>,
}

impl StripState {
    pub fn new(transformer: CoverflowTransformer, scroll_speed: f64) -> Self {
        Self {
            selected: 0,
            scroll: SmoothScroll::new(scroll_speed),
            transformer,
            viewport: None,
        }
    }

    /// Select `index` (clamped to `count`) and start the glide toward it.
    pub fn select(&mut self, index: usize, count: usize, pitch: u16) {
        if count == 0 {
            self.selected = 0;
            return;
        }
        self.selected = index.min(count - 1);
        self.scroll.set_target(self.selected, pitch as f64);
    }

    /// Call the transformer's resize hook when the viewport changed.
    fn sync_viewport(&mut self, viewport: Viewport) {
        if self.viewport != Some(viewport) {
            self.transformer.on_size_changed(viewport);
            self.viewport = Some(viewport);
        }
    }
}

// ─── layout ─────────────────────────────────────────────────────

/// A card placed in the viewport this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedCard {
    pub index: usize,
    pub geometry: ChildGeometry,
    pub top: i32,
}

/// Horizontal layout inputs, all in pixels.
#[derive(Debug, Clone, Copy)]
pub struct StripLayout {
    pub viewport_width: i32,
    pub center_x: i32,
    pub card_width: i32,
    pub card_height: i32,
    pub card_top: i32,
    pub pitch: i32,
    pub scroll_offset: i32,
}

impl StripLayout {
    /// Visible cards in paint order: farthest from the centre first.
    pub fn place(&self, count: usize, selected: usize) -> Vec<PlacedCard> {
        let base_left = self.center_x - self.card_width / 2 + self.scroll_offset;
        let mut cards: Vec<PlacedCard> = (0..count)
            .filter_map(|index| {
                let steps = index as i64 - selected as i64;
                let left = base_left as i64 + steps * self.pitch as i64;
                if left + self.card_width as i64 <= 0 || left >= self.viewport_width as i64 {
                    return None;
                }
                Some(PlacedCard {
                    index,
                    geometry: ChildGeometry::new(left as i32, self.card_width, self.card_height),
                    top: self.card_top,
                })
            })
            .collect();

        cards.sort_by_key(|c| std::cmp::Reverse((c.geometry.center_x() - self.center_x as i64).abs()));
        cards
    }
}

// ─── pixel canvas ───────────────────────────────────────────────

/// Off-screen RGB pixels, two per terminal cell vertically.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<Option<Rgb>>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            None
        }
    }

    fn set(&mut self, x: usize, y: usize, rgb: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = Some(rgb);
        }
    }

    /// Paint a `card_w × card_h` card through `matrix` (card space to canvas
    /// space).  `source` returns the card colour at a card-space pixel.
    pub fn draw_card<F>(&mut self, matrix: &Matrix3, card_w: i32, card_h: i32, alpha: f32, source: F)
    where
        F: Fn(i32, i32) -> Rgb,
    {
        if card_w <= 0 || card_h <= 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let Some(inverse) = matrix.invert() else {
            return;
        };

        let (x0, y0, x1, y1) = self.bounds_of(matrix, card_w as f32, card_h as f32);
        for y in y0..y1 {
            for x in x0..x1 {
                let Some((u, v)) = inverse.map_point(x as f32 + 0.5, y as f32 + 0.5) else {
                    continue;
                };
                if u < 0.0 || v < 0.0 || u >= card_w as f32 || v >= card_h as f32 {
                    continue;
                }
                let rgb = source(u as i32, v as i32);
                self.set(x, y, fade(rgb, alpha));
            }
        }
    }

    /// Pixel box covering the mapped card, clamped to the canvas.
    fn bounds_of(&self, matrix: &Matrix3, w: f32, h: f32) -> (usize, usize, usize, usize) {
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];
        let mut min = (f32::MAX, f32::MAX);
        let mut max = (f32::MIN, f32::MIN);
        for (cx, cy) in corners {
            let Some((x, y)) = matrix.map_point(cx, cy) else {
                // A corner behind the eye: scan everything.
                return (0, 0, self.width, self.height);
            };
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        let clamp_x = |v: f32| v.clamp(0.0, self.width as f32) as usize;
        let clamp_y = |v: f32| v.clamp(0.0, self.height as f32) as usize;
        (
            clamp_x(min.0.floor()),
            clamp_y(min.1.floor()),
            clamp_x(max.0.ceil()),
            clamp_y(max.1.ceil()),
        )
    }

    /// Blit as half-blocks into `area` (one cell = 1×2 pixels).
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let to_color = |rgb: Rgb| Color::Rgb(rgb[0], rgb[1], rgb[2]);
        for row in 0..area.height {
            let yt = row as usize * 2;
            for col in 0..area.width {
                let x = col as usize;
                let (glyph, fg, bg) = match (self.get(x, yt), self.get(x, yt + 1)) {
                    (Some(t), Some(b)) => ('▀', to_color(t), to_color(b)),
                    (Some(t), None) => ('▀', to_color(t), Color::Reset),
                    (None, Some(b)) => ('▄', to_color(b), Color::Reset),
                    (None, None) => continue,
                };
                if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                    cell.set_char(glyph).set_fg(fg).set_bg(bg);
                }
            }
        }
    }
}

fn fade(rgb: Rgb, alpha: f32) -> Rgb {
    if alpha >= 1.0 {
        return rgb;
    }
    rgb.map(|c| (c as f32 * alpha.max(0.0)).round() as u8)
}

/// Colour of card pixel `(u, v)`: the thumbnail fitted and centred inside
/// the card, or a framed placeholder while it is still decoding.
fn card_pixel(thumb: Option<&RgbaImage>, card_w: i32, card_h: i32, u: i32, v: i32) -> Rgb {
    let Some(thumb) = thumb.filter(|t| t.width() > 0 && t.height() > 0) else {
        let edge = u == 0 || v == 0 || u == card_w - 1 || v == card_h - 1;
        return if edge { PLACEHOLDER_EDGE_RGB } else { PLACEHOLDER_RGB };
    };

    let (tw, th) = (thumb.width() as f32, thumb.height() as f32);
    let scale = (card_w as f32 / tw).min(card_h as f32 / th);
    let off_x = (card_w as f32 - tw * scale) / 2.0;
    let off_y = (card_h as f32 - th * scale) / 2.0;
    let sx = (u as f32 + 0.5 - off_x) / scale;
    let sy = (v as f32 + 0.5 - off_y) / scale;
    if sx < 0.0 || sy < 0.0 || sx >= tw || sy >= th {
        return LETTERBOX_RGB;
    }
    let p = thumb.get_pixel(sx as u32, sy as u32);
    if p[3] < 128 {
        LETTERBOX_RGB
    } else {
        [p[0], p[1], p[2]]
    }
}

// ─── widget ─────────────────────────────────────────────────────

/// Ratatui widget drawing the strip.
pub struct CoverflowStrip<'a> {
    entries: &'a [GalleryEntry],
    thumbs: &'a HashMap<PathBuf, Arc<RgbaImage>>,
    card_width: u16,
    card_spacing: u16,
    block: Option<Block<'a>>,
}

impl<'a> CoverflowStrip<'a> {
    pub fn new(entries: &'a [GalleryEntry], thumbs: &'a HashMap<PathBuf, Arc<RgbaImage>>) -> Self {
        Self {
            entries,
            thumbs,
            card_width: crate::config::DEFAULT_CARD_WIDTH,
            card_spacing: crate::config::DEFAULT_CARD_SPACING,
            block: None,
        }
    }

    pub fn card_width(mut self, card_width: u16) -> Self {
        self.card_width = card_width;
        self
    }

    pub fn card_spacing(mut self, card_spacing: u16) -> Self {
        self.card_spacing = card_spacing;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_caption(&self, selected: usize, area: Rect, buf: &mut Buffer) {
        let Some(entry) = self.entries.get(selected) else {
            return;
        };
        let caption = Line::from(vec![
            Span::styled(entry.name.clone(), Theme::caption_style()),
            Span::styled(
                format!("  {}/{}", selected + 1, self.entries.len()),
                Theme::counter_style(),
            ),
        ])
        .centered();
        Paragraph::new(caption).render(area, buf);
    }
}

impl StatefulWidget for CoverflowStrip<'_> {
    type State = StripState;

    fn render(mut self, area: Rect, buf: &mut Buffer, state: &mut StripState) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if self.entries.is_empty() {
            Paragraph::new(Line::from(Span::styled("No images found", Theme::dim_style())).centered())
                .render(Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1), buf);
            return;
        }
        if inner.width < 4 || inner.height < 3 {
            return;
        }

        let caption_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        let cards_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);

        let viewport_w = cards_area.width as i32;
        let viewport_h = cards_area.height as i32 * 2;
        state.sync_viewport(Viewport::new(viewport_w, viewport_h));
        let Some(center_x) = state.transformer.viewport_center_x() else {
            return;
        };

        let card_w = (self.card_width as i32).min(viewport_w).max(1);
        let card_h = ((viewport_h as f32 * CARD_HEIGHT_RATIO) as i32).max(1);
        let layout = StripLayout {
            viewport_width: viewport_w,
            center_x,
            card_width: card_w,
            card_height: card_h,
            card_top: (viewport_h - card_h) / 2,
            pitch: card_w + self.card_spacing as i32,
            scroll_offset: state.scroll.offset(),
        };

        let mut canvas = PixelCanvas::new(viewport_w as usize, viewport_h as usize);
        let mut transformation = Transformation::new();
        for card in layout.place(self.entries.len(), state.selected) {
            if !state
                .transformer
                .child_static_transformation(&card.geometry, &mut transformation)
            {
                continue;
            }
            let mut matrix = transformation.effective_matrix();
            matrix.post_translate(card.geometry.left as f32, card.top as f32);

            let thumb = self.thumbs.get(&self.entries[card.index].path).map(Arc::as_ref);
            let (w, h) = (card.geometry.width, card.geometry.height);
            canvas.draw_card(&matrix, w, h, transformation.effective_alpha(), |u, v| {
                card_pixel(thumb, w, h, u, v)
            });
        }

        canvas.render(cards_area, buf);
        self.render_caption(state.selected, caption_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coverflow::CoverflowConfig;

    fn layout() -> StripLayout {
        StripLayout {
            viewport_width: 100,
            center_x: 50,
            card_width: 20,
            card_height: 30,
            card_top: 5,
            pitch: 24,
            scroll_offset: 0,
        }
    }

    #[test]
    fn selected_card_is_centred_and_painted_last() {
        let cards = layout().place(10, 4);
        let last = cards.last().unwrap();
        assert_eq!(last.index, 4);
        assert_eq!(last.geometry.center_x(), 50);
        // Lefts run -8, 16, 40, 64, 88; the rest fall outside 0..100.
        let mut indices: Vec<_> = cards.iter().map(|c| c.index).collect();
        indices.sort();
        assert_eq!(indices, [2, 3, 4, 5, 6]);
    }

    #[test]
    fn offscreen_cards_are_dropped() {
        let cards = layout().place(10, 0);
        let mut indices: Vec<_> = cards.iter().map(|c| c.index).collect();
        indices.sort();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn scroll_offset_shifts_every_card() {
        let mut l = layout();
        l.scroll_offset = 24;
        let cards = l.place(10, 4);
        let selected = cards.iter().find(|c| c.index == 4).unwrap();
        assert_eq!(selected.geometry.left, 40 + 24);
    }

    #[test]
    fn identity_card_fills_its_rect() {
        let mut canvas = PixelCanvas::new(10, 10);
        let matrix = Matrix3::translate(2.0, 3.0);
        canvas.draw_card(&matrix, 4, 2, 1.0, |_, _| [1, 2, 3]);
        assert_eq!(canvas.get(2, 3), Some([1, 2, 3]));
        assert_eq!(canvas.get(5, 4), Some([1, 2, 3]));
        assert_eq!(canvas.get(6, 4), None);
        assert_eq!(canvas.get(1, 3), None);
        assert_eq!(canvas.get(2, 5), None);
    }

    #[test]
    fn rotated_card_is_narrower_than_flat_one() {
        let config = CoverflowConfig::default();
        let mut transformer = CoverflowTransformer::new(config);
        transformer.on_size_changed(Viewport::new(200, 100));
        let mut t = Transformation::new();

        let count_lit = |t: &Transformation| {
            let mut canvas = PixelCanvas::new(200, 100);
            let mut m = *t.matrix();
            m.post_translate(50.0, 20.0);
            canvas.draw_card(&m, 60, 60, 1.0, |_, _| [9, 9, 9]);
            (0..200).filter(|&x| canvas.get(x, 50).is_some()).count()
        };

        transformer.child_static_transformation(&ChildGeometry::new(70, 60, 60), &mut t);
        let flat = count_lit(&t);
        transformer.child_static_transformation(&ChildGeometry::new(-200, 60, 60), &mut t);
        let turned = count_lit(&t);
        assert!(turned < flat, "turned {turned} flat {flat}");
    }

    #[test]
    fn placeholder_has_a_frame() {
        assert_eq!(card_pixel(None, 10, 10, 0, 5), PLACEHOLDER_EDGE_RGB);
        assert_eq!(card_pixel(None, 10, 10, 5, 5), PLACEHOLDER_RGB);
    }

    #[test]
    fn thumbnail_is_letterboxed() {
        let thumb = RgbaImage::from_pixel(10, 5, image::Rgba([200, 100, 50, 255]));
        // 10×10 card: the 10×5 image occupies rows 2..7.
        assert_eq!(card_pixel(Some(&thumb), 10, 10, 5, 5), [200, 100, 50]);
        assert_eq!(card_pixel(Some(&thumb), 10, 10, 5, 0), LETTERBOX_RGB);
    }

    #[test]
    fn render_uses_half_blocks() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.set(0, 0, [255, 0, 0]);
        canvas.set(1, 1, [0, 255, 0]);
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        canvas.render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "▀");
        assert_eq!(buf[(1, 0)].symbol(), "▄");
    }

    #[test]
    fn widget_reports_resize_once_per_size() {
        let entries = vec![GalleryEntry::from_path(std::path::Path::new("a.png"))];
        let thumbs = HashMap::new();
        let mut state = StripState::new(CoverflowTransformer::default(), 0.35);
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);

        CoverflowStrip::new(&entries, &thumbs).render(area, &mut buf, &mut state);
        assert_eq!(state.transformer.viewport_center_x(), Some(30));
        assert_eq!(state.viewport, Some(Viewport::new(60, 22)));

        let wider = Rect::new(0, 0, 80, 12);
        let mut buf = Buffer::empty(wider);
        CoverflowStrip::new(&entries, &thumbs).render(wider, &mut buf, &mut state);
        assert_eq!(state.transformer.viewport_center_x(), Some(40));
    }
}
