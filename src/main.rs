//! A coverflow image browser for the terminal.
//!
//! Run the binary inside a directory of images to browse them as a strip of
//! cards that turn away in 3D as they leave the middle.
//! Run with `--dump <WIDTH>` to print the per-card transforms and exit.

use std::io::{self, stderr, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use coverflow::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    image_runtime::{spawn_thumbnail_decode, ImageUpdate},
    state::{ActiveView, AppState},
};
use coverflow::config::{self, AppConfig};
use coverflow::core::{
    gallery, rotation_angle, ChildGeometry, CoverflowConfig, CoverflowTransformer, Transformation,
    Viewport,
};
use coverflow::ui::{layout::AppLayout, popup, strip::CoverflowStrip, theme::Theme};

/// Longest edge of a decoded thumbnail, in source pixels.
const THUMBNAIL_EDGE: u32 = 256;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Coverflow image browser")]
struct Cli {
    /// Directory of images to open (defaults to `.`).
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Largest rotation in degrees for off-centre cards.
    #[arg(long = "max-rotation", allow_negative_numbers = true)]
    max_rotation: Option<i32>,

    /// Depth offset for cards near the centre (negative brings them closer).
    #[arg(long = "max-zoom", allow_negative_numbers = true)]
    max_zoom: Option<i32>,

    /// Card width in terminal columns.
    #[arg(long = "card-width")]
    card_width: Option<u16>,

    /// Include images in subdirectories.
    #[arg(long)]
    recursive: bool,

    /// Print every card's transform for a strip of this many columns and exit.
    #[arg(long, value_name = "VIEWPORT_WIDTH")]
    dump: Option<u16>,
}

impl Cli {
    /// Fold the command-line overrides into the loaded config.
    fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(angle) = self.max_rotation {
            config.coverflow = config.coverflow.with_max_rotation_angle(angle);
        }
        if let Some(zoom) = self.max_zoom {
            config.coverflow = config.coverflow.with_max_zoom(zoom);
        }
        if let Some(width) = self.card_width {
            config.card_width = width.max(1);
        }
        Ok(())
    }
}

// ───────────────────────────────────────── dump mode ─────────

/// One line per card of a synthetic strip centred on the middle card.
fn dump_strip(out: &mut impl Write, viewport_width: u16, config: &AppConfig) -> io::Result<()> {
    let coverflow: CoverflowConfig = config.coverflow;
    let width = viewport_width as i32;
    let card_w = (config.card_width as i32).clamp(1, width.max(1));
    let card_h = card_w;
    let pitch = card_w + config.card_spacing as i32;

    let mut transformer = CoverflowTransformer::new(coverflow);
    transformer.on_size_changed(Viewport::new(width, card_h));
    let center = transformer.viewport_center_x().unwrap_or(width / 2);

    writeln!(
        out,
        "# viewport={width} center={center} max_rotation={} max_zoom={}",
        coverflow.max_rotation_angle(),
        coverflow.max_zoom()
    )?;

    let base_left = center - card_w / 2;
    let reach = (width / 2) / pitch.max(1) + 1;
    let mut t = Transformation::new();
    for step in -reach..=reach {
        let child = ChildGeometry::new(base_left + step * pitch, card_w, card_h);
        if child.left + card_w <= 0 || child.left >= width {
            continue;
        }
        transformer.child_static_transformation(&child, &mut t);
        writeln!(
            out,
            "left={:<6} angle={:<4} {}",
            child.left,
            rotation_angle(&child, center, &coverflow),
            t.matrix()
        )?;
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Silent unless RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let mut user_config = AppConfig::load();
    cli.apply(&mut user_config)?;

    // ── non-interactive mode ──────────────────────────────────
    if let Some(width) = cli.dump {
        let stdout = io::stdout();
        dump_strip(&mut stdout.lock(), width, &user_config)?;
        return Ok(());
    }

    // ── discover images ───────────────────────────────────────
    let root = cli
        .path
        .canonicalize()
        .with_context(|| format!("cannot open {}", cli.path.display()))?;
    let entries = gallery::discover_images(&root, cli.recursive)?;

    let mut state = AppState::new(root, entries, user_config);
    state.config_file = Some(config::config_path());

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState,
) -> Result<()> {
    let mut events = spawn_event_reader(FRAME_INTERVAL);
    let (image_tx, mut image_rx) = tokio::sync::mpsc::unbounded_channel::<ImageUpdate>();

    loop {
        // ── draw first ─────────────────────────────────────────
        let completed = terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());

            let strip_block = Block::default()
                .title(format!(" {} ", state.root.display()))
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());

            let strip = CoverflowStrip::new(&state.entries, &state.thumbs)
                .card_width(state.config.card_width)
                .card_spacing(state.config.card_spacing)
                .block(strip_block);
            frame.render_stateful_widget(strip, layout.strip_area, &mut state.strip);

            let hint = state.config.status_bar_hint();
            let status_text = match state.active_view {
                ActiveView::Strip => state.status_message.as_deref().unwrap_or(&hint),
                ActiveView::SettingsMenu | ActiveView::ControlsSubmenu => "",
            };
            let status = Paragraph::new(status_text).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);

            match state.active_view {
                ActiveView::SettingsMenu => frame.render_widget(
                    popup::SettingsPopup {
                        state: &*state,
                        selected: state.settings_selected,
                    },
                    frame.area(),
                ),
                ActiveView::ControlsSubmenu => frame.render_widget(
                    popup::ControlsPopup {
                        config: &state.config,
                        selected: state.controls_selected,
                        awaiting_rebind: state.awaiting_rebind,
                    },
                    frame.area(),
                ),
                ActiveView::Strip => {}
            }
        })?;

        // ── request thumbnails for cards near the middle ───────
        let radius = state.visible_radius(completed.area.width);
        for path in state.take_thumbnail_requests(radius) {
            spawn_thumbnail_decode(image_tx.clone(), path, THUMBNAIL_EDGE, THUMBNAIL_EDGE);
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Wheel(direction) => handler::handle_wheel(state, direction),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Frame => state.strip.scroll.tick(),
                }
            }

            Some(update) = image_rx.recv() => {
                apply_image_update(state, update);
                // Drain everything already decoded before redrawing.
                while let Ok(update) = image_rx.try_recv() {
                    apply_image_update(state, update);
                }
            }

            else => break,
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

fn apply_image_update(state: &mut AppState, update: ImageUpdate) {
    match update {
        ImageUpdate::Thumbnail { path, result: Ok(thumb) } => {
            state.thumbs.insert(path, Arc::new(thumb));
        }
        // The card keeps its placeholder.
        ImageUpdate::Thumbnail { result: Err(e), .. } => tracing::warn!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump(width: u16, config: &AppConfig) -> String {
        let mut out = Vec::new();
        dump_strip(&mut out, width, config).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn dump_lists_centre_card_facing_forward() {
        let text = dump(200, &AppConfig::default());
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("# viewport=200 center=100 max_rotation=20 max_zoom=-180")
        );
        let centre = text.lines().find(|l| l.starts_with("left=80 ")).unwrap();
        assert!(centre.contains("angle=0 "), "{centre}");
    }

    #[test]
    fn dump_angles_are_symmetric() {
        let text = dump(200, &AppConfig::default());
        let angles: Vec<i32> = text
            .lines()
            .skip(1)
            .map(|l| {
                let a = l.split("angle=").nth(1).unwrap();
                a.split_whitespace().next().unwrap().parse().unwrap()
            })
            .collect();
        let mut reversed = angles.clone();
        reversed.reverse();
        let negated: Vec<i32> = reversed.iter().map(|a| -a).collect();
        assert_eq!(angles, negated);
        assert!(angles.first().unwrap() > &0);
    }

    #[test]
    fn cli_overrides_apply() {
        let cli = Cli::parse_from(["coverflow", "--max-rotation", "35", "--max-zoom", "-60"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config).unwrap();
        assert_eq!(config.coverflow.max_rotation_angle(), 35);
        assert_eq!(config.coverflow.max_zoom(), -60);

        // A negative bound means no rotation.
        let negative = Cli::parse_from(["coverflow", "--max-rotation", "-5"]);
        let mut config = AppConfig::default();
        negative.apply(&mut config).unwrap();
        assert_eq!(config.coverflow.max_rotation_angle(), 0);
    }
}
