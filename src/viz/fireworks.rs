//! Fireworks pattern: launching shells, multi-stage bursts, sparkles.

use super::VizState;
use crate::colors::scheme_color;
use crate::config::{FireworksConfig, SaverConfig};
use crate::engine::{EntityKind, FireworksEngine};
use crate::help::show_help_modal;
use crate::terminal::{InputEvent, Terminal};
use crossterm::event::KeyCode;
use std::io;

const HELP: &str = "\
FIREWORKS
─────────────────
click       Burst there
m           Toggle counters
1-9, 0      Speed
Shift+1-0   Color scheme
Space       Pause
q/Esc       Quit
?           Close help";

/// Glyphs per life band for ring particles, faded to fresh.
const RING_CHARS: [char; 4] = ['.', '+', 'o', '*'];

/// Run the fireworks screensaver
pub fn run(
    term: &mut Terminal,
    config: &SaverConfig,
    effect: FireworksConfig,
    scheme: u8,
    seed: u64,
) -> io::Result<()> {
    let mut state = VizState::new(config.time_step, scheme);
    let mut show_metrics = false;

    let (init_w, init_h) = term.size();
    let mut w = init_w;
    let mut h = init_h;

    let mut engine = FireworksEngine::new(w as f64, h as f64, effect, seed);

    loop {
        let (new_w, new_h) = crossterm::terminal::size().unwrap_or((w, h));
        if new_w != w || new_h != h {
            w = new_w;
            h = new_h;
            term.resize(w, h);
            term.clear_screen()?;
            engine.resize(w as f64, h as f64);
        }

        while let Some(event) = term.check_event()? {
            match event {
                InputEvent::Key(KeyCode::Char('?'), _) => {
                    if show_help_modal(term, HELP)? {
                        return Ok(());
                    }
                }
                InputEvent::Key(KeyCode::Char('m'), _) => show_metrics = !show_metrics,
                InputEvent::Key(code, mods) => {
                    if state.handle_key(code, mods) {
                        return Ok(());
                    }
                }
                InputEvent::Click(cx, cy) => {
                    engine.spawn_from_click(cx as f64, cy as f64);
                }
            }
        }

        if state.paused {
            term.sleep(0.1);
            continue;
        }

        engine.update(state.speed as f64 * 1000.0);

        term.clear();

        // Trails underneath, dimmed.
        for (x, y, band) in engine.trail_points() {
            let (color, bold) = scheme_color(state.scheme(), band, false);
            term.set(x as i32, y as i32, '.', Some(color), bold);
        }

        // Particles on top.
        for sprite in engine.sprites() {
            let (ch, intensity, bold) = match sprite.kind {
                EntityKind::Normal if sprite.depth == 0 => ('|', 3, true), // shell
                EntityKind::Normal => (RING_CHARS[sprite.band as usize], sprite.band, sprite.band == 3),
                EntityKind::Sparkle => ('+', 3, true),
                EntityKind::BranchNode => continue,
            };
            let (color, bold) = scheme_color(state.scheme(), intensity, bold);
            term.set(sprite.x as i32, sprite.y as i32, ch, Some(color), bold);
        }

        if show_metrics {
            let m = engine.metrics();
            let line = format!(
                " fireworks:{} particles:{} (normal:{} sparkle:{}) depth:{}/{}/{}/{} ",
                m.active_effects,
                m.total_particles,
                m.normal,
                m.sparkle,
                m.by_depth[0],
                m.by_depth[1],
                m.by_depth[2],
                m.by_depth[3],
            );
            term.set_str(0, 0, &line, Some(crossterm::style::Color::DarkGrey), false);
        }

        term.present()?;
        term.sleep(state.speed);
    }
}
