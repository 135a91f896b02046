//! Lightning pattern: branching bolts striking toward the ground.

use super::VizState;
use crate::colors::scheme_color;
use crate::config::{LightningConfig, SaverConfig};
use crate::engine::LightningEngine;
use crate::help::show_help_modal;
use crate::terminal::{InputEvent, Terminal};
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::io;

const HELP: &str = "\
LIGHTNING
─────────────────
click       Strike there
m           Toggle counters
1-9, 0      Speed
Shift+1-0   Color scheme
Space       Pause
q/Esc       Quit
?           Close help";

/// Run the lightning screensaver
pub fn run(
    term: &mut Terminal,
    config: &SaverConfig,
    effect: LightningConfig,
    scheme: u8,
    seed: u64,
) -> io::Result<()> {
    let mut state = VizState::new(config.time_step, scheme);
    let mut show_metrics = false;

    let (init_w, init_h) = term.size();
    let mut w = init_w;
    let mut h = init_h;

    let mut engine = LightningEngine::new(w as f64, h as f64, effect, seed);

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
        for segment in engine.segments() {
            draw_segment(term, state.scheme(), &segment);
        }

        if show_metrics {
            let m = engine.metrics();
            let line = format!(
                " strikes:{} points:{} depth:{}/{}/{}/{} ",
                m.active_effects,
                m.total_bolt_points,
                m.by_depth[0],
                m.by_depth[1],
                m.by_depth[2],
                m.by_depth[3],
            );
            term.set_str(0, 0, &line, Some(Color::DarkGrey), false);
        }

        term.present()?;
        term.sleep(state.speed);
    }
}

fn draw_segment(term: &mut Terminal, scheme: u8, seg: &crate::engine::lightning::Segment) {
    let dx = seg.x1 - seg.x0;
    let dy = seg.y1 - seg.y0;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0);

    let ch = segment_char(dx, dy);
    let (color, bold) = if seg.flash {
        // The strike frame washes out to white regardless of scheme.
        (Color::White, true)
    } else {
        scheme_color(scheme, seg.band, seg.band >= 2)
    };

    let mut i = 0.0;
    while i <= steps {
        let t = i / steps;
        let x = (seg.x0 + dx * t) as i32;
        let y = (seg.y0 + dy * t) as i32;
        term.set(x, y, ch, Some(color), bold);
        // Thick bolts widen horizontally; vertical cells are tall enough.
        for extra in 1..seg.thickness as i32 {
            let side = if extra % 2 == 1 { (extra + 1) / 2 } else { -(extra / 2) };
            term.set(x + side, y, ch, Some(color), bold && extra == 1);
        }
        i += 1.0;
    }
}

/// Choose a glyph from the segment's dominant direction.
fn segment_char(dx: f64, dy: f64) -> char {
    if dx.abs() > dy.abs() * 2.0 {
        '_'
    } else if dy.abs() > dx.abs() * 2.0 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}
