//! Tunnel pattern: concentric rings rushing toward the viewer.

use super::VizState;
use crate::colors::scheme_color;
use crate::config::SaverConfig;
use crate::help::show_help_modal;
use crate::terminal::{InputEvent, Terminal};
use crossterm::event::KeyCode;
use std::io;

const HELP: &str = "\
TUNNEL
─────────────────
1-9, 0      Speed
Shift+1-0   Color scheme
Space       Pause
q/Esc       Quit
?           Close help";

const CHARS: [char; 8] = [' ', '.', ':', '=', 'o', 'O', '8', '@'];

/// Terminal cells are roughly twice as tall as wide.
const ASPECT: f64 = 2.0;

/// Ring density along the tunnel axis.
const RING_FREQ: f64 = 9.0;

/// Run the tunnel screensaver
pub fn run(term: &mut Terminal, config: &SaverConfig, scheme: u8) -> io::Result<()> {
    let mut state = VizState::new(config.time_step, scheme);

    let (init_w, init_h) = term.size();
    let mut w = init_w;
    let mut h = init_h;
    let mut time: f64 = 0.0;

    loop {
        let (new_w, new_h) = crossterm::terminal::size().unwrap_or((w, h));
        if new_w != w || new_h != h {
            w = new_w;
            h = new_h;
            term.resize(w, h);
            term.clear_screen()?;
        }

        while let Some(event) = term.check_event()? {
            if let InputEvent::Key(code, mods) = event {
                if code == KeyCode::Char('?') {
                    if show_help_modal(term, HELP)? {
                        return Ok(());
                    }
                } else if state.handle_key(code, mods) {
                    return Ok(());
                }
            }
        }

        if state.paused {
            term.sleep(0.1);
            continue;
        }

        if w == 0 || h == 0 {
            term.sleep(0.1);
            continue;
        }

        let cx = w as f64 / 2.0;
        let cy = h as f64 / 2.0;
        // The tunnel mouth wanders slowly around the center.
        let ox = (time * 0.4).sin() * w as f64 * 0.1;
        let oy = (time * 0.27).cos() * h as f64 * 0.1;

        for y in 0..h {
            for x in 0..w {
                let dx = (x as f64 - cx - ox) / ASPECT;
                let dy = y as f64 - cy - oy;
                let r = (dx * dx + dy * dy).sqrt().max(0.5);
                let angle = dy.atan2(dx);

                // Perspective: depth falls off as 1/r, rings advance with time.
                let depth = RING_FREQ / r;
                let stripe = (depth - time * 2.0).sin();
                let swirl = (angle * 3.0 + time * 0.8).sin() * 0.3;
                let value = ((stripe + swirl).clamp(-1.0, 1.0) + 1.0) * 0.5;

                // Far rings fade toward the vanishing point.
                let fade = (r / (w as f64 * 0.5)).min(1.0);
                let shaded = value * (0.35 + 0.65 * fade);

                let char_idx = (shaded * (CHARS.len() - 1) as f64) as usize;
                let ch = CHARS[char_idx.min(CHARS.len() - 1)];

                let intensity = (shaded * 3.0) as u8;
                let (color, bold) = scheme_color(state.scheme(), intensity, shaded > 0.75);
                term.set(x as i32, y as i32, ch, Some(color), bold);
            }
        }

        term.present()?;
        time += (state.speed / 0.03) as f64 * 0.05;
        term.sleep(state.speed);
    }
}
