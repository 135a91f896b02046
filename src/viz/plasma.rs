//! Plasma pattern: a closed-form interference field, re-evaluated per cell
//! every frame. No state beyond the seeded field parameters.

use super::VizState;
use crate::colors::scheme_color;
use crate::config::SaverConfig;
use crate::help::show_help_modal;
use crate::terminal::{InputEvent, Terminal};
use crossterm::event::KeyCode;
use rand::prelude::*;
use std::io;

const HELP: &str = "\
PLASMA
─────────────────
1-9, 0      Speed
Shift+1-0   Color scheme
Space       Pause
q/Esc       Quit
?           Close help";

const CHARS: [char; 9] = [' ', '.', ':', ';', 'o', 'O', '0', '@', '#'];

/// Seed-dependent field parameters, fixed for the run.
struct Field {
    freq_x: f64,
    freq_y: f64,
    freq_diag: f64,
    freq_radial: f64,
    phase: [f64; 4],
    /// The radial term's center orbits this point.
    center: (f64, f64),
    orbit: f64,
    time_scale: [f64; 3],
}

impl Field {
    fn seeded(rng: &mut StdRng) -> Self {
        Self {
            freq_x: rng.gen_range(5.0..12.0),
            freq_y: rng.gen_range(5.0..12.0),
            freq_diag: rng.gen_range(3.0..8.0),
            freq_radial: rng.gen_range(7.0..15.0),
            phase: [
                rng.gen_range(0.0..std::f64::consts::TAU),
                rng.gen_range(0.0..std::f64::consts::TAU),
                rng.gen_range(0.0..std::f64::consts::TAU),
                rng.gen_range(0.0..std::f64::consts::TAU),
            ],
            center: (rng.gen_range(0.35..0.65), rng.gen_range(0.35..0.65)),
            orbit: rng.gen_range(0.05..0.2),
            time_scale: [
                rng.gen_range(0.7..1.3),
                rng.gen_range(1.1..1.7),
                rng.gen_range(0.3..0.7),
            ],
        }
    }

    /// Field value in [-1, 1] at normalized coordinates.
    fn sample(&self, fx: f64, fy: f64, time: f64) -> f64 {
        let t1 = time * self.time_scale[0];
        let t2 = time * self.time_scale[1];
        let t3 = time * self.time_scale[2];

        let v1 = (fx * self.freq_x + self.phase[0] + t1).sin();
        let v2 = (fy * self.freq_y + self.phase[1] + t2).sin();
        let v3 = ((fx + fy) * self.freq_diag + self.phase[2] + t3).sin();

        let cx = self.center.0 + (t3 + self.phase[3]).cos() * self.orbit;
        let cy = self.center.1 + (t3 + self.phase[3]).sin() * self.orbit;
        let dist = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
        let v4 = (dist * self.freq_radial - t1).sin();

        (v1 + v2 + v3 + v4) * 0.25
    }
}

/// Run the plasma screensaver
pub fn run(term: &mut Terminal, config: &SaverConfig, scheme: u8, seed: u64) -> io::Result<()> {
    let mut state = VizState::new(config.time_step, scheme);
    let mut rng = StdRng::seed_from_u64(seed);
    let field = Field::seeded(&mut rng);

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

        let inv_w = 1.0 / w as f64;
        let inv_h = 1.0 / h as f64;

        for y in 0..h {
            let fy = y as f64 * inv_h;
            for x in 0..w {
                let fx = x as f64 * inv_w;
                let value = field.sample(fx, fy, time);
                let normalized = (value + 1.0) * 0.5;

                let char_idx = (normalized * (CHARS.len() - 1) as f64) as usize;
                let ch = CHARS[char_idx.min(CHARS.len() - 1)];

                let intensity = (normalized * 3.0) as u8;
                let (color, bold) = scheme_color(state.scheme(), intensity, normalized > 0.7);
                term.set(x as i32, y as i32, ch, Some(color), bold);
            }
        }

        term.present()?;
        time += (state.speed / 0.03) as f64 * 0.06;
        term.sleep(state.speed);
    }
}
