//! Screensaver patterns.
//!
//! Each pattern is its own module with a `run()` loop over the shared
//! [`Terminal`] back buffer; this module owns the dispatcher and the
//! interactive state common to all of them.

pub mod fireworks;
pub mod lightning;
pub mod plasma;
pub mod tunnel;

use crate::colors::ColorState;
use crate::config::{SaverConfig, SaverType};
use crate::settings::Settings;
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyModifiers};
use std::io;

/// Runtime state for interactive controls (shared by all patterns)
pub struct VizState {
    pub speed: f32,
    pub colors: ColorState,
    pub paused: bool,
}

impl VizState {
    pub fn new(initial_speed: f32, scheme: u8) -> Self {
        Self {
            speed: initial_speed,
            colors: ColorState::new(scheme),
            paused: false,
        }
    }

    pub fn scheme(&self) -> u8 {
        self.colors.scheme
    }

    /// Handle keypress, returns true if should quit
    pub fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            // Number keys: change speed (1=fastest, 9=slowest, 0=very slow)
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let n = c.to_digit(10).unwrap() as u8;
                self.speed = match n {
                    0 => 0.2,
                    1 => 0.005,
                    2 => 0.01,
                    3 => 0.02,
                    4 => 0.03,
                    5 => 0.05,
                    6 => 0.07,
                    7 => 0.1,
                    8 => 0.15,
                    9 => 0.2,
                    _ => self.speed,
                };
            }
            // Shift+number symbols select color schemes
            code => {
                self.colors.handle_key(code);
            }
        }
        false
    }
}

/// Run the selected screensaver
pub fn run(config: SaverConfig) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0) // Fallback seed for misconfigured system clocks
    });

    let settings = Settings::load();

    // Resolve the effect preset before entering the alternate screen so the
    // unknown-name warning stays visible.
    let mut fireworks_cfg = crate::config::FireworksConfig::default();
    let mut lightning_cfg = crate::config::LightningConfig::default();
    match config.saver_type {
        SaverType::Fireworks => {
            if let Some(name) = config
                .preset
                .clone()
                .or_else(|| settings.fireworks.preset.clone())
            {
                match crate::config::FireworksConfig::preset(&name) {
                    Some(cfg) => fireworks_cfg = cfg,
                    None => {
                        eprintln!("Unknown fireworks preset: {}. Using defaults.", name);
                        eprintln!("Available: classic, finale, sparklers");
                    }
                }
            }
        }
        SaverType::Lightning => {
            if let Some(name) = config
                .preset
                .clone()
                .or_else(|| settings.lightning.preset.clone())
            {
                match crate::config::LightningConfig::preset(&name) {
                    Some(cfg) => lightning_cfg = cfg,
                    None => {
                        eprintln!("Unknown lightning preset: {}. Using defaults.", name);
                        eprintln!("Available: storm, distant, strobe");
                    }
                }
            }
        }
        _ => {}
    }

    let default_scheme = match config.saver_type {
        SaverType::Fireworks => 4, // gold
        SaverType::Lightning => 5, // electric
        SaverType::Plasma => 0,
        SaverType::Tunnel => 2, // ice
    };
    let scheme = settings.display.scheme.unwrap_or(default_scheme);

    // Mouse capture only where clicks trigger something.
    let wants_mouse = matches!(
        config.saver_type,
        SaverType::Fireworks | SaverType::Lightning
    );
    let mut term = Terminal::new(true, wants_mouse)?;
    term.clear_screen()?;

    match config.saver_type {
        SaverType::Fireworks => fireworks::run(&mut term, &config, fireworks_cfg, scheme, seed),
        SaverType::Lightning => lightning::run(&mut term, &config, lightning_cfg, scheme, seed),
        SaverType::Plasma => plasma::run(&mut term, &config, scheme, seed),
        SaverType::Tunnel => tunnel::run(&mut term, &config, scheme),
    }
}
