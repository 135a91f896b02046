//! Terminal screensaver effects.
//!
//! The interesting machinery lives in [`engine`]: a deterministic,
//! budget-capped particle and branching-effect simulation shared by the
//! fireworks and lightning patterns. The [`viz`] modules drive it and draw
//! into the cell back buffer in [`terminal`].

pub mod colors;
pub mod config;
pub mod engine;
pub mod help;
pub mod settings;
pub mod terminal;
pub mod viz;
