//! Deterministic particle and branching-effect engine.
//!
//! Both effect families share the same discipline: every entity insertion
//! passes a single budget counter owned by the engine, recursion is unrolled
//! onto explicit worklists, and the update path never reads a clock or an
//! unseeded random source. Identical seeds and identical update cadences
//! replay identical animations.

pub mod entity;
pub mod fireworks;
pub mod lightning;
pub mod pool;

pub use entity::{Entity, EntityKind, Trail};
pub use fireworks::{FireworkPhase, FireworksEngine};
pub use lightning::{LightningEngine, StrikePhase};
pub use pool::Budget;

/// Ceiling on live particles across all fireworks in one engine.
pub const MAX_PARTICLES: usize = 450;

/// Ceiling on waypoints across the whole recursive generation of one strike.
pub const MAX_POINTS_PER_STRIKE: usize = 500;

/// Maximum concurrent effect instances per engine. A spawn past the cap is
/// silently dropped rather than queued; live effects are never evicted.
pub const MAX_EFFECTS: usize = 8;

/// How far outside the canvas an entity may drift before it is culled.
pub const OUT_OF_BOUNDS_MARGIN: f64 = 8.0;

/// Counts-by-kind-and-depth snapshot of one engine, for tests and overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    pub normal: usize,
    pub sparkle: usize,
    /// Live entities per creation depth; depth 3 and deeper share the last slot.
    pub by_depth: [usize; 4],
    pub active_effects: usize,
    pub total_particles: usize,
    pub total_bolt_points: usize,
}
