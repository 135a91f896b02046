//! Firework simulation: launching shells, explosion rings, secondary bursts
//! and sparkles, all drawing slots from one admission-controlled budget.

use rand::prelude::*;

use crate::config::FireworksConfig;

use super::entity::{Entity, EntityKind};
use super::pool::Budget;
use super::{Metrics, MAX_EFFECTS, MAX_PARTICLES, OUT_OF_BOUNDS_MARGIN};

/// An empty firework is kept at least this long so single-frame duds don't
/// flicker in and out of the registry.
const MIN_DWELL_MS: f64 = 400.0;

/// Click bursts are bigger than timed ones.
const CLICK_BURST_SCALE: f64 = 1.5;

/// Fraction of the parent's velocity a burst child inherits.
const INHERIT_VELOCITY: f64 = 0.3;

const ROCKET_TIMER_TICKS: std::ops::RangeInclusive<i64> = 10..=20;
const CHILD_TIMER_TICKS: std::ops::RangeInclusive<i64> = 8..=18;

const RING_SPEED: std::ops::Range<f64> = 5.0..14.0;
const SPARKLE_SPEED: std::ops::Range<f64> = 30.0..70.0;
const SPARKLE_LIFE: std::ops::Range<f64> = 0.15..0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireworkPhase {
    Launching,
    Exploded,
    Expired,
}

/// One live firework: a shell on the way up, or its expanding debris.
pub struct Firework {
    pub id: u64,
    pub origin: (f64, f64),
    pub phase: FireworkPhase,
    pub particles: Vec<Entity>,
    spawned_at_ms: f64,
}

/// Pending explosion: position, inherited velocity, parent depth, size scale.
struct BurstSeed {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    depth: u8,
    scale: f64,
}

/// Read-only render hint for one particle.
#[derive(Clone, Copy, Debug)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    /// Life band, 3 = fresh, 0 = almost gone.
    pub band: u8,
    pub kind: EntityKind,
    pub depth: u8,
}

pub struct FireworksEngine {
    config: FireworksConfig,
    width: f64,
    height: f64,
    seed: u64,
    rng: StdRng,
    controllers: Vec<Firework>,
    budget: Budget,
    now_ms: f64,
    next_launch_ms: f64,
    next_id: u64,
}

impl FireworksEngine {
    pub fn new(width: f64, height: f64, config: FireworksConfig, seed: u64) -> Self {
        let next_launch_ms = config.spawn_interval_ms;
        Self {
            config,
            width,
            height,
            seed,
            rng: StdRng::seed_from_u64(seed),
            controllers: Vec::new(),
            budget: Budget::new(MAX_PARTICLES),
            now_ms: 0.0,
            next_launch_ms,
            next_id: 0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Swap in a named preset. Unknown names leave everything untouched.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match FireworksConfig::preset(name) {
            Some(config) => {
                self.config = config;
                true
            }
            None => false,
        }
    }

    /// Back to the freshly-constructed state, same seed.
    pub fn reset(&mut self) {
        self.controllers.clear();
        self.budget.reset();
        self.rng = StdRng::seed_from_u64(self.seed);
        self.now_ms = 0.0;
        self.next_launch_ms = self.config.spawn_interval_ms;
        self.next_id = 0;
    }

    /// Launch a shell from (x, y). A no-op when the registry is full or the
    /// particle budget has no slot for the shell.
    pub fn spawn_primary(&mut self, x: f64, y: f64) {
        if self.controllers.len() >= MAX_EFFECTS {
            return;
        }
        if self.budget.admit(1) == 0 {
            return;
        }

        let mut shell = Entity::normal(
            x,
            y,
            self.rng.gen_range(-2.0..2.0),
            -self.config.launch_speed * self.rng.gen_range(0.85..1.15),
            0,
            self.config.trail_length,
        );
        shell.can_explode = self.config.max_burst_depth > 0;
        shell.burst_timer = if shell.can_explode {
            self.rng.gen_range(ROCKET_TIMER_TICKS)
        } else {
            -1
        };

        self.controllers.push(Firework {
            id: self.next_id,
            origin: (x, y),
            phase: FireworkPhase::Launching,
            particles: vec![shell],
            spawned_at_ms: self.now_ms,
        });
        self.next_id += 1;
    }

    /// Explode immediately at (x, y) with a bigger ring, skipping the launch
    /// phase.
    /// Dropped silently when the registry is full or no slots were granted.
    pub fn spawn_from_click(&mut self, x: f64, y: f64) {
        if self.controllers.len() >= MAX_EFFECTS {
            return;
        }

        let Self {
            config,
            rng,
            budget,
            ..
        } = self;
        let mut ring = Vec::new();
        Self::run_bursts(
            budget,
            rng,
            config,
            &mut ring,
            vec![BurstSeed {
                x,
                y,
                vx: 0.0,
                vy: 0.0,
                depth: 0,
                scale: CLICK_BURST_SCALE,
            }],
        );
        if ring.is_empty() {
            return;
        }

        self.controllers.push(Firework {
            id: self.next_id,
            origin: (x, y),
            phase: FireworkPhase::Exploded,
            particles: ring,
            spawned_at_ms: self.now_ms,
        });
        self.next_id += 1;
    }

    /// Advance the whole registry by `delta_ms`, in registry order.
    pub fn update(&mut self, delta_ms: f64) {
        let delta_ms = delta_ms.max(0.0);
        let dt = delta_ms / 1000.0;
        self.now_ms += delta_ms;

        // Automatic launches ride the engine clock. Dropped frames do not
        // backfill missed launches.
        let interval = self.config.spawn_interval_ms.max(1.0);
        if self.now_ms - self.next_launch_ms > interval * 4.0 {
            self.next_launch_ms = self.now_ms;
        }
        while self.now_ms >= self.next_launch_ms {
            self.next_launch_ms += interval;
            if self.width >= 8.0 {
                let x = self.rng.gen_range(self.width * 0.15..self.width * 0.85);
                self.spawn_primary(x, self.height - 1.0);
            }
        }

        for idx in 0..self.controllers.len() {
            self.step_firework(idx, dt);
        }

        self.controllers
            .retain(|fw| fw.phase != FireworkPhase::Expired);

        debug_assert_eq!(
            self.budget.in_use(),
            self.controllers
                .iter()
                .map(|fw| fw.particles.len())
                .sum::<usize>(),
            "budget counter diverged from live particle total"
        );
    }

    fn step_firework(&mut self, idx: usize, dt: f64) {
        let width = self.width;
        let height = self.height;
        let now_ms = self.now_ms;
        let Self {
            config,
            rng,
            controllers,
            budget,
            ..
        } = self;
        let fw = &mut controllers[idx];

        // Motion, decay, trails, bounds.
        for p in fw.particles.iter_mut() {
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vy += config.gravity * dt;
            p.life -= config.fade_rate * dt;
            p.trail.push(p.x, p.y);
            if p.x < -OUT_OF_BOUNDS_MARGIN
                || p.x > width + OUT_OF_BOUNDS_MARGIN
                || p.y < -OUT_OF_BOUNDS_MARGIN
                || p.y > height + OUT_OF_BOUNDS_MARGIN
            {
                p.life = 0.0;
            }
        }

        // Secondary generation, left to right. A burst consumes its parent,
        // so the slot reopens before the children ask for theirs; every
        // admission sees the budget as the previous one left it.
        let mut seeds: Vec<BurstSeed> = Vec::new();
        let mut spawned: Vec<Entity> = Vec::new();
        let mut consumed = 0usize;

        for p in fw.particles.iter_mut() {
            if p.life <= 0.0 || p.kind != EntityKind::Normal {
                continue;
            }

            if p.can_explode && p.burst_timer > 0 {
                p.burst_timer -= 1;
            }
            if p.can_explode && p.burst_timer == 0 && p.depth < config.max_burst_depth {
                seeds.push(BurstSeed {
                    x: p.x,
                    y: p.y,
                    vx: p.vx,
                    vy: p.vy,
                    depth: p.depth,
                    scale: 1.0,
                });
                p.life = 0.0;
                p.can_explode = false;
                p.burst_timer = -1;
                budget.release(1);
                consumed += 1;
                if p.depth == 0 {
                    fw.phase = FireworkPhase::Exploded;
                }
                continue;
            }

            // Ring particles shed sparkles while still bright; the shell
            // itself never does.
            if p.depth >= 1
                && p.life > 0.5
                && config.sparkle_chance > 0.0
                && rng.gen_bool(config.sparkle_chance.clamp(0.0, 1.0))
            {
                let want = rng.gen_range(1..=3usize);
                let granted = budget.admit(want);
                let (px, py, pd) = (p.x, p.y, p.depth);
                for _ in 0..granted {
                    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                    let speed = rng.gen_range(SPARKLE_SPEED);
                    let life = rng.gen_range(SPARKLE_LIFE);
                    spawned.push(Entity::sparkle(
                        px,
                        py,
                        angle.cos() * speed,
                        angle.sin() * speed,
                        pd,
                        life,
                    ));
                }
            }
        }

        Self::run_bursts(budget, rng, config, &mut spawned, seeds);

        // Removal happens after the full pass; burst parents already gave
        // their slot back above.
        let before = fw.particles.len();
        fw.particles.retain(|p| p.life > 0.0);
        let removed = before - fw.particles.len();
        budget.release(removed - consumed);

        fw.particles.extend(spawned);

        if fw.particles.is_empty() && now_ms - fw.spawned_at_ms >= MIN_DWELL_MS {
            fw.phase = FireworkPhase::Expired;
        }
    }

    /// Expand pending explosions through an explicit worklist. Recursion
    /// across depths unfolds over later frames via the children's timers;
    /// within one frame only the collected seeds expand.
    fn run_bursts(
        budget: &mut Budget,
        rng: &mut StdRng,
        config: &FireworksConfig,
        spawned: &mut Vec<Entity>,
        seeds: Vec<BurstSeed>,
    ) {
        let mut stack = seeds;
        while let Some(seed) = stack.pop() {
            if seed.depth >= config.max_burst_depth {
                continue;
            }
            let child_depth = seed.depth + 1;
            // Deeper rings are a shrinking fraction of the configured size.
            let base = (config.burst_size as f64 * seed.scale).round() as usize;
            let want = (base >> seed.depth as usize).max(1);
            let granted = budget.admit(want);
            if granted == 0 {
                continue;
            }

            let child_can_explode = (child_depth as u16 + 1) < config.max_burst_depth as u16;
            let speed_scale = 0.6f64.powi(seed.depth as i32);
            for i in 0..granted {
                let angle = std::f64::consts::TAU * (i as f64 / granted as f64)
                    + rng.gen_range(-0.08..0.08);
                let speed = rng.gen_range(RING_SPEED) * speed_scale;
                let mut child = Entity::normal(
                    seed.x,
                    seed.y,
                    angle.cos() * speed + seed.vx * INHERIT_VELOCITY,
                    angle.sin() * speed + seed.vy * INHERIT_VELOCITY,
                    child_depth,
                    config.trail_length,
                );
                if child_can_explode {
                    child.can_explode = true;
                    child.burst_timer = rng.gen_range(CHILD_TIMER_TICKS);
                }
                spawned.push(child);
            }
        }
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.controllers
    }

    /// All live particles, for tests and custom compositors.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.controllers.iter().flat_map(|fw| fw.particles.iter())
    }

    /// Render hints: position plus life-band and kind for glyph/color choice.
    pub fn sprites(&self) -> impl Iterator<Item = Sprite> + '_ {
        self.entities().map(|p| Sprite {
            x: p.x,
            y: p.y,
            band: p.life_band(),
            kind: p.kind,
            depth: p.depth,
        })
    }

    /// Trail samples, oldest first, with a dimness band (1 = recent, 0 = old).
    pub fn trail_points(&self) -> impl Iterator<Item = (f64, f64, u8)> + '_ {
        self.entities().flat_map(|p| {
            let len = p.trail.len();
            p.trail
                .iter()
                .enumerate()
                .map(move |(i, (x, y))| (x, y, u8::from(i + 2 >= len)))
        })
    }

    pub fn metrics(&self) -> Metrics {
        let mut m = Metrics::default();
        for p in self.entities() {
            match p.kind {
                EntityKind::Normal => m.normal += 1,
                EntityKind::Sparkle => m.sparkle += 1,
                EntityKind::BranchNode => {}
            }
            m.by_depth[(p.depth as usize).min(3)] += 1;
        }
        m.active_effects = self.controllers.len();
        m.total_particles = m.normal + m.sparkle;
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> FireworksConfig {
        // No automatic launches; tests drive spawns explicitly.
        FireworksConfig {
            spawn_interval_ms: f64::INFINITY,
            ..FireworksConfig::default()
        }
    }

    fn run_frames(engine: &mut FireworksEngine, frames: usize, delta_ms: f64) {
        for _ in 0..frames {
            engine.update(delta_ms);
        }
    }

    #[test]
    fn cap_holds_under_maximum_pressure() {
        let config = FireworksConfig {
            burst_size: 200,
            sparkle_chance: 1.0,
            max_burst_depth: 3,
            ..quiet_config()
        };
        let mut engine = FireworksEngine::new(120.0, 40.0, config, 7);
        for i in 0..MAX_EFFECTS + 4 {
            engine.spawn_from_click(20.0 + i as f64 * 5.0, 20.0);
        }
        for _ in 0..200 {
            engine.update(33.0);
            let m = engine.metrics();
            assert!(
                m.total_particles <= MAX_PARTICLES,
                "cap exceeded: {}",
                m.total_particles
            );
            assert_eq!(m.total_particles, m.normal + m.sparkle);
        }
    }

    #[test]
    fn depth_never_exceeds_configured_maximum() {
        let config = FireworksConfig {
            sparkle_chance: 1.0,
            max_burst_depth: 2,
            ..quiet_config()
        };
        let mut engine = FireworksEngine::new(120.0, 40.0, config, 3);
        engine.spawn_primary(60.0, 39.0);
        engine.spawn_from_click(40.0, 20.0);
        for _ in 0..150 {
            engine.update(33.0);
            for e in engine.entities() {
                assert!(e.depth <= 2);
                if e.kind == EntityKind::Sparkle {
                    assert!(!e.can_explode);
                    assert_eq!(e.burst_timer, -1);
                }
            }
        }
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let mut a = FireworksEngine::new(100.0, 30.0, FireworksConfig::default(), 42);
        let mut b = FireworksEngine::new(100.0, 30.0, FireworksConfig::default(), 42);
        for frame in 0..120 {
            if frame == 10 {
                a.spawn_from_click(50.0, 15.0);
                b.spawn_from_click(50.0, 15.0);
            }
            a.update(33.0);
            b.update(33.0);
            let snap_a: Vec<_> = a.entities().map(|e| (e.x, e.y, e.life, e.depth)).collect();
            let snap_b: Vec<_> = b.entities().map(|e| (e.x, e.y, e.life, e.depth)).collect();
            assert_eq!(snap_a, snap_b);
        }
    }

    #[test]
    fn decays_to_empty_without_triggers() {
        let config = FireworksConfig {
            fade_rate: 0.5,
            ..quiet_config()
        };
        let mut engine = FireworksEngine::new(100.0, 30.0, config, 11);
        engine.spawn_from_click(50.0, 15.0);
        assert!(engine.metrics().total_particles > 0);
        run_frames(&mut engine, 300, 33.0);
        assert_eq!(engine.metrics().total_particles, 0);
        assert_eq!(engine.metrics().active_effects, 0);
    }

    #[test]
    fn zero_sparkle_chance_spawns_no_sparkles() {
        let config = FireworksConfig {
            sparkle_chance: 0.0,
            ..quiet_config()
        };
        let mut engine = FireworksEngine::new(100.0, 30.0, config, 5);
        engine.spawn_from_click(50.0, 15.0);
        for _ in 0..100 {
            engine.update(33.0);
            assert_eq!(engine.metrics().sparkle, 0);
        }
    }

    #[test]
    fn registry_denies_spawns_past_the_effect_cap() {
        let mut engine = FireworksEngine::new(200.0, 50.0, quiet_config(), 9);
        for i in 0..MAX_EFFECTS + 5 {
            engine.spawn_primary(10.0 + i as f64, 49.0);
        }
        assert_eq!(engine.metrics().active_effects, MAX_EFFECTS);
    }

    #[test]
    fn reset_matches_fresh_engine() {
        let config = FireworksConfig::default();
        let mut used = FireworksEngine::new(100.0, 30.0, config.clone(), 21);
        used.spawn_from_click(30.0, 10.0);
        run_frames(&mut used, 40, 33.0);
        used.reset();

        let mut fresh = FireworksEngine::new(100.0, 30.0, config, 21);
        for _ in 0..60 {
            used.update(33.0);
            fresh.update(33.0);
            let a: Vec<_> = used.entities().map(|e| (e.x, e.y, e.life)).collect();
            let b: Vec<_> = fresh.entities().map(|e| (e.x, e.y, e.life)).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn bad_preset_leaves_state_alone() {
        let mut engine = FireworksEngine::new(100.0, 30.0, quiet_config(), 2);
        engine.spawn_from_click(50.0, 15.0);
        let before = engine.metrics();
        assert!(!engine.apply_preset("not-a-preset"));
        assert_eq!(engine.metrics(), before);
        assert!(engine.apply_preset("finale"));
    }
}
