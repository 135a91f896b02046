//! Lightning simulation: jagged main paths with recursively spawned child
//! branches, generated under a hard per-strike waypoint budget.

use rand::prelude::*;

use crate::config::LightningConfig;

use super::entity::Entity;
use super::pool::Budget;
use super::{Metrics, MAX_EFFECTS, MAX_POINTS_PER_STRIKE};

/// Full-intensity flash before the bolt starts fading.
const STRIKE_FLASH_MS: f64 = 120.0;

/// Cells between waypoints along a branch.
const WAYPOINT_STEP: f64 = 3.0;

/// Child branch length as a fraction of the parent's.
const CHILD_LENGTH: std::ops::Range<f64> = 0.3..0.6;

const EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrikePhase {
    Striking,
    Fading,
    Expired,
}

/// One branch of a strike: an ordered waypoint path at a single depth.
pub struct Bolt {
    pub depth: u8,
    pub thickness: u16,
    pub intensity: f64,
    pub points: Vec<Entity>,
}

/// One live strike and everything it branched into.
pub struct Strike {
    pub id: u64,
    pub origin: (f64, f64),
    pub phase: StrikePhase,
    pub bolts: Vec<Bolt>,
    age_ms: f64,
}

/// Pending branch: segment endpoints plus generation depth and thickness.
struct BranchTask {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    depth: u8,
    thickness: u16,
}

/// Read-only render hint for one bolt segment.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    /// Brightness band, 3 = flash, 0 = nearly faded.
    pub band: u8,
    pub thickness: u16,
    pub flash: bool,
}

pub struct LightningEngine {
    config: LightningConfig,
    width: f64,
    height: f64,
    seed: u64,
    rng: StdRng,
    strikes: Vec<Strike>,
    now_ms: f64,
    next_strike_ms: f64,
    next_id: u64,
}

impl LightningEngine {
    pub fn new(width: f64, height: f64, config: LightningConfig, seed: u64) -> Self {
        let next_strike_ms = config.strike_interval_ms;
        Self {
            config,
            width,
            height,
            seed,
            rng: StdRng::seed_from_u64(seed),
            strikes: Vec::new(),
            now_ms: 0.0,
            next_strike_ms,
            next_id: 0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Swap in a named preset. Unknown names leave everything untouched.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match LightningConfig::preset(name) {
            Some(config) => {
                self.config = config;
                true
            }
            None => false,
        }
    }

    /// Back to the freshly-constructed state, same seed.
    pub fn reset(&mut self) {
        self.strikes.clear();
        self.rng = StdRng::seed_from_u64(self.seed);
        self.now_ms = 0.0;
        self.next_strike_ms = self.config.strike_interval_ms;
        self.next_id = 0;
    }

    /// Strike from the top of the canvas down to (x, y).
    pub fn spawn_strike(&mut self, x: f64, y: f64) {
        let thickness = self.config.thickness;
        self.spawn(x, y, thickness);
    }

    /// Click variant: same path, one step thicker.
    pub fn spawn_from_click(&mut self, x: f64, y: f64) {
        let thickness = self.config.thickness + 1;
        self.spawn(x, y, thickness);
    }

    fn spawn(&mut self, target_x: f64, target_y: f64, thickness: u16) {
        if self.strikes.len() >= MAX_EFFECTS {
            return;
        }

        let drift = if self.width >= 16.0 {
            self.rng.gen_range(-self.width / 10.0..self.width / 10.0)
        } else {
            0.0
        };
        let start_x = (target_x + drift).clamp(0.0, self.width.max(0.0));

        let bolts = Self::generate(
            &mut self.rng,
            &self.config,
            (start_x, 0.0),
            (target_x, target_y),
            thickness.max(1),
        );
        if bolts.is_empty() {
            return;
        }

        self.strikes.push(Strike {
            id: self.next_id,
            origin: (start_x, 0.0),
            phase: StrikePhase::Striking,
            bolts,
            age_ms: 0.0,
        });
        self.next_id += 1;
    }

    /// Build the branch tree for one strike under its waypoint budget.
    ///
    /// Explicit worklist instead of recursion: each task carries its segment,
    /// depth and thickness, and admission against the shared budget happens
    /// when the task is expanded. Once the budget runs dry, whatever was
    /// produced so far is the strike.
    fn generate(
        rng: &mut StdRng,
        config: &LightningConfig,
        start: (f64, f64),
        end: (f64, f64),
        thickness: u16,
    ) -> Vec<Bolt> {
        let mut budget = Budget::new(MAX_POINTS_PER_STRIKE);
        let mut bolts = Vec::new();
        let mut stack = vec![BranchTask {
            x0: start.0,
            y0: start.1,
            x1: end.0,
            y1: end.1,
            depth: 0,
            thickness,
        }];

        while let Some(task) = stack.pop() {
            let dx = task.x1 - task.x0;
            let dy = task.y1 - task.y0;
            let len = dx.hypot(dy);

            let want = ((len / WAYPOINT_STEP).ceil() as usize + 2).clamp(3, 24);
            let granted = budget.admit(want);
            if granted < 2 {
                // Budget exhausted: keep what exists, drop the rest quietly.
                break;
            }

            // Degenerate segments (coincident endpoints) keep a bare stub
            // and never branch: there is no perpendicular to jitter along.
            let degenerate = len < EPSILON;
            let (ux, uy) = if degenerate {
                (0.0, 0.0)
            } else {
                (dx / len, dy / len)
            };
            let (px, py) = (-uy, ux);
            let amp = config.main_path_jaggedness / (task.depth as f64 + 1.0);
            let branch_chance =
                (config.branch_probability * 0.5f64.powi(task.depth as i32)).clamp(0.0, 1.0);

            let steps = granted - 1;
            let mut points = Vec::with_capacity(granted);
            for i in 0..granted {
                let t = i as f64 / steps as f64;
                let mut x = task.x0 + dx * t;
                let mut y = task.y0 + dy * t;
                let interior = i != 0 && i != steps;

                if interior && !degenerate && amp > EPSILON {
                    let off = rng.gen_range(-amp..amp);
                    x += px * off;
                    y += py * off;
                }
                points.push(Entity::branch_node(x, y, task.depth));

                if interior
                    && !degenerate
                    && task.depth + 1 < config.max_branch_depth
                    && branch_chance > 0.0
                    && rng.gen_bool(branch_chance)
                {
                    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                    let angle = sign * (config.branch_spread + rng.gen_range(-0.15..0.15));
                    let (sin, cos) = angle.sin_cos();
                    let bdx = ux * cos - uy * sin;
                    let bdy = ux * sin + uy * cos;
                    let blen = len * rng.gen_range(CHILD_LENGTH);
                    stack.push(BranchTask {
                        x0: x,
                        y0: y,
                        x1: x + bdx * blen,
                        y1: y + bdy * blen,
                        depth: task.depth + 1,
                        thickness: task.thickness.saturating_sub(1).max(1),
                    });
                }
            }

            bolts.push(Bolt {
                depth: task.depth,
                thickness: task.thickness,
                intensity: (1.0 - 0.15 * task.depth as f64).max(0.3),
                points,
            });
        }

        bolts
    }

    /// Advance all strikes by `delta_ms`, in registry order.
    pub fn update(&mut self, delta_ms: f64) {
        let delta_ms = delta_ms.max(0.0);
        self.now_ms += delta_ms;

        // Automatic strikes ride the engine clock. Dropped frames do not
        // backfill missed strikes.
        let interval = self.config.strike_interval_ms.max(1.0);
        if self.now_ms - self.next_strike_ms > interval * 4.0 {
            self.next_strike_ms = self.now_ms;
        }
        while self.now_ms >= self.next_strike_ms {
            self.next_strike_ms += interval;
            if self.width >= 8.0 {
                let x = self.rng.gen_range(self.width * 0.1..self.width * 0.9);
                let ground = self.height - 1.0;
                self.spawn_strike(x, ground);
            }
        }

        let fade_time = self.config.fade_time_ms.max(1.0);
        for strike in &mut self.strikes {
            strike.age_ms += delta_ms;
            let life = if strike.age_ms <= STRIKE_FLASH_MS {
                strike.phase = StrikePhase::Striking;
                1.0
            } else {
                let f = 1.0 - (strike.age_ms - STRIKE_FLASH_MS) / fade_time;
                if f <= 0.0 {
                    strike.phase = StrikePhase::Expired;
                    0.0
                } else {
                    strike.phase = StrikePhase::Fading;
                    f
                }
            };
            for bolt in &mut strike.bolts {
                for p in &mut bolt.points {
                    p.life = life;
                }
            }
        }

        self.strikes.retain(|s| s.phase != StrikePhase::Expired);
    }

    pub fn strikes(&self) -> &[Strike] {
        &self.strikes
    }

    /// All live bolt waypoints, for tests and custom compositors.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.strikes
            .iter()
            .flat_map(|s| s.bolts.iter().flat_map(|b| b.points.iter()))
    }

    /// Render hints: consecutive waypoint pairs with brightness band and
    /// thickness.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.strikes.iter().flat_map(|s| {
            let flash = s.phase == StrikePhase::Striking;
            s.bolts.iter().flat_map(move |b| {
                b.points.windows(2).map(move |w| {
                    let level = w[0].life * b.intensity;
                    let band = if flash {
                        3
                    } else if level > 0.6 {
                        2
                    } else if level > 0.3 {
                        1
                    } else {
                        0
                    };
                    Segment {
                        x0: w[0].x,
                        y0: w[0].y,
                        x1: w[1].x,
                        y1: w[1].y,
                        band,
                        thickness: b.thickness,
                        flash,
                    }
                })
            })
        })
    }

    pub fn metrics(&self) -> Metrics {
        let mut m = Metrics::default();
        for p in self.entities() {
            m.by_depth[(p.depth as usize).min(3)] += 1;
            m.total_bolt_points += 1;
        }
        m.active_effects = self.strikes.len();
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> LightningConfig {
        // No automatic strikes; tests drive spawns explicitly.
        LightningConfig {
            strike_interval_ms: f64::INFINITY,
            ..LightningConfig::default()
        }
    }

    #[test]
    fn point_budget_bounds_each_strike() {
        let config = LightningConfig {
            branch_probability: 1.0,
            max_branch_depth: 6,
            ..quiet_config()
        };
        let mut engine = LightningEngine::new(300.0, 120.0, config, 17);
        engine.spawn_from_click(150.0, 119.0);
        let strike = &engine.strikes()[0];
        let points: usize = strike.bolts.iter().map(|b| b.points.len()).sum();
        assert!(points <= MAX_POINTS_PER_STRIKE, "budget blown: {}", points);
        assert!(points >= 2);
    }

    #[test]
    fn branch_depth_is_capped() {
        let config = LightningConfig {
            branch_probability: 1.0,
            max_branch_depth: 2,
            ..quiet_config()
        };
        let mut engine = LightningEngine::new(200.0, 80.0, config, 4);
        engine.spawn_strike(100.0, 79.0);
        for p in engine.entities() {
            assert!(p.depth < 2);
        }
    }

    #[test]
    fn depth_scaling_formulas() {
        let config = LightningConfig {
            branch_probability: 1.0,
            thickness: 3,
            ..quiet_config()
        };
        let mut engine = LightningEngine::new(200.0, 80.0, config, 12);
        engine.spawn_strike(100.0, 79.0);
        for bolt in engine.strikes()[0].bolts.iter() {
            let expected = (1.0 - 0.15 * bolt.depth as f64).max(0.3);
            assert!((bolt.intensity - expected).abs() < 1e-12);
            assert!(bolt.thickness >= 1);
        }
    }

    #[test]
    fn coincident_click_points_stay_finite() {
        // Origin and target collapse to the same point on a tiny canvas.
        let mut engine = LightningEngine::new(4.0, 4.0, quiet_config(), 1);
        engine.spawn_from_click(2.0, 0.0);
        engine.spawn_from_click(2.0, 0.0);
        for p in engine.entities() {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let mut a = LightningEngine::new(160.0, 50.0, LightningConfig::default(), 99);
        let mut b = LightningEngine::new(160.0, 50.0, LightningConfig::default(), 99);
        for frame in 0..150 {
            if frame == 20 {
                a.spawn_from_click(80.0, 40.0);
                b.spawn_from_click(80.0, 40.0);
            }
            a.update(33.0);
            b.update(33.0);
            let snap_a: Vec<_> = a.entities().map(|e| (e.x, e.y, e.life, e.depth)).collect();
            let snap_b: Vec<_> = b.entities().map(|e| (e.x, e.y, e.life, e.depth)).collect();
            assert_eq!(snap_a, snap_b);
        }
    }

    #[test]
    fn strikes_fade_out_and_expire() {
        let config = LightningConfig {
            fade_time_ms: 200.0,
            ..quiet_config()
        };
        let mut engine = LightningEngine::new(100.0, 40.0, config, 6);
        engine.spawn_strike(50.0, 39.0);
        assert_eq!(engine.metrics().active_effects, 1);

        engine.update(50.0);
        assert_eq!(engine.strikes()[0].phase, StrikePhase::Striking);

        engine.update(150.0);
        assert_eq!(engine.strikes()[0].phase, StrikePhase::Fading);

        engine.update(500.0);
        assert_eq!(engine.metrics().active_effects, 0);
        assert_eq!(engine.metrics().total_bolt_points, 0);
    }

    #[test]
    fn registry_denies_strikes_past_the_effect_cap() {
        let mut engine = LightningEngine::new(200.0, 60.0, quiet_config(), 8);
        for i in 0..MAX_EFFECTS + 6 {
            engine.spawn_from_click(10.0 + i as f64 * 3.0, 59.0);
        }
        assert_eq!(engine.metrics().active_effects, MAX_EFFECTS);
    }

    #[test]
    fn reset_matches_fresh_engine() {
        let config = LightningConfig::default();
        let mut used = LightningEngine::new(120.0, 40.0, config.clone(), 31);
        used.spawn_from_click(60.0, 30.0);
        used.update(250.0);
        used.reset();

        let mut fresh = LightningEngine::new(120.0, 40.0, config, 31);
        for _ in 0..80 {
            used.update(33.0);
            fresh.update(33.0);
            let a: Vec<_> = used.entities().map(|e| (e.x, e.y, e.life)).collect();
            let b: Vec<_> = fresh.entities().map(|e| (e.x, e.y, e.life)).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn bad_preset_leaves_state_alone() {
        let mut engine = LightningEngine::new(100.0, 40.0, quiet_config(), 3);
        engine.spawn_strike(50.0, 39.0);
        let before = engine.metrics();
        assert!(!engine.apply_preset("hurricane"));
        assert_eq!(engine.metrics(), before);
        assert!(engine.apply_preset("distant"));
    }
}
