//! End-to-end scenarios for the effect engines, driven like a pattern would
//! drive them: a trigger or two, then a fixed cadence of update calls.

use termfx::config::{FireworksConfig, LightningConfig};
use termfx::engine::{FireworksEngine, LightningEngine, MAX_PARTICLES, MAX_POINTS_PER_STRIKE};

fn quiet_fireworks(config: FireworksConfig) -> FireworksConfig {
    FireworksConfig {
        spawn_interval_ms: f64::INFINITY,
        ..config
    }
}

#[test]
fn saturated_firework_stays_capped_and_shallow() {
    // Worst-case recursion pressure: maximum sparkle rate, full burst depth.
    let config = quiet_fireworks(FireworksConfig {
        burst_size: 60,
        max_burst_depth: 3,
        sparkle_chance: 1.0,
        ..FireworksConfig::default()
    });
    let mut engine = FireworksEngine::new(160.0, 48.0, config, 1234);
    engine.spawn_primary(80.0, 47.0);

    for _ in 0..100 {
        engine.update(100.0);
        let m = engine.metrics();
        assert!(
            m.total_particles <= MAX_PARTICLES,
            "particle cap exceeded: {}",
            m.total_particles
        );
        assert_eq!(m.total_particles, m.normal + m.sparkle);
        // Recursion is cut at the depth 2 -> 3 boundary.
        assert_eq!(m.by_depth[3], 0);
    }
}

#[test]
fn five_simultaneous_bursts_respect_the_live_recount() {
    // Five controllers, each pre-loaded with 60 explosion-eligible particles
    // (click rings are 1.5 x 40), all bursting within a few frames of each
    // other. The later admissions must see the earlier grants.
    let config = quiet_fireworks(FireworksConfig {
        burst_size: 40,
        max_burst_depth: 3,
        sparkle_chance: 0.0,
        ..FireworksConfig::default()
    });
    let mut engine = FireworksEngine::new(200.0, 60.0, config, 77);
    for i in 0..5 {
        engine.spawn_from_click(30.0 + i as f64 * 30.0, 30.0);
    }
    assert_eq!(engine.metrics().total_particles, 300);

    for _ in 0..120 {
        engine.update(100.0);
        let m = engine.metrics();
        assert!(
            m.total_particles <= MAX_PARTICLES,
            "particle cap exceeded: {}",
            m.total_particles
        );
        assert_eq!(m.total_particles, m.normal + m.sparkle);
    }
}

#[test]
fn both_engines_drain_after_reset() {
    let mut fireworks =
        FireworksEngine::new(120.0, 40.0, quiet_fireworks(FireworksConfig::default()), 5);
    fireworks.spawn_from_click(60.0, 20.0);
    fireworks.update(33.0);
    fireworks.reset();
    assert_eq!(fireworks.metrics().total_particles, 0);
    assert_eq!(fireworks.metrics().active_effects, 0);

    let config = LightningConfig {
        strike_interval_ms: f64::INFINITY,
        ..LightningConfig::default()
    };
    let mut lightning = LightningEngine::new(120.0, 40.0, config, 5);
    lightning.spawn_from_click(60.0, 39.0);
    lightning.update(33.0);
    lightning.reset();
    assert_eq!(lightning.metrics().total_bolt_points, 0);
    assert_eq!(lightning.metrics().active_effects, 0);
}

#[test]
fn rapid_clicks_never_blow_either_budget() {
    let fw_config = quiet_fireworks(FireworksConfig {
        burst_size: 120,
        sparkle_chance: 1.0,
        ..FireworksConfig::default()
    });
    let mut fireworks = FireworksEngine::new(200.0, 60.0, fw_config, 9);

    let lt_config = LightningConfig {
        strike_interval_ms: f64::INFINITY,
        branch_probability: 1.0,
        ..LightningConfig::default()
    };
    let mut lightning = LightningEngine::new(200.0, 60.0, lt_config, 9);

    for frame in 0..200u32 {
        if frame % 3 == 0 {
            let x = 10.0 + (frame % 17) as f64 * 10.0;
            fireworks.spawn_from_click(x, 30.0);
            lightning.spawn_from_click(x, 59.0);
        }
        fireworks.update(33.0);
        lightning.update(33.0);

        assert!(fireworks.metrics().total_particles <= MAX_PARTICLES);
        // Per-strike budget, summed over at most 8 live strikes.
        let strikes = lightning.strikes().len();
        assert!(lightning.metrics().total_bolt_points <= strikes * MAX_POINTS_PER_STRIKE);
    }
}

#[test]
fn automatic_spawning_honors_the_interval() {
    let config = FireworksConfig {
        spawn_interval_ms: 500.0,
        ..FireworksConfig::default()
    };
    let mut engine = FireworksEngine::new(120.0, 40.0, config, 13);

    // Nothing fires before the first interval elapses.
    engine.update(400.0);
    assert_eq!(engine.metrics().active_effects, 0);

    engine.update(200.0);
    assert_eq!(engine.metrics().active_effects, 1);
}
