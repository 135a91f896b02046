/// Types of screensavers available
#[derive(Clone, Copy, PartialEq)]
pub enum SaverType {
    Fireworks, // Launching shells with secondary bursts and sparkles
    Lightning, // Branching bolts
    Plasma,    // Animated interference field
    Tunnel,    // Perspective rings
}

/// Shared per-run options from the CLI
#[derive(Clone)]
pub struct SaverConfig {
    pub saver_type: SaverType,
    pub time_step: f32,
    pub seed: Option<u64>,
    pub preset: Option<String>,
}

/// Tuning for the fireworks simulation.
///
/// All distances are terminal cells, all speeds cells per second.
#[derive(Clone, Debug)]
pub struct FireworksConfig {
    /// Particles in a primary explosion ring
    pub burst_size: usize,
    /// Initial upward speed of a launching shell
    pub launch_speed: f64,
    pub gravity: f64,
    /// Life fraction lost per second
    pub fade_rate: f64,
    /// Automatic launch cadence
    pub spawn_interval_ms: f64,
    /// Ring-buffer capacity of each particle's trail
    pub trail_length: usize,
    /// Per-frame probability that an eligible particle sheds sparkles
    pub sparkle_chance: f64,
    /// Recursion ceiling for secondary bursts
    pub max_burst_depth: u8,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            burst_size: 60,
            launch_speed: 16.0,
            gravity: 9.0,
            fade_rate: 0.45,
            spawn_interval_ms: 1400.0,
            trail_length: 5,
            sparkle_chance: 0.08,
            max_burst_depth: 3,
        }
    }
}

impl FireworksConfig {
    /// Look up a named preset. Unknown names return None.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::default()),
            "finale" => Some(Self {
                burst_size: 90,
                spawn_interval_ms: 700.0,
                sparkle_chance: 0.15,
                ..Self::default()
            }),
            "sparklers" => Some(Self {
                burst_size: 40,
                fade_rate: 0.6,
                sparkle_chance: 0.35,
                max_burst_depth: 1,
                ..Self::default()
            }),
            _ => None,
        }
    }
}

/// Tuning for the lightning simulation.
#[derive(Clone, Debug)]
pub struct LightningConfig {
    /// Base chance of a child branch at each interior waypoint (halved per depth)
    pub branch_probability: f64,
    /// Automatic strike cadence
    pub strike_interval_ms: f64,
    /// Recursion ceiling for branches
    pub max_branch_depth: u8,
    /// Perpendicular jitter amplitude of the main path, in cells
    pub main_path_jaggedness: f64,
    /// Angular spread of child branches off the parent direction, radians
    pub branch_spread: f64,
    /// Thickness of the main path (branches thin out per depth)
    pub thickness: u16,
    /// How long a bolt takes to fade after the strike flash
    pub fade_time_ms: f64,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            branch_probability: 0.35,
            strike_interval_ms: 1800.0,
            max_branch_depth: 3,
            main_path_jaggedness: 7.0,
            branch_spread: 0.55,
            thickness: 3,
            fade_time_ms: 400.0,
        }
    }
}

impl LightningConfig {
    /// Look up a named preset. Unknown names return None.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "storm" => Some(Self::default()),
            "distant" => Some(Self {
                branch_probability: 0.2,
                strike_interval_ms: 3200.0,
                thickness: 1,
                fade_time_ms: 650.0,
                ..Self::default()
            }),
            "strobe" => Some(Self {
                branch_probability: 0.5,
                strike_interval_ms: 600.0,
                fade_time_ms: 180.0,
                ..Self::default()
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configs_are_sane() {
        let fw = FireworksConfig::default();
        assert!(fw.burst_size > 0);
        assert!(fw.fade_rate > 0.0);
        assert!(fw.max_burst_depth >= 1);

        let lt = LightningConfig::default();
        assert!(lt.max_branch_depth >= 1);
        assert!(lt.thickness >= 1);
        assert!(lt.fade_time_ms > 0.0);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(FireworksConfig::preset("nope").is_none());
        assert!(LightningConfig::preset("nope").is_none());
        assert!(FireworksConfig::preset("finale").is_some());
        assert!(LightningConfig::preset("distant").is_some());
    }
}
