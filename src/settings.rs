use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub fireworks: EffectSettings,
    #[serde(default)]
    pub lightning: EffectSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct DisplaySettings {
    /// Startup color scheme (0-9), same mapping as the shift-digit keys
    pub scheme: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EffectSettings {
    /// Preset applied at startup when no --preset flag is given
    pub preset: Option<String>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termfx")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_settings() {
        let settings: Settings = toml::from_str(
            r#"
[display]
scheme = 5

[fireworks]
preset = "finale"
"#,
        )
        .unwrap();
        assert_eq!(settings.display.scheme, Some(5));
        assert_eq!(settings.fireworks.preset.as_deref(), Some("finale"));
        assert!(settings.lightning.preset.is_none());
    }
}
