use mindmapx_engine::{RenderOptions, SyncSettings, ViewSettings, ViewportLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalid { config_path: PathBuf, reason: String },
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root that relative document paths resolve against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_path: Option<PathBuf>,
    pub render: RenderOptions,
    pub sync: SyncSettings,
    pub viewport: ViewportLimits,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        // Expand shell variables and tilde in the loaded notes path
        config.notes_path = config
            .notes_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/mindmapx");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Settings for a new diagram view
    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            render: self.render.clone(),
            sync: self.sync.clone(),
            viewport: self.viewport.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let v = &self.viewport;
        if !(v.min_scale > 0.0 && v.min_scale <= v.max_scale) {
            return Err(format!(
                "viewport scale range {}..{} must be positive and ordered",
                v.min_scale, v.max_scale
            ));
        }
        if v.zoom_in_factor <= 1.0 || !(v.zoom_out_factor > 0.0 && v.zoom_out_factor < 1.0) {
            return Err("zoom_in_factor must be > 1 and zoom_out_factor in (0, 1)".to_string());
        }
        if !v.scroll_sensitivity.is_finite() || v.scroll_sensitivity <= 0.0 {
            return Err("scroll_sensitivity must be positive".to_string());
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/mindmapx/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.render.color_freeze_level, 2);
        assert_eq!(config.render.duration_ms, 300);
        assert_eq!(config.render.max_width, 300);
        assert_eq!(config.sync.debounce_ms, 300);
        assert_eq!(config.viewport.max_scale, 5.0);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[sync]
debounce_ms = 50

[viewport]
max_scale = 3.0
"#,
        )
        .unwrap();

        assert_eq!(config.sync.debounce_ms, 50);
        assert!(!config.sync.trailing);
        assert_eq!(config.viewport.max_scale, 3.0);
        assert_eq!(config.viewport.min_scale, 0.1);
        assert_eq!(config.render, RenderOptions::default());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_path(temp_dir.path().join("nonexistent.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut config = Config {
            notes_path: Some(PathBuf::from("/tmp/test-notes")),
            ..Config::default()
        };
        config.render.max_width = 120;
        config.sync.trailing = true;

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[render\nmax_width = ").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_inverted_scale_range_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[viewport]\nmin_scale = 4.0\nmax_scale = 2.0\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_notes_path_with_env_var() {
        unsafe {
            env::set_var("MINDMAPX_TEST_NOTES", "/custom/notes");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "notes_path = \"$MINDMAPX_TEST_NOTES/my-notes\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.notes_path, Some(PathBuf::from("/custom/notes/my-notes")));

        unsafe {
            env::remove_var("MINDMAPX_TEST_NOTES");
        }
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/test/path")).unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_view_settings_carry_sections() {
        let mut config = Config::default();
        config.viewport.zoom_in_factor = 2.0;
        let settings = config.view_settings();
        assert_eq!(settings.viewport.zoom_in_factor, 2.0);
        assert_eq!(settings.render, config.render);
    }
}
