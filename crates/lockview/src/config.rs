//! Viewer configuration loaded from `lockview.yaml`.

use crate::diagram::DEFAULT_HIT_TARGET_WIDTH;
use crate::domain::{ModifierKey, SelectionLayout};
use crate::error::{Error, Result};
use lockview_transform::Rect;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "lockview.yaml";

/// Default container width for headless sessions.
pub const DEFAULT_CONTAINER_WIDTH: f64 = 1280.0;

/// Default container height for headless sessions.
pub const DEFAULT_CONTAINER_HEIGHT: f64 = 800.0;

/// Viewer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Modifier that turns an edge click into an exclusion toggle.
    pub toggle_modifier: ModifierKey,

    /// Layout used once an edge is selected.
    pub selection_layout: SelectionLayout,

    /// Stroke width of the invisible click target over each edge.
    pub hit_target_width: f64,

    /// Container size for headless sessions.
    pub container: ContainerConfig,
}

/// Container size section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ContainerConfig {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Whether mounted views receive resize notifications. Without them,
    /// each resize updates the projection directly.
    pub observe_resize: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CONTAINER_WIDTH,
            height: DEFAULT_CONTAINER_HEIGHT,
            observe_resize: true,
        }
    }
}

impl ContainerConfig {
    /// The container's bounding box, anchored at the origin.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            toggle_modifier: ModifierKey::default(),
            selection_layout: SelectionLayout::default(),
            hit_target_width: DEFAULT_HIT_TARGET_WIDTH,
            container: ContainerConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it is not valid YAML or fails validation.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid YAML or fails
    /// validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first invalid key.
    pub fn validate(&self) -> Result<()> {
        if !(self.hit_target_width.is_finite() && self.hit_target_width > 0.0) {
            return Err(Error::Config(format!(
                "hit-target-width must be a positive number, got {}",
                self.hit_target_width
            )));
        }
        for (key, value) in [
            ("container.width", self.container.width),
            ("container.height", self.container.height),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Config(format!(
                    "{key} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.toggle_modifier, ModifierKey::Ctrl);
        assert_eq!(config.selection_layout, SelectionLayout::DetailFocus);
        assert!((config.hit_target_width - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.container.rect(), Rect::new(0.0, 0.0, 1280.0, 800.0));
        assert!(config.container.observe_resize);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ViewerConfig::from_yaml("toggle-modifier: shift\n").unwrap();
        assert_eq!(config.toggle_modifier, ModifierKey::Shift);
        assert_eq!(config.selection_layout, SelectionLayout::DetailFocus);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "\
toggle-modifier: meta
selection-layout: side-by-side
hit-target-width: 14.5
container:
  width: 640
  height: 480
  observe-resize: false
";
        let config = ViewerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.toggle_modifier, ModifierKey::Meta);
        assert_eq!(config.selection_layout, SelectionLayout::SideBySide);
        assert!((config.hit_target_width - 14.5).abs() < f64::EPSILON);
        assert_eq!(config.container.rect(), Rect::new(0.0, 0.0, 640.0, 480.0));
        assert!(!config.container.observe_resize);
    }

    #[rstest]
    #[case::zero_width("hit-target-width: 0")]
    #[case::negative_width("hit-target-width: -3")]
    #[case::bad_modifier("toggle-modifier: hyper")]
    #[case::unknown_key("zoom-speed: 2")]
    #[case::negative_container("container:\n  width: -1\n")]
    fn test_invalid_config(#[case] yaml: &str) {
        assert!(matches!(
            ViewerConfig::from_yaml(yaml),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ViewerConfig::load(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[tokio::test]
    async fn test_load_round_trips_saved_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = ViewerConfig {
            toggle_modifier: ModifierKey::Alt,
            ..ViewerConfig::default()
        };
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        assert_eq!(ViewerConfig::load(&path).await.unwrap(), config);
    }
}
