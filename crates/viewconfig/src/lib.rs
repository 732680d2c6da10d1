use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Serializer;
use serde::{Deserialize, Serialize};
use stereorig::{
    EyeCalibration, EyeTransform, PlacementMode, PlacementTuning, PreviewCompositor, ViewerConfig,
    ViewerSettings, DEFAULT_PANEL_WIDTH, DEFAULT_PREVIEW_SPACING, DEFAULT_VIEW_DISTANCE,
};

pub const CONFIG_FILE_NAME: &str = "stereopane.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Contents of `stereopane.toml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewConfig {
    pub version: u32,
    #[serde(default)]
    pub panel: PanelSection,
    #[serde(default)]
    pub placement: PlacementSection,
    #[serde(default)]
    pub preview: PreviewSection,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub calibration: CalibrationSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PanelSection {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_distance")]
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementSetting {
    #[default]
    World,
    Head,
}

impl From<PlacementSetting> for PlacementMode {
    fn from(setting: PlacementSetting) -> Self {
        match setting {
            PlacementSetting::World => PlacementMode::WorldAnchored,
            PlacementSetting::Head => PlacementMode::HeadLocked,
        }
    }
}

impl FromStr for PlacementSetting {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "world" | "anchored" => Ok(Self::World),
            "head" | "locked" => Ok(Self::Head),
            other => Err(format!(
                "invalid placement mode '{other}'; expected 'world' or 'head'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlacementSection {
    #[serde(default)]
    pub mode: PlacementSetting,
    #[serde(default)]
    pub x_offset: f32,
    #[serde(default = "default_y_offset")]
    pub y_offset: f32,
    /// Degrees.
    #[serde(default)]
    pub tilt: f32,
    #[serde(default = "default_nudge_step")]
    pub nudge_step: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PreviewSection {
    #[serde(default = "default_spacing")]
    pub spacing: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RenderSection {
    #[serde(
        default,
        deserialize_with = "deserialize_antialias_opt",
        serialize_with = "serialize_antialias_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub antialias: Option<AntialiasSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CalibrationSection {
    #[serde(default)]
    pub left: EyeSection,
    #[serde(default)]
    pub right: EyeSection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct EyeSection {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// Degrees.
    #[serde(default)]
    pub rotation: f32,
}

impl From<EyeSection> for EyeTransform {
    fn from(section: EyeSection) -> Self {
        EyeTransform::new(section.x, section.y, section.rotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

impl FromStr for AntialiasSetting {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_antialias(raw)
    }
}

fn default_width() -> f32 {
    DEFAULT_PANEL_WIDTH
}

fn default_distance() -> f32 {
    DEFAULT_VIEW_DISTANCE
}

fn default_y_offset() -> f32 {
    PlacementTuning::default().y_offset
}

fn default_nudge_step() -> f32 {
    PlacementTuning::default().nudge_step
}

fn default_spacing() -> f32 {
    DEFAULT_PREVIEW_SPACING
}

impl Default for PanelSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            distance: default_distance(),
        }
    }
}

impl Default for PlacementSection {
    fn default() -> Self {
        Self {
            mode: PlacementSetting::default(),
            x_offset: 0.0,
            y_offset: default_y_offset(),
            tilt: 0.0,
            nudge_step: default_nudge_step(),
        }
    }
}

impl Default for PreviewSection {
    fn default() -> Self {
        Self {
            spacing: default_spacing(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            version: 1,
            panel: PanelSection::default(),
            placement: PlacementSection::default(),
            preview: PreviewSection::default(),
            render: RenderSection::default(),
            calibration: CalibrationSection::default(),
        }
    }
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

fn serialize_antialias_opt<S>(
    value: &Option<AntialiasSetting>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        None => serializer.serialize_none(),
        Some(AntialiasSetting::Auto) => serializer.serialize_str("auto"),
        Some(AntialiasSetting::Off) => serializer.serialize_str("off"),
        Some(setting) => serializer.serialize_u32(setting.samples().unwrap_or(1)),
    }
}

fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

fn require_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be a positive number (got {value})"
        )))
    }
}

fn require_finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be finite")))
    }
}

impl ViewConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ViewConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        require_positive("panel.width", self.panel.width)?;
        require_positive("panel.distance", self.panel.distance)?;
        require_positive("placement.nudge_step", self.placement.nudge_step)?;
        require_positive("preview.spacing", self.preview.spacing)?;
        require_finite("placement.x_offset", self.placement.x_offset)?;
        require_finite("placement.y_offset", self.placement.y_offset)?;
        require_finite("placement.tilt", self.placement.tilt)?;

        for (eye, section) in [("left", &self.calibration.left), ("right", &self.calibration.right)]
        {
            require_finite(&format!("calibration.{eye}.x"), section.x)?;
            require_finite(&format!("calibration.{eye}.y"), section.y)?;
            require_finite(&format!("calibration.{eye}.rotation"), section.rotation)?;
        }

        Ok(())
    }

    /// Initial viewer state described by this file.
    pub fn viewer_settings(&self) -> Result<ViewerSettings, ConfigError> {
        let config = ViewerConfig::new(self.panel.width, self.panel.distance)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(ViewerSettings {
            config,
            placement_mode: self.placement.mode.into(),
            tuning: PlacementTuning {
                x_offset: self.placement.x_offset,
                y_offset: self.placement.y_offset,
                tilt_deg: self.placement.tilt,
                nudge_step: self.placement.nudge_step,
            },
            preview: PreviewCompositor::new(self.preview.spacing),
            calibration: EyeCalibration::new(
                self.calibration.left.into(),
                self.calibration.right.into(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[panel]
width = 2.4
distance = 3.0

[placement]
mode = "head"
y_offset = 0.0
tilt = -5.0

[render]
antialias = 4

[calibration.right]
x = 0.004
rotation = -0.3
"#;

    #[test]
    fn parses_sample_config() {
        let config = ViewConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.panel.width, 2.4);
        assert_eq!(config.placement.mode, PlacementSetting::Head);
        assert_eq!(config.placement.nudge_step, 0.02);
        assert_eq!(config.preview.spacing, DEFAULT_PREVIEW_SPACING);
        assert_eq!(config.render.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(config.calibration.left, EyeSection::default());
        assert_eq!(config.calibration.right.rotation, -0.3);
    }

    #[test]
    fn version_only_file_yields_defaults() {
        let config = ViewConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.placement.y_offset, 0.12);
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = ViewConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_width() {
        let err = ViewConfig::from_toml_str("version = 1\n[panel]\nwidth = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("panel.width")));
    }

    #[test]
    fn rejects_unknown_placement_mode() {
        let err = ViewConfig::from_toml_str("version = 1\n[placement]\nmode = \"orbit\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn converts_into_viewer_settings() {
        let settings = ViewConfig::from_toml_str(SAMPLE)
            .unwrap()
            .viewer_settings()
            .unwrap();
        assert_eq!(settings.config.panel_width(), 2.4);
        assert_eq!(settings.config.view_distance(), 3.0);
        assert_eq!(settings.placement_mode, PlacementMode::HeadLocked);
        assert_eq!(settings.tuning.tilt_deg, -5.0);
        assert_eq!(
            settings.calibration.get(stereorig::Eye::Right),
            EyeTransform::new(0.004, 0.0, -0.3)
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, ViewConfig::default());
        assert!(matches!(
            ViewConfig::load(&dir.path().join(CONFIG_FILE_NAME)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn default_round_trips_through_toml() {
        let text = ViewConfig::default().to_toml_string().unwrap();
        assert_eq!(ViewConfig::from_toml_str(&text).unwrap(), ViewConfig::default());
    }

    #[test]
    fn antialias_sample_count_survives_serialisation() {
        let mut config = ViewConfig::default();
        config.render.antialias = Some(AntialiasSetting::Samples4);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("antialias = 4"));
        assert_eq!(ViewConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn parses_antialias_aliases() {
        assert_eq!("max".parse::<AntialiasSetting>(), Ok(AntialiasSetting::Auto));
        assert_eq!("none".parse::<AntialiasSetting>(), Ok(AntialiasSetting::Off));
        assert!("3".parse::<AntialiasSetting>().is_err());
        assert_eq!(" Head ".parse::<PlacementSetting>(), Ok(PlacementSetting::Head));
    }
}
