use crate::error::{require_positive, StereoError};

pub const DEFAULT_PANEL_WIDTH: f32 = 1.8;
pub const DEFAULT_VIEW_DISTANCE: f32 = 2.0;

/// Panel size and distance from the viewer, both in metres.
///
/// Both values are always strictly positive; setters reject anything else and
/// keep the previous value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    panel_width: f32,
    view_distance: f32,
}

impl ViewerConfig {
    pub fn new(panel_width: f32, view_distance: f32) -> Result<Self, StereoError> {
        Ok(Self {
            panel_width: require_positive("panel width", panel_width)?,
            view_distance: require_positive("view distance", view_distance)?,
        })
    }

    pub fn panel_width(&self) -> f32 {
        self.panel_width
    }

    pub fn view_distance(&self) -> f32 {
        self.view_distance
    }

    /// Returns `Ok(true)` when the stored width actually changed.
    pub fn set_panel_width(&mut self, width: f32) -> Result<bool, StereoError> {
        let width = require_positive("panel width", width)?;
        let changed = width != self.panel_width;
        self.panel_width = width;
        Ok(changed)
    }

    /// Returns `Ok(true)` when the stored distance actually changed.
    pub fn set_view_distance(&mut self, distance: f32) -> Result<bool, StereoError> {
        let distance = require_positive("view distance", distance)?;
        let changed = distance != self.view_distance;
        self.view_distance = distance;
        Ok(changed)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            panel_width: DEFAULT_PANEL_WIDTH,
            view_distance: DEFAULT_VIEW_DISTANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_keeps_last_value() {
        let mut config = ViewerConfig::new(2.0, 1.5).unwrap();
        assert!(config.set_panel_width(0.0).is_err());
        assert!(config.set_view_distance(-3.0).is_err());
        assert_eq!(config.panel_width(), 2.0);
        assert_eq!(config.view_distance(), 1.5);
    }

    #[test]
    fn reports_whether_value_changed() {
        let mut config = ViewerConfig::default();
        assert_eq!(config.set_panel_width(DEFAULT_PANEL_WIDTH), Ok(false));
        assert_eq!(config.set_panel_width(2.5), Ok(true));
        assert_eq!(config.set_view_distance(3.0), Ok(true));
    }

    #[test]
    fn constructor_validates_both_fields() {
        assert!(matches!(
            ViewerConfig::new(1.0, 0.0),
            Err(StereoError::InvalidConfigValue {
                field: "view distance",
                ..
            })
        ));
        assert!(ViewerConfig::new(f32::NAN, 1.0).is_err());
    }
}
