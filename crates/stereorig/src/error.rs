use crate::calibration::Eye;

/// Non-fatal conditions surfaced to whoever drives the viewer.
///
/// None of these stop the render loop; the state that was valid before the
/// failure stays in place and the error is handed to the UI through
/// [`ViewerState::take_reports`](crate::ViewerState::take_reports).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StereoError {
    #[error("failed to load {eye} image: {reason}")]
    ImageLoadFailure { eye: Eye, reason: String },
    #[error("headset presentation unavailable: {0}")]
    UnsupportedDisplay(String),
    #[error("{field} must be a positive finite number (got {value})")]
    InvalidConfigValue { field: &'static str, value: f32 },
}

impl StereoError {
    pub fn image_load(eye: Eye, reason: impl Into<String>) -> Self {
        Self::ImageLoadFailure {
            eye,
            reason: reason.into(),
        }
    }
}

pub(crate) fn require_positive(field: &'static str, value: f32) -> Result<f32, StereoError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(StereoError::InvalidConfigValue { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_negative_and_nan() {
        assert!(require_positive("width", 0.0).is_err());
        assert!(require_positive("width", -1.0).is_err());
        assert!(require_positive("width", f32::NAN).is_err());
        assert!(require_positive("width", f32::INFINITY).is_err());
        assert_eq!(require_positive("width", 0.5), Ok(0.5));
    }

    #[test]
    fn messages_name_the_eye() {
        let err = StereoError::image_load(Eye::Right, "truncated PNG");
        assert_eq!(err.to_string(), "failed to load right image: truncated PNG");
    }
}
