use crate::calibration::Eye;

/// A decoded image together with its pixel dimensions.
///
/// `I` is whatever the decoding collaborator produces (an RGBA buffer in the
/// renderer, `()` in tests); the rig only ever reads the dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeImage<I> {
    pub width: u32,
    pub height: u32,
    pub pixels: I,
}

impl<I> EyeImage<I> {
    pub fn new(width: u32, height: u32, pixels: I) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Left and right images, always replaced together.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoTexturePair<I> {
    left: EyeImage<I>,
    right: EyeImage<I>,
}

impl<I> StereoTexturePair<I> {
    pub fn new(left: EyeImage<I>, right: EyeImage<I>) -> Self {
        if (left.width, left.height) != (right.width, right.height) {
            tracing::warn!(
                left_width = left.width,
                left_height = left.height,
                right_width = right.width,
                right_height = right.height,
                "stereo pair dimensions differ; right image will be stretched to the left aspect"
            );
        }
        Self { left, right }
    }

    pub fn image(&self, eye: Eye) -> &EyeImage<I> {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    pub fn left(&self) -> &EyeImage<I> {
        &self.left
    }

    pub fn right(&self) -> &EyeImage<I> {
        &self.right
    }
}

/// Most recently supplied source for each eye.
///
/// A single side is a natural precondition, not an error: nothing is emitted
/// until both eyes have a source.
#[derive(Debug, Clone)]
pub struct StagedPair<S> {
    left: Option<S>,
    right: Option<S>,
}

impl<S: Clone> StagedPair<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `source` for `eye` and returns the full pair when both sides
    /// are present.
    pub fn stage(&mut self, eye: Eye, source: S) -> Option<(S, S)> {
        match eye {
            Eye::Left => self.left = Some(source),
            Eye::Right => self.right = Some(source),
        }
        let pair = self.complete();
        if pair.is_none() {
            tracing::debug!(%eye, "staged image; waiting for the other eye");
        }
        pair
    }

    pub fn complete(&self) -> Option<(S, S)> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Some((left.clone(), right.clone())),
            _ => None,
        }
    }

    pub fn get(&self, eye: Eye) -> Option<&S> {
        match eye {
            Eye::Left => self.left.as_ref(),
            Eye::Right => self.right.as_ref(),
        }
    }
}

impl<S> Default for StagedPair<S> {
    fn default() -> Self {
        Self {
            left: None,
            right: None,
        }
    }
}
