use std::fmt;

/// One of the viewer's two eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn other(self) -> Self {
        match self {
            Eye::Left => Eye::Right,
            Eye::Right => Eye::Left,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eye::Left => f.write_str("left"),
            Eye::Right => f.write_str("right"),
        }
    }
}

/// Fine correction applied to a single eye's quad, local to that quad.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EyeTransform {
    pub offset_x: f32,
    pub offset_y: f32,
    /// Roll about the quad normal, in degrees.
    pub rotation_deg: f32,
}

impl EyeTransform {
    pub fn new(offset_x: f32, offset_y: f32, rotation_deg: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            rotation_deg,
        }
    }

    pub fn rotation_rad(&self) -> f32 {
        self.rotation_deg.to_radians()
    }

    pub fn nudged(&self, dx: f32, dy: f32, drotation: f32) -> Self {
        Self {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            rotation_deg: self.rotation_deg + drotation,
        }
    }
}

/// Per-eye calibration values. Writes snap immediately; the next frame picks
/// them up without interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EyeCalibration {
    eyes: [EyeTransform; 2],
}

impl EyeCalibration {
    pub fn new(left: EyeTransform, right: EyeTransform) -> Self {
        Self {
            eyes: [left, right],
        }
    }

    pub fn get(&self, eye: Eye) -> EyeTransform {
        self.eyes[eye.index()]
    }

    /// Replaces one eye's values and reports whether anything changed.
    pub fn set(&mut self, eye: Eye, transform: EyeTransform) -> bool {
        let slot = &mut self.eyes[eye.index()];
        if *slot == transform {
            return false;
        }
        *slot = transform;
        true
    }

    pub fn nudge(&mut self, eye: Eye, dx: f32, dy: f32, drotation: f32) -> EyeTransform {
        let next = self.get(eye).nudged(dx, dy, drotation);
        self.set(eye, next);
        next
    }
}
