use glam::{Mat4, Quat, Vec3};

use crate::calibration::Eye;
use crate::geometry::PanelGeometry;

/// Visibility tag restricting a quad to one eye's render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderLayer {
    LeftEye,
    RightEye,
}

impl RenderLayer {
    pub fn for_eye(eye: Eye) -> Self {
        match eye {
            Eye::Left => RenderLayer::LeftEye,
            Eye::Right => RenderLayer::RightEye,
        }
    }

    pub fn eye(self) -> Eye {
        match self {
            RenderLayer::LeftEye => Eye::Left,
            RenderLayer::RightEye => Eye::Right,
        }
    }

    fn bit(self) -> u32 {
        // Layer 0 is the default scene layer; the eye layers sit above it.
        match self {
            RenderLayer::LeftEye => 1 << 1,
            RenderLayer::RightEye => 1 << 2,
        }
    }
}

/// Set of layers a camera is allowed to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);

    pub fn only(layer: RenderLayer) -> Self {
        Self(layer.bit())
    }

    pub fn both_eyes() -> Self {
        Self(RenderLayer::LeftEye.bit() | RenderLayer::RightEye.bit())
    }

    pub fn enable(&mut self, layer: RenderLayer) {
        self.0 |= layer.bit();
    }

    pub fn disable(&mut self, layer: RenderLayer) {
        self.0 &= !layer.bit();
    }

    pub fn contains(&self, layer: RenderLayer) -> bool {
        self.0 & layer.bit() != 0
    }
}

/// Layer masks of the flat preview camera and the two headset eye cameras.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraLayers {
    pub preview: LayerMask,
    pub left: LayerMask,
    pub right: LayerMask,
}

impl CameraLayers {
    pub fn eye(&self, eye: Eye) -> LayerMask {
        match eye {
            Eye::Left => self.left,
            Eye::Right => self.right,
        }
    }

    /// Restricts each eye camera to its own layer. Runs on session start so a
    /// camera never samples the other eye's quad, wherever the quads sit.
    pub fn restrict_to_own_eye(&mut self) {
        for eye in Eye::BOTH {
            let own = RenderLayer::for_eye(eye);
            let other = RenderLayer::for_eye(eye.other());
            let mask = match eye {
                Eye::Left => &mut self.left,
                Eye::Right => &mut self.right,
            };
            mask.enable(own);
            mask.disable(other);
        }
    }
}

impl Default for CameraLayers {
    fn default() -> Self {
        Self {
            preview: LayerMask::both_eyes(),
            left: LayerMask::both_eyes(),
            right: LayerMask::both_eyes(),
        }
    }
}

/// The two physical quads. `A` carries the left source image, `B` the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuadId {
    A,
    B,
}

impl QuadId {
    pub fn source_eye(self) -> Eye {
        match self {
            QuadId::A => Eye::Left,
            QuadId::B => Eye::Right,
        }
    }
}

/// Transform of a quad relative to the panel group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    /// Roll about the quad normal, in radians.
    pub rotation_z: f32,
}

impl LocalTransform {
    pub const IDENTITY: LocalTransform = LocalTransform {
        position: Vec3::ZERO,
        rotation_z: 0.0,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_z(self.rotation_z), self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub id: QuadId,
    pub layer: RenderLayer,
    pub local: LocalTransform,
}

/// A fixed pair of quads sharing one geometry, each tagged for exactly one eye.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoRig {
    quads: [Quad; 2],
    geometry: PanelGeometry,
    swapped: bool,
}

impl StereoRig {
    pub fn new(geometry: PanelGeometry) -> Self {
        let mut rig = Self {
            quads: [
                Quad {
                    id: QuadId::A,
                    layer: RenderLayer::LeftEye,
                    local: LocalTransform::IDENTITY,
                },
                Quad {
                    id: QuadId::B,
                    layer: RenderLayer::RightEye,
                    local: LocalTransform::IDENTITY,
                },
            ],
            geometry,
            swapped: false,
        };
        rig.assign_layers();
        rig
    }

    /// Exchanges which eye layer each quad is tagged with. Applying it twice
    /// restores the original mapping.
    pub fn swap(&mut self) {
        self.swapped = !self.swapped;
        self.assign_layers();
        tracing::debug!(swapped = self.swapped, "swapped eye assignment");
    }

    pub fn set_swapped(&mut self, swapped: bool) {
        self.swapped = swapped;
        self.assign_layers();
    }

    pub fn swapped(&self) -> bool {
        self.swapped
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Replaces the geometry of both quads in one assignment.
    pub fn set_geometry(&mut self, geometry: PanelGeometry) {
        self.geometry = geometry;
    }

    pub fn quads(&self) -> &[Quad; 2] {
        &self.quads
    }

    pub fn quad(&self, id: QuadId) -> &Quad {
        &self.quads[Self::slot(id)]
    }

    /// The quad currently tagged for `eye`.
    pub fn quad_for_eye(&self, eye: Eye) -> &Quad {
        &self.quads[self.slot_for_eye(eye)]
    }

    pub fn set_local(&mut self, eye: Eye, local: LocalTransform) {
        let slot = self.slot_for_eye(eye);
        self.quads[slot].local = local;
    }

    /// Quads a camera with `mask` is allowed to draw.
    pub fn visible_to(&self, mask: LayerMask) -> impl Iterator<Item = &Quad> {
        self.quads
            .iter()
            .filter(move |quad| mask.contains(quad.layer))
    }

    fn assign_layers(&mut self) {
        let (a, b) = if self.swapped {
            (RenderLayer::RightEye, RenderLayer::LeftEye)
        } else {
            (RenderLayer::LeftEye, RenderLayer::RightEye)
        };
        self.quads[Self::slot(QuadId::A)].layer = a;
        self.quads[Self::slot(QuadId::B)].layer = b;
    }

    fn slot(id: QuadId) -> usize {
        match id {
            QuadId::A => 0,
            QuadId::B => 1,
        }
    }

    fn slot_for_eye(&self, eye: Eye) -> usize {
        let layer = RenderLayer::for_eye(eye);
        if self.quads[0].layer == layer {
            0
        } else {
            1
        }
    }
}
