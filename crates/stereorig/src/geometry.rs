use crate::texture::EyeImage;

/// Aspect used when an image reports a zero dimension.
const FALLBACK_DIMENSIONS: (u32, u32) = (1920, 1080);

/// Size of the quad shared by both eyes, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub width: f32,
    pub height: f32,
}

impl PanelGeometry {
    /// Derives the panel height from `width` and the image's aspect ratio.
    pub fn for_image<I>(width: f32, image: &EyeImage<I>) -> Self {
        let (pixel_width, pixel_height) = if image.width == 0 || image.height == 0 {
            tracing::warn!(
                width = image.width,
                height = image.height,
                "image reports a zero dimension; assuming 16:9"
            );
            FALLBACK_DIMENSIONS
        } else {
            (image.width, image.height)
        };
        Self {
            width,
            height: width * (pixel_height as f32 / pixel_width as f32),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Tracks whether the shared geometry must be rebuilt this frame.
///
/// Invalidation happens while commands are drained; the rebuild itself runs
/// once, before placement, so both quads always observe the same geometry.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    dirty: bool,
}

impl GeometryBuilder {
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Produces new geometry if a rebuild is pending. The aspect always comes
    /// from the left image.
    pub fn rebuild<I>(&mut self, width: f32, left: &EyeImage<I>) -> Option<PanelGeometry> {
        if !std::mem::take(&mut self.dirty) {
            return None;
        }
        let geometry = PanelGeometry::for_image(width, left);
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            "rebuilt panel geometry"
        );
        Some(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_source_aspect() {
        let geometry = PanelGeometry::for_image(2.0, &EyeImage::new(1920, 1080, ()));
        assert!((geometry.height - 1.125).abs() < 1e-6);
        assert!((geometry.aspect() - 1920.0 / 1080.0).abs() < 1e-5);
    }

    #[test]
    fn portrait_images_are_taller_than_wide() {
        let geometry = PanelGeometry::for_image(1.0, &EyeImage::new(600, 800, ()));
        assert!((geometry.height - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn zero_dimension_falls_back_to_widescreen() {
        let geometry = PanelGeometry::for_image(1.6, &EyeImage::new(0, 0, ()));
        assert!((geometry.height - 0.9).abs() < 1e-6);
    }

    #[test]
    fn builder_rebuilds_once_per_invalidation() {
        let image = EyeImage::new(4, 2, ());
        let mut builder = GeometryBuilder::default();
        assert!(builder.rebuild(1.0, &image).is_none());
        builder.invalidate();
        builder.invalidate();
        assert_eq!(
            builder.rebuild(1.0, &image),
            Some(PanelGeometry {
                width: 1.0,
                height: 0.5
            })
        );
        assert!(builder.rebuild(1.0, &image).is_none());
    }
}
