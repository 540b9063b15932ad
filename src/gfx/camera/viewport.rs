use winit::dpi::PhysicalSize;

/// Upper bound on the device pixel ratio used for the render surface
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical window size plus the pixel ratio the surface is rendered at
///
/// High-density displays render at most two surface pixels per logical pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub logical_width: f64,
    pub logical_height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(logical_width: f64, logical_height: f64, scale_factor: f64) -> Self {
        Self {
            logical_width,
            logical_height,
            pixel_ratio: scale_factor.clamp(f64::MIN_POSITIVE, MAX_PIXEL_RATIO),
        }
    }

    /// Viewport for a window reporting `size` physical pixels at `scale_factor`
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    /// True when either side has collapsed to zero, as for a minimised window
    pub fn is_empty(&self) -> bool {
        self.logical_width <= 0.0 || self.logical_height <= 0.0
    }

    /// Width over height; 1 for an empty viewport
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            (self.logical_width / self.logical_height) as f32
        }
    }

    /// Surface size in pixels; zero along a collapsed side
    pub fn surface_size(&self) -> (u32, u32) {
        (
            (self.logical_width * self.pixel_ratio).round() as u32,
            (self.logical_height * self.pixel_ratio).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pixel_ratio_is_capped() {
        let viewport = Viewport::new(1280.0, 720.0, 3.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.surface_size(), (2560, 1440));
        assert_relative_eq!(viewport.aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn low_density_ratio_passes_through() {
        let viewport = Viewport::new(800.0, 600.0, 1.25);
        assert_eq!(viewport.pixel_ratio, 1.25);
        assert_eq!(viewport.surface_size(), (1000, 750));
    }

    #[test]
    fn physical_size_is_converted_to_logical() {
        let viewport = Viewport::from_physical(PhysicalSize::new(3000, 1500), 1.5);
        assert_eq!(viewport.logical_width, 2000.0);
        assert_eq!(viewport.logical_height, 1000.0);
        assert_eq!(viewport.surface_size(), (3000, 1500));
        assert_relative_eq!(viewport.aspect(), 2.0);
    }

    #[test]
    fn minimised_window_reports_an_empty_surface() {
        let viewport = Viewport::from_physical(PhysicalSize::new(0, 0), 1.0);
        assert!(viewport.is_empty());
        assert_eq!(viewport.surface_size(), (0, 0));
        assert_eq!(viewport.aspect(), 1.0);
    }

    #[test]
    fn zero_width_is_empty_and_keeps_a_usable_aspect() {
        let viewport = Viewport::new(0.0, 600.0, 1.0);
        assert!(viewport.is_empty());
        assert_eq!(viewport.aspect(), 1.0);
        assert!(!Viewport::new(1.0, 600.0, 1.0).is_empty());
    }
}
