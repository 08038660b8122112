//! Visual configuration for the sphere effect.
//!
//! Controls how the effect looks (colors, sizes, trails, connections),
//! separate from the motion model that controls how particles move.
//!
//! # Usage
//!
//! ```ignore
//! SphereEffect::new()
//!     .with_visuals(|v| {
//!         v.palette(vec![rgb8(0xa6, 0xcb, 0xde), rgb8(0x79, 0x9a, 0xbf)]);
//!         v.connection_radius(80.0);
//!     })
//!     .run()
//! ```

use glam::Vec3;

/// Convert an 8-bit-per-channel color to linear 0..1 components.
#[inline]
pub fn rgb8(r: u8, g: u8, b: u8) -> Vec3 {
    Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

/// Appearance settings for particles, trails and connection lines.
///
/// The defaults reproduce the classic single-color plexus look: pale blue
/// glowing points over a fading black background, with faint blue lines
/// between close neighbors.
#[derive(Debug, Clone)]
pub struct VisualConfig {
    /// Colors particles draw from at spawn time.
    pub palette: Vec<Vec3>,
    /// Particle size range in logical pixels, sampled uniformly per particle.
    pub size_range: (f32, f32),
    /// Maximum projected distance at which two particles get a line, in
    /// logical pixels. Pairs exactly at the radius are not connected.
    pub connection_radius: f32,
    /// Connection line color.
    pub connection_color: Vec3,
    /// Connection stroke width in logical pixels.
    pub connection_width: f32,
    /// Opacity of the per-frame black fade. Higher values clear faster and
    /// shorten trails; 1.0 is a hard clear.
    pub fade_alpha: f32,
}

impl VisualConfig {
    /// Replace the spawn palette. Empty palettes fall back to white.
    pub fn palette(&mut self, colors: Vec<Vec3>) -> &mut Self {
        self.palette = colors;
        self
    }

    /// Set the per-particle size range in logical pixels.
    pub fn size_range(&mut self, min: f32, max: f32) -> &mut Self {
        self.size_range = (min, max);
        self
    }

    /// Set the neighbor distance below which connection lines are drawn.
    pub fn connection_radius(&mut self, radius: f32) -> &mut Self {
        self.connection_radius = radius;
        self
    }

    /// Set the connection line color.
    pub fn connection_color(&mut self, color: Vec3) -> &mut Self {
        self.connection_color = color;
        self
    }

    /// Set the connection stroke width in logical pixels.
    pub fn connection_width(&mut self, width: f32) -> &mut Self {
        self.connection_width = width;
        self
    }

    /// Set the trail fade strength (0 = infinite trails, 1 = hard clear).
    pub fn fade_alpha(&mut self, alpha: f32) -> &mut Self {
        self.fade_alpha = alpha.clamp(0.0, 1.0);
        self
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            palette: vec![rgb8(0xa6, 0xcb, 0xde)],
            size_range: (0.1, 1.6),
            connection_radius: 60.0,
            connection_color: rgb8(0x79, 0x9a, 0xbf),
            connection_width: 0.2,
            fade_alpha: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb8_full_range() {
        let white = rgb8(255, 255, 255);
        assert!((white.x - 1.0).abs() < 0.001);
        assert!((white.y - 1.0).abs() < 0.001);
        assert!((white.z - 1.0).abs() < 0.001);
        assert_eq!(rgb8(0, 0, 0), Vec3::ZERO);
    }

    #[test]
    fn test_default_palette_single_entry() {
        let visuals = VisualConfig::default();
        assert_eq!(visuals.palette.len(), 1);
        assert!((visuals.palette[0].x - 166.0 / 255.0).abs() < 0.001);
    }

    #[test]
    fn test_fade_alpha_clamped() {
        let mut visuals = VisualConfig::default();
        visuals.fade_alpha(2.0);
        assert_eq!(visuals.fade_alpha, 1.0);
        visuals.fade_alpha(-1.0);
        assert_eq!(visuals.fade_alpha, 0.0);
    }
}
