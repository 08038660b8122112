//! Spawn context for particle initialization.
//!
//! Provides the per-particle RNG and the spiral placement helper used when
//! building the sphere. Each context is seeded from a base seed and the
//! particle index, so a run is fully reproducible given its seed while
//! every particle still draws independent animation parameters.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Golden angle in radians, pi * (3 - sqrt(5)).
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Context handed to particle construction with helpers for placement and
/// randomized animation parameters.
///
/// Spatial placement is deterministic in (index, count); only speeds,
/// sizes, phases and colors come from the RNG.
pub struct SpawnContext {
    /// Index of the particle being spawned (0 to count-1).
    pub index: u32,
    /// Total number of particles being spawned.
    pub count: u32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context for one particle.
    pub fn new(index: u32, count: u32, base_seed: u64) -> Self {
        Self {
            index,
            count,
            rng: SmallRng::seed_from_u64(base_seed ^ index as u64),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        self.index as f32 / self.count as f32
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random angle in [0, 2*pi).
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// Pick a random entry from a palette. Empty palettes yield white.
    pub fn pick(&mut self, colors: &[Vec3]) -> Vec3 {
        if colors.is_empty() {
            return Vec3::ONE;
        }
        colors[self.rng.gen_range(0..colors.len())]
    }

    /// Point for this particle on the unit sphere, placed by a golden-angle
    /// spiral over the full index range.
    ///
    /// Latitude runs from y = 1 at index 0 down to y = -1 at the last
    /// index; longitude advances by the golden angle per index, which
    /// spreads the points roughly evenly over the surface. Counts below 2
    /// are treated as 2, leaving a single particle at the north pole.
    pub fn golden_spiral_point(&self) -> Vec3 {
        let count = self.count.max(2);
        let y = 1.0 - (self.index as f32 / (count as f32 - 1.0)) * 2.0;
        let radius = (1.0 - y * y).max(0.0).sqrt();
        let theta = GOLDEN_ANGLE * self.index as f32;

        Vec3::new(radius * theta.cos(), y, radius * theta.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let ctx = SpawnContext::new(50, 100, 0);
        assert!((ctx.progress() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = SpawnContext::new(3, 150, 42);
        let mut b = SpawnContext::new(3, 150, 42);
        for _ in 0..16 {
            assert_eq!(a.random_range(0.0, 1.0), b.random_range(0.0, 1.0));
        }
    }

    #[test]
    fn test_different_index_different_draws() {
        let mut a = SpawnContext::new(0, 150, 42);
        let mut b = SpawnContext::new(1, 150, 42);
        let draws_a: Vec<f32> = (0..8).map(|_| a.random()).collect();
        let draws_b: Vec<f32> = (0..8).map(|_| b.random()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_spiral_points_unit_length() {
        let count = 150;
        for i in 0..count {
            let p = SpawnContext::new(i, count, 0).golden_spiral_point();
            assert!(
                (p.length() - 1.0).abs() < 1e-4,
                "index {} off the sphere: |p| = {}",
                i,
                p.length()
            );
        }
    }

    #[test]
    fn test_spiral_poles() {
        let count = 150;
        let first = SpawnContext::new(0, count, 0).golden_spiral_point();
        let last = SpawnContext::new(count - 1, count, 0).golden_spiral_point();
        assert_eq!(first.y, 1.0);
        assert_eq!(last.y, -1.0);
    }

    #[test]
    fn test_spiral_points_distinct() {
        let count = 150;
        let points: Vec<Vec3> = (0..count)
            .map(|i| SpawnContext::new(i, count, 0).golden_spiral_point())
            .collect();
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert!(
                    points[i].distance(points[j]) > 1e-5,
                    "indices {} and {} coincide",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_single_particle_at_pole() {
        let p = SpawnContext::new(0, 1, 0).golden_spiral_point();
        assert_eq!(p.y, 1.0);
    }

    #[test]
    fn test_pick_empty_palette() {
        let mut ctx = SpawnContext::new(0, 1, 0);
        assert_eq!(ctx.pick(&[]), Vec3::ONE);
    }
}
