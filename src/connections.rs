//! Connection lines between nearby particles.
//!
//! Scans every unordered pair of projected particle positions and emits a
//! line segment for pairs closer than the connection radius, with alpha
//! falling off linearly to zero at the radius. The scan is quadratic in
//! the particle count, which stays cheap at the default count of 150
//! (about 11k pairs per frame); see `benches/connections.rs`.

use glam::Vec2;

use crate::particle::Particle;

/// Base opacity factor for a zero-length connection.
const CONNECTION_ALPHA: f32 = 0.1;

/// One connection line in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub alpha: f32,
}

/// Collect connection segments for the current frame.
///
/// Stateless: the output depends only on the particles' projected
/// positions and depth scales. A pair exactly at `radius` produces no
/// segment; a coincident pair produces the maximum alpha for its average
/// depth scale.
pub fn collect(particles: &[Particle], radius: f32) -> Vec<Segment> {
    let mut segments = Vec::new();

    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            let a = particles[i].projected();
            let b = particles[j].projected();
            let distance = a.distance(b);

            if distance < radius {
                let avg_scale = (particles[i].scale() + particles[j].scale()) * 0.5;
                segments.push(Segment {
                    a,
                    b,
                    alpha: (1.0 - distance / radius) * CONNECTION_ALPHA * avg_scale,
                });
            }
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_at_radius_excluded() {
        let particles = vec![
            Particle::with_projection(Vec2::new(0.0, 0.0), 1.0),
            Particle::with_projection(Vec2::new(60.0, 0.0), 1.0),
        ];
        assert!(collect(&particles, 60.0).is_empty());
    }

    #[test]
    fn test_pair_inside_radius_alpha() {
        let particles = vec![
            Particle::with_projection(Vec2::new(0.0, 0.0), 1.0),
            Particle::with_projection(Vec2::new(30.0, 0.0), 0.5),
        ];
        let segments = collect(&particles, 60.0);
        assert_eq!(segments.len(), 1);

        // (1 - 30/60) * 0.1 * (1.0 + 0.5)/2
        assert!((segments[0].alpha - 0.5 * 0.1 * 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_coincident_pair_max_alpha() {
        let particles = vec![
            Particle::with_projection(Vec2::new(10.0, 10.0), 1.0),
            Particle::with_projection(Vec2::new(10.0, 10.0), 1.0),
        ];
        let segments = collect(&particles, 60.0);
        assert_eq!(segments.len(), 1);
        assert!((segments[0].alpha - CONNECTION_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_yields_three_segments() {
        let particles = vec![
            Particle::with_projection(Vec2::new(0.0, 0.0), 1.0),
            Particle::with_projection(Vec2::new(10.0, 0.0), 1.0),
            Particle::with_projection(Vec2::new(0.0, 10.0), 1.0),
        ];
        assert_eq!(collect(&particles, 60.0).len(), 3);
    }

    #[test]
    fn test_far_particles_unconnected() {
        let particles = vec![
            Particle::with_projection(Vec2::new(0.0, 0.0), 1.0),
            Particle::with_projection(Vec2::new(500.0, 0.0), 1.0),
        ];
        assert!(collect(&particles, 60.0).is_empty());
    }
}
