//! Particle model for the rotating sphere.
//!
//! Each particle owns a fixed point on the unit sphere plus randomized
//! animation parameters. Every tick it rotates that base point, scales it
//! to the current viewport, perspective-projects it to screen space and
//! refreshes its pulse-driven opacity. All math runs in logical pixels.

use glam::{Vec2, Vec3};

use crate::scene::Viewport;
use crate::spawn::SpawnContext;
use crate::visuals::VisualConfig;

/// Sphere radius in world units at the reference viewport size.
pub const SPHERE_RADIUS: f32 = 100.0;
/// Viewport extent at which the sphere has exactly `SPHERE_RADIUS`.
pub const REFERENCE_SIZE: f32 = 350.0;
/// Camera distance for the perspective projection.
pub const PERSPECTIVE: f32 = 400.0;

/// Lower bound on the projection distance. A rotated z near -PERSPECTIVE
/// would otherwise divide toward infinity.
const MIN_PROJECTION_DISTANCE: f32 = 1.0;

/// Particles at or below this opacity produce no sprite.
const VISIBILITY_FLOOR: f32 = 0.1;

/// One point of the sphere.
///
/// The base position never changes after spawn; rotation angles and the
/// pulse phase advance by fixed per-particle increments each tick.
pub struct Particle {
    base: Vec3,
    rotation: Vec3,
    speed: Vec3,
    size: f32,
    base_opacity: f32,
    color: Vec3,
    pulse_phase: f32,
    pulse_speed: f32,

    world: Vec3,
    projected: Vec2,
    scale: f32,
    projected_size: f32,
    projected_opacity: f32,
}

/// Draw record for one visible particle: a colored glowing disc with a
/// smaller white core, both with floor radii so distant points never
/// disappear entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub glow: f32,
    pub core_radius: f32,
    pub core_alpha: f32,
    pub core_glow: f32,
    pub color: Vec3,
}

impl Particle {
    /// Spawn a particle at its golden-spiral slot with randomized
    /// animation parameters.
    pub fn new(ctx: &mut SpawnContext, visuals: &VisualConfig) -> Self {
        let base = ctx.golden_spiral_point();
        let speed = Vec3::new(
            ctx.random_range(0.003, 0.010),
            ctx.random_range(0.005, 0.015),
            ctx.random_range(0.002, 0.007),
        );
        let (size_min, size_max) = visuals.size_range;
        let size = ctx.random_range(size_min, size_max);
        let base_opacity = ctx.random_range(1.0, 1.3);
        let color = ctx.pick(&visuals.palette);
        let pulse_phase = ctx.random_angle();
        let pulse_speed = ctx.random_range(0.02, 0.05);

        Self {
            base,
            rotation: Vec3::ZERO,
            speed,
            size,
            base_opacity,
            color,
            pulse_phase,
            pulse_speed,
            world: Vec3::ZERO,
            projected: Vec2::ZERO,
            scale: 0.0,
            projected_size: 0.0,
            projected_opacity: 0.0,
        }
    }

    /// Advance one tick: rotate, scale to the viewport, project, pulse.
    ///
    /// Rotation is a Y-axis turn followed by an X-axis turn; the z angle
    /// only accumulates and never touches the vector. After this call the
    /// projected position, scale and opacity reflect the current tick.
    pub fn update(&mut self, viewport: &Viewport) {
        self.rotation += self.speed;

        let (sin_y, cos_y) = self.rotation.y.sin_cos();
        let spun_x = self.base.x * cos_y - self.base.z * sin_y;
        let spun_z = self.base.x * sin_y + self.base.z * cos_y;

        let (sin_x, cos_x) = self.rotation.x.sin_cos();
        let tilted_y = self.base.y * cos_x - spun_z * sin_x;
        let tilted_z = self.base.y * sin_x + spun_z * cos_x;

        let radius = SPHERE_RADIUS * viewport.min_extent() / REFERENCE_SIZE;
        self.world = Vec3::new(spun_x, tilted_y, tilted_z) * radius;

        let distance = (PERSPECTIVE + self.world.z).max(MIN_PROJECTION_DISTANCE);
        self.scale = PERSPECTIVE / distance;
        self.projected = viewport.center() + Vec2::new(self.world.x, self.world.y) * self.scale;
        self.projected_size = self.size * self.scale;

        self.pulse_phase += self.pulse_speed;
        let pulse = 0.7 + 0.3 * self.pulse_phase.sin();
        self.projected_opacity = self.base_opacity * self.scale * pulse;
    }

    /// Draw record for the current tick, or `None` when the particle is
    /// too faint to bother drawing.
    pub fn sprite(&self) -> Option<Sprite> {
        if self.projected_opacity <= VISIBILITY_FLOOR {
            return None;
        }

        Some(Sprite {
            position: self.projected,
            radius: self.projected_size.max(0.8),
            alpha: self.projected_opacity.max(0.15),
            glow: 6.0 * self.scale,
            core_radius: (self.projected_size * 0.4).max(0.3),
            core_alpha: (self.projected_opacity * 0.6).max(0.08),
            core_glow: 5.0 * self.scale,
            color: self.color,
        })
    }

    /// Projected screen position as of the last `update`.
    #[inline]
    pub fn projected(&self) -> Vec2 {
        self.projected
    }

    /// Depth scale as of the last `update` (1.0 at the sphere center
    /// plane, larger when nearer the camera).
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Opacity as of the last `update`.
    #[inline]
    pub fn projected_opacity(&self) -> f32 {
        self.projected_opacity
    }

    /// Base position on the unit sphere.
    #[inline]
    pub fn base(&self) -> Vec3 {
        self.base
    }

    /// Particle with pinned projection output, for exercising the
    /// renderers without running `update`.
    #[cfg(test)]
    pub(crate) fn with_projection(projected: Vec2, scale: f32) -> Self {
        Self {
            base: Vec3::ZERO,
            rotation: Vec3::ZERO,
            speed: Vec3::ZERO,
            size: 1.0,
            base_opacity: 1.0,
            color: Vec3::ONE,
            pulse_phase: 0.0,
            pulse_speed: 0.0,
            world: Vec3::ZERO,
            projected,
            scale,
            projected_size: scale,
            projected_opacity: 1.0,
        }
    }
}
