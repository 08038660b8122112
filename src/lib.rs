//! # Plexus - animated 3D particle sphere
//!
//! A decorative "plexus" effect: points distributed over a sphere by a
//! golden-angle spiral, rotated every frame, perspective-projected and
//! drawn as glowing discs, with faint lines connecting close neighbors
//! over a fading trail background.
//!
//! ## Quick Start
//!
//! ```ignore
//! use plexus::SphereEffect;
//!
//! fn main() -> Result<(), plexus::EffectError> {
//!     SphereEffect::new()
//!         .with_particle_count(150)
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! Each [`Particle`] owns a fixed point on the unit sphere plus randomized
//! rotation speeds, a size, a base opacity and a pulse phase. Placement is
//! deterministic in the particle index; everything else derives from a
//! seed, so `.with_seed()` makes whole runs reproducible.
//!
//! ### The scene
//!
//! [`Scene`] holds the particle collection and turns one `tick()` into
//! draw data: every particle updates first, then connection segments are
//! collected from the projected positions. The scene also owns playback
//! (pause while the window is occluded) and the debounced resize.
//!
//! ### Rendering
//!
//! The GPU layer only presents what the scene computed: a translucent
//! black fade pass for trails, instanced quads for the particles, and
//! instanced line quads for the connections.
//!
//! ### Visuals
//!
//! [`VisualConfig`] collects the appearance knobs (palette, sizes,
//! connection radius and stroke, fade strength):
//!
//! ```ignore
//! SphereEffect::new()
//!     .with_visuals(|v| {
//!         v.connection_radius(80.0);
//!         v.fade_alpha(0.1);
//!     })
//!     .run()
//! ```

pub mod connections;
mod effect;
pub mod error;
mod gpu;
pub mod particle;
pub mod scene;
pub mod spawn;
pub mod time;
pub mod visuals;

pub use connections::Segment;
pub use effect::SphereEffect;
pub use error::{EffectError, GpuError};
pub use glam::{Vec2, Vec3};
pub use particle::{Particle, Sprite};
pub use scene::{FrameData, Playback, Scene, Viewport};
pub use spawn::SpawnContext;
pub use time::Time;
pub use visuals::{rgb8, VisualConfig};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use plexus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::connections::Segment;
    pub use crate::effect::SphereEffect;
    pub use crate::error::{EffectError, GpuError};
    pub use crate::particle::{Particle, Sprite};
    pub use crate::scene::{FrameData, Playback, Scene, Viewport};
    pub use crate::spawn::SpawnContext;
    pub use crate::time::Time;
    pub use crate::visuals::{rgb8, VisualConfig};
    pub use crate::{Vec2, Vec3};
}
