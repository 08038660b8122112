//! Scene driver: owns the particles and produces per-frame draw data.
//!
//! The scene is plain state with explicit methods; the windowing layer in
//! `effect` calls `tick` once per frame and forwards pause/resume and
//! resize events. Resizes are debounced with a 100ms quiet period so a
//! drag-resize coalesces into a single surface rebuild. Pausing and
//! resuming form a two-state machine; `resume` reports whether it
//! transitioned so the caller schedules exactly one redraw per wakeup.

use std::time::{Duration, Instant};

use glam::Vec2;

use crate::connections::{self, Segment};
use crate::particle::{Particle, Sprite};
use crate::spawn::SpawnContext;
use crate::time::Time;
use crate::visuals::VisualConfig;

/// Quiet period before a requested resize is applied.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Drawing area in logical pixels plus the device pixel ratio.
///
/// All projection math runs in logical pixels; the GPU surface uses the
/// physical size so output stays sharp on high-density displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Viewport {
    /// Viewport from a logical size and device pixel ratio.
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Viewport from a physical pixel size and device pixel ratio.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width: (width as f64 / scale_factor) as f32,
            height: (height as f64 / scale_factor) as f32,
            scale_factor: scale_factor as f32,
        }
    }

    /// Smaller of the two logical dimensions.
    #[inline]
    pub fn min_extent(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Center point in logical pixels.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Physical pixel size, never zero.
    pub fn physical_size(&self) -> (u32, u32) {
        let width = (self.width * self.scale_factor).round() as u32;
        let height = (self.height * self.scale_factor).round() as u32;
        (width.max(1), height.max(1))
    }
}

/// Playback state of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Running,
    Paused,
}

/// Draw data for one frame: visible sprites, then connection segments.
pub struct FrameData {
    pub sprites: Vec<Sprite>,
    pub segments: Vec<Segment>,
}

/// The particle collection and everything the frame loop mutates.
pub struct Scene {
    particles: Vec<Particle>,
    viewport: Viewport,
    visuals: VisualConfig,
    playback: Playback,
    pending_resize: Option<(Viewport, Instant)>,
    time: Time,
}

impl Scene {
    /// Build a scene with `count` particles.
    ///
    /// Placement depends only on the index; speeds, sizes, phases and
    /// colors derive from `seed`, so two scenes with the same seed evolve
    /// identically.
    pub fn new(count: u32, seed: u64, visuals: VisualConfig, viewport: Viewport) -> Self {
        let particles = (0..count)
            .map(|i| {
                let mut ctx = SpawnContext::new(i, count, seed);
                Particle::new(&mut ctx, &visuals)
            })
            .collect();

        Self {
            particles,
            viewport,
            visuals,
            playback: Playback::Running,
            pending_resize: None,
            time: Time::new(),
        }
    }

    /// Advance one frame: update every particle in index order, then
    /// gather sprites and connection segments.
    pub fn tick(&mut self) -> FrameData {
        self.time.update();

        for particle in &mut self.particles {
            particle.update(&self.viewport);
        }

        let sprites = self.particles.iter().filter_map(Particle::sprite).collect();
        let segments = connections::collect(&self.particles, self.visuals.connection_radius);

        FrameData { sprites, segments }
    }

    /// Current playback state.
    #[inline]
    pub fn playback(&self) -> Playback {
        self.playback
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.playback == Playback::Paused
    }

    /// Stop ticking. Idempotent.
    pub fn pause(&mut self) {
        self.playback = Playback::Paused;
        self.time.pause();
    }

    /// Start ticking again. Returns true only on the transition out of
    /// pause, so a caller can schedule exactly one redraw per wakeup.
    pub fn resume(&mut self) -> bool {
        if self.playback == Playback::Running {
            return false;
        }
        self.playback = Playback::Running;
        self.time.resume();
        true
    }

    /// Record a resize request. The new viewport takes effect only after
    /// the quiet period passes with no further request.
    pub fn request_resize(&mut self, viewport: Viewport) {
        self.pending_resize = Some((viewport, Instant::now() + RESIZE_DEBOUNCE));
    }

    /// Apply a pending resize whose quiet period has elapsed.
    ///
    /// Particles are not recreated; the next `tick` picks up the new
    /// geometry through the viewport.
    pub fn poll_resize(&mut self) -> Option<Viewport> {
        match self.pending_resize {
            Some((viewport, deadline)) if Instant::now() >= deadline => {
                self.pending_resize = None;
                self.viewport = viewport;
                Some(viewport)
            }
            _ => None,
        }
    }

    /// Apply a pending resize immediately, skipping the quiet period.
    /// Used when the surface is already lost and must be rebuilt anyway.
    pub fn apply_pending_resize(&mut self) -> Option<Viewport> {
        let (viewport, _) = self.pending_resize.take()?;
        self.viewport = viewport;
        Some(viewport)
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn visuals(&self) -> &VisualConfig {
        &self.visuals
    }

    #[inline]
    pub fn time(&self) -> &Time {
        &self.time
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn test_scene() -> Scene {
        Scene::new(
            150,
            7,
            VisualConfig::default(),
            Viewport::new(350.0, 350.0, 1.0),
        )
    }

    #[test]
    fn test_tick_counts_frames() {
        let mut scene = test_scene();
        scene.tick();
        scene.tick();
        assert_eq!(scene.time().frame(), 2);
    }

    #[test]
    fn test_tick_draws_every_particle_at_reference_size() {
        let mut scene = test_scene();
        let frame = scene.tick();
        // Opacity floors never trip at the reference size: scale >= 0.8
        // and base opacity >= 1.0 keep everything above the skip cutoff.
        assert_eq!(frame.sprites.len(), 150);
        assert!(!frame.segments.is_empty());
    }

    #[test]
    fn test_resize_waits_for_quiet_period() {
        let mut scene = test_scene();
        let bigger = Viewport::new(700.0, 700.0, 1.0);

        scene.request_resize(bigger);
        assert!(scene.poll_resize().is_none());
        assert_eq!(scene.viewport().width, 350.0);

        thread::sleep(RESIZE_DEBOUNCE + Duration::from_millis(20));
        assert_eq!(scene.poll_resize(), Some(bigger));
        assert_eq!(scene.viewport(), bigger);
        assert!(scene.poll_resize().is_none());
    }

    #[test]
    fn test_rapid_resizes_coalesce() {
        let mut scene = test_scene();

        scene.request_resize(Viewport::new(400.0, 400.0, 1.0));
        thread::sleep(Duration::from_millis(50));
        let last = Viewport::new(500.0, 500.0, 1.0);
        scene.request_resize(last);

        // The second request restarted the quiet period.
        assert!(scene.poll_resize().is_none());

        thread::sleep(RESIZE_DEBOUNCE + Duration::from_millis(20));
        assert_eq!(scene.poll_resize(), Some(last));
    }

    #[test]
    fn test_resize_keeps_particles() {
        let mut scene = test_scene();
        let before: Vec<_> = scene.particles().iter().map(|p| p.base()).collect();

        scene.request_resize(Viewport::new(700.0, 350.0, 2.0));
        thread::sleep(RESIZE_DEBOUNCE + Duration::from_millis(20));
        scene.poll_resize();

        let after: Vec<_> = scene.particles().iter().map(|p| p.base()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_apply_pending_resize_is_immediate() {
        let mut scene = test_scene();
        let bigger = Viewport::new(700.0, 700.0, 1.0);
        scene.request_resize(bigger);
        assert_eq!(scene.apply_pending_resize(), Some(bigger));
        assert!(scene.apply_pending_resize().is_none());
    }

    #[test]
    fn test_pause_resume_transitions_once() {
        let mut scene = test_scene();
        assert_eq!(scene.playback(), Playback::Running);
        assert!(!scene.resume());

        scene.pause();
        scene.pause();
        assert!(scene.is_paused());

        assert!(scene.resume());
        assert!(!scene.resume());
        assert_eq!(scene.playback(), Playback::Running);
    }

    #[test]
    fn test_viewport_physical_size() {
        let viewport = Viewport::new(350.0, 200.0, 2.0);
        assert_eq!(viewport.physical_size(), (700, 400));
        assert_eq!(Viewport::new(0.0, 0.0, 1.0).physical_size(), (1, 1));

        let roundtrip = Viewport::from_physical(700, 400, 2.0);
        assert_eq!(roundtrip.width, 350.0);
        assert_eq!(roundtrip.height, 200.0);
    }
}
