//! Effect builder and windowed runner.
//!
//! `SphereEffect` is the configuration entry point; `.run()` opens a
//! window and drives the scene from the event loop. Frames are strictly
//! sequential: the redraw handler ticks the scene, renders, and requests
//! the next redraw only after the current one finishes. Window occlusion
//! pauses the loop; un-occlusion resumes it with a single redraw request.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::EffectError;
use crate::gpu::GpuState;
use crate::scene::{Scene, Viewport};
use crate::visuals::VisualConfig;

/// Builder for the particle sphere effect.
///
/// Use method chaining to configure, then call `.run()` to start.
pub struct SphereEffect {
    particle_count: u32,
    seed: Option<u64>,
    visuals: VisualConfig,
    window_title: String,
    window_size: (u32, u32),
}

impl SphereEffect {
    /// Create an effect with default settings: 150 particles, the
    /// single-color palette, a 700x700 logical window.
    pub fn new() -> Self {
        Self {
            particle_count: 150,
            seed: None,
            visuals: VisualConfig::default(),
            window_title: "plexus".to_string(),
            window_size: (700, 700),
        }
    }

    /// Set the number of particles on the sphere.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Fix the seed for the per-particle animation parameters. Runs with
    /// the same seed are identical; by default a random seed is used.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Adjust the visual configuration.
    pub fn with_visuals(mut self, configure: impl FnOnce(&mut VisualConfig)) -> Self {
        configure(&mut self.visuals);
        self
    }

    /// Set the window title.
    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Run the effect. Blocks until the window is closed.
    pub fn run(self) -> Result<(), EffectError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Current particle count.
    #[inline]
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    /// Current visual configuration.
    #[inline]
    pub fn visuals(&self) -> &VisualConfig {
        &self.visuals
    }
}

impl Default for SphereEffect {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    settings: SphereEffect,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    scene: Option<Scene>,
    fatal: Option<EffectError>,
}

impl App {
    fn new(settings: SphereEffect) -> Self {
        Self {
            settings,
            window: None,
            gpu: None,
            scene: None,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EffectError) {
        log::error!("{}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(scene), Some(gpu)) = (
            self.window.as_ref(),
            self.scene.as_mut(),
            self.gpu.as_mut(),
        ) else {
            return;
        };

        if scene.is_paused() {
            return;
        }

        if let Some(viewport) = scene.poll_resize() {
            gpu.resize(viewport);
        }

        let frame = scene.tick();
        match gpu.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                let viewport = scene
                    .apply_pending_resize()
                    .unwrap_or_else(|| scene.viewport());
                gpu.resize(viewport);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, shutting down");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("frame skipped: {:?}", e),
        }

        if scene.time().frame() % 30 == 0 {
            window.set_title(&format!(
                "{} - {:.0} fps",
                self.settings.window_title,
                scene.time().fps()
            ));
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.settings.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(&self.settings.window_title)
            .with_inner_size(LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = window.inner_size();
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());

        let gpu = match pollster::block_on(GpuState::new(
            window.clone(),
            viewport,
            self.settings.particle_count,
            &self.settings.visuals,
        )) {
            Ok(gpu) => gpu,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let seed = self.settings.seed.unwrap_or_else(rand::random);
        let scene = Scene::new(
            self.settings.particle_count,
            seed,
            self.settings.visuals.clone(),
            viewport,
        );

        log::info!(
            "sphere effect started: {} particles, {:.0}x{:.0} logical, seed {}",
            self.settings.particle_count,
            viewport.width,
            viewport.height,
            seed
        );

        window.request_redraw();

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.scene = Some(scene);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(scene), Some(window)) = (self.scene.as_mut(), self.window.as_ref()) {
                    scene.request_resize(Viewport::from_physical(
                        size.width,
                        size.height,
                        window.scale_factor(),
                    ));
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let (Some(scene), Some(window)) = (self.scene.as_mut(), self.window.as_ref()) {
                    let size = window.inner_size();
                    scene.request_resize(Viewport::from_physical(
                        size.width,
                        size.height,
                        scale_factor,
                    ));
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let (Some(scene), Some(window)) = (self.scene.as_mut(), self.window.as_ref()) {
                    if occluded {
                        scene.pause();
                        log::debug!("window occluded, animation paused");
                    } else if scene.resume() {
                        log::debug!("window visible, animation resumed");
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let effect = SphereEffect::new();
        assert_eq!(effect.particle_count(), 150);
        assert_eq!(effect.visuals().connection_radius, 60.0);
        assert_eq!(effect.visuals().palette.len(), 1);
    }

    #[test]
    fn test_builder_overrides() {
        let effect = SphereEffect::new()
            .with_particle_count(42)
            .with_seed(7)
            .with_visuals(|v| {
                v.connection_radius(80.0).fade_alpha(0.3);
            });

        assert_eq!(effect.particle_count(), 42);
        assert_eq!(effect.visuals().connection_radius, 80.0);
        assert!((effect.visuals().fade_alpha - 0.3).abs() < 1e-6);
    }
}
