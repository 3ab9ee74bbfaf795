use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowAttributes, WindowId},
};

use crate::backend::AtlasProvider;
use crate::config::EngineConfig;
use crate::frame::FrameDriver;
use crate::gpu::GpuBackend;
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::keys::Key;
use crate::scene::TileMap;
use crate::time::FixedTimeStep;

/// What application callbacks can reach.
pub struct AppContext<'a> {
    pub frame: &'a mut FrameDriver,
    exit_requested: &'a mut bool,
}

impl AppContext<'_> {
    pub fn request_exit(&mut self) {
        *self.exit_requested = true;
    }
}

/// Application hooks driven by [`EngineWindow`].
pub trait App {
    /// Once, after the window and GPU are ready.
    fn on_start(&mut self, _ctx: &mut AppContext) {}

    /// Every fixed step, before the engine's own update.
    fn on_update(&mut self, ctx: &mut AppContext, dt: f32);

    /// Every input event; `consumed` tells whether the UI already handled it.
    fn on_event(&mut self, _ctx: &mut AppContext, _event: &InputEvent, _consumed: bool) {}
}

pub struct EngineWindow<A: App> {
    config: EngineConfig,
    app: A,
    window: Option<Arc<Window>>,
    gpu: Option<GpuBackend>,
    frame: FrameDriver,
    timestep: FixedTimeStep,
    started_at: Instant,
    modifiers: Modifiers,
    exit_requested: bool,
    pending_atlases: Vec<(u32, image::DynamicImage, u32, u32)>,
}

impl<A: App> EngineWindow<A> {
    pub fn new(config: EngineConfig, map: TileMap, app: A) -> Self {
        let config = config.validated();
        Self {
            frame: FrameDriver::new(&config, map),
            timestep: FixedTimeStep::with_rate(config.updates_per_second),
            config,
            app,
            window: None,
            gpu: None,
            started_at: Instant::now(),
            modifiers: Modifiers::NONE,
            exit_requested: false,
            pending_atlases: Vec::new(),
        }
    }

    /// Atlas to upload once the GPU is up, for slots the config leaves empty.
    pub fn with_atlas_image(mut self, tilemap_id: u32, img: image::DynamicImage, tile_width: u32, tile_height: u32) -> Self {
        self.pending_atlases.push((tilemap_id, img, tile_width, tile_height));
        self
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new().context("creating event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self).context("running event loop")?;
        Ok(())
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let mut gpu = pollster::block_on(GpuBackend::new(window.clone()))?;
        gpu.set_clear_color(self.config.clear_color);
        for atlas in &self.config.atlases {
            let loaded = std::fs::read(&atlas.path)
                .with_context(|| format!("reading atlas {}", atlas.path.display()))
                .and_then(|bytes| gpu.load_atlas(atlas.id, &bytes, atlas.tile_width, atlas.tile_height));
            match loaded {
                Ok(info) => tracing::info!(
                    "atlas {} loaded from {}: {} tiles",
                    atlas.id,
                    atlas.path.display(),
                    info.tile_count()
                ),
                // Cells on a missing atlas draw nothing; keep running.
                Err(e) => tracing::warn!("atlas {} unavailable: {:#}", atlas.id, e),
            }
        }
        for (id, img, tile_width, tile_height) in self.pending_atlases.drain(..) {
            if gpu.atlases().atlas(id).is_some() {
                continue;
            }
            match gpu.load_atlas_image(id, &img, tile_width, tile_height) {
                Ok(info) => tracing::info!("atlas {} loaded from memory: {} tiles", id, info.tile_count()),
                Err(e) => tracing::warn!("atlas {} unavailable: {:#}", id, e),
            }
        }
        let size = window.inner_size();
        gpu.set_projection(self.frame.resize(size.width, size.height));
        self.gpu = Some(gpu);
        Ok(())
    }

    fn dispatch(&mut self, event: InputEvent) {
        let consumed = self.frame.handle_input(event);
        let mut ctx = AppContext { frame: &mut self.frame, exit_requested: &mut self.exit_requested };
        self.app.on_event(&mut ctx, &event, consumed);
    }

    fn redraw(&mut self) -> Result<()> {
        let frame = &mut self.frame;
        let app = &mut self.app;
        let exit_requested = &mut self.exit_requested;
        self.timestep.update(|dt| {
            let dt = dt as f32;
            let mut ctx = AppContext { frame: &mut *frame, exit_requested: &mut *exit_requested };
            app.on_update(&mut ctx, dt);
            frame.update(dt);
        });

        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };
        gpu.set_time(self.started_at.elapsed().as_secs_f32());
        self.frame.render(gpu);
        gpu.present()
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(gpu) = self.gpu.as_mut() {
            self.frame.shutdown(gpu);
        }
        event_loop.exit();
    }
}

impl<A: App> ApplicationHandler for EngineWindow<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let size = self.config.window_size;
        let window_attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(size.width as u32, size.height as u32));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        tracing::info!("Window created successfully");

        if let Err(e) = self.init_gpu(window.clone()) {
            tracing::error!("GPU initialisation failed: {:#}", e);
            event_loop.exit();
            return;
        }
        self.window = Some(window);

        let mut ctx = AppContext { frame: &mut self.frame, exit_requested: &mut self.exit_requested };
        self.app.on_start(&mut ctx);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window close requested");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(physical_size) => {
                tracing::debug!("Window resized: {:?}", physical_size);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(physical_size.width, physical_size.height);
                    gpu.set_projection(self.frame.resize(physical_size.width, physical_size.height));
                }
            }
            WindowEvent::Focused(false) => self.frame.clear_input(),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = Modifiers::from_winit(modifiers.state());
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = Key::from_winit(code) else {
                    tracing::trace!("unmapped key {:?}", code);
                    return;
                };
                let modifiers = self.modifiers;
                self.dispatch(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown { key, modifiers },
                    ElementState::Released => InputEvent::KeyUp { key, modifiers },
                });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.dispatch(InputEvent::PointerMove {
                    x: position.x as f32,
                    y: position.y as f32,
                    modifiers: self.modifiers,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.dispatch(InputEvent::Button {
                    button: PointerButton::from_winit(button),
                    pressed: state == ElementState::Pressed,
                    modifiers: self.modifiers,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / self.config.tile_size.height as f32,
                };
                self.dispatch(InputEvent::Wheel { delta, modifiers: self.modifiers });
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    tracing::error!("render failed: {:#}", e);
                    self.shutdown(event_loop);
                }
            }
            _ => {}
        }
        if self.exit_requested {
            self.exit_requested = false;
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
