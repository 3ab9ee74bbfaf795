//! Per-frame orchestration of the three layers.
//!
//! Update order is fixed: sprites advance first, then the active page gets
//! its update hook, then the UI is composed. Rendering submits back to
//! front: scene, UI, sprites.

use glam::Mat4;

use crate::backend::SurfaceBackend;
use crate::config::EngineConfig;
use crate::coords::CoordinateMapper;
use crate::geometry::{Area, Position};
use crate::input::{ControlInput, InputEvent, InputState};
use crate::metrics::MetricsCollector;
use crate::scene::{SceneLayer, TileMap};
use crate::sprites::{SpriteAnimationEngine, SpriteEvent};
use crate::ui::{UiComposer, UiEvent};

const PERF_LOG_INTERVAL: u64 = 300;

pub struct FrameDriver {
    mapper: CoordinateMapper,
    scene: SceneLayer,
    ui: UiComposer,
    sprites: SpriteAnimationEngine,
    input: InputState,
    metrics: MetricsCollector,
    sprite_events: Vec<SpriteEvent>,
}

impl FrameDriver {
    /// Scene, UI and sprite layers all cover the full logical grid.
    pub fn new(config: &EngineConfig, map: TileMap) -> Self {
        let grid = Area::new(Position::ZERO, config.tile_count.at_least_one());
        let mut mapper = CoordinateMapper::new(config.tile_size, grid.size, config.scale_mode);
        mapper.on_resize(config.window_size.width as u32, config.window_size.height as u32);
        Self {
            mapper,
            scene: SceneLayer::new(map, grid),
            ui: UiComposer::new(grid.size),
            sprites: SpriteAnimationEngine::new(grid),
            input: InputState::new(),
            metrics: MetricsCollector::new(),
            sprite_events: Vec::new(),
        }
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn scene(&self) -> &SceneLayer {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneLayer {
        &mut self.scene
    }

    pub fn ui(&self) -> &UiComposer {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiComposer {
        &mut self.ui
    }

    pub fn sprites(&self) -> &SpriteAnimationEngine {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut SpriteAnimationEngine {
        &mut self.sprites
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Recompute scale and letterbox for a new window size. Returns the
    /// projection the renderer should use.
    pub fn resize(&mut self, width: u32, height: u32) -> Mat4 {
        self.mapper.on_resize(width, height);
        tracing::debug!(
            "window resized to {}x{}, scale {:.3}, offset {:?}",
            width,
            height,
            self.mapper.scale(),
            self.mapper.offset()
        );
        self.mapper.projection()
    }

    /// Track input state and offer the event to the UI. Pointer events carry
    /// the grid cell under the pointer. Returns whether the UI consumed it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        self.input.apply(&event);
        let tile = if event.is_pointer() {
            self.mapper.pointer_to_tile(self.input.pointer.x, self.input.pointer.y)
        } else {
            None
        };
        self.ui.dispatch(&ControlInput { event, tile })
    }

    /// Forget held keys and buttons, e.g. when the window loses focus.
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Grid cell under the last known pointer position.
    pub fn pointer_tile(&self) -> Option<Position> {
        self.mapper.pointer_to_tile(self.input.pointer.x, self.input.pointer.y)
    }

    pub fn update(&mut self, dt: f32) {
        if !self.metrics.in_frame() {
            self.metrics.begin_frame();
        }
        self.sprites.on_update(dt);
        let events = self.sprites.take_events();
        self.metrics.record_sprite_events(events.len());
        self.sprite_events.extend(events);

        self.ui.update(dt);
        if self.ui.compose() {
            self.metrics.record_composition();
        }
    }

    /// Submit scene, UI, then sprites. Returns the number of cells uploaded.
    pub fn render(&mut self, backend: &mut dyn SurfaceBackend) -> usize {
        if !self.metrics.in_frame() {
            self.metrics.begin_frame();
        }
        let mut total = 0;
        if self.scene.surface().is_visible() {
            let n = self.scene.render(backend);
            self.metrics.record_upload(n);
            total += n;
        }
        if self.ui.surface().is_visible() {
            let n = self.ui.render(backend);
            self.metrics.record_upload(n);
            total += n;
        }
        if self.sprites.surface().is_visible() {
            let n = self.sprites.render(backend);
            self.metrics.record_upload(n);
            total += n;
        }
        self.metrics.end_frame();

        if self.metrics.frames() % PERF_LOG_INTERVAL == 0 {
            if let Some(stats) = self.metrics.stats() {
                tracing::info!(
                    "frames: {} mean {:.2}ms p99 {:.2}ms uploads/frame {:.1}",
                    self.metrics.frames(),
                    stats.cpu_mean_ms,
                    stats.cpu_p99_ms,
                    stats.uploads_mean
                );
            }
            for violation in self.metrics.validate_budgets() {
                tracing::warn!("budget: {}", violation);
            }
        }
        total
    }

    pub fn take_ui_events(&mut self) -> Vec<UiEvent> {
        self.ui.take_events()
    }

    pub fn take_sprite_events(&mut self) -> Vec<SpriteEvent> {
        std::mem::take(&mut self.sprite_events)
    }

    /// Close the page and release every surface.
    pub fn shutdown(&mut self, backend: &mut dyn SurfaceBackend) {
        self.ui.shutdown(backend);
        self.scene.dispose(backend);
        self.sprites.clear();
        self.sprites.dispose(backend);
        tracing::debug!("frame driver shut down");
    }
}
