//! World map shown through a scrolling viewport.

use crate::backend::SurfaceBackend;
use crate::cell::TileCell;
use crate::coords::Viewport;
use crate::geometry::{Area, Dimension, Position};
use crate::surface::TileSurface;

/// World-sized grid of cells. Out-of-bounds access is a no-op / `None`.
#[derive(Debug, Clone)]
pub struct TileMap {
    size: Dimension,
    cells: Vec<TileCell>,
}

impl TileMap {
    pub fn new(width: i32, height: i32, fill: TileCell) -> Self {
        let size = Dimension::new(width, height).at_least_one();
        Self { size, cells: vec![fill; size.area()] }
    }

    pub fn size(&self) -> Dimension {
        self.size
    }

    fn index_of(&self, p: Position) -> Option<usize> {
        self.size
            .contains(p.x, p.y)
            .then(|| p.y as usize * self.size.width as usize + p.x as usize)
    }

    pub fn get(&self, p: Position) -> Option<TileCell> {
        self.index_of(p).map(|i| self.cells[i])
    }

    /// Returns whether the cell changed.
    pub fn set(&mut self, p: Position, cell: TileCell) -> bool {
        match self.index_of(p) {
            Some(i) if self.cells[i] != cell => {
                self.cells[i] = cell;
                true
            }
            _ => false,
        }
    }

    pub fn fill_area(&mut self, area: Area, cell: TileCell) {
        for p in area.positions() {
            self.set(p, cell);
        }
    }
}

/// The scene surface: the part of the map under the camera, drawn at the
/// viewport's grid position.
pub struct SceneLayer {
    map: TileMap,
    viewport: Viewport,
    surface: TileSurface,
}

impl SceneLayer {
    pub fn new(map: TileMap, viewport_area: Area) -> Self {
        let mut layer = Self {
            map,
            viewport: Viewport::new(viewport_area),
            surface: TileSurface::new("scene"),
        };
        layer.resize_viewport(viewport_area);
        layer
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera(&self) -> Position {
        self.viewport.camera
    }

    pub fn surface(&self) -> &TileSurface {
        &self.surface
    }

    /// Update the map; the surface is only touched when the cell is on screen.
    pub fn set_map_cell(&mut self, scene: Position, cell: TileCell) {
        if !self.map.set(scene, cell) {
            return;
        }
        if let Some(local) = self.viewport.scene_to_viewport(scene) {
            self.surface.set_cell(local.x, local.y, cell);
        }
    }

    pub fn set_camera(&mut self, camera: Position) {
        let before = self.viewport.camera;
        self.viewport.camera = camera;
        self.viewport.clamp_camera(self.map.size());
        if self.viewport.camera != before {
            self.rebuild();
        }
    }

    pub fn center_on(&mut self, scene: Position) {
        let mut target = self.viewport;
        target.center_on(scene, self.map.size());
        self.set_camera(target.camera);
    }

    pub fn scroll(&mut self, dx: i32, dy: i32) {
        self.set_camera(self.viewport.camera.offset(dx, dy));
    }

    /// Move or resize the viewport on the grid.
    pub fn resize_viewport(&mut self, area: Area) {
        let area = Area::new(area.origin, area.size.at_least_one());
        tracing::debug!(
            "scene: viewport {}x{} at ({}, {})",
            area.size.width,
            area.size.height,
            area.origin.x,
            area.origin.y
        );
        self.viewport.area = area;
        self.viewport.clamp_camera(self.map.size());
        self.surface.set_origin(area.origin);
        self.surface.resize(area.size.width, area.size.height, TileCell::BLANK);
        self.rebuild();
    }

    /// Scene cell under a grid position, if the viewport covers it.
    pub fn pick(&self, grid: Position) -> Option<Position> {
        self.viewport
            .grid_to_scene(grid)
            .filter(|scene| self.map.size().contains(scene.x, scene.y))
    }

    fn rebuild(&mut self) {
        let size = self.viewport.area.size;
        for row in 0..size.height {
            for col in 0..size.width {
                let scene = self.viewport.viewport_to_scene(Position::new(col, row));
                let cell = self.map.get(scene).unwrap_or(TileCell::BLANK);
                self.surface.set_cell(col, row, cell);
            }
        }
    }

    pub fn render(&mut self, backend: &mut dyn SurfaceBackend) -> usize {
        self.surface.render(backend)
    }

    pub fn dispose(&mut self, backend: &mut dyn SurfaceBackend) {
        self.surface.dispose(backend);
    }
}
