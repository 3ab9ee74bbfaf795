use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::{Area, Dimension, Position};

/// How the base fit scale is adjusted before letterboxing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Exact fit; the grid fills the limiting axis.
    #[default]
    Fractional,
    /// Floor to a whole multiple (min 1) so tiles stay pixel-crisp.
    Integer,
}

/// Largest uniform scale at which the grid still fits into the window.
///
/// Denominators are clamped to at least one pixel so a zero-sized window
/// or grid never divides by zero.
pub fn calculate_base_scale(window: Vec2, grid_pixels: Vec2) -> f32 {
    let gw = grid_pixels.x.max(1.0);
    let gh = grid_pixels.y.max(1.0);
    (window.x.max(0.0) / gw).min(window.y.max(0.0) / gh)
}

pub fn calculate_final_scale(base_scale: f32, mode: ScaleMode) -> f32 {
    match mode {
        ScaleMode::Fractional => base_scale.max(f32::EPSILON),
        ScaleMode::Integer => base_scale.floor().max(1.0),
    }
}

/// Offset that centers the scaled grid on both axes. Negative on an axis
/// where a forced integer scale makes the grid larger than the window.
pub fn calculate_letterbox_offset(window: Vec2, grid_pixels: Vec2, scale: f32) -> Vec2 {
    (window - grid_pixels * scale) * 0.5
}

/// Maps between window pixels and the fixed logical tile grid.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    tile_size: Dimension,
    tile_count: Dimension,
    window: Vec2,
    mode: ScaleMode,
    scale: f32,
    offset: Vec2,
    projection: Mat4,
}

impl CoordinateMapper {
    pub fn new(tile_size: Dimension, tile_count: Dimension, mode: ScaleMode) -> Self {
        let mut mapper = Self {
            tile_size,
            tile_count,
            window: Vec2::ZERO,
            mode,
            scale: 1.0,
            offset: Vec2::ZERO,
            projection: Mat4::IDENTITY,
        };
        let native = mapper.grid_pixels();
        mapper.on_resize(native.x as u32, native.y as u32);
        mapper
    }

    fn grid_pixels(&self) -> Vec2 {
        Vec2::new(
            (self.tile_count.width.max(1) * self.tile_size.width.max(1)) as f32,
            (self.tile_count.height.max(1) * self.tile_size.height.max(1)) as f32,
        )
    }

    fn cell_pixels(&self) -> Vec2 {
        Vec2::new(
            self.tile_size.width.max(1) as f32 * self.scale,
            self.tile_size.height.max(1) as f32 * self.scale,
        )
    }

    /// Recompute scale, centering offset and projection for a new window size.
    pub fn on_resize(&mut self, window_width: u32, window_height: u32) {
        self.window = Vec2::new(window_width as f32, window_height as f32);
        let grid = self.grid_pixels();
        let base = calculate_base_scale(self.window, grid);
        self.scale = calculate_final_scale(base, self.mode);
        self.offset = calculate_letterbox_offset(self.window, grid, self.scale);

        // Grid units -> window pixels (y down) -> clip space.
        let cell = self.cell_pixels();
        let to_pixels = Mat4::from_translation(self.offset.extend(0.0))
            * Mat4::from_scale(Vec3::new(cell.x, cell.y, 1.0));
        let to_clip = Mat4::orthographic_rh(
            0.0,
            self.window.x.max(1.0),
            self.window.y.max(1.0),
            0.0,
            -1.0,
            1.0,
        );
        self.projection = to_clip * to_pixels;
        tracing::debug!(
            "mapper: window {}x{} scale {:.3} offset ({:.1}, {:.1})",
            window_width,
            window_height,
            self.scale,
            self.offset.x,
            self.offset.y
        );
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.mode = mode;
        self.on_resize(self.window.x as u32, self.window.y as u32);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn tile_count(&self) -> Dimension {
        self.tile_count
    }

    pub fn tile_size(&self) -> Dimension {
        self.tile_size
    }

    pub fn window_size(&self) -> Vec2 {
        self.window
    }

    /// Projection taking grid units (one unit per cell) to clip space.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Cell under a window pixel, or `None` in the letterbox bars.
    pub fn pointer_to_tile(&self, px: f32, py: f32) -> Option<Position> {
        let cell = self.cell_pixels();
        let gx = ((px - self.offset.x) / cell.x).floor();
        let gy = ((py - self.offset.y) / cell.y).floor();
        if !gx.is_finite() || !gy.is_finite() {
            return None;
        }
        let tile = Position::new(gx as i32, gy as i32);
        self.tile_count.contains(tile.x, tile.y).then_some(tile)
    }

    /// Window pixel at the center of a cell.
    pub fn tile_to_screen(&self, tile: Position) -> Vec2 {
        let cell = self.cell_pixels();
        self.offset + Vec2::new((tile.x as f32 + 0.5) * cell.x, (tile.y as f32 + 0.5) * cell.y)
    }

    /// Pixel rectangle `(x, y, width, height)` covered by a cell.
    pub fn tile_rect(&self, tile: Position) -> (f32, f32, f32, f32) {
        let cell = self.cell_pixels();
        (
            self.offset.x + tile.x as f32 * cell.x,
            self.offset.y + tile.y as f32 * cell.y,
            cell.x,
            cell.y,
        )
    }
}

/// Window of the grid that shows part of a larger scene.
///
/// `area` is where the viewport sits on the grid; `camera` is the scene cell
/// shown at the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub area: Area,
    pub camera: Position,
}

impl Viewport {
    pub fn new(area: Area) -> Self {
        Self { area, camera: Position::ZERO }
    }

    /// Viewport-local cell showing `scene`, if it is on screen.
    pub fn scene_to_viewport(&self, scene: Position) -> Option<Position> {
        let local = scene - self.camera;
        self.area.size.contains(local.x, local.y).then_some(local)
    }

    pub fn viewport_to_scene(&self, local: Position) -> Position {
        local + self.camera
    }

    /// Viewport-local cell under a grid position, if it lies inside the viewport.
    pub fn grid_to_viewport(&self, grid: Position) -> Option<Position> {
        self.area.contains(grid).then(|| grid - self.area.origin)
    }

    pub fn viewport_to_grid(&self, local: Position) -> Position {
        local + self.area.origin
    }

    pub fn is_visible(&self, scene: Position) -> bool {
        self.scene_to_viewport(scene).is_some()
    }

    /// Scene cell under a grid position.
    pub fn grid_to_scene(&self, grid: Position) -> Option<Position> {
        self.grid_to_viewport(grid).map(|local| self.viewport_to_scene(local))
    }

    /// Keep the camera inside a scene of `map` cells. Scenes smaller than the
    /// viewport pin the camera at zero.
    pub fn clamp_camera(&mut self, map: Dimension) {
        let max_x = (map.width - self.area.size.width).max(0);
        let max_y = (map.height - self.area.size.height).max(0);
        self.camera.x = self.camera.x.clamp(0, max_x);
        self.camera.y = self.camera.y.clamp(0, max_y);
    }

    /// Put `scene` in the middle of the viewport, clamped to `map`.
    pub fn center_on(&mut self, scene: Position, map: Dimension) {
        self.camera = Position::new(
            scene.x - self.area.size.width / 2,
            scene.y - self.area.size.height / 2,
        );
        self.clamp_camera(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        // 20x10 grid of 16px tiles: native 320x160
        CoordinateMapper::new(Dimension::new(16, 16), Dimension::new(20, 10), ScaleMode::Fractional)
    }

    #[test]
    fn base_scale_picks_limiting_axis() {
        // width 800/320 = 2.5, height 600/160 = 3.75
        assert_eq!(calculate_base_scale(Vec2::new(800.0, 600.0), Vec2::new(320.0, 160.0)), 2.5);
        assert_eq!(calculate_base_scale(Vec2::new(640.0, 160.0), Vec2::new(320.0, 160.0)), 1.0);
    }

    #[test]
    fn zero_sized_inputs_do_not_divide_by_zero() {
        let s = calculate_base_scale(Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0));
        assert!(s.is_finite());
        let mut m = CoordinateMapper::new(Dimension::new(0, 0), Dimension::new(0, 0), ScaleMode::Fractional);
        m.on_resize(0, 0);
        assert!(m.scale().is_finite());
        assert!(m.offset().x.is_finite() && m.offset().y.is_finite());
        assert_eq!(m.pointer_to_tile(0.0, 0.0), None);
    }

    #[test]
    fn integer_mode_floors_with_minimum_one() {
        assert_eq!(calculate_final_scale(2.7, ScaleMode::Integer), 2.0);
        assert_eq!(calculate_final_scale(0.4, ScaleMode::Integer), 1.0);
        assert_eq!(calculate_final_scale(2.7, ScaleMode::Fractional), 2.7);
    }

    #[test]
    fn oversized_integer_grid_is_centered_on_both_axes() {
        let mut m = CoordinateMapper::new(Dimension::new(16, 16), Dimension::new(20, 10), ScaleMode::Integer);
        m.on_resize(100, 100);
        assert_eq!(m.scale(), 1.0);
        assert_eq!(m.offset(), Vec2::new(-110.0, -30.0));
        // Window center lands on the grid center.
        assert_eq!(m.pointer_to_tile(50.0, 50.0), Some(Position::new(10, 5)));
    }

    #[test]
    fn wide_window_is_pillarboxed() {
        let mut m = mapper();
        m.on_resize(800, 160);
        // scale 1.0, grid 320 wide centered in 800
        assert_eq!(m.scale(), 1.0);
        assert_eq!(m.offset(), Vec2::new(240.0, 0.0));
        assert_eq!(m.pointer_to_tile(239.0, 10.0), None);
        assert_eq!(m.pointer_to_tile(240.0, 0.0), Some(Position::new(0, 0)));
        assert_eq!(m.pointer_to_tile(559.0, 159.0), Some(Position::new(19, 9)));
        assert_eq!(m.pointer_to_tile(560.0, 159.0), None);
    }

    #[test]
    fn tall_window_is_letterboxed() {
        let mut m = mapper();
        m.on_resize(640, 1000);
        assert_eq!(m.scale(), 2.0);
        // 320 tall grid in 1000px
        assert_eq!(m.offset(), Vec2::new(0.0, 340.0));
        assert_eq!(m.pointer_to_tile(0.0, 339.0), None);
        assert_eq!(m.pointer_to_tile(0.0, 340.0), Some(Position::new(0, 0)));
    }

    #[test]
    fn projection_maps_grid_corners_to_clip_corners() {
        let mut m = mapper();
        m.on_resize(320, 160);
        let tl = m.projection().transform_point3(Vec3::new(0.0, 0.0, 0.0));
        let br = m.projection().transform_point3(Vec3::new(20.0, 10.0, 0.0));
        assert!((tl.x + 1.0).abs() < 1e-5 && (tl.y - 1.0).abs() < 1e-5);
        assert!((br.x - 1.0).abs() < 1e-5 && (br.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn viewport_camera_offsets() {
        let mut vp = Viewport::new(Area::from_xywh(2, 1, 10, 5));
        vp.camera = Position::new(30, 40);
        assert_eq!(vp.scene_to_viewport(Position::new(31, 42)), Some(Position::new(1, 2)));
        assert_eq!(vp.scene_to_viewport(Position::new(29, 42)), None);
        assert_eq!(vp.scene_to_viewport(Position::new(40, 42)), None);
        assert_eq!(vp.viewport_to_scene(Position::new(1, 2)), Position::new(31, 42));
        assert_eq!(vp.grid_to_scene(Position::new(3, 3)), Some(Position::new(31, 42)));
        assert_eq!(vp.grid_to_scene(Position::new(0, 0)), None);
    }

    #[test]
    fn camera_clamps_to_map() {
        let mut vp = Viewport::new(Area::from_xywh(0, 0, 10, 5));
        vp.center_on(Position::new(1, 1), Dimension::new(50, 50));
        assert_eq!(vp.camera, Position::ZERO);
        vp.center_on(Position::new(49, 49), Dimension::new(50, 50));
        assert_eq!(vp.camera, Position::new(40, 45));
        vp.center_on(Position::new(3, 3), Dimension::new(4, 4));
        assert_eq!(vp.camera, Position::ZERO);
    }
}
