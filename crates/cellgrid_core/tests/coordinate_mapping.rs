use cellgrid_core::coords::{CoordinateMapper, ScaleMode, Viewport};
use cellgrid_core::geometry::{Area, Dimension, Position};
use glam::{Vec2, Vec4};
use proptest::prelude::*;

proptest! {
    #[test]
    fn cell_centers_map_back_to_their_cell(
        win_w in 64u32..2560,
        win_h in 64u32..1600,
        cols in 1i32..64,
        rows in 1i32..48,
        tile in 4i32..24,
        integer in any::<bool>(),
    ) {
        let mode = if integer { ScaleMode::Integer } else { ScaleMode::Fractional };
        let mut m = CoordinateMapper::new(Dimension::new(tile, tile), Dimension::new(cols, rows), mode);
        m.on_resize(win_w, win_h);
        for row in 0..rows {
            for col in 0..cols {
                let p = Position::new(col, row);
                let c = m.tile_to_screen(p);
                prop_assert_eq!(m.pointer_to_tile(c.x, c.y), Some(p));
            }
        }
    }

    #[test]
    fn grid_is_centered_and_fits(win_w in 1u32..4000, win_h in 1u32..4000) {
        let mut m = CoordinateMapper::new(Dimension::new(16, 16), Dimension::new(40, 25), ScaleMode::Fractional);
        m.on_resize(win_w, win_h);
        let scaled = Vec2::new(640.0, 400.0) * m.scale();
        prop_assert!(scaled.x <= win_w as f32 + 0.5 && scaled.y <= win_h as f32 + 0.5);
        let off = m.offset();
        prop_assert!((off.x * 2.0 + scaled.x - win_w as f32).abs() < 1.0);
        prop_assert!((off.y * 2.0 + scaled.y - win_h as f32).abs() < 1.0);
    }
}

#[test]
fn zero_sized_window_and_grid_do_not_divide_by_zero() {
    let mut m = CoordinateMapper::new(Dimension::new(0, 0), Dimension::new(0, 0), ScaleMode::Fractional);
    m.on_resize(0, 0);
    assert!(m.scale().is_finite() && m.scale() > 0.0);
    assert!(m.offset().is_finite());
    assert!(m.projection().is_finite());
}

#[test]
fn pointer_in_letterbox_bar_is_outside_grid() {
    // 40x25 cells of 16px at 1280x1000: scale 2, 100px bars top and bottom.
    let mut m = CoordinateMapper::new(Dimension::new(16, 16), Dimension::new(40, 25), ScaleMode::Fractional);
    m.on_resize(1280, 1000);
    assert_eq!(m.scale(), 2.0);
    assert_eq!(m.offset(), Vec2::new(0.0, 100.0));
    assert_eq!(m.pointer_to_tile(10.0, 50.0), None);
    assert_eq!(m.pointer_to_tile(10.0, 100.0), Some(Position::new(0, 0)));
    assert_eq!(m.pointer_to_tile(1279.0, 899.0), Some(Position::new(39, 24)));
    assert_eq!(m.pointer_to_tile(1279.0, 901.0), None);
}

#[test]
fn integer_mode_floors_scale() {
    let mut m = CoordinateMapper::new(Dimension::new(16, 16), Dimension::new(40, 25), ScaleMode::Integer);
    m.on_resize(1900, 1200);
    assert_eq!(m.scale(), 2.0);
    assert_eq!(m.offset(), Vec2::new(310.0, 200.0));
}

#[test]
fn projection_maps_grid_corners_to_clip_corners() {
    let mut m = CoordinateMapper::new(Dimension::new(8, 8), Dimension::new(10, 10), ScaleMode::Fractional);
    m.on_resize(80, 80);
    let tl = m.projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let br = m.projection() * Vec4::new(10.0, 10.0, 0.0, 1.0);
    assert!((tl.x + 1.0).abs() < 1e-5 && (tl.y - 1.0).abs() < 1e-5);
    assert!((br.x - 1.0).abs() < 1e-5 && (br.y + 1.0).abs() < 1e-5);
}

#[test]
fn viewport_scene_round_trip() {
    let mut vp = Viewport::new(Area::from_xywh(2, 1, 6, 4));
    vp.center_on(Position::new(20, 20), Dimension::new(30, 30));
    assert_eq!(vp.camera, Position::new(17, 18));
    let scene = Position::new(19, 19);
    let local = vp.scene_to_viewport(scene).unwrap();
    assert_eq!(vp.viewport_to_scene(local), scene);
    assert_eq!(vp.grid_to_scene(vp.viewport_to_grid(local)), Some(scene));
    assert!(!vp.is_visible(Position::new(0, 0)));
}
