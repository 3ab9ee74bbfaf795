use cellgrid_core::backend::HeadlessBackend;
use cellgrid_core::cell::{Color, TileCell};
use cellgrid_core::surface::TileSurface;
use proptest::prelude::*;

fn cell(tile: u32) -> TileCell {
    TileCell::new(tile, 0, Color::WHITE)
}

proptest! {
    // Flushing partial updates at arbitrary points must leave the backend
    // holding exactly what one full upload of the final grid would.
    #[test]
    fn partial_updates_match_full_rebuild(
        w in 1i32..12,
        h in 1i32..12,
        ops in proptest::collection::vec((0i32..12, 0i32..12, 0u32..40, any::<bool>()), 0..80),
    ) {
        let mut backend = HeadlessBackend::new();
        let mut live = TileSurface::with_size("live", w, h, TileCell::BLANK);
        live.flush(&mut backend);

        let mut model = vec![TileCell::BLANK; (w * h) as usize];
        for &(col, row, tile, flush_now) in &ops {
            let (col, row) = (col % w, row % h);
            live.set_cell(col, row, cell(tile));
            model[(row * w + col) as usize] = cell(tile);
            if flush_now {
                live.flush(&mut backend);
            }
        }
        live.flush(&mut backend);

        let mut rebuilt = TileSurface::with_size("rebuilt", w, h, TileCell::BLANK);
        for &(col, row, tile, _) in &ops {
            rebuilt.set_cell(col % w, row % h, cell(tile));
        }
        rebuilt.flush(&mut backend);

        prop_assert_eq!(live.cells(), &model[..]);
        let a = backend.surface(live.handle().unwrap()).unwrap();
        let b = backend.surface(rebuilt.handle().unwrap()).unwrap();
        prop_assert_eq!(&a.cells, &b.cells);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored(
        w in 1i32..10,
        h in 1i32..10,
        writes in proptest::collection::vec((-20i32..20, -20i32..20), 1..40),
    ) {
        let mut backend = HeadlessBackend::new();
        let mut s = TileSurface::with_size("oob", w, h, cell(1));
        s.flush(&mut backend);
        for (col, row) in writes {
            if col >= 0 && col < w && row >= 0 && row < h {
                continue;
            }
            s.set_cell(col, row, cell(99));
        }
        prop_assert!(!s.is_dirty());
        prop_assert!(s.cells().iter().all(|c| *c == cell(1)));
        prop_assert_eq!(s.render(&mut backend), 0);
    }
}

#[test]
fn ten_by_ten_scenario() {
    let mut backend = HeadlessBackend::new();
    let mut s = TileSurface::new("scenario");
    s.resize(10, 10, TileCell::BLANK);
    let x = TileCell::new(65, 0, Color::GREEN);
    let y = TileCell::new(66, 0, Color::RED);
    s.set_cell(3, 3, x);
    s.set_cell(11, 11, y);

    assert_eq!(s.get_cell(3, 3), Some(x));
    assert_eq!(s.get_cell(11, 11), None);
    assert!(s.cells().iter().filter(|c| **c == y).count() == 0);

    let uploaded = s.render(&mut backend);
    assert_eq!(uploaded, 100);
    let handle = s.handle().unwrap();
    assert_eq!(backend.submitted(), &[handle]);
    assert_eq!(backend.surface(handle).unwrap().cell(3, 3).unwrap().tile_index, 65);
}

#[test]
fn single_change_after_first_frame_uploads_one_cell() {
    let mut backend = HeadlessBackend::new();
    let mut s = TileSurface::with_size("cursor", 40, 25, TileCell::BLANK);
    s.render(&mut backend);
    backend.end_frame();
    let before = backend.total_uploads();
    s.set_cell(20, 12, cell(7));
    assert_eq!(s.render(&mut backend), 1);
    assert_eq!(backend.total_uploads() - before, 1);
}
