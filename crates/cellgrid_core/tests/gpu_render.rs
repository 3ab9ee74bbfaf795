use cellgrid_core::backend::AtlasProvider;
use cellgrid_core::cell::{Color, TileCell};
use cellgrid_core::coords::{CoordinateMapper, ScaleMode};
use cellgrid_core::geometry::Dimension;
use cellgrid_core::gpu::GpuBackend;
use cellgrid_core::surface::TileSurface;
use image::{DynamicImage, Rgba, RgbaImage};

const SIZE: u32 = 64;

fn white_atlas() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 16, Rgba([255, 255, 255, 255])))
}

fn pixel(rgba: &[u8], x: u32, y: u32) -> (u8, u8, u8) {
    let i = ((y * SIZE + x) * 4) as usize;
    (rgba[i], rgba[i + 1], rgba[i + 2])
}

// Needs a GPU adapter; machines without one skip rather than fail.
async fn backend() -> Option<GpuBackend> {
    match GpuBackend::new_headless(SIZE, SIZE).await {
        Ok(b) => Some(b),
        Err(e) => {
            eprintln!("skipping: {e:#}");
            None
        }
    }
}

#[test]
fn renders_a_tinted_cell_in_its_grid_slot() {
    let Some(mut gpu) = pollster::block_on(backend()) else {
        return;
    };
    let info = gpu.load_atlas_image(0, &white_atlas(), 16, 16).unwrap();
    assert_eq!(info.tile_count(), 2);
    assert!(gpu.atlases().is_loaded(0));

    let mut mapper = CoordinateMapper::new(Dimension::new(16, 16), Dimension::new(4, 4), ScaleMode::Fractional);
    mapper.on_resize(SIZE, SIZE);
    gpu.set_projection(mapper.projection());

    let mut surface = TileSurface::with_size("test", 4, 4, TileCell::BLANK);
    surface.set_cell(1, 1, TileCell::new(0, 0, Color::rgb(255, 0, 0)));
    surface.render(&mut gpu);
    gpu.present().unwrap();

    let rgba = gpu.read_pixels().unwrap();
    let (r, g, b) = pixel(&rgba, 24, 24);
    assert!(r > 200 && g < 30 && b < 30, "unexpected color in cell: {},{},{}", r, g, b);
    let (r, g, b) = pixel(&rgba, 4, 4);
    assert!(r < 30 && g < 30 && b < 30, "blank cell drew: {},{},{}", r, g, b);
}

#[tokio::test]
async fn unloaded_atlas_and_out_of_range_tiles_draw_nothing() {
    let Some(mut gpu) = backend().await else {
        return;
    };
    gpu.load_atlas_image(0, &white_atlas(), 16, 16).unwrap();
    let mut mapper = CoordinateMapper::new(Dimension::new(16, 16), Dimension::new(4, 4), ScaleMode::Fractional);
    mapper.on_resize(SIZE, SIZE);
    gpu.set_projection(mapper.projection());

    let mut surface = TileSurface::with_size("test", 2, 1, TileCell::BLANK);
    surface.set_cell(0, 0, TileCell::new(0, 2, Color::WHITE));
    surface.set_cell(1, 0, TileCell::new(9, 0, Color::WHITE));
    surface.render(&mut gpu);
    assert_eq!(gpu.live_surfaces(), 1);
    gpu.present().unwrap();

    let rgba = gpu.read_pixels().unwrap();
    for x in [8, 24] {
        let (r, g, b) = pixel(&rgba, x, 8);
        assert!(r < 30 && g < 30 && b < 30, "cell at x={} drew: {},{},{}", x, r, g, b);
    }
}
