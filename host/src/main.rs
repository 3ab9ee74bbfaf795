use anyhow::Result;
use cellgrid_core::config::EngineConfig;
use cellgrid_core::window::EngineWindow;
use image::DynamicImage;
use tracing::info;

mod demo;

const DEFAULT_CONFIG: &str = "cellgrid.json";

fn main() -> Result<()> {
    // Parse simple CLI flags
    let mut config_path = DEFAULT_CONFIG.to_string();
    let mut seed: u64 = 0x5eed;
    {
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        config_path = path;
                    }
                }
                "--seed" => {
                    if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                        seed = value;
                    }
                }
                _ => {}
            }
        }
    }

    // The log level comes from the config, so load it before the subscriber exists.
    let loaded = EngineConfig::load(&config_path);
    let config = loaded.as_ref().ok().cloned().unwrap_or_default();
    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();
    if let Err(e) = &loaded {
        tracing::warn!("using default config: {:#}", e);
    }

    info!("cellgrid demo starting...");
    info!(
        "grid {}x{} cells of {}x{}px, {} atlas(es)",
        config.tile_count.width,
        config.tile_count.height,
        config.tile_size.width,
        config.tile_size.height,
        config.atlases.len()
    );

    let map = demo::generate_map(seed);
    let app = demo::DemoApp::new(config.title.clone(), seed);
    EngineWindow::new(config, map, app)
        .with_atlas_image(0, DynamicImage::ImageRgba8(demo::placeholder_atlas()), demo::GLYPH_PX, demo::GLYPH_PX)
        .run()?;

    info!("cellgrid demo exited");
    Ok(())
}
