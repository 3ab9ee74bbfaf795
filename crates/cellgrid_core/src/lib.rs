//! Tile-grid rendering core: partially-updatable cell surfaces, letterboxed
//! grid coordinates, a FIFO sprite animator and a page-based UI, with a
//! wgpu backend and a headless recorder behind the same trait.

pub mod backend;
pub mod cell;
pub mod config;
pub mod coords;
pub mod frame;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod keys;
pub mod metrics;
pub mod rng;
pub mod scene;
pub mod sprites;
pub mod surface;
pub mod time;
pub mod ui;
pub mod window;

pub use backend::{HeadlessBackend, SurfaceBackend, SurfaceHandle};
pub use cell::{Color, TileCell, VisualEffect};
pub use config::EngineConfig;
pub use coords::{CoordinateMapper, ScaleMode};
pub use frame::FrameDriver;
pub use geometry::{Area, Dimension, Position};
pub use surface::TileSurface;
