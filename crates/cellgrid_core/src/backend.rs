use std::collections::HashMap;

use crate::cell::{PackedCell, TILEMAP_COUNT};

/// Opaque id of a GPU-resident cell buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u32);

/// The four operations the grid core needs from a graphics backend.
///
/// Implementations must tolerate stale handles (already freed) and
/// out-of-range cell addresses by ignoring them.
pub trait SurfaceBackend {
    fn allocate_surface(&mut self, width: u32, height: u32) -> SurfaceHandle;

    fn upload_cell(&mut self, handle: SurfaceHandle, col: u32, row: u32, cell: PackedCell);

    /// Replace the whole buffer, row-major. Backends with a bulk path override this.
    fn upload_all(&mut self, handle: SurfaceHandle, width: u32, cells: &[PackedCell]) {
        let width = width.max(1);
        for (i, cell) in cells.iter().enumerate() {
            let i = i as u32;
            self.upload_cell(handle, i % width, i / width, *cell);
        }
    }

    /// Queue the buffer for drawing in this frame, after everything submitted before it.
    fn submit(&mut self, handle: SurfaceHandle);

    fn free(&mut self, handle: SurfaceHandle);
}

/// Grid layout of a loaded atlas texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasInfo {
    pub columns: u32,
    pub rows: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl AtlasInfo {
    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }
}

/// Resolves tilemap ids carried by cells to loaded atlases.
pub trait AtlasProvider {
    fn atlas(&self, tilemap_id: u32) -> Option<AtlasInfo>;

    fn is_loaded(&self, tilemap_id: u32) -> bool {
        self.atlas(tilemap_id).is_some()
    }
}

/// Fixed slot table of atlases, indexed by tilemap id.
#[derive(Debug, Clone, Default)]
pub struct AtlasRegistry {
    slots: [Option<AtlasInfo>; TILEMAP_COUNT as usize],
}

impl AtlasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when `tilemap_id` is outside the slot table.
    pub fn register(&mut self, tilemap_id: u32, info: AtlasInfo) -> bool {
        match self.slots.get_mut(tilemap_id as usize) {
            Some(slot) => {
                *slot = Some(info);
                tracing::debug!(
                    "Registered atlas {} ({}x{} tiles of {}x{}px)",
                    tilemap_id,
                    info.columns,
                    info.rows,
                    info.tile_width,
                    info.tile_height
                );
                true
            }
            None => {
                tracing::warn!("Atlas id {} exceeds slot count {}", tilemap_id, TILEMAP_COUNT);
                false
            }
        }
    }

    pub fn unregister(&mut self, tilemap_id: u32) {
        if let Some(slot) = self.slots.get_mut(tilemap_id as usize) {
            *slot = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AtlasInfo)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|info| (i as u32, info)))
    }
}

impl AtlasProvider for AtlasRegistry {
    fn atlas(&self, tilemap_id: u32) -> Option<AtlasInfo> {
        self.slots.get(tilemap_id as usize).copied().flatten()
    }
}

/// In-memory buffer held by [`HeadlessBackend`] for one handle.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<PackedCell>,
    pub uploads: usize,
}

impl HeadlessSurface {
    pub fn cell(&self, col: u32, row: u32) -> Option<&PackedCell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get((row * self.width + col) as usize)
    }
}

/// Backend that mirrors GPU buffers in memory and records what was drawn.
///
/// Stands in for the GPU when running without one and lets tests observe
/// exactly which cells were uploaded.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    surfaces: HashMap<SurfaceHandle, HeadlessSurface>,
    next_handle: u32,
    submitted: Vec<SurfaceHandle>,
    total_uploads: usize,
    total_frees: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            ..Default::default()
        }
    }

    pub fn surface(&self, handle: SurfaceHandle) -> Option<&HeadlessSurface> {
        self.surfaces.get(&handle)
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    /// Handles submitted since the last [`HeadlessBackend::end_frame`], in order.
    pub fn submitted(&self) -> &[SurfaceHandle] {
        &self.submitted
    }

    pub fn total_uploads(&self) -> usize {
        self.total_uploads
    }

    pub fn total_frees(&self) -> usize {
        self.total_frees
    }

    pub fn end_frame(&mut self) {
        self.submitted.clear();
    }
}

impl SurfaceBackend for HeadlessBackend {
    fn allocate_surface(&mut self, width: u32, height: u32) -> SurfaceHandle {
        let handle = SurfaceHandle(self.next_handle.max(1));
        self.next_handle = handle.0 + 1;
        let zeroed = PackedCell {
            position: [0.0; 2],
            tile_index: 0,
            tilemap_id: 0,
            color: [0.0; 4],
            effect: 0,
            flags: 0,
        };
        self.surfaces.insert(
            handle,
            HeadlessSurface {
                width,
                height,
                cells: vec![zeroed; (width * height) as usize],
                uploads: 0,
            },
        );
        handle
    }

    fn upload_cell(&mut self, handle: SurfaceHandle, col: u32, row: u32, cell: PackedCell) {
        let Some(surface) = self.surfaces.get_mut(&handle) else {
            tracing::trace!("upload to stale handle {:?}", handle);
            return;
        };
        if col >= surface.width || row >= surface.height {
            return;
        }
        let idx = (row * surface.width + col) as usize;
        surface.cells[idx] = cell;
        surface.uploads += 1;
        self.total_uploads += 1;
    }

    fn submit(&mut self, handle: SurfaceHandle) {
        if self.surfaces.contains_key(&handle) {
            self.submitted.push(handle);
        }
    }

    fn free(&mut self, handle: SurfaceHandle) {
        if self.surfaces.remove(&handle).is_some() {
            self.total_frees += 1;
        }
    }
}
