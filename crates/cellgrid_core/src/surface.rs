//! Partially-updatable grid of cells backing one on-screen region.
//!
//! A [`TileSurface`] keeps the logical cells on the CPU and a list of the
//! cells changed since the last upload. Writes never touch the backend;
//! [`TileSurface::flush`] pushes only the changed cells, or the whole buffer
//! after a resize or origin move.

use crate::backend::{SurfaceBackend, SurfaceHandle};
use crate::cell::{PackedCell, TileCell};
use crate::geometry::{Dimension, Position};

#[derive(Debug)]
pub struct TileSurface {
    label: String,
    size: Dimension,
    origin: Position,
    cells: Vec<TileCell>,
    // Absolute grid position each cell is drawn at.
    placements: Vec<Position>,
    dirty_flags: Vec<bool>,
    dirty_list: Vec<usize>,
    full_upload: bool,
    needs_alloc: bool,
    handle: Option<SurfaceHandle>,
    visible: bool,
}

impl TileSurface {
    /// Empty surface; renders nothing until resized.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            size: Dimension::default(),
            origin: Position::ZERO,
            cells: Vec::new(),
            placements: Vec::new(),
            dirty_flags: Vec::new(),
            dirty_list: Vec::new(),
            full_upload: false,
            needs_alloc: true,
            handle: None,
            visible: true,
        }
    }

    pub fn with_size(label: impl Into<String>, width: i32, height: i32, fill: TileCell) -> Self {
        let mut surface = Self::new(label);
        surface.resize(width, height, fill);
        surface
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> Dimension {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn handle(&self) -> Option<SurfaceHandle> {
        self.handle
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Reallocate to `width * height` cells, all set to `fill`.
    ///
    /// Non-positive sizes are clamped to 1. Any pending partial updates are
    /// dropped in favour of a full upload, and the backend buffer is
    /// recreated on the next flush.
    pub fn resize(&mut self, width: i32, height: i32, fill: TileCell) {
        let size = Dimension::new(width, height).at_least_one();
        if (size.width, size.height) != (width, height) {
            tracing::debug!(
                "surface '{}': resize {}x{} clamped to {}x{}",
                self.label,
                width,
                height,
                size.width,
                size.height
            );
        }
        let n = size.area();
        self.size = size;
        self.cells.clear();
        self.cells.resize(n, fill);
        self.dirty_flags.clear();
        self.dirty_flags.resize(n, false);
        self.dirty_list.clear();
        let (origin, w) = (self.origin, size.width as usize);
        self.placements.clear();
        self.placements
            .extend((0..n).map(|i| origin.offset((i % w) as i32, (i / w) as i32)));
        self.full_upload = true;
        self.needs_alloc = true;
    }

    fn index_of(&self, col: i32, row: i32) -> Option<usize> {
        if self.size.contains(col, row) {
            Some(row as usize * self.size.width as usize + col as usize)
        } else {
            None
        }
    }

    fn mark_dirty(&mut self, idx: usize) {
        if self.full_upload || self.dirty_flags[idx] {
            return;
        }
        self.dirty_flags[idx] = true;
        self.dirty_list.push(idx);
    }

    /// Store `cell` at `(col, row)`. Out-of-range coordinates are ignored.
    pub fn set_cell(&mut self, col: i32, row: i32, cell: TileCell) {
        let Some(idx) = self.index_of(col, row) else {
            tracing::trace!("surface '{}': set_cell({}, {}) out of range", self.label, col, row);
            return;
        };
        if self.cells[idx] == cell {
            return;
        }
        self.cells[idx] = cell;
        self.mark_dirty(idx);
    }

    /// Store `cell` at `(col, row)` and draw it at grid position `at`
    /// instead of its row-major slot.
    pub fn set_cell_at(&mut self, col: i32, row: i32, cell: TileCell, at: Position) {
        let Some(idx) = self.index_of(col, row) else {
            tracing::trace!("surface '{}': set_cell_at({}, {}) out of range", self.label, col, row);
            return;
        };
        if self.cells[idx] == cell && self.placements[idx] == at {
            return;
        }
        self.cells[idx] = cell;
        self.placements[idx] = at;
        self.mark_dirty(idx);
    }

    pub fn get_cell(&self, col: i32, row: i32) -> Option<TileCell> {
        self.index_of(col, row).map(|idx| self.cells[idx])
    }

    /// Grid position the cell at `(col, row)` is drawn at.
    pub fn placement(&self, col: i32, row: i32) -> Option<Position> {
        self.index_of(col, row).map(|idx| self.placements[idx])
    }

    pub fn cells(&self) -> &[TileCell] {
        &self.cells
    }

    pub fn fill(&mut self, cell: TileCell) {
        for idx in 0..self.cells.len() {
            if self.cells[idx] != cell {
                self.cells[idx] = cell;
                self.mark_dirty(idx);
            }
        }
    }

    /// Move the whole surface; every cell's placement shifts with it.
    pub fn set_origin(&mut self, origin: Position) {
        if origin == self.origin {
            return;
        }
        let delta = origin - self.origin;
        self.origin = origin;
        for p in &mut self.placements {
            *p = *p + delta;
        }
        self.full_upload = true;
        self.dirty_list.clear();
        self.dirty_flags.iter_mut().for_each(|f| *f = false);
    }

    pub fn is_dirty(&self) -> bool {
        self.full_upload || !self.dirty_list.is_empty()
    }

    /// Cells that the next flush will upload.
    pub fn pending_uploads(&self) -> usize {
        if self.full_upload {
            self.cells.len()
        } else {
            self.dirty_list.len()
        }
    }

    /// Push pending changes to the backend; returns the number of cells uploaded.
    pub fn flush(&mut self, backend: &mut dyn SurfaceBackend) -> usize {
        if self.cells.is_empty() {
            return 0;
        }
        if self.needs_alloc || self.handle.is_none() {
            if let Some(old) = self.handle.take() {
                backend.free(old);
            }
            let handle = backend.allocate_surface(self.size.width as u32, self.size.height as u32);
            tracing::debug!(
                "surface '{}': allocated {:?} ({}x{})",
                self.label,
                handle,
                self.size.width,
                self.size.height
            );
            self.handle = Some(handle);
            self.needs_alloc = false;
            self.full_upload = true;
        }
        let Some(handle) = self.handle else {
            return 0;
        };

        let uploaded = if self.full_upload {
            let packed: Vec<PackedCell> = self
                .cells
                .iter()
                .zip(&self.placements)
                .map(|(cell, at)| cell.pack(*at))
                .collect();
            backend.upload_all(handle, self.size.width as u32, &packed);
            self.full_upload = false;
            packed.len()
        } else {
            let w = self.size.width as usize;
            for &idx in &self.dirty_list {
                let packed = self.cells[idx].pack(self.placements[idx]);
                backend.upload_cell(handle, (idx % w) as u32, (idx / w) as u32, packed);
                self.dirty_flags[idx] = false;
            }
            self.dirty_list.len()
        };
        self.dirty_list.clear();
        uploaded
    }

    /// Flush and queue the surface for drawing. No-op when empty or hidden.
    pub fn render(&mut self, backend: &mut dyn SurfaceBackend) -> usize {
        if self.cells.is_empty() || !self.visible {
            return 0;
        }
        let uploaded = self.flush(backend);
        if let Some(handle) = self.handle {
            backend.submit(handle);
        }
        uploaded
    }

    /// Release the backend buffer. Safe to call repeatedly.
    pub fn dispose(&mut self, backend: &mut dyn SurfaceBackend) {
        if let Some(handle) = self.handle.take() {
            backend.free(handle);
            tracing::debug!("surface '{}': freed {:?}", self.label, handle);
        }
        self.needs_alloc = true;
        self.full_upload = true;
        self.dirty_list.clear();
        self.dirty_flags.iter_mut().for_each(|f| *f = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::cell::Color;

    fn cell(i: u32) -> TileCell {
        TileCell::new(i, 0, Color::WHITE)
    }

    #[test]
    fn only_changed_cells_are_uploaded_after_first_flush() {
        let mut backend = HeadlessBackend::new();
        let mut s = TileSurface::with_size("t", 8, 8, TileCell::BLANK);
        assert_eq!(s.flush(&mut backend), 64);
        s.set_cell(1, 1, cell(3));
        s.set_cell(2, 1, cell(4));
        s.set_cell(1, 1, cell(5));
        assert_eq!(s.pending_uploads(), 2);
        assert_eq!(s.flush(&mut backend), 2);
        assert!(!s.is_dirty());
        let h = s.handle().unwrap();
        assert_eq!(backend.surface(h).unwrap().cell(1, 1).unwrap().tile_index, 5);
    }

    #[test]
    fn writing_identical_cell_is_not_dirty() {
        let mut backend = HeadlessBackend::new();
        let mut s = TileSurface::with_size("t", 4, 4, cell(1));
        s.flush(&mut backend);
        s.set_cell(0, 0, cell(1));
        assert!(!s.is_dirty());
    }

    #[test]
    fn resize_clamps_and_reallocates() {
        let mut backend = HeadlessBackend::new();
        let mut s = TileSurface::with_size("t", 3, 3, TileCell::BLANK);
        s.flush(&mut backend);
        let first = s.handle().unwrap();
        s.resize(0, -2, TileCell::BLANK);
        assert_eq!(s.size(), Dimension::new(1, 1));
        assert_eq!(s.pending_uploads(), 1);
        s.flush(&mut backend);
        assert_ne!(s.handle().unwrap(), first);
        assert!(backend.surface(first).is_none());
        assert_eq!(backend.live_surfaces(), 1);
    }

    #[test]
    fn empty_or_hidden_surface_does_not_submit() {
        let mut backend = HeadlessBackend::new();
        let mut empty = TileSurface::new("empty");
        assert_eq!(empty.render(&mut backend), 0);
        let mut hidden = TileSurface::with_size("hidden", 2, 2, TileCell::BLANK);
        hidden.set_visible(false);
        hidden.render(&mut backend);
        assert!(backend.submitted().is_empty());
        assert_eq!(backend.live_surfaces(), 0);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut backend = HeadlessBackend::new();
        let mut s = TileSurface::with_size("t", 2, 2, TileCell::BLANK);
        s.render(&mut backend);
        s.dispose(&mut backend);
        s.dispose(&mut backend);
        assert_eq!(backend.total_frees(), 1);
        assert!(s.handle().is_none());
    }

    #[test]
    fn origin_shifts_placements() {
        let mut s = TileSurface::with_size("t", 2, 1, TileCell::BLANK);
        s.set_origin(Position::new(10, 5));
        assert_eq!(s.placement(1, 0), Some(Position::new(11, 5)));
        assert_eq!(s.pending_uploads(), 2);
    }
}
