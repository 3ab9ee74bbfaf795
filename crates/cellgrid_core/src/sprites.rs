//! Timed sprite playback on a dedicated surface.
//!
//! Sequences queue up FIFO; only the head one plays. Each plays frame by
//! frame on the engine's own [`TileSurface`], which is resized to fit the
//! sequence's shape when it starts.

use std::collections::VecDeque;

use glam::Vec2;

use crate::backend::SurfaceBackend;
use crate::cell::{Color, TileCell};
use crate::geometry::{Area, Position};
use crate::surface::TileSurface;

/// Grid position used for frames that fall outside the sprite viewport.
pub const OFFSCREEN: Position = Position { x: -4096, y: -4096 };

/// Slowest a moving sprite may travel, in cells per second.
pub const MIN_SPEED: f32 = 0.01;

/// Shortest frame duration accepted.
pub const MIN_SECONDS_PER_FRAME: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    /// One cell walking along `positions`.
    Moving,
    /// A cell at every position, all cycling through `frame_count` tiles.
    StaticFrameCycle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSequence {
    pub kind: SpriteKind,
    pub positions: Vec<Position>,
    pub tile_index: u32,
    pub frame_count: u32,
    pub color: Color,
    pub tilemap_id: u32,
    pub seconds_per_frame: f32,
}

impl SpriteSequence {
    /// Straight-line move from `origin` to `target` at `cells_per_second`.
    pub fn moving(
        origin: Position,
        target: Position,
        tile_index: u32,
        tilemap_id: u32,
        color: Color,
        cells_per_second: f32,
    ) -> Self {
        let speed = if cells_per_second.is_finite() {
            cells_per_second.max(MIN_SPEED)
        } else {
            MIN_SPEED
        };
        if speed != cells_per_second {
            tracing::debug!("sprite speed {} clamped to {}", cells_per_second, speed);
        }
        let positions = build_path(origin, target);
        Self {
            kind: SpriteKind::Moving,
            frame_count: positions.len() as u32,
            positions,
            tile_index,
            color,
            tilemap_id,
            seconds_per_frame: 1.0 / speed,
        }
    }

    /// Animate `frame_count` consecutive tiles starting at `tile_index` at every position.
    pub fn frame_cycle(
        positions: Vec<Position>,
        tile_index: u32,
        frame_count: u32,
        tilemap_id: u32,
        color: Color,
        seconds_per_frame: f32,
    ) -> Self {
        Self {
            kind: SpriteKind::StaticFrameCycle,
            positions,
            tile_index,
            frame_count: frame_count.max(1),
            color,
            tilemap_id,
            seconds_per_frame: clamp_frame_time(seconds_per_frame),
        }
    }

    pub fn with_seconds_per_frame(mut self, seconds: f32) -> Self {
        self.seconds_per_frame = clamp_frame_time(seconds);
        self
    }

    /// Number of frames before the sequence ends.
    pub fn frame_total(&self) -> usize {
        match self.kind {
            SpriteKind::Moving => self.positions.len().max(1),
            SpriteKind::StaticFrameCycle => self.frame_count.max(1) as usize,
        }
    }

    /// Surface shape while playing: `1x1` or one column per position.
    fn surface_width(&self) -> i32 {
        match self.kind {
            SpriteKind::Moving => 1,
            SpriteKind::StaticFrameCycle => self.positions.len().max(1) as i32,
        }
    }
}

fn clamp_frame_time(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(MIN_SECONDS_PER_FRAME)
    } else {
        MIN_SECONDS_PER_FRAME
    }
}

/// Cells visited walking from `origin` to `target` in unit-length steps.
///
/// Consecutive duplicates are dropped; both endpoints are always present.
pub fn build_path(origin: Position, target: Position) -> Vec<Position> {
    let start = Vec2::new(origin.x as f32, origin.y as f32);
    let delta = Vec2::new((target.x - origin.x) as f32, (target.y - origin.y) as f32);
    let len = delta.length();
    let mut path = vec![origin];
    if len <= 0.0 {
        return path;
    }
    let steps = len.floor() as i32;
    for step in 1..=steps {
        let p = start + delta * (step as f32 / len);
        let cell = Position::new(p.x.round() as i32, p.y.round() as i32);
        if path.last() != Some(&cell) {
            path.push(cell);
        }
    }
    if path.last() != Some(&target) {
        path.push(target);
    }
    path
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteEvent {
    Created(SequenceId),
    Destroyed(SequenceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Playing,
}

#[derive(Debug)]
struct ActiveSequence {
    id: SequenceId,
    sequence: SpriteSequence,
    frame: usize,
    frame_time: f32,
}

pub struct SpriteAnimationEngine {
    surface: TileSurface,
    viewport: Area,
    queue: VecDeque<(SequenceId, SpriteSequence)>,
    active: Option<ActiveSequence>,
    next_id: u64,
    events: Vec<SpriteEvent>,
}

impl SpriteAnimationEngine {
    /// `viewport` is the grid region sprite positions are relative to.
    pub fn new(viewport: Area) -> Self {
        let mut surface = TileSurface::new("sprites");
        surface.set_visible(false);
        Self {
            surface,
            viewport,
            queue: VecDeque::new(),
            active: None,
            next_id: 1,
            events: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Area {
        self.viewport
    }

    /// Move the sprite viewport; the playing frame is redrawn in place.
    pub fn set_viewport(&mut self, viewport: Area) {
        self.viewport = viewport;
        self.render_frame();
    }

    pub fn state(&self) -> AnimationState {
        if self.active.is_some() {
            AnimationState::Playing
        } else {
            AnimationState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Sequences waiting behind the active one.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn active_id(&self) -> Option<SequenceId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn active_frame(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.frame)
    }

    pub fn surface(&self) -> &TileSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut TileSurface {
        &mut self.surface
    }

    /// Queue a sequence. Starts playing at once when nothing else is.
    ///
    /// Frame time and frame count are clamped again here, since the fields
    /// are public and a literal can skip the constructors.
    pub fn enqueue(&mut self, mut sequence: SpriteSequence) -> SequenceId {
        sequence.seconds_per_frame = clamp_frame_time(sequence.seconds_per_frame);
        sequence.frame_count = sequence.frame_count.max(1);
        let id = SequenceId(self.next_id);
        self.next_id += 1;
        self.queue.push_back((id, sequence));
        if self.active.is_none() {
            self.start_next();
        }
        id
    }

    /// Notifications raised since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<SpriteEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the active sequence by `dt` seconds. At most one frame per call.
    pub fn on_update(&mut self, dt: f32) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.frame_time += if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if active.frame_time < active.sequence.seconds_per_frame {
            return;
        }
        active.frame += 1;
        active.frame_time = 0.0;
        if active.frame >= active.sequence.frame_total() {
            self.finish_active();
        } else {
            self.render_frame();
        }
    }

    /// Drop the active and all queued sequences. Only the active one raises `Destroyed`.
    pub fn clear(&mut self) {
        self.queue.clear();
        if let Some(active) = self.active.take() {
            self.events.push(SpriteEvent::Destroyed(active.id));
        }
        self.surface.set_visible(false);
    }

    pub fn render(&mut self, backend: &mut dyn SurfaceBackend) -> usize {
        self.surface.render(backend)
    }

    pub fn dispose(&mut self, backend: &mut dyn SurfaceBackend) {
        self.surface.dispose(backend);
    }

    fn finish_active(&mut self) {
        if let Some(done) = self.active.take() {
            tracing::debug!("sprite sequence {:?} finished", done.id);
            self.events.push(SpriteEvent::Destroyed(done.id));
        }
        if self.queue.is_empty() {
            self.surface.set_visible(false);
        } else {
            self.start_next();
        }
    }

    fn start_next(&mut self) {
        let Some((id, sequence)) = self.queue.pop_front() else {
            return;
        };
        tracing::debug!(
            "sprite sequence {:?} started ({:?}, {} frames)",
            id,
            sequence.kind,
            sequence.frame_total()
        );
        self.surface.resize(sequence.surface_width(), 1, TileCell::BLANK);
        self.surface.set_visible(true);
        self.active = Some(ActiveSequence {
            id,
            sequence,
            frame: 0,
            frame_time: 0.0,
        });
        self.events.push(SpriteEvent::Created(id));
        self.render_frame();
    }

    fn place(&self, local: Position) -> Position {
        let bounds = Area::new(Position::ZERO, self.viewport.size);
        if bounds.contains(local) {
            self.viewport.origin + local
        } else {
            OFFSCREEN
        }
    }

    fn render_frame(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let seq = &active.sequence;
        match seq.kind {
            SpriteKind::Moving => {
                let Some(&pos) = seq.positions.get(active.frame) else {
                    return;
                };
                let cell = TileCell::new(seq.tile_index, seq.tilemap_id, seq.color);
                let at = self.place(pos);
                self.surface.set_cell_at(0, 0, cell, at);
            }
            SpriteKind::StaticFrameCycle => {
                // Frames are stepped here, so the shader's own tile flip stays off.
                let tile = seq.tile_index.wrapping_add(active.frame as u32);
                let cell = TileCell::new(tile, seq.tilemap_id, seq.color);
                let placed: Vec<Position> = seq.positions.iter().map(|p| self.place(*p)).collect();
                for (col, at) in placed.into_iter().enumerate() {
                    self.surface.set_cell_at(col as i32, 0, cell, at);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SpriteAnimationEngine {
        SpriteAnimationEngine::new(Area::from_xywh(0, 0, 10, 10))
    }

    #[test]
    fn straight_path_includes_both_endpoints() {
        let path = build_path(Position::new(0, 0), Position::new(4, 0));
        assert_eq!(
            path,
            (0..=4).map(|x| Position::new(x, 0)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn diagonal_path_has_no_duplicates() {
        let path = build_path(Position::new(0, 0), Position::new(3, 3));
        assert_eq!(
            path,
            vec![
                Position::new(0, 0),
                Position::new(1, 1),
                Position::new(2, 2),
                Position::new(3, 3)
            ]
        );
    }

    #[test]
    fn zero_length_path_is_one_step() {
        let p = Position::new(5, 5);
        assert_eq!(build_path(p, p), vec![p]);
    }

    #[test]
    fn non_positive_speed_is_floored() {
        let seq = SpriteSequence::moving(Position::ZERO, Position::new(1, 0), 0, 0, Color::WHITE, -3.0);
        assert!((seq.seconds_per_frame - 1.0 / MIN_SPEED).abs() < 1e-3);
        let seq = SpriteSequence::frame_cycle(vec![], 0, 0, 0, Color::WHITE, 0.0);
        assert_eq!(seq.seconds_per_frame, MIN_SECONDS_PER_FRAME);
        assert_eq!(seq.frame_total(), 1);
    }

    #[test]
    fn enqueue_while_idle_plays_frame_zero() {
        let mut e = engine();
        assert_eq!(e.state(), AnimationState::Idle);
        let id = e.enqueue(SpriteSequence::moving(
            Position::new(2, 3),
            Position::new(5, 3),
            7,
            0,
            Color::WHITE,
            10.0,
        ));
        assert_eq!(e.state(), AnimationState::Playing);
        assert_eq!(e.take_events(), vec![SpriteEvent::Created(id)]);
        assert_eq!(e.surface().placement(0, 0), Some(Position::new(2, 3)));
        assert_eq!(e.surface().get_cell(0, 0).map(|c| c.tile_index), Some(7));
    }

    #[test]
    fn enqueue_while_playing_waits() {
        let mut e = engine();
        let a = e.enqueue(SpriteSequence::moving(Position::ZERO, Position::new(2, 0), 0, 0, Color::WHITE, 10.0));
        let _b = e.enqueue(SpriteSequence::moving(Position::ZERO, Position::new(2, 0), 0, 0, Color::WHITE, 10.0));
        assert_eq!(e.active_id(), Some(a));
        assert_eq!(e.queued(), 1);
    }

    #[test]
    fn frame_advances_only_after_seconds_per_frame() {
        let mut e = engine();
        e.enqueue(SpriteSequence::moving(Position::ZERO, Position::new(4, 0), 0, 0, Color::WHITE, 10.0));
        e.on_update(0.05);
        assert_eq!(e.active_frame(), Some(0));
        e.on_update(0.05);
        assert_eq!(e.active_frame(), Some(1));
        // A long frame still advances a single step.
        e.on_update(5.0);
        assert_eq!(e.active_frame(), Some(2));
    }

    #[test]
    fn frames_outside_viewport_use_sentinel() {
        let mut e = SpriteAnimationEngine::new(Area::from_xywh(5, 5, 2, 2));
        e.enqueue(SpriteSequence::moving(Position::new(1, 0), Position::new(3, 0), 0, 0, Color::WHITE, 10.0));
        assert_eq!(e.surface().placement(0, 0), Some(Position::new(6, 5)));
        e.on_update(0.1);
        assert_eq!(e.surface().placement(0, 0), Some(OFFSCREEN));
        assert_eq!(e.surface().size().area(), 1);
    }

    #[test]
    fn frame_cycle_resizes_and_steps_tile_index() {
        let mut e = engine();
        let spots = vec![Position::new(1, 1), Position::new(4, 2), Position::new(8, 8)];
        let id = e.enqueue(SpriteSequence::frame_cycle(spots.clone(), 100, 3, 1, Color::RED, 0.2));
        assert_eq!(e.surface().width(), 3);
        assert_eq!(e.surface().height(), 1);
        for (col, p) in spots.iter().enumerate() {
            assert_eq!(e.surface().placement(col as i32, 0), Some(*p));
            assert_eq!(e.surface().get_cell(col as i32, 0).map(|c| c.tile_index), Some(100));
        }
        e.on_update(0.2);
        assert_eq!(e.surface().get_cell(2, 0).map(|c| c.tile_index), Some(101));
        e.on_update(0.2);
        assert_eq!(e.surface().get_cell(0, 0).map(|c| c.tile_index), Some(102));
        e.take_events();
        e.on_update(0.2);
        assert_eq!(e.take_events(), vec![SpriteEvent::Destroyed(id)]);
        assert_eq!(e.state(), AnimationState::Idle);
        assert!(!e.surface().is_visible());
    }

    #[test]
    fn engine_stepped_cells_are_not_shader_animated() {
        let mut e = engine();
        e.enqueue(SpriteSequence::frame_cycle(vec![Position::ZERO], 100, 3, 0, Color::WHITE, 0.1));
        e.on_update(0.1);
        e.on_update(0.1);
        let cell = e.surface().get_cell(0, 0).unwrap();
        assert_eq!((cell.tile_index, cell.animated), (102, false));

        let mut e = engine();
        e.enqueue(SpriteSequence::moving(Position::ZERO, Position::new(2, 0), 5, 0, Color::WHITE, 10.0));
        assert_eq!(e.surface().get_cell(0, 0).map(|c| c.animated), Some(false));
    }

    #[test]
    fn literal_sequence_is_clamped_on_enqueue() {
        let mut e = engine();
        e.enqueue(SpriteSequence {
            kind: SpriteKind::StaticFrameCycle,
            positions: vec![Position::ZERO],
            tile_index: 0,
            frame_count: 3,
            color: Color::WHITE,
            tilemap_id: 0,
            seconds_per_frame: -1.0,
        });
        e.on_update(0.0);
        assert_eq!(e.active_frame(), Some(0));

        let mut e = engine();
        e.enqueue(SpriteSequence {
            kind: SpriteKind::StaticFrameCycle,
            positions: vec![Position::ZERO],
            tile_index: 0,
            frame_count: 0,
            color: Color::WHITE,
            tilemap_id: 0,
            seconds_per_frame: f32::NAN,
        });
        e.on_update(0.0);
        assert_eq!(e.active_frame(), Some(0));
    }

    #[test]
    fn tile_index_near_max_wraps_instead_of_panicking() {
        let mut e = engine();
        e.enqueue(SpriteSequence::frame_cycle(vec![Position::ZERO], u32::MAX, 2, 0, Color::WHITE, 0.1));
        e.on_update(0.1);
        assert_eq!(e.surface().get_cell(0, 0).map(|c| c.tile_index), Some(0));
    }

    #[test]
    fn clear_destroys_only_active() {
        let mut e = engine();
        let a = e.enqueue(SpriteSequence::moving(Position::ZERO, Position::new(2, 0), 0, 0, Color::WHITE, 1.0));
        e.enqueue(SpriteSequence::moving(Position::ZERO, Position::new(2, 0), 0, 0, Color::WHITE, 1.0));
        e.take_events();
        e.clear();
        assert_eq!(e.take_events(), vec![SpriteEvent::Destroyed(a)]);
        assert_eq!(e.queued(), 0);
        assert!(!e.is_playing());
    }
}
