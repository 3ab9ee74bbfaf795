use std::any::Any;

use crate::cell::{Color, TileCell, VisualEffect};
use crate::geometry::{Area, Dimension, Position};
use crate::input::ControlInput;
use crate::surface::TileSurface;

/// Identity of a control within its page, stable for the page's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u32);

/// Properties every control carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlProps {
    pub position: Position,
    pub color: Color,
    pub tile_index: u32,
    pub tilemap_id: u32,
    pub z_order: i32,
    pub effect: Option<VisualEffect>,
    pub visible: bool,
}

impl ControlProps {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            position: Position::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_tile(mut self, tile_index: u32, tilemap_id: u32) -> Self {
        self.tile_index = tile_index;
        self.tilemap_id = tilemap_id;
        self
    }

    pub fn with_z(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn with_effect(mut self, effect: VisualEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Cell showing `tile_index` with this control's tilemap, effect and `color`.
    pub fn cell(&self, tile_index: u32, color: Color) -> TileCell {
        TileCell {
            tile_index,
            tilemap_id: self.tilemap_id,
            color,
            effect: self.effect,
            animated: false,
        }
    }
}

impl Default for ControlProps {
    fn default() -> Self {
        Self {
            position: Position::ZERO,
            color: Color::WHITE,
            tile_index: 0,
            tilemap_id: 0,
            z_order: 0,
            effect: None,
            visible: true,
        }
    }
}

/// Result of offering an input event to a page or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Consumed,
}

/// Notifications raised by controls for application code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Clicked { control: ControlId },
    SelectionChanged { control: ControlId, index: usize },
    MenuActivated { control: ControlId, index: usize },
}

/// Optional capability: a control that reacts to input.
pub trait InputHandler {
    fn handle(&mut self, id: ControlId, input: &ControlInput, events: &mut Vec<UiEvent>) -> InputOutcome;
}

/// Something that paints itself into the UI surface.
pub trait Control: Any {
    fn props(&self) -> &ControlProps;

    fn props_mut(&mut self) -> &mut ControlProps;

    /// Grid cells the control covers; used for pointer hit-testing.
    fn bounds(&self) -> Area {
        Area::new(self.props().position, Dimension::new(1, 1))
    }

    fn paint(&self, surface: &mut TileSurface);

    fn input_mut(&mut self) -> Option<&mut dyn InputHandler> {
        None
    }

    fn accepts_input(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Slot {
    id: ControlId,
    control: Box<dyn Control>,
}

/// Controls of one page, in insertion order, plus the page's invalidation flag.
///
/// All mutation goes through [`ControlSet::modify`] / [`ControlSet::props_mut`]
/// so every change marks the set for re-composition. The flag is only
/// cleared by the composer, so any number of changes within a frame cost one
/// repaint.
#[derive(Default)]
pub struct ControlSet {
    slots: Vec<Slot>,
    next_id: u32,
    invalidated: bool,
    focus: Option<ControlId>,
    events: Vec<UiEvent>,
}

impl ControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<C: Control>(&mut self, control: C) -> ControlId {
        let id = ControlId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot { id, control: Box::new(control) });
        self.invalidated = true;
        id
    }

    pub fn remove(&mut self, id: ControlId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.id != id);
        if self.focus == Some(id) {
            self.focus = None;
        }
        let removed = self.slots.len() != before;
        self.invalidated |= removed;
        removed
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ControlId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    fn slot(&self, id: ControlId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: ControlId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    pub fn get<C: Control>(&self, id: ControlId) -> Option<&C> {
        self.slot(id).and_then(|s| s.control.as_any().downcast_ref::<C>())
    }

    pub fn props(&self, id: ControlId) -> Option<&ControlProps> {
        self.slot(id).map(|s| s.control.props())
    }

    /// Mutate a control of concrete type `C` and mark the set invalidated.
    /// Returns `None` when the id is unknown or the type does not match.
    pub fn modify<C: Control, R>(&mut self, id: ControlId, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let control = self
            .slot_mut(id)
            .and_then(|s| s.control.as_any_mut().downcast_mut::<C>())?;
        let out = f(control);
        self.invalidated = true;
        Some(out)
    }

    /// Mutate the shared properties of any control.
    pub fn props_mut<R>(&mut self, id: ControlId, f: impl FnOnce(&mut ControlProps) -> R) -> Option<R> {
        let slot = self.slot_mut(id)?;
        let out = f(slot.control.props_mut());
        self.invalidated = true;
        Some(out)
    }

    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub(crate) fn clear_invalidated(&mut self) {
        self.invalidated = false;
    }

    pub fn focus(&self) -> Option<ControlId> {
        self.focus
    }

    pub fn set_focus(&mut self, id: Option<ControlId>) {
        if self.focus != id {
            self.focus = id;
            self.invalidated = true;
        }
    }

    pub fn push_event(&mut self, event: UiEvent) {
        self.events.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    /// Slot indices back to front: ascending `z_order`, ties in insertion order.
    pub fn paint_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        // sort_by_key is stable
        order.sort_by_key(|&i| self.slots[i].control.props().z_order);
        order
    }

    /// Paint every visible control, lowest z first, so higher z wins overlaps.
    pub fn paint(&self, surface: &mut TileSurface) {
        for i in self.paint_order() {
            let control = &self.slots[i].control;
            if control.props().visible {
                control.paint(surface);
            }
        }
    }

    /// Route an event to a control. Pointer events go to the topmost visible
    /// input control under the pointer; key events go to the focused control,
    /// falling back to the first input control in insertion order.
    pub fn dispatch(&mut self, input: &ControlInput) -> bool {
        let target = if input.event.is_pointer() {
            input.tile.and_then(|tile| {
                self.paint_order().into_iter().rev().find(|&i| {
                    let c = &self.slots[i].control;
                    c.props().visible && c.accepts_input() && c.bounds().contains(tile)
                })
            })
        } else {
            let focused = self
                .focus
                .and_then(|id| self.slots.iter().position(|s| s.id == id))
                .filter(|&i| {
                    let c = &self.slots[i].control;
                    c.props().visible && c.accepts_input()
                });
            focused.or_else(|| {
                self.slots
                    .iter()
                    .position(|s| s.control.props().visible && s.control.accepts_input())
            })
        };
        let Some(index) = target else {
            return false;
        };

        let id = self.slots[index].id;
        let Some(handler) = self.slots[index].control.input_mut() else {
            return false;
        };
        let outcome = handler.handle(id, input, &mut self.events);
        if outcome == InputOutcome::Consumed {
            if !input.event.is_pointer() || input.is_click() {
                self.focus = Some(id);
            }
            self.invalidated = true;
            true
        } else {
            false
        }
    }
}
