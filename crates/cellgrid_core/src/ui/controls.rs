use std::any::Any;

use crate::cell::{Color, TileCell};
use crate::geometry::{Area, Dimension, Position};
use crate::input::{ControlInput, InputEvent};
use crate::keys::Key;
use crate::surface::TileSurface;

use super::control::{Control, ControlId, ControlProps, InputHandler, InputOutcome, UiEvent};

// Code page 437 glyph indices used by the stock controls.
pub const GLYPH_BOX_TOP_LEFT: u32 = 218;
pub const GLYPH_BOX_TOP_RIGHT: u32 = 191;
pub const GLYPH_BOX_BOTTOM_LEFT: u32 = 192;
pub const GLYPH_BOX_BOTTOM_RIGHT: u32 = 217;
pub const GLYPH_BOX_HORIZONTAL: u32 = 196;
pub const GLYPH_BOX_VERTICAL: u32 = 179;
pub const GLYPH_FULL_BLOCK: u32 = 219;
pub const GLYPH_LIGHT_SHADE: u32 = 176;
pub const GLYPH_POINTER_RIGHT: u32 = 16;

macro_rules! control_boilerplate {
    () => {
        fn props(&self) -> &ControlProps {
            &self.props
        }

        fn props_mut(&mut self) -> &mut ControlProps {
            &mut self.props
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

fn glyph(ch: char) -> u32 {
    let code = ch as u32;
    if code < 256 {
        code
    } else {
        b'?' as u32
    }
}

/// Single line of text, one glyph per cell.
#[derive(Debug, Clone)]
pub struct Label {
    pub props: ControlProps,
    pub text: String,
}

impl Label {
    pub fn new(props: ControlProps, text: impl Into<String>) -> Self {
        Self { props, text: text.into() }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Control for Label {
    control_boilerplate!();

    fn bounds(&self) -> Area {
        Area::new(self.props.position, Dimension::new(self.text.chars().count() as i32, 1))
    }

    fn paint(&self, surface: &mut TileSurface) {
        let Position { x, y } = self.props.position;
        for (i, ch) in self.text.chars().enumerate() {
            surface.set_cell(x + i as i32, y, self.props.cell(glyph(ch), self.props.color));
        }
    }
}

/// Filled rectangle, optionally framed with box-drawing glyphs.
#[derive(Debug, Clone)]
pub struct Panel {
    pub props: ControlProps,
    pub size: Dimension,
    pub fill_color: Color,
    pub border: bool,
}

impl Panel {
    /// Fills with `props.tile_index` in `fill_color`; the border uses `props.color`.
    pub fn new(props: ControlProps, size: Dimension, fill_color: Color) -> Self {
        Self { props, size, fill_color, border: true }
    }

    pub fn borderless(mut self) -> Self {
        self.border = false;
        self
    }
}

impl Control for Panel {
    control_boilerplate!();

    fn bounds(&self) -> Area {
        Area::new(self.props.position, self.size)
    }

    fn paint(&self, surface: &mut TileSurface) {
        let area = self.bounds();
        let (l, t, r, b) = (area.left(), area.top(), area.right() - 1, area.bottom() - 1);
        for p in area.positions() {
            let edge_x = p.x == l || p.x == r;
            let edge_y = p.y == t || p.y == b;
            let cell = if !self.border || !(edge_x || edge_y) {
                self.props.cell(self.props.tile_index, self.fill_color)
            } else {
                let tile = match (p.x == l, p.x == r, p.y == t, p.y == b) {
                    (true, _, true, _) => GLYPH_BOX_TOP_LEFT,
                    (_, true, true, _) => GLYPH_BOX_TOP_RIGHT,
                    (true, _, _, true) => GLYPH_BOX_BOTTOM_LEFT,
                    (_, true, _, true) => GLYPH_BOX_BOTTOM_RIGHT,
                    _ if edge_y => GLYPH_BOX_HORIZONTAL,
                    _ => GLYPH_BOX_VERTICAL,
                };
                self.props.cell(tile, self.props.color)
            };
            surface.set_cell(p.x, p.y, cell);
        }
    }
}

/// One tile from an atlas.
#[derive(Debug, Clone)]
pub struct TileImage {
    pub props: ControlProps,
}

impl TileImage {
    pub fn new(props: ControlProps) -> Self {
        Self { props }
    }
}

impl Control for TileImage {
    control_boilerplate!();

    fn paint(&self, surface: &mut TileSurface) {
        let p = self.props.position;
        surface.set_cell(p.x, p.y, self.props.cell(self.props.tile_index, self.props.color));
    }
}

/// Horizontal gauge; `value` is clamped to `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    pub props: ControlProps,
    pub width: i32,
    pub empty_color: Color,
    value: f32,
}

impl ProgressBar {
    pub fn new(props: ControlProps, width: i32, empty_color: Color) -> Self {
        Self { props, width: width.max(1), empty_color, value: 0.0 }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub fn filled_cells(&self) -> i32 {
        (self.value * self.width as f32).round() as i32
    }
}

impl Control for ProgressBar {
    control_boilerplate!();

    fn bounds(&self) -> Area {
        Area::new(self.props.position, Dimension::new(self.width, 1))
    }

    fn paint(&self, surface: &mut TileSurface) {
        let Position { x, y } = self.props.position;
        let filled = self.filled_cells();
        for i in 0..self.width {
            let cell = if i < filled {
                self.props.cell(GLYPH_FULL_BLOCK, self.props.color)
            } else {
                self.props.cell(GLYPH_LIGHT_SHADE, self.empty_color)
            };
            surface.set_cell(x + i, y, cell);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Entry(String),
    Separator,
}

impl MenuItem {
    pub fn entry(text: impl Into<String>) -> Self {
        MenuItem::Entry(text.into())
    }

    pub fn is_selectable(&self) -> bool {
        matches!(self, MenuItem::Entry(_))
    }
}

/// Vertical list of entries with a cursor.
///
/// Selection wraps at both ends and never rests on a separator. A menu with
/// no entries has no selection.
#[derive(Debug, Clone)]
pub struct Menu {
    pub props: ControlProps,
    pub highlight: Color,
    items: Vec<MenuItem>,
    selected: Option<usize>,
}

impl Menu {
    pub fn new(props: ControlProps, items: Vec<MenuItem>, highlight: Color) -> Self {
        let mut menu = Self { props, highlight, items, selected: None };
        menu.selected = menu.step_from(None, true);
        menu
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        self.items = items;
        let keep = self.selected.filter(|&i| self.items.get(i).is_some_and(MenuItem::is_selectable));
        self.selected = keep.or_else(|| self.step_from(None, true));
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select `index`, wrapping out-of-range values and moving forward off
    /// separators.
    pub fn set_selected(&mut self, index: usize) {
        if self.items.is_empty() {
            self.selected = None;
            return;
        }
        let index = index % self.items.len();
        self.selected = if self.items[index].is_selectable() {
            Some(index)
        } else {
            self.step_from(Some(index), true)
        };
    }

    pub fn select_next(&mut self) {
        self.selected = self.step_from(self.selected, true);
    }

    pub fn select_previous(&mut self) {
        self.selected = self.step_from(self.selected, false);
    }

    pub fn select_first(&mut self) {
        self.selected = self.step_from(None, true);
    }

    pub fn select_last(&mut self) {
        self.selected = self.step_from(None, false);
    }

    fn step_from(&self, from: Option<usize>, forward: bool) -> Option<usize> {
        let n = self.items.len();
        if n == 0 {
            return None;
        }
        let start = match (from, forward) {
            (Some(i), _) => i,
            (None, true) => n - 1,
            (None, false) => 0,
        };
        (1..=n)
            .map(|k| if forward { (start + k) % n } else { (start + n - k % n) % n })
            .find(|&i| self.items[i].is_selectable())
    }

    fn width(&self) -> i32 {
        self.items
            .iter()
            .map(|item| match item {
                MenuItem::Entry(text) => text.chars().count() as i32,
                MenuItem::Separator => 0,
            })
            .max()
            .unwrap_or(0)
            .max(1)
    }

    fn row_at(&self, tile: Position) -> Option<usize> {
        if !self.bounds().contains(tile) {
            return None;
        }
        let row = (tile.y - self.props.position.y) as usize;
        self.items.get(row).filter(|item| item.is_selectable()).map(|_| row)
    }

    fn change_selection(&mut self, id: ControlId, events: &mut Vec<UiEvent>, f: impl FnOnce(&mut Self)) {
        let before = self.selected;
        f(self);
        if let Some(index) = self.selected.filter(|_| self.selected != before) {
            events.push(UiEvent::SelectionChanged { control: id, index });
        }
    }
}

impl Control for Menu {
    control_boilerplate!();

    fn bounds(&self) -> Area {
        // One column on the left for the cursor glyph.
        Area::new(
            self.props.position,
            Dimension::new(self.width() + 1, self.items.len() as i32),
        )
    }

    fn paint(&self, surface: &mut TileSurface) {
        let Position { x, y } = self.props.position;
        let width = self.width();
        for (row, item) in self.items.iter().enumerate() {
            let y = y + row as i32;
            match item {
                MenuItem::Separator => {
                    for i in 0..=width {
                        surface.set_cell(x + i, y, self.props.cell(GLYPH_BOX_HORIZONTAL, self.props.color));
                    }
                }
                MenuItem::Entry(text) => {
                    let selected = self.selected == Some(row);
                    let color = if selected { self.highlight } else { self.props.color };
                    let cursor = if selected {
                        self.props.cell(GLYPH_POINTER_RIGHT, color)
                    } else {
                        TileCell::BLANK
                    };
                    surface.set_cell(x, y, cursor);
                    for (i, ch) in text.chars().enumerate() {
                        surface.set_cell(x + 1 + i as i32, y, self.props.cell(glyph(ch), color));
                    }
                }
            }
        }
    }

    fn input_mut(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn accepts_input(&self) -> bool {
        true
    }
}

impl InputHandler for Menu {
    fn handle(&mut self, id: ControlId, input: &ControlInput, events: &mut Vec<UiEvent>) -> InputOutcome {
        if let Some(key) = input.key_down() {
            match key {
                Key::ARROW_DOWN | Key::S => self.change_selection(id, events, Menu::select_next),
                Key::ARROW_UP | Key::W => self.change_selection(id, events, Menu::select_previous),
                Key::HOME => self.change_selection(id, events, Menu::select_first),
                Key::END => self.change_selection(id, events, Menu::select_last),
                Key::ENTER | Key::SPACE => match self.selected {
                    Some(index) => events.push(UiEvent::MenuActivated { control: id, index }),
                    None => return InputOutcome::Ignored,
                },
                _ => return InputOutcome::Ignored,
            }
            return InputOutcome::Consumed;
        }

        let Some(row) = input.tile.and_then(|tile| self.row_at(tile)) else {
            return InputOutcome::Ignored;
        };
        match input.event {
            InputEvent::PointerMove { .. } => {
                self.change_selection(id, events, |m| m.selected = Some(row));
                InputOutcome::Consumed
            }
            _ if input.is_click() => {
                self.change_selection(id, events, |m| m.selected = Some(row));
                events.push(UiEvent::MenuActivated { control: id, index: row });
                InputOutcome::Consumed
            }
            _ => InputOutcome::Ignored,
        }
    }
}
