//! Demo world: a scrolling cave map, a title menu and wandering sprites.

use cellgrid_core::cell::{Color, TileCell, VisualEffect};
use cellgrid_core::geometry::{Area, Dimension, Position};
use cellgrid_core::input::{ControlInput, InputEvent, PointerButton};
use cellgrid_core::keys::Key;
use cellgrid_core::rng::Rng;
use cellgrid_core::scene::TileMap;
use cellgrid_core::sprites::SpriteSequence;
use cellgrid_core::ui::{
    ControlId, ControlProps, ControlSet, InputOutcome, Label, Menu, MenuItem, PageInit, Panel, ProgressBar,
    UiEvent, UiPage,
};
use cellgrid_core::window::{App, AppContext};
use image::{Rgba, RgbaImage};

pub const MAP_SIZE: Dimension = Dimension::new(120, 80);

const GLYPH_FLOOR: u32 = '.' as u32;
const GLYPH_WALL: u32 = '#' as u32;
const GLYPH_WATER: u32 = '~' as u32;
const GLYPH_CRYSTAL: u32 = '*' as u32;
const GLYPH_WANDERER: u32 = '@' as u32;

const MENU_PLAY: usize = 0;
const MENU_SPARKS: usize = 1;
const MENU_QUIT: usize = 3;

/// Atlas tile side in pixels.
pub const GLYPH_PX: u32 = 16;

/// Stand-in 16x16 glyph sheet for when no atlas image is configured. Each
/// glyph is a mirrored block pattern derived from its code, so different
/// characters stay distinguishable; the few glyphs the demo leans on get
/// recognisable shapes.
pub fn placeholder_atlas() -> RgbaImage {
    let side = GLYPH_PX * 16;
    let mut img = RgbaImage::new(side, side);
    for glyph in 0..256u32 {
        let (ox, oy) = ((glyph % 16) * GLYPH_PX, (glyph / 16) * GLYPH_PX);
        for y in 0..GLYPH_PX {
            for x in 0..GLYPH_PX {
                if glyph_pixel(glyph, x, y) {
                    img.put_pixel(ox + x, oy + y, Rgba([255, 255, 255, 255]));
                }
            }
        }
    }
    img
}

fn glyph_pixel(glyph: u32, x: u32, y: u32) -> bool {
    let (cx, cy) = (x as i32 - 8, y as i32 - 8);
    match glyph {
        0 | 32 => false,
        GLYPH_FLOOR => (7..9).contains(&x) && (7..9).contains(&y),
        GLYPH_WALL => ((x / 4) + (y / 4)) % 2 == 0,
        GLYPH_WATER => (y % 6 == 2 && x % 8 < 4) || (y % 6 == 3 && x % 8 >= 4),
        GLYPH_WANDERER => (cx * cx + cy * cy) < 36,
        GLYPH_CRYSTAL => cx.abs() + cy.abs() < 7,
        219 => true,
        176 => (x + y) % 4 == 0,
        196 => (7..9).contains(&y),
        179 => (7..9).contains(&x),
        218 => ((7..9).contains(&y) && x >= 7) || ((7..9).contains(&x) && y >= 7),
        191 => ((7..9).contains(&y) && x <= 8) || ((7..9).contains(&x) && y >= 7),
        192 => ((7..9).contains(&y) && x >= 7) || ((7..9).contains(&x) && y <= 8),
        217 => ((7..9).contains(&y) && x <= 8) || ((7..9).contains(&x) && y <= 8),
        16 => (4..12).contains(&x) && cy.abs() <= (x as i32 - 4) / 2,
        _ => {
            // 3x5 block pattern mirrored to 5 columns, inside a 2px margin.
            if !(3..13).contains(&x) || !(2..14).contains(&y) {
                return false;
            }
            let col = ((x - 3) / 2).min(4);
            let col = if col > 2 { 4 - col } else { col };
            let row = (y - 2) / 3;
            let hash = glyph.wrapping_mul(2_654_435_761);
            (hash >> (row * 3 + col)) & 1 == 1
        }
    }
}

/// Random cave: walls on the border and scattered inside, pools of water.
pub fn generate_map(seed: u64) -> TileMap {
    let mut rng = Rng::new(seed);
    let floor = TileCell::new(GLYPH_FLOOR, 0, Color::GRAY);
    let wall = TileCell::new(GLYPH_WALL, 0, Color::rgb(150, 110, 70));
    let water = TileCell::new(GLYPH_WATER, 0, Color::BLUE).with_effect(VisualEffect::Wave);

    let mut map = TileMap::new(MAP_SIZE.width, MAP_SIZE.height, floor);
    let bounds = Area::new(Position::ZERO, MAP_SIZE);
    for p in bounds.positions() {
        let edge = p.x == 0 || p.y == 0 || p.x == MAP_SIZE.width - 1 || p.y == MAP_SIZE.height - 1;
        if edge || rng.chance(0.08) {
            map.set(p, wall);
        }
    }
    for _ in 0..12 {
        let w = rng.range(3, 9);
        let h = rng.range(2, 6);
        let x = rng.range(1, MAP_SIZE.width - w - 1);
        let y = rng.range(1, MAP_SIZE.height - h - 1);
        map.fill_area(Area::from_xywh(x, y, w, h), water);
    }
    map
}

/// Parameters for [`TitlePage`].
pub struct TitleParams {
    pub title: String,
}

/// Title screen: framed menu plus a pulsing gauge.
#[derive(Default)]
pub struct TitlePage {
    gauge: Option<ControlId>,
    elapsed: f32,
}

impl UiPage for TitlePage {
    fn name(&self) -> &'static str {
        "title"
    }

    fn on_input(&mut self, _controls: &mut ControlSet, input: &ControlInput) -> InputOutcome {
        // Swallow Escape so it does not leak into the game.
        if input.key_down() == Some(Key::ESCAPE) {
            return InputOutcome::Consumed;
        }
        InputOutcome::Ignored
    }

    fn on_update(&mut self, controls: &mut ControlSet, dt: f32) {
        self.elapsed += dt;
        let value = (self.elapsed * 0.5).fract();
        if let Some(id) = self.gauge {
            controls.modify::<ProgressBar, _>(id, |bar| bar.set_value(value));
        }
    }
}

impl PageInit for TitlePage {
    type Params = TitleParams;

    fn init(&mut self, controls: &mut ControlSet, params: TitleParams) {
        let width = params.title.chars().count() as i32 + 6;
        controls.add(Panel::new(
            ControlProps::at(2, 2).with_color(Color::YELLOW).with_z(-1),
            Dimension::new(width.max(16), 10),
            Color::rgb(20, 20, 40),
        ));
        controls.add(Label::new(
            ControlProps::at(5, 3).with_color(Color::WHITE).with_effect(VisualEffect::Pulse),
            params.title,
        ));
        controls.add(Menu::new(
            ControlProps::at(4, 5),
            vec![
                MenuItem::entry("Play"),
                MenuItem::entry("Sparks"),
                MenuItem::Separator,
                MenuItem::entry("Quit"),
            ],
            Color::YELLOW,
        ));
        self.gauge = Some(controls.add(ProgressBar::new(
            ControlProps::at(5, 10).with_color(Color::GREEN),
            10,
            Color::GRAY,
        )));
    }
}

/// Drives the demo: menu handling, camera scrolling and sprite spawning.
pub struct DemoApp {
    title: String,
    rng: Rng,
    spawn_timer: f32,
    playing: bool,
}

impl DemoApp {
    pub fn new(title: impl Into<String>, seed: u64) -> Self {
        Self { title: title.into(), rng: Rng::new(seed), spawn_timer: 0.0, playing: false }
    }

    fn show_title(&mut self, ctx: &mut AppContext) {
        self.playing = false;
        ctx.frame.ui_mut().show_page::<TitlePage>(TitleParams { title: self.title.clone() });
    }

    fn spawn_wanderer(&mut self, ctx: &mut AppContext) {
        let grid = ctx.frame.sprites().viewport().size;
        let from = Position::new(self.rng.range(0, grid.width), self.rng.range(0, grid.height));
        let to = Position::new(self.rng.range(0, grid.width), self.rng.range(0, grid.height));
        let speed = 6.0 + self.rng.next_f32() * 10.0;
        ctx.frame.sprites_mut().enqueue(SpriteSequence::moving(
            from,
            to,
            GLYPH_WANDERER,
            0,
            Color::RED,
            speed,
        ));
    }

    fn spawn_sparks(&mut self, ctx: &mut AppContext) {
        let grid = ctx.frame.sprites().viewport().size;
        let positions = (0..8)
            .map(|_| Position::new(self.rng.range(0, grid.width), self.rng.range(0, grid.height)))
            .collect();
        ctx.frame
            .sprites_mut()
            .enqueue(SpriteSequence::frame_cycle(positions, GLYPH_CRYSTAL, 2, 0, Color::YELLOW, 0.15));
    }

    fn handle_ui_event(&mut self, ctx: &mut AppContext, event: UiEvent) {
        let UiEvent::MenuActivated { index, .. } = event else {
            return;
        };
        match index {
            MENU_PLAY => {
                tracing::info!("entering play mode");
                ctx.frame.ui_mut().close_page();
                self.playing = true;
            }
            MENU_SPARKS => self.spawn_sparks(ctx),
            MENU_QUIT => ctx.request_exit(),
            other => tracing::debug!("unhandled menu entry {}", other),
        }
    }
}

impl App for DemoApp {
    fn on_start(&mut self, ctx: &mut AppContext) {
        ctx.frame.scene_mut().center_on(Position::new(MAP_SIZE.width / 2, MAP_SIZE.height / 2));
        self.show_title(ctx);
    }

    fn on_update(&mut self, ctx: &mut AppContext, dt: f32) {
        for event in ctx.frame.take_ui_events() {
            self.handle_ui_event(ctx, event);
        }
        for event in ctx.frame.take_sprite_events() {
            tracing::trace!("sprite {:?}", event);
        }
        if !self.playing {
            return;
        }

        let input = ctx.frame.input_state();
        let dx = input.is_key_down(Key::ARROW_RIGHT) as i32 - input.is_key_down(Key::ARROW_LEFT) as i32;
        let dy = input.is_key_down(Key::ARROW_DOWN) as i32 - input.is_key_down(Key::ARROW_UP) as i32;
        if dx != 0 || dy != 0 {
            ctx.frame.scene_mut().scroll(dx, dy);
        }

        self.spawn_timer += dt;
        if self.spawn_timer >= 1.0 {
            self.spawn_timer = 0.0;
            if ctx.frame.sprites().queued() < 3 {
                self.spawn_wanderer(ctx);
            }
        }
    }

    fn on_event(&mut self, ctx: &mut AppContext, event: &InputEvent, consumed: bool) {
        if consumed || !self.playing {
            return;
        }
        match *event {
            InputEvent::KeyDown { key: Key::ESCAPE, .. } => self.show_title(ctx),
            InputEvent::Button { button: PointerButton::Left, pressed: true, .. } => {
                let Some(scene) = ctx.frame.pointer_tile().and_then(|grid| ctx.frame.scene().pick(grid)) else {
                    return;
                };
                let crystal = TileCell::new(GLYPH_CRYSTAL, 0, Color::YELLOW).with_effect(VisualEffect::Blink);
                tracing::debug!("placing crystal at ({}, {})", scene.x, scene.y);
                ctx.frame.scene_mut().set_map_cell(scene, crystal);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::config::EngineConfig;
    use cellgrid_core::ui::PageState;
    use cellgrid_core::FrameDriver;

    #[test]
    fn map_is_walled_and_deterministic() {
        let a = generate_map(7);
        let b = generate_map(7);
        assert_eq!(a.size(), MAP_SIZE);
        for p in Area::new(Position::ZERO, MAP_SIZE).positions() {
            assert_eq!(a.get(p), b.get(p));
        }
        assert_eq!(a.get(Position::ZERO).unwrap().tile_index, GLYPH_WALL);
    }

    #[test]
    fn title_page_has_a_menu_with_a_separator() {
        let mut frame = FrameDriver::new(&EngineConfig::default(), generate_map(1));
        frame
            .ui_mut()
            .show_page::<TitlePage>(TitleParams { title: "demo".to_string() });
        assert_eq!(frame.ui().page_name(), Some("title"));
        let controls = frame.ui().controls().unwrap();
        let menu = controls.ids().find_map(|id| controls.get::<Menu>(id)).unwrap();
        assert_eq!(menu.items()[2], MenuItem::Separator);
        assert_eq!(menu.selected(), Some(MENU_PLAY));
    }

    #[test]
    fn placeholder_atlas_is_a_full_glyph_sheet() {
        let img = placeholder_atlas();
        assert_eq!(img.dimensions(), (256, 256));
        // Full block is solid, space is empty.
        let (bx, by) = ((219 % 16) * GLYPH_PX, (219 / 16) * GLYPH_PX);
        assert_eq!(img.get_pixel(bx + 3, by + 3)[3], 255);
        let (sx, sy) = ((32 % 16) * GLYPH_PX, (32 / 16) * GLYPH_PX);
        assert!((0..GLYPH_PX).all(|y| (0..GLYPH_PX).all(|x| img.get_pixel(sx + x, sy + y)[3] == 0)));
    }
}
