use crate::backend::SurfaceBackend;
use crate::cell::TileCell;
use crate::geometry::Dimension;
use crate::input::ControlInput;
use crate::surface::TileSurface;

use super::control::{ControlSet, InputOutcome, UiEvent};
use super::page::{PageInit, UiPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NoPage,
    PageActive,
}

struct ActivePage {
    page: Box<dyn UiPage>,
    controls: ControlSet,
}

/// Hosts at most one page and paints its controls into a grid-sized surface.
///
/// Repaints are coalesced: control changes only set the page's invalidation
/// flag, and [`UiComposer::compose`] redraws once when it is set.
pub struct UiComposer {
    surface: TileSurface,
    active: Option<ActivePage>,
    events: Vec<UiEvent>,
    compositions: u64,
}

impl UiComposer {
    pub fn new(grid: Dimension) -> Self {
        Self {
            surface: TileSurface::with_size("ui", grid.width, grid.height, TileCell::BLANK),
            active: None,
            events: Vec::new(),
            compositions: 0,
        }
    }

    pub fn state(&self) -> PageState {
        if self.active.is_some() {
            PageState::PageActive
        } else {
            PageState::NoPage
        }
    }

    pub fn page_name(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.page.name())
    }

    /// Close any current page, then construct and initialise `P`.
    pub fn show_page<P: PageInit>(&mut self, params: P::Params) {
        self.close_page();
        let mut page = P::default();
        let mut controls = ControlSet::new();
        page.init(&mut controls, params);
        controls.invalidate();
        tracing::debug!("ui: showing page {} ({} controls)", page.name(), controls.len());
        self.active = Some(ActivePage { page: Box::new(page), controls });
    }

    /// Dispose the active page and clear the UI surface. No-op without a page.
    pub fn close_page(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.page.on_close(&mut active.controls);
        self.events.extend(active.controls.take_events());
        self.surface.fill(TileCell::BLANK);
        tracing::debug!("ui: closed page {}", active.page.name());
    }

    pub fn controls(&self) -> Option<&ControlSet> {
        self.active.as_ref().map(|a| &a.controls)
    }

    pub fn controls_mut(&mut self) -> Option<&mut ControlSet> {
        self.active.as_mut().map(|a| &mut a.controls)
    }

    pub fn invalidate(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.controls.invalidate();
        }
    }

    pub fn is_invalidated(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.controls.is_invalidated())
    }

    /// Repaint the page if anything changed since the last composition.
    /// Returns whether a repaint happened.
    pub fn compose(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !active.controls.is_invalidated() {
            return false;
        }
        self.surface.fill(TileCell::BLANK);
        active.controls.paint(&mut self.surface);
        active.controls.clear_invalidated();
        self.compositions += 1;
        true
    }

    /// Number of repaints performed so far.
    pub fn compositions(&self) -> u64 {
        self.compositions
    }

    /// Offer `input` to the page, then to its controls. Returns whether it was consumed.
    pub fn dispatch(&mut self, input: &ControlInput) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let consumed = match active.page.on_input(&mut active.controls, input) {
            InputOutcome::Consumed => true,
            InputOutcome::Ignored => active.controls.dispatch(input),
        };
        self.events.extend(active.controls.take_events());
        consumed
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(active) = self.active.as_mut() {
            active.page.on_update(&mut active.controls, dt);
            self.events.extend(active.controls.take_events());
        }
    }

    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    /// Match the UI surface to a new logical grid; the page is repainted on the next compose.
    pub fn resize(&mut self, grid: Dimension) {
        if grid == self.surface.size() {
            return;
        }
        self.surface.resize(grid.width, grid.height, TileCell::BLANK);
        self.invalidate();
    }

    pub fn surface(&self) -> &TileSurface {
        &self.surface
    }

    pub fn render(&mut self, backend: &mut dyn SurfaceBackend) -> usize {
        self.surface.render(backend)
    }

    /// Close the page and release the surface's backend buffer.
    pub fn shutdown(&mut self, backend: &mut dyn SurfaceBackend) {
        self.close_page();
        self.surface.dispose(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Color;
    use crate::ui::controls::Label;
    use crate::ui::ControlProps;

    #[derive(Default)]
    struct Title;

    impl UiPage for Title {}

    impl PageInit for Title {
        type Params = &'static str;

        fn init(&mut self, controls: &mut ControlSet, text: &'static str) {
            controls.add(Label::new(ControlProps::at(0, 0).with_color(Color::GREEN), text));
        }
    }

    #[test]
    fn many_changes_one_composition() {
        let mut ui = UiComposer::new(Dimension::new(10, 2));
        ui.show_page::<Title>("hi");
        let id = ui.controls().unwrap().ids().next().unwrap();
        for text in ["a", "bb", "ccc"] {
            ui.controls_mut().unwrap().modify::<Label, _>(id, |l| l.set_text(text));
        }
        assert!(ui.compose());
        assert!(!ui.compose());
        assert_eq!(ui.compositions(), 1);
        assert_eq!(ui.surface().get_cell(2, 0).unwrap().tile_index, 'c' as u32);
    }

    #[test]
    fn closing_clears_surface() {
        let mut ui = UiComposer::new(Dimension::new(4, 1));
        ui.show_page::<Title>("x");
        ui.compose();
        assert!(!ui.surface().get_cell(0, 0).unwrap().is_blank());
        ui.close_page();
        assert_eq!(ui.state(), PageState::NoPage);
        assert!(ui.surface().get_cell(0, 0).unwrap().is_blank());
        ui.close_page();
    }

    #[test]
    fn resize_invalidates_active_page() {
        let mut ui = UiComposer::new(Dimension::new(4, 1));
        ui.show_page::<Title>("ab");
        ui.compose();
        ui.resize(Dimension::new(6, 2));
        assert!(ui.is_invalidated());
        assert!(ui.compose());
        assert_eq!(ui.surface().size(), Dimension::new(6, 2));
    }
}
