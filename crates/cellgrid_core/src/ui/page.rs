use crate::input::ControlInput;

use super::control::{ControlSet, InputOutcome};

/// Behaviour of a full-screen UI page. Every hook receives the page's
/// controls; the composer owns both and drops them together on close.
pub trait UiPage: 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Offered every input event before the page's controls see it.
    fn on_input(&mut self, _controls: &mut ControlSet, _input: &ControlInput) -> InputOutcome {
        InputOutcome::Ignored
    }

    fn on_update(&mut self, _controls: &mut ControlSet, _dt: f32) {}

    /// Called once when the page is closed or replaced.
    fn on_close(&mut self, _controls: &mut ControlSet) {}
}

/// A page the composer can construct: default-built, then initialised with
/// its parameters so it can add its controls.
pub trait PageInit: UiPage + Default {
    type Params;

    fn init(&mut self, controls: &mut ControlSet, params: Self::Params);
}
