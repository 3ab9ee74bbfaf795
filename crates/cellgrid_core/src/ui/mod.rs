//! Page-based UI layer painted into its own tile surface.

pub mod composer;
pub mod control;
pub mod controls;
pub mod page;

pub use composer::{PageState, UiComposer};
pub use control::{Control, ControlId, ControlProps, ControlSet, InputHandler, InputOutcome, UiEvent};
pub use controls::{Label, Menu, MenuItem, Panel, ProgressBar, TileImage};
pub use page::{PageInit, UiPage};
