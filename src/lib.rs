//! Plume is a popup-menu layout and animation core for embedding UIs.
//!
//! It owns everything about a menu session except pixels and events: given a
//! [`Menu`] model, an anchor rect and a bounds rect, [`PopupMenu`] places the
//! root panel, materializes submenu panels as the pointer moves, pages
//! overflowing menus, runs the open/close animation state machine and reports
//! the selection back through the menu's chosen index and callbacks.
//!
//! # Session overview
//!
//! 1. **Open**: `PopupMenu::open` lays out the root [`MenuPanel`] beside the
//!    anchor and starts the expand animation.
//! 2. **Track**: mouse handlers hit-test cells and reconcile which submenu
//!    branch is visible (at most one leaf branch at a time).
//! 3. **Dismiss**: a click records the chosen item (if choosable), fires the
//!    callbacks and runs the flicker/collapse/idle teardown chain.
//! 4. **Draw**: `PopupMenu::draw` renders the visible branch through a
//!    [`MenuRenderer`] onto any [`Surface`] backend.
//!
//! The embedding UI implements [`Host`] (text measurement, dirty marking,
//! animation arming) and [`Surface`] (four primitive ops). Everything else
//! has stock implementations.
#![forbid(unsafe_code)]

mod control;
mod error;
mod geom;
mod menu;
mod panel;
mod render;
mod style;
mod text;

pub use control::{
    CellRef, DEFAULT_ANIMATION_DURATION, Host, PopupMenu, PopupState,
};
pub use error::{PlumeError, PlumeResult};
pub use geom::{CardinalDir, RectExt};
pub use menu::{Menu, MenuCallback, MenuItem};
pub use panel::MenuPanel;
pub use render::{DefaultRenderer, MenuRenderer, Rgba8, Surface};
pub use style::{MenuStyle, TextStyle};
pub use text::{FixedAdvance, MeasureText, TextShaper};
