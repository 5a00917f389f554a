//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - the editor pane, drawn from the active surface's rows
//! - the read-only preview pane
//! - [`style`]: Theming and colors

pub mod style;

mod render;
mod status;

pub use render::{line_number_width, render, split_main_columns};
pub use status::status_line;

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const PREVIEW_WIDTH_PERCENT: u16 = 50;
