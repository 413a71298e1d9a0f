//! Reusable UI components for the company TUI

pub mod form_field;
pub mod status_display;

pub use form_field::{FormField, FormFieldType};
pub use status_display::StatusDisplay;
