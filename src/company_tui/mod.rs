//! Company Terminal User Interface (TUI)
//!
//! Interactive editor for a single company record. The form logic lives in
//! [`crate::form`]; this module only renders it and maps keys onto it.

pub mod app;
pub mod components;
pub mod screens;
pub mod traits;
pub mod ui;

pub use app::App;
pub use screens::CompanyScreen;
