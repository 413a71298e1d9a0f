//! rpel company editor
//!
//! A terminal client for the company records of the rpel training registry.
//! The form logic lives in [`form`], remote access in [`remote`] and the
//! ratatui front end in [`company_tui`].

pub mod company_tui;
pub mod config;
pub mod errors;
pub mod form;
pub mod models;
pub mod remote;

pub use errors::{Result, RpelError};
