//! Screen modules for the company TUI

pub mod company;

pub use company::CompanyScreen;
