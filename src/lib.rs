//! Shelf application library
//!
//! The books module and the startup wiring shared by the `shelf-app` and
//! `shelf` binaries.

pub mod bootstrap;
pub mod modules;

pub use modules::books;
