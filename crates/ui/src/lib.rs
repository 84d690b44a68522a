#![deny(unsafe_code)]

/// Portfolio window shell with the typed headline.
pub mod app;
/// Floating FAQ chat widget.
pub mod faq;
/// Settings persistence.
pub mod settings;
