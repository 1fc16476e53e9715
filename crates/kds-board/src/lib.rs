//! kds-board: kitchen display board library (core + inbound TUI)

pub mod config;
pub mod notice;

pub mod application;

pub use kds_types::{domain, ports};

pub mod inbound; // terminal adapter (screen + key handling)
