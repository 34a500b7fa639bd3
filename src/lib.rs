//! Infinite Library: the engine of an incremental game about copying every
//! possible book.
//!
//! `library` holds the game itself (state, transitions, catalog, persistence,
//! offline progress). `time` drives it frame by frame, `web` wires it into a
//! browser page.

pub mod config;
pub mod decimal;
pub mod format;
pub mod library;
pub mod logging;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;
