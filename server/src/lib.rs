//! Arena shooter server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod combat;
pub mod config;
pub mod game_loop;
pub mod player;
pub mod protocol;
pub mod state;
pub mod vec2;
pub mod ws;
