//! Room broadcast and presence server library.
//!
//! Fans chat messages out to every live WebSocket connection in a room, tracks
//! which users are active in each room, and periodically evicts users who have
//! gone quiet, notifying the remaining participants.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
