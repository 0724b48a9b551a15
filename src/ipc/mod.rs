//! FILENAME: src/ipc/mod.rs
// PURPOSE: Exposes the messaging bridge, channel registry and handlers.

pub mod bridge;
pub mod events;
pub mod handlers;

pub use bridge::{Bridge, Subscription};
