//! FILENAME: src/ipc/events.rs
// PURPOSE: Channel-constant registry for the messaging bridge.
// CONTEXT: Payloads are untyped at the boundary; callers layer type safety
//          on top of these shared identifiers.

/// Fire-and-forget test channel, host side logs the payload.
pub const TEST_PING: &str = "test:ping";

/// Response test channel.
pub const TEST_PONG: &str = "test:pong";

/// Closed set of test channels.
pub const TEST_CHANNELS: [&str; 2] = [TEST_PING, TEST_PONG];

/// Whether a channel identifier belongs to the registry.
pub fn is_known_channel(channel: &str) -> bool {
    TEST_CHANNELS.contains(&channel)
}
