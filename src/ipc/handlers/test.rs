//! FILENAME: src/ipc/handlers/test.rs
// PURPOSE: Handlers for the test channels, bound to the event constants.

use serde_json::{json, Value};

use crate::ipc::bridge::Bridge;
use crate::ipc::events;
use crate::{log_debug, log_info};

/// Log a ping payload.
pub fn on_ping(args: &[Value]) {
    let data = args.first().cloned().unwrap_or(Value::Null);
    log_info!("ping received:", data);
}

/// Log a pong response with its raw argument list.
pub fn on_pong(args: &[Value]) {
    log_debug!("pong response:", json!(args));
}

/// Answer an invoke on the ping channel with an echo payload.
pub fn invoke_ping(args: &[Value]) -> Result<Value, String> {
    Ok(json!({
        "channel": events::TEST_PONG,
        "echo": args,
    }))
}

/// Register the full test handler table on the bridge.
pub fn register_test_handlers(bridge: &Bridge) {
    let table = [
        (events::TEST_PING, on_ping as fn(&[Value])),
        (events::TEST_PONG, on_pong as fn(&[Value])),
    ];
    for (channel, handler) in table {
        bridge.on(channel, handler);
    }
    bridge.handle(events::TEST_PING, invoke_ping);
}
