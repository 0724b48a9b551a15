//! FILENAME: src/lib.rs
// PURPOSE: Main library entry point (composition root).
// CONTEXT: Wires the logging facility and the messaging bridge together and
//          installs the process-wide bindings.

use once_cell::sync::OnceCell;

pub mod caller;
pub mod ipc;
pub mod logger;

// Re-exported for the logging macros.
pub use serde_json;

pub use caller::{caller_info, CallerInfo};
pub use ipc::bridge::{Bridge, Subscription};
pub use ipc::events;
pub use ipc::handlers::register_test_handlers;
pub use logger::{global as global_logger, init_facade, Level, LogRecord, Logger};


// ============================================================================
// GLOBAL BRIDGE
// ============================================================================

/// Process-wide bridge binding, set once at startup and never reassigned.
static BRIDGE: OnceCell<Bridge> = OnceCell::new();

/// Expose the bridge on the process-wide binding.
/// Fails when the binding is already occupied (boundary misconfigured).
pub fn install_bridge(bridge: Bridge) -> Result<&'static Bridge, String> {
    BRIDGE
        .set(bridge)
        .map_err(|_| "Bridge global already installed".to_string())?;
    BRIDGE
        .get()
        .ok_or_else(|| "Bridge global unavailable".to_string())
}

/// The process-wide bridge, if exposure succeeded.
pub fn bridge() -> Option<&'static Bridge> {
    BRIDGE.get()
}

// ============================================================================
// COMPOSITION ROOT
// ============================================================================

/// Start the scaffold: install the log facade, expose the bridge, register
/// the channel handlers. Every failure here degrades, none is fatal.
pub fn run() {
    if let Err(e) = logger::init_facade() {
        eprintln!("Failed to install log facade: {}", e);
    }

    match install_bridge(Bridge::new()) {
        Ok(bridge) => {
            register_test_handlers(bridge);
            crate::log_info!("ipc bridge ready");
            bridge.send(events::TEST_PING, &[serde_json::json!("startup ping")]);
        }
        Err(e) => {
            // Degraded state: keep running without the messaging surface.
            eprintln!("Failed to expose ipc bridge: {}", e);
        }
    }

    crate::log_info!("application scaffold started");
}
