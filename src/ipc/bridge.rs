//! FILENAME: src/ipc/bridge.rs
// PURPOSE: In-process messaging bridge between the host side and the UI side.
// CONTEXT: Named channels carrying untyped argument lists. Four operations:
//          send (fire-and-forget), invoke (request/response), on (subscribe,
//          returns an unsubscribe action), remove_all_listeners.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

type ListenerFn = dyn Fn(&[Value]) + Send + Sync;
type HandlerFn = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

struct Listener {
    id: String,
    callback: Box<ListenerFn>,
}

/// Messaging bridge. Listener and handler tables live behind mutexes;
/// callbacks run outside the locks so they may re-enter the bridge.
pub struct Bridge {
    listeners: Mutex<HashMap<String, Vec<Arc<Listener>>>>,
    handlers: Mutex<HashMap<String, Arc<HandlerFn>>>,
}

impl Bridge {
    pub fn new() -> Self {
        Bridge {
            listeners: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Fire-and-forget: dispatch to every listener on the channel.
    /// A channel with no listeners is a no-op.
    pub fn send(&self, channel: &str, args: &[Value]) {
        let snapshot: Vec<Arc<Listener>> = match self.listeners.lock() {
            Ok(guard) => guard.get(channel).cloned().unwrap_or_default(),
            Err(_) => return,
        };
        for listener in snapshot {
            (listener.callback)(args);
        }
    }

    /// Request/response: route to the registered handler for the channel.
    pub fn invoke(&self, channel: &str, args: &[Value]) -> Result<Value, String> {
        let handler = self
            .handlers
            .lock()
            .map_err(|e| format!("Handler table lock error: {}", e))?
            .get(channel)
            .cloned()
            .ok_or_else(|| format!("No handler registered for channel '{}'", channel))?;
        handler(args)
    }

    /// Subscribe to a channel. The returned [`Subscription`] is the
    /// unsubscribe action; dropping it without calling `unsubscribe` leaves
    /// the listener registered.
    pub fn on<F>(&self, channel: &str, callback: F) -> Subscription<'_>
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let listener = Arc::new(Listener {
            id: id.clone(),
            callback: Box::new(callback),
        });
        if let Ok(mut guard) = self.listeners.lock() {
            guard.entry(channel.to_string()).or_default().push(listener);
        }
        Subscription {
            bridge: self,
            channel: channel.to_string(),
            id,
        }
    }

    /// Register (or replace) the invoke handler for a channel.
    pub fn handle<F>(&self, channel: &str, handler: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        if let Ok(mut guard) = self.handlers.lock() {
            guard.insert(channel.to_string(), Arc::new(handler));
        }
    }

    /// Drop every listener on the channel. Invoke handlers are unaffected.
    pub fn remove_all_listeners(&self, channel: &str) {
        if let Ok(mut guard) = self.listeners.lock() {
            guard.remove(channel);
        }
    }

    /// Number of listeners currently registered on a channel.
    pub fn listener_count(&self, channel: &str) -> usize {
        match self.listeners.lock() {
            Ok(guard) => guard.get(channel).map(Vec::len).unwrap_or(0),
            Err(_) => 0,
        }
    }

    fn remove_listener(&self, channel: &str, id: &str) {
        if let Ok(mut guard) = self.listeners.lock() {
            if let Some(list) = guard.get_mut(channel) {
                list.retain(|listener| listener.id != id);
                if list.is_empty() {
                    guard.remove(channel);
                }
            }
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Bridge::new()
    }
}

/// Unsubscribe action returned by [`Bridge::on`].
pub struct Subscription<'a> {
    bridge: &'a Bridge,
    channel: String,
    id: String,
}

impl Subscription<'_> {
    /// Remove exactly this listener; others on the channel are unaffected.
    pub fn unsubscribe(self) {
        self.bridge.remove_listener(&self.channel, &self.id);
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}
