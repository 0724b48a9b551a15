//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for scaffold integration tests.

use std::sync::{Arc, Mutex};

use app_lib::Bridge;
use regex::Regex;
use serde_json::Value;

/// Test harness holding a fresh bridge per test.
pub struct TestHarness {
    pub bridge: Bridge,
}

impl TestHarness {
    pub fn new() -> Self {
        TestHarness {
            bridge: Bridge::new(),
        }
    }

    /// Harness with the test channel handlers already registered.
    pub fn with_test_handlers() -> Self {
        let harness = Self::new();
        app_lib::register_test_handlers(&harness.bridge);
        harness
    }
}

/// Shared sink collecting dispatched payloads for assertions.
#[derive(Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bridge listener that appends each payload to the sink.
    pub fn listener(&self) -> impl Fn(&[Value]) + Send + Sync + 'static {
        let entries = self.entries.clone();
        move |args: &[Value]| {
            entries.lock().unwrap().push(args.to_vec());
        }
    }

    pub fn received(&self) -> Vec<Vec<Value>> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Strip ANSI color escapes from a rendered log line.
#[allow(dead_code)]
pub fn strip_ansi(text: &str) -> String {
    Regex::new("\x1b\\[[0-9;]*m")
        .unwrap()
        .replace_all(text, "")
        .to_string()
}
