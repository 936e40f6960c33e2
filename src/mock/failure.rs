//! Failure Injection for the Mock CMDB
//!
//! Supports configurable failure injection for testing error paths.

use std::collections::HashMap;

use serde_json::{json, Value};

/// What the mock does instead of answering normally.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureMode {
    /// Reply with this value in the `error` member.
    Error(Value),
    /// Reply with `"result": null` and no error.
    NullResult,
    /// Answer normally but under a different id.
    ForeignId(String),
    /// Leave the request unanswered.
    DropReply,
}

/// Failure configuration for a method
#[derive(Debug, Clone)]
pub struct FailureConfig {
    pub mode: FailureMode,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    fn new(mode: FailureMode) -> Self {
        Self { mode, fail_count: None }
    }

    /// A JSON-RPC error object with `code` and `message`
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self::new(FailureMode::Error(json!({
            "code": code,
            "message": message.into(),
            "data": null,
        })))
    }

    /// An arbitrary value in the `error` member
    pub fn error_value(error: Value) -> Self {
        Self::new(FailureMode::Error(error))
    }

    pub fn null_result() -> Self {
        Self::new(FailureMode::NullResult)
    }

    pub fn foreign_id(id: impl Into<String>) -> Self {
        Self::new(FailureMode::ForeignId(id.into()))
    }

    pub fn drop_reply() -> Self {
        Self::new(FailureMode::DropReply)
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Failure injector for the mock CMDB, keyed by method name
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<String, FailureConfig>,
    /// Call counts per method (for fail_count tracking)
    call_counts: HashMap<String, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for a method
    pub fn inject(&mut self, method: impl Into<String>, config: FailureConfig) {
        let method = method.into();
        self.configs.insert(method.clone(), config);
        self.call_counts.insert(method, 0);
    }

    /// Clear all failure injections
    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Clear failure injection for a specific method
    pub fn clear_method(&mut self, method: &str) {
        self.configs.remove(method);
        self.call_counts.remove(method);
    }

    /// The failure mode to apply to this call of `method`, if any
    pub fn check(&mut self, method: &str) -> Option<FailureMode> {
        let config = self.configs.get(method)?;
        let count = self.call_counts.entry(method.to_string()).or_insert(0);
        *count += 1;

        if let Some(fail_limit) = config.fail_count {
            if *count > fail_limit {
                return None;
            }
        }

        Some(config.mode.clone())
    }
}
