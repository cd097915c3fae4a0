//! Logging and diagnostics conduit passed through cache operations
//!
//! A `Context` is not a cancellation token. It scopes log output under a
//! tracing span and collects issues for the caller to report.

use std::sync::{Arc, Mutex};
use tracing::{info, info_span, warn, Span};

/// Shared logging context for a unit of build work
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    label: String,
    span: Span,
    issues: Mutex<Vec<String>>,
}

impl Context {
    /// Create a context with its own span
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let span = info_span!("build", op = %label);
        Self {
            inner: Arc::new(Inner {
                label,
                span,
                issues: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Span that work on behalf of this context runs in
    pub fn span(&self) -> &Span {
        &self.inner.span
    }

    /// Emit progress output
    pub fn output(&self, message: &str) {
        let _enter = self.inner.span.enter();
        info!("{}", message);
    }

    /// Record an issue and log it as a warning
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        {
            let _enter = self.inner.span.enter();
            warn!("{}", message);
        }
        let mut issues = match self.inner.issues.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        issues.push(message);
    }

    /// Issues recorded so far, in order
    pub fn issues(&self) -> Vec<String> {
        match self.inner.issues.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
