//! Capture engine diagnostics instead of printing them.
//!
//! [`Interception::install`] swaps both engine hooks for the lifetime of the
//! returned guard: system messages go through the default handling and are
//! recorded, and the warning stream is discarded. Dropping the guard restores
//! the previous hooks, also when unwinding from a panic.
//!
//! The hooks are process-wide. Interceptions are serialized against each other
//! by a mutex held by the guard, but a plain render running on another thread
//! meanwhile also goes through the intercepted hooks.

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rstview_engine::hooks::{self, StreamWriteFn, SystemMessageFn};
use rstview_engine::{Level, Reporter};

static INTERCEPTION_LOCK: Mutex<()> = Mutex::new(());

/// A diagnostic captured during a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source line, when the engine knows it.
    pub line: Option<usize>,
    pub level: Level,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(line: Option<usize>, level: Level, message: impl Into<String>) -> Self {
        Self {
            line,
            level,
            message: message.into(),
        }
    }
}

/// Guard holding the engine hooks intercepted.
pub struct Interception {
    records: Arc<Mutex<Vec<Diagnostic>>>,
    previous_message_hook: Option<Arc<SystemMessageFn>>,
    previous_stream_hook: Option<Arc<StreamWriteFn>>,
    _lock: MutexGuard<'static, ()>,
}

impl Interception {
    /// Start intercepting; diagnostics at or above `threshold` are recorded.
    ///
    /// Blocks while another interception is active.
    pub fn install(threshold: Level) -> Self {
        let lock = INTERCEPTION_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&records);
        let previous_message_hook = hooks::replace_system_message_hook(Some(Arc::new(
            move |reporter: &Reporter, level: Level, message: &str, line: Option<usize>| {
                if level >= threshold {
                    sink.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(Diagnostic::new(line, level, message));
                }
                reporter.default_system_message(level, message, line)
            },
        )));
        let previous_stream_hook = hooks::replace_stream_write_hook(Some(Arc::new(|_: &str| {})));

        tracing::trace!(threshold = %threshold, "Installed diagnostic interception");
        Self {
            records,
            previous_message_hook,
            previous_stream_hook,
            _lock: lock,
        }
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop intercepting and return the recorded diagnostics.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Drop for Interception {
    fn drop(&mut self) {
        hooks::replace_stream_write_hook(self.previous_stream_hook.take());
        hooks::replace_system_message_hook(self.previous_message_hook.take());
        tracing::trace!("Restored engine hooks");
    }
}

impl fmt::Debug for Interception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interception")
            .field("records", &self.diagnostics())
            .finish_non_exhaustive()
    }
}

/// Run `f` with diagnostics intercepted, returning its result and the
/// diagnostics at or above `threshold`.
pub fn intercept<R>(threshold: Level, f: impl FnOnce() -> R) -> (R, Vec<Diagnostic>) {
    let interception = Interception::install(threshold);
    let result = f();
    (result, interception.finish())
}
