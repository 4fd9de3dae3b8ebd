//! Process-wide extension points.
//!
//! The engine exposes two hooks shared by every parse in the process: the
//! system-message handler used by [`Reporter::system_message`] and the writer
//! for the warning stream. Each `replace_*` function installs a new hook and
//! returns the previous one so callers can restore it.

use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::EngineError;
use crate::reporter::{Level, Reporter, SystemMessage};

/// System-message handler signature.
pub type SystemMessageFn = dyn Fn(&Reporter, Level, &str, Option<usize>) -> Result<SystemMessage, EngineError>
    + Send
    + Sync;

/// Warning-stream writer signature.
pub type StreamWriteFn = dyn Fn(&str) + Send + Sync;

static SYSTEM_MESSAGE_HOOK: RwLock<Option<Arc<SystemMessageFn>>> = RwLock::new(None);
static STREAM_WRITE_HOOK: RwLock<Option<Arc<StreamWriteFn>>> = RwLock::new(None);

/// Install `hook` as the system-message handler, returning the previous one.
///
/// `None` restores the default handling.
pub fn replace_system_message_hook(
    hook: Option<Arc<SystemMessageFn>>,
) -> Option<Arc<SystemMessageFn>> {
    let mut slot = SYSTEM_MESSAGE_HOOK
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, hook)
}

/// Install `hook` as the warning-stream writer, returning the previous one.
///
/// `None` restores writing to stderr.
pub fn replace_stream_write_hook(hook: Option<Arc<StreamWriteFn>>) -> Option<Arc<StreamWriteFn>> {
    let mut slot = STREAM_WRITE_HOOK
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, hook)
}

pub(crate) fn system_message_hook() -> Option<Arc<SystemMessageFn>> {
    SYSTEM_MESSAGE_HOOK
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Write `text` to the warning stream.
pub fn write_warning(text: &str) {
    // Clone out of the lock so a hook may itself replace hooks.
    let hook = STREAM_WRITE_HOOK
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match hook {
        Some(hook) => hook(text),
        None => {
            let _ = std::io::stderr().write_all(text.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_replace_returns_previous() {
        let first: Arc<StreamWriteFn> = Arc::new(|_: &str| {});
        let original = replace_stream_write_hook(Some(Arc::clone(&first)));

        let second: Arc<StreamWriteFn> = Arc::new(|_: &str| {});
        let previous = replace_stream_write_hook(Some(second)).unwrap();
        assert!(Arc::ptr_eq(&previous, &first));

        replace_stream_write_hook(original);
    }

    #[test]
    #[serial]
    fn test_write_warning_uses_hook() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let original = replace_stream_write_hook(Some(Arc::new(move |text: &str| {
            sink.lock().unwrap().push(text.to_owned());
        })));

        write_warning("one\n");
        write_warning("two\n");

        replace_stream_write_hook(original);
        assert_eq!(*captured.lock().unwrap(), vec!["one\n", "two\n"]);
    }

    #[test]
    #[serial]
    fn test_hook_may_replace_hooks() {
        let original = replace_stream_write_hook(Some(Arc::new(|_: &str| {
            replace_stream_write_hook(None);
        })));

        write_warning("reentrant\n");

        assert!(STREAM_WRITE_HOOK.read().unwrap().is_none());
        replace_stream_write_hook(original);
    }
}
