//! Dual logging surface (§10.2): every diagnostic message is emitted through
//! `tracing` *and*, if one is registered, through a C-style logger callback,
//! so embedders that expect the legacy `set_logger_proc` style and
//! embedders that just want `tracing` both observe it exactly once.

use std::sync::{Mutex, OnceLock};

/// Severity of a logged diagnostic, mirroring `tracing::Level` ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A caller-supplied logging callback, in the style of libuiohook's
/// `logger_t`.
pub type LoggerProc = Box<dyn Fn(LogLevel, &str) + Send + Sync>;

static LOGGER_PROC: OnceLock<Mutex<Option<LoggerProc>>> = OnceLock::new();

fn proc_slot() -> &'static Mutex<Option<LoggerProc>> {
    LOGGER_PROC.get_or_init(|| Mutex::new(None))
}

/// Registers a callback invoked for every diagnostic message, in addition to
/// the `tracing` event the message always produces. Passing `None` clears
/// any previously registered callback.
pub fn set_logger_proc(proc: Option<LoggerProc>) {
    *proc_slot().lock().unwrap() = proc;
}

/// Emits `message` at `level`: always as a `tracing` event, and additionally
/// through the registered [`LoggerProc`] if one is set.
pub fn log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!("{message}"),
        LogLevel::Info => tracing::info!("{message}"),
        LogLevel::Warn => tracing::warn!("{message}"),
        LogLevel::Error => tracing::error!("{message}"),
    }

    if let Some(proc) = proc_slot().lock().unwrap().as_ref() {
        proc(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    #[test]
    fn test_registered_proc_receives_message() {
        let received = Arc::new(StdMutex::new(None));
        let received_clone = Arc::clone(&received);
        set_logger_proc(Some(Box::new(move |level, msg| {
            *received_clone.lock().unwrap() = Some((level, msg.to_string()));
        })));

        log(LogLevel::Warn, "hook install retried");

        let got = received.lock().unwrap().clone();
        assert_eq!(got, Some((LogLevel::Warn, "hook install retried".to_string())));

        set_logger_proc(None);
    }

    #[test]
    fn test_log_without_registered_proc_does_not_panic() {
        set_logger_proc(None);
        log(LogLevel::Info, "no listener registered");
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
