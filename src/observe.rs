//! Where the thread client reports what it's doing.
//!
//! The client never touches process-wide logging configuration itself; it is
//! handed an [Observer] at construction. The default forwards to [tracing],
//! leaving the subscriber up to the binary.

use tracing::{debug, error, info, trace, warn, Level};

/// A sink for leveled events.
pub trait Observer: Send + Sync {
    fn event(&self, level: Level, message: &str);
}

/// Forward events to whichever [tracing] subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn event(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => error!("{}", message),
            Level::WARN => warn!("{}", message),
            Level::INFO => info!("{}", message),
            Level::DEBUG => debug!("{}", message),
            Level::TRACE => trace!("{}", message),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every event for later inspection.
    #[derive(Default)]
    pub struct RecordingObserver {
        events: Mutex<Vec<(Level, String)>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<(Level, String)> {
            self.events.lock().unwrap().clone()
        }

        pub fn at(&self, level: Level) -> Vec<String> {
            self.events()
                .into_iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m)
                .collect()
        }
    }

    impl Observer for RecordingObserver {
        fn event(&self, level: Level, message: &str) {
            self.events.lock().unwrap().push((level, message.to_owned()));
        }
    }
}
