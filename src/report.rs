//! Reporting collaborator.
//!
//! The engine never prints. Warnings and errors are handed to a [`Report`]
//! owned by the host so console, log file or GUI presentation stay
//! uniform.

pub trait Report: Send + Sync {
    fn warn(&self, id: u32, msg: &str);

    fn error(&self, id: u32, msg: &str);
}

/// Forwards everything to the `log` facade.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogReport;

impl Report for LogReport {
    fn warn(&self, id: u32, msg: &str) {
        log::warn!("[{}] {}", id, msg);
    }

    fn error(&self, id: u32, msg: &str) {
        log::error!("[{}] {}", id, msg);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::Report;
    use std::sync::Mutex;

    /// Keeps every message, for assertions.
    #[derive(Default)]
    pub struct RecordingReport {
        pub warnings: Mutex<Vec<(u32, String)>>,
        pub errors: Mutex<Vec<(u32, String)>>,
    }

    impl Report for RecordingReport {
        fn warn(&self, id: u32, msg: &str) {
            self.warnings.lock().unwrap().push((id, msg.to_string()));
        }

        fn error(&self, id: u32, msg: &str) {
            self.errors.lock().unwrap().push((id, msg.to_string()));
        }
    }
}
