//! Build progress reporting

use tracing::debug;

/// Forwards progress to a caller callback, never letting the percentage go backwards.
pub struct Progress<'a> {
    callback: &'a mut dyn FnMut(f32, &str),
    last: f32,
}

impl<'a> Progress<'a> {
    pub fn new(callback: &'a mut dyn FnMut(f32, &str)) -> Self {
        Self {
            callback,
            last: 0.0,
        }
    }

    /// Report `percent` (clamped to 0..=100 and to the last reported value).
    pub fn report(&mut self, percent: f32, message: &str) {
        let percent = percent.clamp(0.0, 100.0).max(self.last);
        self.last = percent;
        debug!("[{:5.1}%] {}", percent, message);
        (self.callback)(percent, message);
    }

    /// Report a sub-phase's own 0..=100 progress mapped into `start..=end`.
    pub fn report_within(&mut self, start: f32, end: f32, sub_percent: f32, message: &str) {
        let sub = sub_percent.clamp(0.0, 100.0) / 100.0;
        self.report(start + (end - start) * sub, message);
    }

    pub fn last(&self) -> f32 {
        self.last
    }
}
