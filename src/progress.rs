//! Step progress reporting

use anyhow::{bail, Result};

/// Receives the current position after every step change
pub trait ProgressReporter {
    fn report(&mut self, current: usize, total: usize) -> Result<()>;
}

/// Progress shown in the header gauge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressGauge {
    current: usize,
    total: usize,
}

impl ProgressGauge {
    /// Completion in percent, 0 before the first report
    pub fn percent(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        ((self.current * 100) / self.total).min(100) as u16
    }

    pub fn label(&self) -> String {
        format!("Step {} of {}", self.current, self.total)
    }
}

impl ProgressReporter for ProgressGauge {
    fn report(&mut self, current: usize, total: usize) -> Result<()> {
        if total == 0 {
            bail!("progress total must be positive");
        }
        if current == 0 || current > total {
            bail!("step {current} outside 1..={total}");
        }
        self.current = current;
        self.total = total;
        Ok(())
    }
}

/// Forward a step change to the reporter, if any. Failures are logged and
/// never interrupt navigation.
pub fn notify(reporter: Option<&mut dyn ProgressReporter>, current: usize, total: usize) {
    let Some(reporter) = reporter else {
        tracing::debug!(current, total, "no progress reporter");
        return;
    };
    if let Err(err) = reporter.report(current, total) {
        tracing::warn!(%err, "progress update failed");
    }
}
