//! Where findings go.
//!
//! Findings are written one line each, as soon as they are found. The
//! [`Reporter`] trait keeps the scanner independent of the destination.

use crate::model::Finding;
use std::io::Write;
use std::sync::Mutex;
use tracing::warn;

pub trait Reporter: Send + Sync {
    fn report(&self, finding: &Finding);
}

/// Writes each finding as a line on standard output.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&self, finding: &Finding) {
        write_finding(&mut std::io::stdout().lock(), finding);
    }
}

/// Writes one finding line. A failed write is logged and does not stop the
/// scan; returns whether the line was written.
fn write_finding<W: Write>(out: &mut W, finding: &Finding) -> bool {
    match writeln!(out, "{}", finding).and_then(|_| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to write finding for {}: {}", finding.package(), e);
            false
        }
    }
}

/// Keeps the rendered lines in memory.
#[derive(Default)]
pub struct BufferReporter {
    lines: Mutex<Vec<String>>,
}

impl BufferReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Reporter for BufferReporter {
    fn report(&self, finding: &Finding) {
        let line = finding.to_string();
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

impl<R: Reporter + ?Sized> Reporter for std::sync::Arc<R> {
    fn report(&self, finding: &Finding) {
        (**self).report(finding)
    }
}
